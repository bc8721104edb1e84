use crate::application::ApplicationError;
use crate::domain::model::{
    Book, BookFormat, BookId, BookUpdate, Money, Sale, SaleWithBook, SellerId,
};
use crate::domain::port::{BookRepository, Logger, SaleRepository};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;

pub mod sales_history_service;

pub use sales_history_service::{SalesHistoryQuery, SalesHistoryService};

/// 書籍登録の入力内容
/// 境界で検証済みのリクエストから組み立てられる
#[derive(Debug, Clone)]
pub struct BookDraft {
    pub name: String,
    pub author: String,
    pub price: Money,
    pub release_date: NaiveDate,
    pub publisher: String,
    pub isbn: Option<String>,
    pub language: String,
    pub series: Option<String>,
    pub genres: Vec<String>,
    pub format: BookFormat,
    pub page_count: u32,
    pub quantity: u32,
}

/// 書籍アプリケーションサービス
/// 書籍の登録・取得・更新・削除を提供する
/// すべての操作は要求した販売者のIDでスコープされる
pub struct BookApplicationService {
    book_repository: Arc<dyn BookRepository>,
}

impl BookApplicationService {
    /// 新しい書籍アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `book_repository` - 書籍リポジトリ
    pub fn new(book_repository: Arc<dyn BookRepository>) -> Self {
        Self { book_repository }
    }

    /// 新しい書籍を登録
    /// 所有者は要求した販売者に固定される
    ///
    /// # Returns
    /// * `Ok(Book)` - 登録された書籍
    /// * `Err(ApplicationError)` - 登録失敗（検証エラーを含む）
    pub async fn create_book(
        &self,
        seller_id: SellerId,
        draft: BookDraft,
    ) -> Result<Book, ApplicationError> {
        let book_id = self.book_repository.next_identity();
        let book = Book::new(
            book_id,
            draft.name,
            draft.author,
            draft.price,
            draft.release_date,
            draft.publisher,
            draft.isbn,
            draft.language,
            draft.series,
            draft.genres,
            draft.format,
            draft.page_count,
            draft.quantity,
            seller_id,
        )?;
        self.book_repository.save(&book).await?;
        Ok(book)
    }

    /// 書籍IDで書籍を取得
    /// 他の販売者が所有する書籍は見つからない扱いになる
    pub async fn get_book(
        &self,
        book_id: BookId,
        seller_id: SellerId,
    ) -> Result<Option<Book>, ApplicationError> {
        self.book_repository
            .find_by_id(book_id, seller_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 販売者が所有するすべての書籍を取得
    /// 作成日時の降順で並べて返す
    pub async fn get_books(&self, seller_id: SellerId) -> Result<Vec<Book>, ApplicationError> {
        self.book_repository
            .find_all_by_seller(seller_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 書籍を部分更新
    /// 在庫数の明示的な更新もこの操作を通して行う
    ///
    /// # Returns
    /// * `Ok(Book)` - 更新後の書籍
    /// * `Err(ApplicationError::NotFound)` - 書籍が見つからない（IDまたは所有者の不一致）
    pub async fn update_book(
        &self,
        book_id: BookId,
        seller_id: SellerId,
        update: BookUpdate,
    ) -> Result<Book, ApplicationError> {
        let mut book = self
            .book_repository
            .find_by_id(book_id, seller_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("Book with ID {} not found", book_id))
            })?;
        book.apply_update(update)?;
        self.book_repository.save(&book).await?;
        Ok(book)
    }

    /// 書籍を削除
    ///
    /// # Returns
    /// * `Ok(())` - 削除成功
    /// * `Err(ApplicationError::NotFound)` - 書籍が見つからない（IDまたは所有者の不一致）
    pub async fn delete_book(
        &self,
        book_id: BookId,
        seller_id: SellerId,
    ) -> Result<(), ApplicationError> {
        let deleted = self.book_repository.delete(book_id, seller_id).await?;
        if !deleted {
            return Err(ApplicationError::NotFound(format!(
                "Book with ID {} not found",
                book_id
            )));
        }
        Ok(())
    }

    /// 複数の書籍を一括削除
    /// 所有者が一致しない書籍は削除されず、削除件数にも含まれない
    ///
    /// # Returns
    /// * `Ok(u64)` - 削除された件数
    /// * `Err(ApplicationError::InvalidRequest)` - IDリストが空
    pub async fn delete_books(
        &self,
        book_ids: &[BookId],
        seller_id: SellerId,
    ) -> Result<u64, ApplicationError> {
        if book_ids.is_empty() {
            return Err(ApplicationError::InvalidRequest(
                "At least one Book ID is required".to_string(),
            ));
        }
        self.book_repository
            .delete_many(book_ids, seller_id)
            .await
            .map_err(ApplicationError::from)
    }
}

/// 販売アプリケーションサービス
/// 在庫の検証・引き落としを伴うアトミックな販売作成を提供する
pub struct SaleApplicationService {
    sale_repository: Arc<dyn SaleRepository>,
    logger: Arc<dyn Logger>,
}

impl SaleApplicationService {
    /// 新しい販売アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `sale_repository` - 販売リポジトリ
    /// * `logger` - ロガー
    pub fn new(sale_repository: Arc<dyn SaleRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            sale_repository,
            logger,
        }
    }

    /// 新しい販売を作成
    ///
    /// 対象書籍の読み取り、在庫の検証・引き落とし、販売記録の永続化は
    /// リポジトリが単一のアトミックなトランザクションとして実行する
    /// いずれかの手順が失敗した場合は部分的な状態を残さない
    ///
    /// # Arguments
    /// * `seller_id` - 要求した販売者のID（認証済み）
    /// * `book_id` - 販売する書籍のID
    /// * `quantity` - 販売数量（1以上）
    /// * `buyer` - 購入者名
    /// * `sale_date` - 販売日時（Noneの場合は現在時刻）
    ///
    /// # Returns
    /// * `Ok(SaleWithBook)` - 作成された販売記録（書籍の表示フィールド付き）
    /// * `Err(ApplicationError)` - 作成失敗（種別は保持される）
    pub async fn create_sale(
        &self,
        seller_id: SellerId,
        book_id: BookId,
        quantity: u32,
        buyer: String,
        sale_date: Option<DateTime<Utc>>,
    ) -> Result<SaleWithBook, ApplicationError> {
        let sale_id = self.sale_repository.next_identity();
        let sale = Sale::new(sale_id, book_id, quantity, buyer, sale_date, seller_id)?;

        match self.sale_repository.create_sale(&sale).await {
            Ok(sale_with_book) => {
                let mut context = HashMap::new();
                context.insert("sale_id".to_string(), sale_id.to_string());
                context.insert("book_id".to_string(), book_id.to_string());
                context.insert("quantity".to_string(), quantity.to_string());
                self.logger.info(
                    "SaleApplicationService",
                    "販売を登録しました",
                    Some(seller_id.as_uuid()),
                    Some(context),
                );
                Ok(sale_with_book)
            }
            Err(err) => {
                let mut context = HashMap::new();
                context.insert("book_id".to_string(), book_id.to_string());
                context.insert("quantity".to_string(), quantity.to_string());
                self.logger.error(
                    "SaleApplicationService",
                    &format!("販売の登録に失敗しました: {}", err),
                    Some(seller_id.as_uuid()),
                    Some(context),
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::port::{RepositoryError, SaleTransactionError};
    use crate::domain::report::SaleFact;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // テスト用のモックリポジトリ
    struct MockBookRepository {
        books: Mutex<HashMap<BookId, Book>>,
    }

    impl MockBookRepository {
        fn new() -> Self {
            Self {
                books: Mutex::new(HashMap::new()),
            }
        }

        fn add_book(&self, book: Book) {
            let mut books = self.books.lock().unwrap();
            books.insert(book.id(), book);
        }
    }

    #[async_trait]
    impl BookRepository for MockBookRepository {
        async fn save(&self, book: &Book) -> Result<(), RepositoryError> {
            let mut books = self.books.lock().unwrap();
            books.insert(book.id(), book.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            book_id: BookId,
            seller_id: SellerId,
        ) -> Result<Option<Book>, RepositoryError> {
            let books = self.books.lock().unwrap();
            Ok(books
                .get(&book_id)
                .filter(|book| book.seller_id() == seller_id)
                .cloned())
        }

        async fn find_all_by_seller(
            &self,
            seller_id: SellerId,
        ) -> Result<Vec<Book>, RepositoryError> {
            let books = self.books.lock().unwrap();
            Ok(books
                .values()
                .filter(|book| book.seller_id() == seller_id)
                .cloned()
                .collect())
        }

        async fn delete(
            &self,
            book_id: BookId,
            seller_id: SellerId,
        ) -> Result<bool, RepositoryError> {
            let mut books = self.books.lock().unwrap();
            let owned = books
                .get(&book_id)
                .map(|book| book.seller_id() == seller_id)
                .unwrap_or(false);
            if owned {
                books.remove(&book_id);
            }
            Ok(owned)
        }

        async fn delete_many(
            &self,
            book_ids: &[BookId],
            seller_id: SellerId,
        ) -> Result<u64, RepositoryError> {
            let mut deleted = 0;
            for book_id in book_ids {
                if self.delete(*book_id, seller_id).await? {
                    deleted += 1;
                }
            }
            Ok(deleted)
        }

        fn next_identity(&self) -> BookId {
            BookId::new()
        }
    }

    struct MockSaleRepository {
        sales: Mutex<Vec<Sale>>,
        fail_with: Mutex<Option<SaleTransactionError>>,
    }

    impl MockSaleRepository {
        fn new() -> Self {
            Self {
                sales: Mutex::new(Vec::new()),
                fail_with: Mutex::new(None),
            }
        }

        fn fail_next_with(&self, err: SaleTransactionError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }
    }

    #[async_trait]
    impl SaleRepository for MockSaleRepository {
        async fn create_sale(&self, sale: &Sale) -> Result<SaleWithBook, SaleTransactionError> {
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            self.sales.lock().unwrap().push(sale.clone());
            Ok(SaleWithBook {
                sale: sale.clone(),
                book_name: "Test Book".to_string(),
                book_price: Money::usd(1000),
                book_quantity: 5,
            })
        }

        async fn find_facts_by_seller(
            &self,
            _seller_id: SellerId,
        ) -> Result<Vec<SaleFact>, RepositoryError> {
            Ok(Vec::new())
        }

        fn next_identity(&self) -> crate::domain::model::SaleId {
            crate::domain::model::SaleId::new()
        }
    }

    struct NullLogger;

    impl Logger for NullLogger {
        fn debug(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<uuid::Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
        }
        fn info(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<uuid::Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
        }
        fn warn(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<uuid::Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
        }
        fn error(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<uuid::Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
        }
    }

    fn sample_draft() -> BookDraft {
        BookDraft {
            name: "The Rust Programming Language".to_string(),
            author: "Steve Klabnik".to_string(),
            price: Money::usd(3500),
            release_date: NaiveDate::from_ymd_opt(2019, 8, 6).unwrap(),
            publisher: "No Starch Press".to_string(),
            isbn: Some("9781718500440".to_string()),
            language: "English".to_string(),
            series: None,
            genres: vec!["Programming".to_string()],
            format: BookFormat::Paperback,
            page_count: 560,
            quantity: 10,
        }
    }

    #[tokio::test]
    async fn test_create_book_stamps_seller() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository.clone());
        let seller_id = SellerId::new();

        let book = service.create_book(seller_id, sample_draft()).await.unwrap();
        assert_eq!(book.seller_id(), seller_id);

        let found = service.get_book(book.id(), seller_id).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_get_book_foreign_owner_is_not_found() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository.clone());
        let owner = SellerId::new();
        let other = SellerId::new();

        let book = service.create_book(owner, sample_draft()).await.unwrap();

        let found = service.get_book(book.id(), other).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_book_quantity() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository.clone());
        let seller_id = SellerId::new();

        let book = service.create_book(seller_id, sample_draft()).await.unwrap();
        let update = BookUpdate {
            quantity: Some(3),
            ..Default::default()
        };
        let updated = service
            .update_book(book.id(), seller_id, update)
            .await
            .unwrap();
        assert_eq!(updated.quantity(), 3);
    }

    #[tokio::test]
    async fn test_update_book_foreign_owner_fails_as_not_found() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository.clone());
        let owner = SellerId::new();
        let other = SellerId::new();

        let book = service.create_book(owner, sample_draft()).await.unwrap();
        let update = BookUpdate {
            quantity: Some(3),
            ..Default::default()
        };
        let result = service.update_book(book.id(), other, update).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_book_foreign_owner_fails_as_not_found() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository.clone());
        let owner = SellerId::new();
        let other = SellerId::new();

        let book = service.create_book(owner, sample_draft()).await.unwrap();
        let result = service.delete_book(book.id(), other).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));

        // 書籍は所有者からはまだ見える
        let found = service.get_book(book.id(), owner).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_delete_books_empty_list_fails() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository);
        let seller_id = SellerId::new();

        let result = service.delete_books(&[], seller_id).await;
        assert!(matches!(result, Err(ApplicationError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_books_skips_foreign_owned() {
        let repository = Arc::new(MockBookRepository::new());
        let service = BookApplicationService::new(repository.clone());
        let owner = SellerId::new();
        let other = SellerId::new();

        let mine = service.create_book(owner, sample_draft()).await.unwrap();
        let theirs = service.create_book(other, sample_draft()).await.unwrap();

        let deleted = service
            .delete_books(&[mine.id(), theirs.id()], owner)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_create_sale_success() {
        let repository = Arc::new(MockSaleRepository::new());
        let service = SaleApplicationService::new(repository.clone(), Arc::new(NullLogger));
        let seller_id = SellerId::new();

        let result = service
            .create_sale(seller_id, BookId::new(), 2, "Jane".to_string(), None)
            .await;
        assert!(result.is_ok());
        assert_eq!(repository.sales.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_sale_zero_quantity_fails_before_repository() {
        let repository = Arc::new(MockSaleRepository::new());
        let service = SaleApplicationService::new(repository.clone(), Arc::new(NullLogger));
        let seller_id = SellerId::new();

        let result = service
            .create_sale(seller_id, BookId::new(), 0, "Jane".to_string(), None)
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::DomainError(DomainError::InvalidQuantity))
        ));
        assert!(repository.sales.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_sale_not_found_is_surfaced() {
        let repository = Arc::new(MockSaleRepository::new());
        let service = SaleApplicationService::new(repository.clone(), Arc::new(NullLogger));
        let seller_id = SellerId::new();
        let book_id = BookId::new();

        repository.fail_next_with(SaleTransactionError::BookNotFound(book_id));

        let result = service
            .create_sale(seller_id, book_id, 2, "Jane".to_string(), None)
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_sale_insufficient_stock_is_surfaced() {
        let repository = Arc::new(MockSaleRepository::new());
        let service = SaleApplicationService::new(repository.clone(), Arc::new(NullLogger));
        let seller_id = SellerId::new();

        repository.fail_next_with(SaleTransactionError::Domain(
            DomainError::InsufficientStock {
                book_name: "Test Book".to_string(),
                requested: 10,
                available: 5,
            },
        ));

        let result = service
            .create_sale(seller_id, BookId::new(), 10, "Jane".to_string(), None)
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::DomainError(
                DomainError::InsufficientStock { .. }
            ))
        ));
    }
}
