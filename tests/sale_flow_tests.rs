use async_trait::async_trait;
use bookstore_sales_management::application::service::{
    BookApplicationService, BookDraft, SaleApplicationService, SalesHistoryQuery,
    SalesHistoryService,
};
use bookstore_sales_management::application::ApplicationError;
use bookstore_sales_management::domain::error::DomainError;
use bookstore_sales_management::domain::model::{
    Book, BookFormat, BookId, Money, Sale, SaleId, SaleWithBook, SellerId,
};
use bookstore_sales_management::domain::port::{
    BookRepository, Logger, RepositoryError, SaleRepository, SaleTransactionError,
};
use bookstore_sales_management::domain::report::SaleFact;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 共有のインメモリストア
/// 書籍と販売記録を同じロックの下で保持し、
/// 販売トランザクションのアトミックな挙動を再現する
#[derive(Default)]
struct InMemoryStore {
    books: Mutex<HashMap<BookId, Book>>,
    sales: Mutex<Vec<Sale>>,
}

struct InMemoryBookRepository {
    store: Arc<InMemoryStore>,
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn save(&self, book: &Book) -> Result<(), RepositoryError> {
        self.store
            .books
            .lock()
            .unwrap()
            .insert(book.id(), book.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        book_id: BookId,
        seller_id: SellerId,
    ) -> Result<Option<Book>, RepositoryError> {
        Ok(self
            .store
            .books
            .lock()
            .unwrap()
            .get(&book_id)
            .filter(|book| book.seller_id() == seller_id)
            .cloned())
    }

    async fn find_all_by_seller(&self, seller_id: SellerId) -> Result<Vec<Book>, RepositoryError> {
        Ok(self
            .store
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|book| book.seller_id() == seller_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, book_id: BookId, seller_id: SellerId) -> Result<bool, RepositoryError> {
        let mut books = self.store.books.lock().unwrap();
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

struct InMemorySaleRepository {
    store: Arc<InMemoryStore>,
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn create_sale(&self, sale: &Sale) -> Result<SaleWithBook, SaleTransactionError> {
        // 書籍の読み取り・在庫検証・販売記録の追加を単一ロックの下で行う
        let mut books = self.store.books.lock().unwrap();

        let book = books
            .get_mut(&sale.book_id())
            .filter(|book| book.seller_id() == sale.seller_id())
            .ok_or(SaleTransactionError::BookNotFound(sale.book_id()))?;

        book.deduct_stock(sale.quantity())?;

        let sale_with_book = SaleWithBook {
            sale: sale.clone(),
            book_name: book.name().to_string(),
            book_price: book.price(),
            book_quantity: book.quantity(),
        };

        self.store.sales.lock().unwrap().push(sale.clone());
        Ok(sale_with_book)
    }

    async fn find_facts_by_seller(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<SaleFact>, RepositoryError> {
        let books = self.store.books.lock().unwrap();
        let sales = self.store.sales.lock().unwrap();

        // 各販売を書籍の現在価格と結合する
        Ok(sales
            .iter()
            .filter(|sale| sale.seller_id() == seller_id)
            .filter_map(|sale| {
                books.get(&sale.book_id()).map(|book| SaleFact {
                    sale_date: sale.sale_date(),
                    quantity: sale.quantity(),
                    unit_price: book.price(),
                })
            })
            .collect())
    }

    fn next_identity(&self) -> SaleId {
        SaleId::new()
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

struct TestContext {
    store: Arc<InMemoryStore>,
    book_service: BookApplicationService,
    sale_service: SaleApplicationService,
    history_service: SalesHistoryService,
}

fn setup() -> TestContext {
    let store = Arc::new(InMemoryStore::default());
    let book_repository = Arc::new(InMemoryBookRepository {
        store: store.clone(),
    });
    let sale_repository = Arc::new(InMemorySaleRepository {
        store: store.clone(),
    });

    TestContext {
        store,
        book_service: BookApplicationService::new(book_repository),
        sale_service: SaleApplicationService::new(sale_repository.clone(), Arc::new(NullLogger)),
        history_service: SalesHistoryService::new(sale_repository),
    }
}

fn draft(name: &str, price: i64, quantity: u32) -> BookDraft {
    BookDraft {
        name: name.to_string(),
        author: "Test Author".to_string(),
        price: Money::usd(price),
        release_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        publisher: "Test Publisher".to_string(),
        isbn: None,
        language: "English".to_string(),
        series: None,
        genres: vec!["Fiction".to_string()],
        format: BookFormat::Paperback,
        page_count: 200,
        quantity,
    }
}

fn date(s: &str) -> Option<DateTime<Utc>> {
    Some(s.parse::<DateTime<Utc>>().unwrap())
}

#[tokio::test]
async fn test_sell_three_of_five_twice() {
    let ctx = setup();
    let seller_id = SellerId::new();

    let book = ctx
        .book_service
        .create_book(seller_id, draft("The Hobbit", 1500, 5))
        .await
        .unwrap();

    // 1回目: 5冊中3冊の販売は成功し、在庫は2冊になる
    let sale = ctx
        .sale_service
        .create_sale(seller_id, book.id(), 3, "Alice".to_string(), None)
        .await
        .unwrap();
    assert_eq!(sale.book_quantity, 2);

    // 2回目: 残り2冊に対する3冊の販売は在庫不足で失敗する
    let result = ctx
        .sale_service
        .create_sale(seller_id, book.id(), 3, "Bob".to_string(), None)
        .await;
    match result {
        Err(ApplicationError::DomainError(DomainError::InsufficientStock {
            book_name,
            requested,
            available,
        })) => {
            assert_eq!(book_name, "The Hobbit");
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("在庫不足エラーを期待したが: {:?}", other.err()),
    }

    // 在庫は2冊のまま、販売記録は1件のみ
    let remaining = ctx
        .book_service
        .get_book(book.id(), seller_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remaining.quantity(), 2);
    assert_eq!(ctx.store.sales.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_sale_leaves_no_partial_state() {
    let ctx = setup();
    let seller_id = SellerId::new();

    let book = ctx
        .book_service
        .create_book(seller_id, draft("Dune", 2000, 1))
        .await
        .unwrap();

    let result = ctx
        .sale_service
        .create_sale(seller_id, book.id(), 10, "Carol".to_string(), None)
        .await;
    assert!(result.is_err());

    // 販売記録も在庫変更も残らない
    assert!(ctx.store.sales.lock().unwrap().is_empty());
    let book = ctx
        .book_service
        .get_book(book.id(), seller_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(book.quantity(), 1);
}

#[tokio::test]
async fn test_ownership_isolation_fails_as_not_found() {
    let ctx = setup();
    let owner = SellerId::new();
    let other = SellerId::new();

    let book = ctx
        .book_service
        .create_book(owner, draft("1984", 1200, 5))
        .await
        .unwrap();

    // 他の販売者は存在しない書籍として扱われる
    let result = ctx
        .sale_service
        .create_sale(other, book.id(), 1, "Mallory".to_string(), None)
        .await;
    assert!(matches!(result, Err(ApplicationError::NotFound(_))));

    // 在庫は変わらず、販売記録も作られない
    let book = ctx.book_service.get_book(book.id(), owner).await.unwrap().unwrap();
    assert_eq!(book.quantity(), 5);
    assert!(ctx.store.sales.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_nonexistent_book_fails_as_not_found() {
    let ctx = setup();
    let seller_id = SellerId::new();

    let result = ctx
        .sale_service
        .create_sale(seller_id, BookId::new(), 1, "Dave".to_string(), None)
        .await;
    assert!(matches!(result, Err(ApplicationError::NotFound(_))));
}

#[tokio::test]
async fn test_sales_history_year_buckets() {
    let ctx = setup();
    let seller_id = SellerId::new();

    let book = ctx
        .book_service
        .create_book(seller_id, draft("Foundation", 10, 100))
        .await
        .unwrap();

    // 2023年に4冊と3冊、2024年に2冊を販売
    for (sale_date, quantity, buyer) in [
        ("2023-02-01T00:00:00Z", 4, "Alice"),
        ("2023-09-15T00:00:00Z", 3, "Bob"),
        ("2024-06-30T00:00:00Z", 2, "Carol"),
    ] {
        ctx.sale_service
            .create_sale(
                seller_id,
                book.id(),
                quantity,
                buyer.to_string(),
                date(sale_date),
            )
            .await
            .unwrap();
    }

    let query = SalesHistoryQuery {
        period: Some("year".to_string()),
        ..Default::default()
    };
    let report = ctx
        .history_service
        .get_sales_history(seller_id, query)
        .await
        .unwrap();

    // 既定のソートはバケットキーの降順（新しい期間が先頭）
    assert_eq!(report.meta.total, 2);
    assert_eq!(report.result.len(), 2);
    assert_eq!(report.result[0].bucket, "2024");
    assert_eq!(report.result[0].total_book_sold, 2);
    assert_eq!(report.result[0].total_price, 20);
    assert_eq!(report.result[1].bucket, "2023");
    assert_eq!(report.result[1].total_book_sold, 7);
    assert_eq!(report.result[1].total_price, 70);
}

#[tokio::test]
async fn test_sales_history_excludes_other_sellers() {
    let ctx = setup();
    let seller_a = SellerId::new();
    let seller_b = SellerId::new();

    let book_a = ctx
        .book_service
        .create_book(seller_a, draft("Book A", 100, 10))
        .await
        .unwrap();
    let book_b = ctx
        .book_service
        .create_book(seller_b, draft("Book B", 100, 10))
        .await
        .unwrap();

    ctx.sale_service
        .create_sale(seller_a, book_a.id(), 2, "Alice".to_string(), None)
        .await
        .unwrap();
    ctx.sale_service
        .create_sale(seller_b, book_b.id(), 5, "Bob".to_string(), None)
        .await
        .unwrap();

    let report = ctx
        .history_service
        .get_sales_history(seller_a, SalesHistoryQuery::default())
        .await
        .unwrap();

    let total_sold: u64 = report.result.iter().map(|b| b.total_book_sold).sum();
    assert_eq!(total_sold, 2);
}

#[tokio::test]
async fn test_history_uses_current_book_price() {
    let ctx = setup();
    let seller_id = SellerId::new();

    let book = ctx
        .book_service
        .create_book(seller_id, draft("Neuromancer", 10, 10))
        .await
        .unwrap();

    ctx.sale_service
        .create_sale(seller_id, book.id(), 2, "Alice".to_string(), None)
        .await
        .unwrap();

    // 価格を変更すると、過去の販売も新しい価格で集計される
    let update = bookstore_sales_management::domain::model::BookUpdate {
        price: Some(Money::usd(50)),
        ..Default::default()
    };
    ctx.book_service
        .update_book(book.id(), seller_id, update)
        .await
        .unwrap();

    let report = ctx
        .history_service
        .get_sales_history(seller_id, SalesHistoryQuery::default())
        .await
        .unwrap();

    assert_eq!(report.result[0].total_price, 100); // 2 × 50
}
