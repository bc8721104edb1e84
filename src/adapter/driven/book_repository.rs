use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Book, BookFormat, BookId, Money, SellerId};
use crate::domain::port::{BookRepository, RepositoryError};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, Pool, Row};

/// MySQL書籍リポジトリ
/// MySQLデータベースを使用して書籍を永続化する
/// すべての読み書きは所有する販売者のIDでスコープされる
pub struct MySqlBookRepository {
    pool: Pool<MySql>,
}

impl MySqlBookRepository {
    /// 新しいMySQL書籍リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    ///
    /// # Returns
    /// * MySqlBookRepositoryのインスタンス
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

/// データベースの行から書籍集約を再構築する
/// 書籍取得クエリと販売トランザクションの両方で使用する
pub(crate) fn build_book_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Book, RepositoryError> {
    let book_id = BookId::from_string(row.get("id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("書籍IDの解析に失敗しました: {}", e))
    })?;

    let seller_id = SellerId::from_string(row.get("seller_id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("販売者IDの解析に失敗しました: {}", e))
    })?;

    let price = Money::new(row.get("price_amount"), row.get("price_currency")).map_err(|e| {
        RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e))
    })?;

    let format = BookFormat::from_string(row.get("format")).map_err(|e| {
        RepositoryError::FetchFailed(format!("書籍形態の解析に失敗しました: {}", e))
    })?;

    // ジャンルはJSON配列の文字列として保存されている
    let genres_json: String = row.get("genres");
    let genres: Vec<String> = serde_json::from_str(&genres_json).map_err(|e| {
        RepositoryError::FetchFailed(format!("ジャンルの解析に失敗しました: {}", e))
    })?;

    let release_date: NaiveDate = row.get("release_date");

    Book::reconstruct(
        book_id,
        row.get("name"),
        row.get("author"),
        price,
        release_date,
        row.get("publisher"),
        row.get::<Option<String>, _>("isbn"),
        row.get("language"),
        row.get::<Option<String>, _>("series"),
        genres,
        format,
        row.get::<u32, _>("page_count"),
        row.get::<u32, _>("quantity"),
        seller_id,
    )
    .map_err(|e| RepositoryError::FetchFailed(format!("書籍集約の再構築に失敗しました: {}", e)))
}

#[async_trait]
impl BookRepository for MySqlBookRepository {
    async fn save(&self, book: &Book) -> Result<(), RepositoryError> {
        let genres_json = serde_json::to_string(book.genres()).map_err(|e| {
            RepositoryError::OperationFailed(format!("ジャンルの変換に失敗しました: {}", e))
        })?;

        // 書籍データをbooksテーブルにUPSERT
        // seller_idは所有権の一部として更新対象から除外する
        sqlx::query(
            r#"
            INSERT INTO books (
                id, name, author, price_amount, price_currency, release_date,
                publisher, isbn, language, series, genres, format,
                page_count, quantity, seller_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                author = VALUES(author),
                price_amount = VALUES(price_amount),
                price_currency = VALUES(price_currency),
                release_date = VALUES(release_date),
                publisher = VALUES(publisher),
                isbn = VALUES(isbn),
                language = VALUES(language),
                series = VALUES(series),
                genres = VALUES(genres),
                format = VALUES(format),
                page_count = VALUES(page_count),
                quantity = VALUES(quantity)
            "#,
        )
        .bind(book.id().to_string())
        .bind(book.name())
        .bind(book.author())
        .bind(book.price().amount())
        .bind(book.price().currency())
        .bind(book.release_date())
        .bind(book.publisher())
        .bind(book.isbn())
        .bind(book.language())
        .bind(book.series())
        .bind(genres_json)
        .bind(book.format().to_string())
        .bind(book.page_count())
        .bind(book.quantity())
        .bind(book.seller_id().to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("書籍の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        book_id: BookId,
        seller_id: SellerId,
    ) -> Result<Option<Book>, RepositoryError> {
        // 所有者の不一致も見つからない扱いにする
        let row = sqlx::query(
            r#"
            SELECT
                id, name, author, price_amount, price_currency, release_date,
                publisher, isbn, language, series, genres, format,
                page_count, quantity, seller_id
            FROM books
            WHERE id = ? AND seller_id = ?
            "#,
        )
        .bind(book_id.to_string())
        .bind(seller_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("書籍の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(build_book_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all_by_seller(&self, seller_id: SellerId) -> Result<Vec<Book>, RepositoryError> {
        // 作成日時の降順で並べる
        let rows = sqlx::query(
            r#"
            SELECT
                id, name, author, price_amount, price_currency, release_date,
                publisher, isbn, language, series, genres, format,
                page_count, quantity, seller_id
            FROM books
            WHERE seller_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(seller_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("書籍一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut books = Vec::with_capacity(rows.len());
        for row in &rows {
            books.push(build_book_from_row(row)?);
        }

        Ok(books)
    }

    async fn delete(&self, book_id: BookId, seller_id: SellerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ? AND seller_id = ?")
            .bind(book_id.to_string())
            .bind(seller_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("書籍の削除に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(
        &self,
        book_ids: &[BookId],
        seller_id: SellerId,
    ) -> Result<u64, RepositoryError> {
        if book_ids.is_empty() {
            return Ok(0);
        }

        // IN句のプレースホルダをIDの数だけ組み立てる
        let placeholders = vec!["?"; book_ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM books WHERE seller_id = ? AND id IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&sql).bind(seller_id.to_string());
        for book_id in book_ids {
            query = query.bind(book_id.to_string());
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("書籍の一括削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected())
    }

    fn next_identity(&self) -> BookId {
        BookId::new()
    }
}
