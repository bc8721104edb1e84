use crate::adapter::database_error::DatabaseError;
use crate::adapter::driven::book_repository::build_book_from_row;
use crate::domain::model::{Money, Sale, SaleId, SaleWithBook, SellerId};
use crate::domain::port::{RepositoryError, SaleRepository, SaleTransactionError};
use crate::domain::report::SaleFact;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool, Row};

/// MySQL販売リポジトリ
/// 販売記録の永続化と販売実績の読み出しを担う
/// 販売作成は在庫の引き落としと同一トランザクションで実行する
pub struct MySqlSaleRepository {
    pool: Pool<MySql>,
}

impl MySqlSaleRepository {
    /// 新しいMySQL販売リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    ///
    /// # Returns
    /// * MySqlSaleRepositoryのインスタンス
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaleRepository for MySqlSaleRepository {
    async fn create_sale(&self, sale: &Sale) -> Result<SaleWithBook, SaleTransactionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "トランザクション開始に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        // 対象書籍を行ロック付きで読み取る
        // 同一書籍への並行販売をトランザクションの分離文脈で直列化する
        let row = sqlx::query(
            r#"
            SELECT
                id, name, author, price_amount, price_currency, release_date,
                publisher, isbn, language, series, genres, format,
                page_count, quantity, seller_id
            FROM books
            WHERE id = ? AND seller_id = ?
            FOR UPDATE
            "#,
        )
        .bind(sale.book_id().to_string())
        .bind(sale.seller_id().to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("書籍の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // 書籍が存在しない場合と所有者が一致しない場合は区別しない
        let Some(row) = row else {
            return Err(SaleTransactionError::BookNotFound(sale.book_id()));
        };

        let mut book = build_book_from_row(&row)?;

        // 在庫の検証と引き落としはドメインの不変条件として実行する
        book.deduct_stock(sale.quantity())?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, book_id, quantity, buyer, sale_date, seller_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sale.id().to_string())
        .bind(sale.book_id().to_string())
        .bind(sale.quantity())
        .bind(sale.buyer())
        .bind(sale.sale_date())
        .bind(sale.seller_id().to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("販売記録の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        sqlx::query("UPDATE books SET quantity = ? WHERE id = ? AND seller_id = ?")
            .bind(book.quantity())
            .bind(book.id().to_string())
            .bind(book.seller_id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("在庫の更新に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        // コミットに失敗した場合も販売記録・在庫変更のどちらも残らない
        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(SaleWithBook {
            sale: sale.clone(),
            book_name: book.name().to_string(),
            book_price: book.price(),
            book_quantity: book.quantity(),
        })
    }

    async fn find_facts_by_seller(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<SaleFact>, RepositoryError> {
        // 各販売を書籍の現在価格と結合する
        // 削除された書籍の販売は集計対象から外れる（INNER JOIN）
        let rows = sqlx::query(
            r#"
            SELECT s.sale_date, s.quantity, b.price_amount, b.price_currency
            FROM sales s
            INNER JOIN books b ON s.book_id = b.id
            WHERE s.seller_id = ?
            "#,
        )
        .bind(seller_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("販売実績の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in &rows {
            let unit_price =
                Money::new(row.get("price_amount"), row.get("price_currency")).map_err(|e| {
                    RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e))
                })?;
            let sale_date: DateTime<Utc> = row.get("sale_date");

            facts.push(SaleFact {
                sale_date,
                quantity: row.get::<u32, _>("quantity"),
                unit_price,
            });
        }

        Ok(facts)
    }

    fn next_identity(&self) -> SaleId {
        SaleId::new()
    }
}
