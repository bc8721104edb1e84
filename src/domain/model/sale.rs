use crate::domain::error::DomainError;
use crate::domain::model::{BookId, Money, SaleId, SellerId};
use chrono::{DateTime, Utc};

/// 販売記録
/// 1件の販売（1冊以上）を表す不変のエンティティ
/// 販売トランザクション以外から作成されることはなく、作成後は変更されない
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    id: SaleId,
    book_id: BookId,
    quantity: u32,
    buyer: String,
    sale_date: DateTime<Utc>,
    seller_id: SellerId,
}

impl Sale {
    /// 新しい販売記録を作成
    ///
    /// # Arguments
    /// * `quantity` - 販売数量（1以上）
    /// * `buyer` - 購入者名（空でない文字列）
    /// * `sale_date` - 販売日時（Noneの場合は現在時刻）
    ///
    /// # Returns
    /// * `Ok(Sale)` - 作成成功
    /// * `Err(DomainError)` - 検証失敗
    pub fn new(
        id: SaleId,
        book_id: BookId,
        quantity: u32,
        buyer: String,
        sale_date: Option<DateTime<Utc>>,
        seller_id: SellerId,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        if buyer.trim().is_empty() {
            return Err(DomainError::SaleValidation(
                "購入者名は空にできません".to_string(),
            ));
        }
        Ok(Self {
            id,
            book_id,
            quantity,
            buyer,
            sale_date: sale_date.unwrap_or_else(Utc::now),
            seller_id,
        })
    }

    /// データベースから取得したデータで販売記録を再構築
    /// リポジトリでの使用を想定
    pub fn reconstruct(
        id: SaleId,
        book_id: BookId,
        quantity: u32,
        buyer: String,
        sale_date: DateTime<Utc>,
        seller_id: SellerId,
    ) -> Result<Self, DomainError> {
        Self::new(id, book_id, quantity, buyer, Some(sale_date), seller_id)
    }

    /// 販売記録IDを取得
    pub fn id(&self) -> SaleId {
        self.id
    }

    /// 書籍IDを取得
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// 販売数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 購入者名を取得
    pub fn buyer(&self) -> &str {
        &self.buyer
    }

    /// 販売日時を取得
    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    /// 販売者のIDを取得
    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }
}

/// 書籍の表示フィールドと結合された販売記録
/// 販売作成のレスポンス用（書籍の在庫数は引き落とし後の値）
#[derive(Debug, Clone, PartialEq)]
pub struct SaleWithBook {
    pub sale: Sale,
    pub book_name: String,
    pub book_price: Money,
    pub book_quantity: u32,
}
