use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 書籍登録用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateBookRequest {
    pub name: String,
    pub author: String,
    /// 価格（米ドルのセント単位）
    pub price: i64,
    pub release_date: NaiveDate,
    pub publisher: String,
    pub isbn: Option<String>,
    pub language: String,
    pub series: Option<String>,
    pub genres: Vec<String>,
    pub format: String,
    pub page_count: u32,
    pub quantity: u32,
}

/// 書籍の部分更新用のリクエストDTO
/// 指定されたフィールドのみを更新する
#[derive(Serialize, Deserialize, Default)]
pub struct UpdateBookRequest {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<i64>,
    pub release_date: Option<NaiveDate>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub language: Option<String>,
    pub series: Option<String>,
    pub genres: Option<Vec<String>>,
    pub format: Option<String>,
    pub page_count: Option<u32>,
    pub quantity: Option<u32>,
}

/// 書籍一括削除用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct DeleteMultipleBooksRequest {
    pub book_ids: Vec<Uuid>,
}

/// 販売作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub book_id: Uuid,
    /// 省略時は1
    pub quantity: Option<u32>,
    pub buyer: String,
    pub sale_date: Option<DateTime<Utc>>,
}

/// 販売履歴取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct SalesHistoryQueryParams {
    pub period: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
