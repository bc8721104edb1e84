use crate::adapter::driver::auth::AuthenticatedSeller;
use crate::domain::model::{Book, SaleWithBook};
use crate::domain::report::{SalesBucket, SalesReport};
use serde::Serialize;

/// 書籍用のレスポンスDTO
#[derive(Serialize)]
pub struct BookResponse {
    pub book_id: String,
    pub name: String,
    pub author: String,
    pub price_amount: i64,
    pub price_currency: String,
    pub release_date: String,
    pub publisher: String,
    pub isbn: Option<String>,
    pub language: String,
    pub series: Option<String>,
    pub genres: Vec<String>,
    pub format: String,
    pub page_count: u32,
    pub quantity: u32,
    pub seller_id: String,
}

/// 販売記録用のレスポンスDTO
/// 書籍の表示フィールドと販売者の表示フィールドを結合して返す
#[derive(Serialize)]
pub struct SaleResponse {
    pub sale_id: String,
    pub book_id: String,
    pub book_name: String,
    pub book_price_amount: i64,
    pub book_price_currency: String,
    /// 引き落とし後の在庫数
    pub book_quantity: u32,
    pub quantity: u32,
    pub buyer: String,
    pub sale_date: String,
    pub seller_id: String,
    pub seller_name: String,
    pub seller_email: String,
}

/// 一括削除の結果用のレスポンスDTO
#[derive(Serialize)]
pub struct DeleteManyResponse {
    pub deleted_count: u64,
}

/// 集計バケット用のレスポンスDTO
#[derive(Serialize)]
pub struct SalesBucketResponse {
    pub bucket: String,
    pub total_price: i64,
    pub total_book_sold: u64,
}

/// ページングメタ情報用のレスポンスDTO
#[derive(Serialize)]
pub struct PageMetaResponse {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_page: u64,
}

/// 販売履歴用のレスポンスDTO
#[derive(Serialize)]
pub struct SalesHistoryResponse {
    pub meta: PageMetaResponse,
    pub result: Vec<SalesBucketResponse>,
}

impl BookResponse {
    /// ドメインオブジェクトからBookResponseを作成
    pub fn from_book(book: &Book) -> Self {
        Self {
            book_id: book.id().to_string(),
            name: book.name().to_string(),
            author: book.author().to_string(),
            price_amount: book.price().amount(),
            price_currency: book.price().currency(),
            release_date: book.release_date().format("%Y-%m-%d").to_string(),
            publisher: book.publisher().to_string(),
            isbn: book.isbn().map(|s| s.to_string()),
            language: book.language().to_string(),
            series: book.series().map(|s| s.to_string()),
            genres: book.genres().to_vec(),
            format: book.format().to_string(),
            page_count: book.page_count(),
            quantity: book.quantity(),
            seller_id: book.seller_id().to_string(),
        }
    }
}

impl SaleResponse {
    /// 販売記録と認証済み販売者からSaleResponseを作成
    pub fn from_sale_with_book(sale_with_book: &SaleWithBook, seller: &AuthenticatedSeller) -> Self {
        let sale = &sale_with_book.sale;
        Self {
            sale_id: sale.id().to_string(),
            book_id: sale.book_id().to_string(),
            book_name: sale_with_book.book_name.clone(),
            book_price_amount: sale_with_book.book_price.amount(),
            book_price_currency: sale_with_book.book_price.currency(),
            book_quantity: sale_with_book.book_quantity,
            quantity: sale.quantity(),
            buyer: sale.buyer().to_string(),
            sale_date: sale.sale_date().to_rfc3339(),
            seller_id: sale.seller_id().to_string(),
            seller_name: seller.name.clone(),
            seller_email: seller.email.clone(),
        }
    }
}

impl SalesBucketResponse {
    /// 集計結果からSalesBucketResponseを作成
    pub fn from_bucket(bucket: &SalesBucket) -> Self {
        Self {
            bucket: bucket.bucket.clone(),
            total_price: bucket.total_price,
            total_book_sold: bucket.total_book_sold,
        }
    }
}

impl SalesHistoryResponse {
    /// 集計レポートからSalesHistoryResponseを作成
    pub fn from_report(report: &SalesReport) -> Self {
        Self {
            meta: PageMetaResponse {
                total: report.meta.total,
                page: report.meta.page,
                limit: report.meta.limit,
                total_page: report.meta.total_page,
            },
            result: report
                .result
                .iter()
                .map(SalesBucketResponse::from_bucket)
                .collect(),
        }
    }
}
