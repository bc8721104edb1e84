/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 在庫不足（要求数量が現在庫を超えている）
    InsufficientStock {
        book_name: String,
        requested: u32,
        available: u32,
    },
    /// 無効な数量（例: 0以下の数量）
    InvalidQuantity,
    /// 書籍の検証失敗（例: ジャンルが空、ページ数が0）
    BookValidation(String),
    /// 販売記録の検証失敗（例: 購入者名が空）
    SaleValidation(String),
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値
    InvalidValue(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InsufficientStock {
                book_name,
                requested,
                available,
            } => write!(
                f,
                "Requested quantity ({}) exceeds available stock ({}) for book \"{}\"",
                requested, available, book_name
            ),
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::BookValidation(msg) => write!(f, "Book validation failed: {}", msg),
            DomainError::SaleValidation(msg) => write!(f, "Sale validation failed: {}", msg),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
