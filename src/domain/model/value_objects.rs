use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 書籍の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    /// 新しい一意のBookIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 販売記録の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleId(Uuid);

impl SaleId {
    /// 新しい一意のSaleIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから SaleId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からSaleIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for SaleId {
    fn default() -> Self {
        Self::new()
    }
}

/// 販売者（書籍の所有者）の一意識別子
/// 認証レイヤーから渡されるユーザーIDに対応する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SellerId(Uuid);

impl SellerId {
    /// 新しい一意のSellerIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから SellerId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からSellerIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for SellerId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 米ドル
    #[allow(clippy::upper_case_acronyms)]
    USD,
}

/// 金額を表す値オブジェクト（最小通貨単位で保持）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "USD" => Currency::USD,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// 米ドルの金額を作成
    pub fn usd(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::USD,
        }
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::USD => "USD".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }
}

/// 書籍の形態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookFormat {
    /// ハードカバー
    Hardcover,
    /// ペーパーバック
    Paperback,
    /// 電子書籍
    Ebook,
    /// オーディオブック
    Audiobook,
}

impl fmt::Display for BookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format_str = match self {
            BookFormat::Hardcover => "hardcover",
            BookFormat::Paperback => "paperback",
            BookFormat::Ebook => "ebook",
            BookFormat::Audiobook => "audiobook",
        };
        write!(f, "{}", format_str)
    }
}

impl BookFormat {
    /// 文字列からBookFormatを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "hardcover" => Ok(BookFormat::Hardcover),
            "paperback" => Ok(BookFormat::Paperback),
            "ebook" => Ok(BookFormat::Ebook),
            "audiobook" => Ok(BookFormat::Audiobook),
            _ => Err(DomainError::InvalidValue(format!("無効な書籍形態: {}", s))),
        }
    }
}
