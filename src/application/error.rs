use crate::domain::error::DomainError;
use crate::domain::port::{RepositoryError, SaleTransactionError};

/// アプリケーション層のエラー型
/// ドメインエラー、リポジトリエラー、リクエスト検証エラーをラップする
#[derive(Debug)]
pub enum ApplicationError {
    /// ドメインエラー（ビジネスルール違反）
    DomainError(DomainError),
    /// リポジトリエラー（永続化の失敗）
    RepositoryError(RepositoryError),
    /// エンティティが見つからない
    NotFound(String),
    /// 無効なリクエスト（ページングや期間パラメータの不正など）
    InvalidRequest(String),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::DomainError(err) => write!(f, "Domain error: {}", err),
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ApplicationError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApplicationError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ApplicationError {}

// From実装でエラー変換を簡潔に
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        ApplicationError::DomainError(err)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::RepositoryError(err)
    }
}

/// 販売トランザクションの失敗種別を対応するアプリケーションエラーに写す
/// 種別は畳み込まず、呼び出し側がそのまま区別できるようにする
impl From<SaleTransactionError> for ApplicationError {
    fn from(err: SaleTransactionError) -> Self {
        match err {
            SaleTransactionError::BookNotFound(book_id) => {
                ApplicationError::NotFound(format!("Book with ID {} not found", book_id))
            }
            SaleTransactionError::Domain(err) => ApplicationError::DomainError(err),
            SaleTransactionError::Repository(err) => ApplicationError::RepositoryError(err),
        }
    }
}
