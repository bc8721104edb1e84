// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::error::DomainError;
use crate::domain::model::{Book, BookId, Sale, SaleId, SaleWithBook, SellerId};
use crate::domain::report::SaleFact;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 販売トランザクションエラー
/// アトミックな販売作成処理で発生する失敗種別を区別して表現する
/// 種別を汎用エラーに畳み込まず、そのまま呼び出し側へ伝搬する
#[derive(Debug, thiserror::Error)]
pub enum SaleTransactionError {
    /// 書籍が存在しない、または要求した販売者の所有でない
    /// 二つのケースは呼び出し側から区別できない（所有情報の漏洩防止）
    #[error("Book with ID {0} not found")]
    BookNotFound(BookId),
    /// ビジネスルール違反（在庫不足など）
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// 永続化の失敗（書き込み競合によるアボートを含む）
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 書籍リポジトリトレイト
/// 書籍集約の永続化を抽象化する
/// 読み書きはすべて所有する販売者のIDでスコープされる（必須パラメータ）
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 書籍を保存する（新規作成・更新の両方）
    ///
    /// # Arguments
    /// * `book` - 保存する書籍
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, book: &Book) -> Result<(), RepositoryError>;

    /// 書籍IDと販売者IDで書籍を検索する
    /// 他の販売者が所有する書籍は存在しないものとして扱う
    ///
    /// # Returns
    /// * `Ok(Some(Book))` - 書籍が見つかった
    /// * `Ok(None)` - 書籍が見つからなかった（IDまたは所有者の不一致）
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(
        &self,
        book_id: BookId,
        seller_id: SellerId,
    ) -> Result<Option<Book>, RepositoryError>;

    /// 指定された販売者が所有するすべての書籍を取得する
    /// 作成日時の降順で並べて返す
    async fn find_all_by_seller(&self, seller_id: SellerId) -> Result<Vec<Book>, RepositoryError>;

    /// 書籍を削除する
    ///
    /// # Returns
    /// * `Ok(true)` - 削除成功
    /// * `Ok(false)` - 書籍が見つからなかった（IDまたは所有者の不一致）
    /// * `Err(RepositoryError)` - 削除失敗
    async fn delete(&self, book_id: BookId, seller_id: SellerId) -> Result<bool, RepositoryError>;

    /// 複数の書籍を一括削除する
    ///
    /// # Returns
    /// * `Ok(u64)` - 削除された件数（所有者の不一致分は含まれない）
    /// * `Err(RepositoryError)` - 削除失敗
    async fn delete_many(
        &self,
        book_ids: &[BookId],
        seller_id: SellerId,
    ) -> Result<u64, RepositoryError>;

    /// 新しい一意の書籍IDを生成する
    fn next_identity(&self) -> BookId;
}

/// 販売リポジトリトレイト
/// 販売記録の永続化と販売実績の読み出しを抽象化する
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// 販売記録を作成する
    ///
    /// 次の手順を単一のアトミックなトランザクションとして実行する:
    /// 1. 対象書籍を (book_id, seller_id) で読み取る（トランザクションの分離文脈内）
    /// 2. 見つからなければ `BookNotFound`
    /// 3. 在庫を検証し引き落とす（不足なら `Domain(InsufficientStock)`）
    /// 4. 販売記録を永続化し、更新された書籍を保存してコミット
    ///
    /// いずれかの手順が失敗した場合はトランザクション全体をアボートし、
    /// 販売記録・在庫変更のどちらも残さない
    ///
    /// # Returns
    /// * `Ok(SaleWithBook)` - 作成された販売記録（引き落とし後の書籍表示フィールド付き）
    /// * `Err(SaleTransactionError)` - 失敗種別を保持したエラー
    async fn create_sale(&self, sale: &Sale) -> Result<SaleWithBook, SaleTransactionError>;

    /// 指定された販売者の全販売実績を取得する
    /// 各販売はその書籍の現在価格と結合される（集計時点の価格を採用する仕様）
    async fn find_facts_by_seller(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<SaleFact>, RepositoryError>;

    /// 新しい一意の販売記録IDを生成する
    fn next_identity(&self) -> SaleId;
}
