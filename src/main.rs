mod adapter;
mod application;
mod domain;

use adapter::driven::{ConsoleLogger, MySqlBookRepository, MySqlSaleRepository};
use adapter::driver::rest_api::{create_router, AppStateInner};
use adapter::{DatabaseConfig, DatabaseMigration};
use application::service::{BookApplicationService, SaleApplicationService, SalesHistoryService};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 書店販売管理システム REST API ===");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLリポジトリを作成
    let book_repository = Arc::new(MySqlBookRepository::new(pool.clone()));
    let sale_repository = Arc::new(MySqlSaleRepository::new(pool.clone()));

    // ロガーを作成
    let logger = Arc::new(ConsoleLogger::new());

    // アプリケーションサービスを作成
    let book_service = BookApplicationService::new(book_repository.clone());
    let sale_service = SaleApplicationService::new(sale_repository.clone(), logger.clone());
    let sales_history_service = SalesHistoryService::new(sale_repository.clone());

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        book_service: Arc::new(book_service),
        sale_service: Arc::new(sale_service),
        sales_history_service: Arc::new(sales_history_service),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  POST   /sales/create-sale - 販売作成（在庫の引き落としを含む）");
    println!("  GET    /sales/history - 販売履歴の期間集計取得");
    println!("  POST   /books/create-book - 書籍登録");
    println!("  GET    /books - 書籍一覧取得");
    println!("  GET    /books/:id - 書籍詳細取得");
    println!("  PUT    /books/:id - 書籍更新");
    println!("  DELETE /books/:id - 書籍削除");
    println!("  DELETE /books/delete-multiple-books - 書籍一括削除");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
