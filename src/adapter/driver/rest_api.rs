use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driver::auth::AuthenticatedSeller;
use crate::adapter::driver::request_dto::{
    CreateBookRequest, CreateSaleRequest, DeleteMultipleBooksRequest, SalesHistoryQueryParams,
    UpdateBookRequest,
};
use crate::adapter::driver::response_dto::{
    BookResponse, DeleteManyResponse, SaleResponse, SalesHistoryResponse,
};
use crate::application::service::{
    BookApplicationService, BookDraft, SaleApplicationService, SalesHistoryQuery,
    SalesHistoryService,
};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{BookFormat, BookId, BookUpdate, Money};

/// エラーレスポンスDTO
/// `success`は常にfalse、`code`は機械判読用のエラーコード
#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl ApiError {
    fn new(message: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: code.to_string(),
        }
    }
}

// アプリケーションサービスを含む状態
pub type AppState = AppStateInner;

#[derive(Clone)]
pub struct AppStateInner {
    pub book_service: Arc<BookApplicationService>,
    pub sale_service: Arc<SaleApplicationService>,
    pub sales_history_service: Arc<SalesHistoryService>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/sales/create-sale", post(create_sale))
        .route("/sales/history", get(get_sales_history))
        .route("/books/create-book", post(create_book))
        .route("/books", get(get_books))
        .route("/books/delete-multiple-books", delete(delete_multiple_books))
        .route(
            "/books/:book_id",
            get(get_book_by_id).put(update_book).delete(delete_book),
        )
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bookstore-sales-management",
        "version": "0.1.0"
    }))
}

// 販売作成エンドポイント
// 在庫の検証・引き落としと販売記録の保存をアトミックに実行する
async fn create_sale(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    Json(request): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), (StatusCode, Json<ApiError>)> {
    let book_id = BookId::from_uuid(request.book_id);
    let quantity = request.quantity.unwrap_or(1);

    match state
        .sale_service
        .create_sale(
            seller.seller_id,
            book_id,
            quantity,
            request.buyer,
            request.sale_date,
        )
        .await
    {
        Ok(sale_with_book) => Ok((
            StatusCode::CREATED,
            Json(SaleResponse::from_sale_with_book(&sale_with_book, &seller)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 販売履歴取得エンドポイント
async fn get_sales_history(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    query: Result<Query<SalesHistoryQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<SalesHistoryResponse>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("無効なクエリパラメータです", "INVALID_PARAMETER")),
        )
    })?;

    let history_query = SalesHistoryQuery {
        period: params.period,
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        page: params.page,
        limit: params.limit,
    };

    match state
        .sales_history_service
        .get_sales_history(seller.seller_id, history_query)
        .await
    {
        Ok(report) => Ok(Json(SalesHistoryResponse::from_report(&report))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 書籍登録エンドポイント
async fn create_book(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    Json(request): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), (StatusCode, Json<ApiError>)> {
    let format = match BookFormat::from_string(&request.format) {
        Ok(format) => format,
        Err(err) => return Err(map_domain_error(err)),
    };

    let draft = BookDraft {
        name: request.name,
        author: request.author,
        price: Money::usd(request.price),
        release_date: request.release_date,
        publisher: request.publisher,
        isbn: request.isbn,
        language: request.language,
        series: request.series,
        genres: request.genres,
        format,
        page_count: request.page_count,
        quantity: request.quantity,
    };

    match state.book_service.create_book(seller.seller_id, draft).await {
        Ok(book) => Ok((StatusCode::CREATED, Json(BookResponse::from_book(&book)))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 書籍一覧取得エンドポイント
// 要求した販売者が所有する書籍のみを返す
async fn get_books(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
) -> Result<Json<Vec<BookResponse>>, (StatusCode, Json<ApiError>)> {
    match state.book_service.get_books(seller.seller_id).await {
        Ok(books) => {
            let response: Vec<BookResponse> = books.iter().map(BookResponse::from_book).collect();
            Ok(Json(response))
        }
        Err(err) => Err(map_application_error(err)),
    }
}

// 書籍詳細取得エンドポイント
async fn get_book_by_id(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, (StatusCode, Json<ApiError>)> {
    let book_id = BookId::from_uuid(book_id);

    match state.book_service.get_book(book_id, seller.seller_id).await {
        Ok(Some(book)) => Ok(Json(BookResponse::from_book(&book))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                format!("Book with ID {} not found", book_id),
                "NOT_FOUND",
            )),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 書籍更新エンドポイント
// 在庫数の明示的な更新もここを通る
async fn update_book(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    Path(book_id): Path<Uuid>,
    Json(request): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, (StatusCode, Json<ApiError>)> {
    let book_id = BookId::from_uuid(book_id);

    let format = match request.format {
        Some(format_str) => match BookFormat::from_string(&format_str) {
            Ok(format) => Some(format),
            Err(err) => return Err(map_domain_error(err)),
        },
        None => None,
    };

    let update = BookUpdate {
        name: request.name,
        author: request.author,
        price: request.price.map(Money::usd),
        release_date: request.release_date,
        publisher: request.publisher,
        isbn: request.isbn,
        language: request.language,
        series: request.series,
        genres: request.genres,
        format,
        page_count: request.page_count,
        quantity: request.quantity,
    };

    match state
        .book_service
        .update_book(book_id, seller.seller_id, update)
        .await
    {
        Ok(book) => Ok(Json(BookResponse::from_book(&book))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 書籍削除エンドポイント
async fn delete_book(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let book_id = BookId::from_uuid(book_id);

    match state
        .book_service
        .delete_book(book_id, seller.seller_id)
        .await
    {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 書籍一括削除エンドポイント
async fn delete_multiple_books(
    State(state): State<AppState>,
    seller: AuthenticatedSeller,
    Json(request): Json<DeleteMultipleBooksRequest>,
) -> Result<Json<DeleteManyResponse>, (StatusCode, Json<ApiError>)> {
    let book_ids: Vec<BookId> = request.book_ids.into_iter().map(BookId::from_uuid).collect();

    match state
        .book_service
        .delete_books(&book_ids, seller.seller_id)
        .await
    {
        Ok(deleted_count) => Ok(Json(DeleteManyResponse { deleted_count })),
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(format!("{}", repo_err), "REPOSITORY_ERROR")),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(msg, "NOT_FOUND")),
        ),
        ApplicationError::InvalidRequest(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(msg, "INVALID_REQUEST")),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    match domain_err {
        DomainError::InsufficientStock { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                format!("{}", domain_err),
                "INSUFFICIENT_STOCK",
            )),
        ),
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("無効な数量です", "INVALID_QUANTITY")),
        ),
        DomainError::BookValidation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(msg, "BOOK_VALIDATION")),
        ),
        DomainError::SaleValidation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(msg, "SALE_VALIDATION")),
        ),
        DomainError::CurrencyMismatch => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("通貨が一致しません", "CURRENCY_MISMATCH")),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(msg, "INVALID_VALUE")),
        ),
    }
}
