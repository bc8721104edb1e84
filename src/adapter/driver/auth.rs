use crate::adapter::driver::rest_api::ApiError;
use crate::domain::model::SellerId;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Json,
};

/// 認証済みの販売者
///
/// 認証自体は上流の認証レイヤーが行い、検証済みの識別情報を
/// リクエストヘッダーとして注入する:
/// - `x-seller-id` - 販売者ID（UUID、必須）
/// - `x-seller-name` - 表示名
/// - `x-seller-email` - メールアドレス
///
/// ヘッダーが欠けている・不正な場合は401を返す
#[derive(Debug, Clone)]
pub struct AuthenticatedSeller {
    pub seller_id: SellerId,
    pub name: String,
    pub email: String,
}

fn unauthorized(message: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError {
            success: false,
            message: message.to_string(),
            code: "UNAUTHORIZED".to_string(),
        }),
    )
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedSeller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let seller_id = parts
            .headers
            .get("x-seller-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("認証情報がありません"))?;

        let seller_id = SellerId::from_string(seller_id)
            .map_err(|_| unauthorized("販売者IDの形式が不正です"))?;

        let name = parts
            .headers
            .get("x-seller-name")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let email = parts
            .headers
            .get("x-seller-email")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(Self {
            seller_id,
            name,
            email,
        })
    }
}
