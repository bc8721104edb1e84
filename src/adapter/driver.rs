pub mod auth;
pub mod request_dto;
pub mod response_dto;
pub mod rest_api;

pub use auth::AuthenticatedSeller;
