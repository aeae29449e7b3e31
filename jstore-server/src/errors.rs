use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use blob_store::StoreError;
use thiserror::Error;

pub type JStoreResult<T> = Result<T, JStoreErr>;

/// Everything a request can fail with. The `Display` text is what the client
/// sees, the wrapped sources only go to the logs.
#[derive(Debug, Error)]
pub enum JStoreErr {
    #[error("404 page not found")]
    InvalidIdentifier,

    #[error("Cannot read the request")]
    RequestRead(String),

    #[error("404 page not found")]
    DocumentNotFound(#[source] StoreError),

    #[error("Internal server error")]
    Generation(#[from] rand::Error),

    #[error("Internal server error")]
    Persistence(#[source] StoreError),

    #[error("Method not supported")]
    MethodNotSupported,
}

impl ResponseError for JStoreErr {
    fn status_code(&self) -> StatusCode {
        match self {
            JStoreErr::InvalidIdentifier => StatusCode::NOT_FOUND,
            JStoreErr::RequestRead(_) => StatusCode::BAD_REQUEST,
            JStoreErr::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            JStoreErr::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JStoreErr::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JStoreErr::MethodNotSupported => StatusCode::NOT_IMPLEMENTED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}
