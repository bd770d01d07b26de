use http::StatusCode;
use vtn_domain::error::StoreError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("config: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(err) => store_status(err),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 存储失败原因到 HTTP 状态码的映射
pub fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::IdentifierRequired { .. } | StoreError::Validation { .. } => {
            StatusCode::BAD_REQUEST
        }
        StoreError::IdentifierUnknown { .. } => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists { .. }
        | StoreError::StaleUpdate { .. }
        | StoreError::ConcurrentWrite { .. } => StatusCode::CONFLICT,
        StoreError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
