use platform_api::ApiError;
use platform_authz::ReasonCode;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("forbidden: {0}")]
    Forbidden(ReasonCode),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(DbErr),
}

pub type HrResult<T> = Result<T, HrError>;

impl HrError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            HrError::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<DbErr> for HrError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => HrError::Conflict(detail),
            _ => HrError::Database(err),
        }
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        match err {
            HrError::Forbidden(reason) => ApiError::Forbidden(reason),
            HrError::NotFound(_) => ApiError::NotFound,
            HrError::Conflict(message) => ApiError::Conflict(message),
            HrError::InvalidInput(message) => ApiError::InvalidInput(message),
            HrError::Database(err) => ApiError::internal(anyhow::Error::new(err)),
        }
    }
}
