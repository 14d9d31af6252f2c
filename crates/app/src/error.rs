use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("db error: {0}")]
    Db(#[from] ledger_db::DbError),
    #[error("ingest error: {0}")]
    Ingest(#[from] ingest::IngestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::InvalidInput(_) => (400, Some("invalid_input".to_string())),
            AppError::NotFound(_) => (404, Some("not_found".to_string())),
            AppError::Ingest(ingest::IngestError::MalformedRecord { .. }) => {
                (500, Some("malformed_record".to_string()))
            }
            AppError::Db(_)
            | AppError::Ingest(_)
            | AppError::Io(_)
            | AppError::Serde(_)
            | AppError::Message(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let api: ApiError = AppError::NotFound("unknown endpoint".to_string()).into();
        assert_eq!(api.status, 404);
        assert_eq!(api.code.as_deref(), Some("not_found"));
        assert_eq!(
            serde_json::to_value(&api).expect("json"),
            serde_json::json!({"status": 404, "message": "unknown endpoint", "code": "not_found"})
        );
    }

    #[test]
    fn malformed_record_keeps_line_in_message() {
        let err = AppError::from(ingest::IngestError::MalformedRecord {
            line: 4,
            message: "expected value".to_string(),
        });
        let api = ApiError::from(err);
        assert_eq!(api.status, 500);
        assert!(api.message.contains("line 4"), "{}", api.message);
    }
}
