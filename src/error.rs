use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Item {name} was already decommissioned on {date}")]
    AlreadyDecommissioned { name: String, date: NaiveDate },

    #[error("Unique constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("QR encoding failed: {0}")]
    Encoder(String),

    #[error("Item {item_id} cannot be placed under {parent_id}: hierarchy would contain a cycle")]
    HierarchyCycle { item_id: String, parent_id: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "DB_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::AlreadyDecommissioned { .. } => "ALREADY_DECOMMISSIONED",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::Encoder(_) => "ENCODER_FAILURE",
            Self::HierarchyCycle { .. } => "HIERARCHY_CYCLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return AppError::ConstraintViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return AppError::InvalidInput(format!(
                    "referenced record does not exist ({})",
                    db_err.constraint().unwrap_or("foreign key")
                ));
            }
        }
        AppError::Database(err)
    }
}

#[cfg(feature = "grpc")]
impl From<AppError> for tonic::Status {
    fn from(err: AppError) -> Self {
        use tonic::Status;

        match err {
            AppError::Database(e) => Status::internal(format!("Database error: {}", e)),
            AppError::NotFound(msg) => Status::not_found(msg),
            AppError::InvalidInput(msg) => Status::invalid_argument(msg),
            e @ AppError::AlreadyDecommissioned { .. } => Status::failed_precondition(e.to_string()),
            AppError::ConstraintViolation(c) => {
                Status::already_exists(format!("Unique constraint violated: {}", c))
            }
            AppError::Encoder(msg) => Status::internal(format!("QR encoding failed: {}", msg)),
            e @ AppError::HierarchyCycle { .. } => Status::failed_precondition(e.to_string()),
            AppError::Internal(msg) => Status::internal(msg),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
