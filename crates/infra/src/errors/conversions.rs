//! Conversions from external infrastructure errors into domain errors.

use leadflow_domain::LeadflowError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LeadflowError);

impl From<InfraError> for LeadflowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LeadflowError> for InfraError {
    fn from(value: LeadflowError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLeadflowError {
    fn into_leadflow(self) -> LeadflowError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for SqlError {
    fn into_leadflow(self) -> LeadflowError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        LeadflowError::TransientStore("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        LeadflowError::TransientStore("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        LeadflowError::Conflict(format!("unique constraint violation: {message}"))
                    }
                    _ => LeadflowError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LeadflowError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LeadflowError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                LeadflowError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => LeadflowError::Config(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => LeadflowError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for r2d2::Error {
    fn into_leadflow(self) -> LeadflowError {
        // r2d2 only fails when no connection could be checked out in time.
        LeadflowError::TransientStore(format!("connection pool unavailable: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for JoinError {
    fn into_leadflow(self) -> LeadflowError {
        if self.is_cancelled() {
            LeadflowError::TransientStore("blocking store task cancelled".into())
        } else {
            LeadflowError::Internal(format!("blocking store task panicked: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
