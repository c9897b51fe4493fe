use crate::twoface::{Describe, ExternalError, Fallible, TfError};
use actix_web::error::BlockingError;
use anyhow::anyhow;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

type DbPoolErr = BlockingError<TfError>;
pub type DbPoolResult<T> = Result<T, DbPoolErr>;

/// Convenience extension used to extract errors from `web::block`.
pub trait BlockingResp<T> {
    /// Convert the return from a web::block into a normal `Fallible<T>`.
    fn to_resp(self) -> Fallible<T>;
}

impl<T, I: std::fmt::Debug + Into<TfError>> BlockingResp<T> for Result<T, BlockingError<I>> {
    fn to_resp(self) -> Fallible<T> {
        match self {
            Ok(t) => Ok(t),
            Err(BlockingError::Error(err)) => Err(err.into()),
            Err(BlockingError::Canceled) => Err(TfError {
                internal: anyhow!("DB operation cancelled"),
                external: ExternalError::default(),
            }),
        }
    }
}

/// If the statement broke a unique constraint, show `external` to the user.
/// Any other error stays a generic server error.
pub fn on_unique_violation(err: DieselError, external: ExternalError) -> TfError {
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = err {
        err.describe(external)
    } else {
        err.into()
    }
}
