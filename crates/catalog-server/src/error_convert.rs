use catalog_types::AppError;

/// PostgreSQL SQLSTATE codes the catalog reacts to.
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

/// Map a failed query onto the catalog's error kinds.
///
/// Unique violations on a `*_slug_key` constraint surface as the same
/// conflict the in-memory catalog reports.
pub fn sqlx_to_app_error(err: sqlx::Error) -> AppError {
    let sqlx::Error::Database(db_err) = &err else {
        return match err {
            sqlx::Error::RowNotFound => AppError::not_found("Catalog record not found"),
            other => AppError::database(other.to_string()),
        };
    };

    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => {
            let on_slug = db_err
                .constraint()
                .map(|c| c.ends_with("slug_key"))
                .unwrap_or_else(|| db_err.message().contains("slug"));
            if on_slug {
                AppError::conflict("This slug is already taken")
            } else {
                AppError::conflict("A catalog record with this value already exists")
            }
        }
        Some(CHECK_VIOLATION) => AppError::bad_request(db_err.message().to_string()),
        _ => AppError::database(err.to_string()),
    }
}

/// `.into_app_error()` on sqlx::Error, for `map_err` chains in the repository.
pub trait SqlxErrorExt {
    fn into_app_error(self) -> AppError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_app_error(self) -> AppError {
        sqlx_to_app_error(self)
    }
}

/// Run `validator` rules on a typed request shape.
pub trait ValidateRequest {
    fn validate_request(&self) -> Result<(), AppError>;
}

impl<T: validator::Validate> ValidateRequest for T {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_types::{AppErrorKind, CreateCatalogEntryRequest};

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = sqlx::Error::RowNotFound.into_app_error();
        assert_eq!(err.kind, AppErrorKind::NotFound);
    }

    #[test]
    fn other_errors_map_to_database() {
        let err = sqlx::Error::PoolTimedOut.into_app_error();
        assert_eq!(err.kind, AppErrorKind::DatabaseError);
        assert_eq!(err.status_code_u16(), 500);
    }

    #[test]
    fn validate_request_reports_fields() {
        let request = CreateCatalogEntryRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        let err = request.validate_request().unwrap_err();
        assert_eq!(err.kind, AppErrorKind::ValidationError);
        assert!(err.field_errors.contains_key("name"));
    }
}
