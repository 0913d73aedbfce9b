use fleetme_core::store::StoreError;
use sqlx::error::ErrorKind;

/// Classifies a sqlx error into the storage error taxonomy.
pub(crate) fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(database_error) => match database_error.kind() {
            ErrorKind::UniqueViolation => StoreError::UniqueViolation {
                fields: unique_fields(database_error.message()),
            },
            ErrorKind::ForeignKeyViolation => StoreError::ForeignKeyViolation,
            _ if is_foreign_key_code(database_error.code().as_deref()) => {
                StoreError::ForeignKeyViolation
            }
            _ => StoreError::Database(error.to_string()),
        },
        _ => StoreError::Database(error.to_string()),
    }
}

// SQLITE_CONSTRAINT_FOREIGNKEY (787) and SQLITE_CONSTRAINT_TRIGGER (1811).
// `ON DELETE RESTRICT` reports the latter, which sqlx leaves unclassified.
fn is_foreign_key_code(code: Option<&str>) -> bool {
    matches!(code, Some("787" | "1811"))
}

/// Column names out of `UNIQUE constraint failed: vehicles.license_plate, vehicles.vin`.
fn unique_fields(message: &str) -> Vec<String> {
    let Some((_, columns)) = message.split_once(':') else {
        return Vec::new();
    };

    columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(|column| {
            column
                .rsplit_once('.')
                .map_or(column, |(_, name)| name)
                .to_owned()
        })
        .collect()
}

pub(crate) fn corrupt(what: &str, error: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("invalid {what} in database: {error}"))
}
