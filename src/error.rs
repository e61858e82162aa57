// Error types for the catalog
//
// Every failure the catalog can report, from request validation down to the
// store. The HTTP layer collapses all of them into a 400 response, so the
// Display text is what clients read.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Request carried no fields at all
    #[error("No input data provided")]
    EmptyInput,

    /// Required fields absent on create
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Field names outside the entity whitelist
    #[error("Invalid fields: {}", .0.join(", "))]
    InvalidFields(Vec<String>),

    /// An identity field was expected but not supplied
    #[error("No {0} specified")]
    MissingId(String),

    /// A value could not be coerced to its field type
    #[error("{message}")]
    InvalidValue { field: String, message: String },

    /// Referenced record does not exist
    #[error("{kind} with id {id} does not exist")]
    NotFound { kind: &'static str, id: i64 },

    /// Shared connection is poisoned
    #[error("Database connection is unavailable")]
    Unavailable,

    #[error("{0}")]
    Store(#[from] rusqlite::Error),
}

impl CatalogError {
    /// Machine-readable category reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::EmptyInput => "empty_input",
            CatalogError::MissingFields(_) | CatalogError::MissingId(_) => "missing_fields",
            CatalogError::InvalidFields(_) => "invalid_fields",
            CatalogError::InvalidValue { .. } => "invalid_value",
            CatalogError::NotFound { .. } => "not_found",
            CatalogError::Unavailable => "store",
            CatalogError::Store(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                "constraint"
            }
            CatalogError::Store(_) => "store",
        }
    }

    pub fn not_found(kind: &'static str, id: i64) -> Self {
        CatalogError::NotFound { kind, id }
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.kind() == "constraint"
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_list_fields_in_order() {
        let err = CatalogError::MissingFields(vec!["gender".into(), "date_of_birth".into()]);
        assert_eq!(err.to_string(), "Missing fields: gender, date_of_birth");
        assert_eq!(err.kind(), "missing_fields");

        let err = CatalogError::InvalidFields(vec!["budget".into()]);
        assert_eq!(err.to_string(), "Invalid fields: budget");
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found("Movie", 42);
        assert_eq!(err.to_string(), "Movie with id 42 does not exist");
        assert_eq!(err.kind(), "not_found");
    }
}
