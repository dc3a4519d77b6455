//! Error types for cadastro.
//!
//! This module defines all error types used throughout the cadastro crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cadastro operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The document store rejected a write.
    #[error("failed to write to collection '{collection}': {message}")]
    StoreWrite {
        /// Collection the record was destined for.
        collection: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A query used a field name that cannot be addressed in a document.
    #[error("invalid query field: {field}")]
    InvalidField {
        /// The offending field name.
        field: String,
    },

    /// A stored document could not be decoded into a record.
    #[error("malformed document {id}: {message}")]
    MalformedDocument {
        /// Identifier of the document.
        id: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// The identity provider failed to end the session.
    #[error("failed to end session: {0}")]
    SignOut(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for cadastro operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a store write error for the given collection.
    #[must_use]
    pub fn store_write(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Create a sign-out error.
    #[must_use]
    pub fn sign_out(message: impl Into<String>) -> Self {
        Self::SignOut(message.into())
    }

    /// Check if this error came from a rejected store write.
    #[must_use]
    pub fn is_store_write(&self) -> bool {
        matches!(self, Self::StoreWrite { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::sign_out("network unreachable");
        assert_eq!(err.to_string(), "failed to end session: network unreachable");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_store_write_error() {
        let err = Error::store_write("devices", "quota exceeded");
        assert!(err.is_store_write());
        let msg = err.to_string();
        assert!(msg.contains("devices"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_sign_out_error() {
        let err = Error::sign_out("token revoked");
        assert_eq!(err.to_string(), "failed to end session: token revoked");
        assert!(!err.is_store_write());
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::InvalidField {
            field: "user'Id".to_string(),
        };
        assert!(err.to_string().contains("user'Id"));
    }

    #[test]
    fn test_malformed_document_display() {
        let err = Error::MalformedDocument {
            id: "abc".to_string(),
            message: "missing field `nome`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("nome"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "success_banner_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("success_banner_ms"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
