//! Export error types.

use std::path::PathBuf;

/// Every failure aborts the run; the variant tells the operator which step broke.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Missing or malformed config file, environment section or credentials.
    #[error("config error: {0}")]
    Config(String),

    /// The database could not be reached.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// One of the player or rating queries failed.
    #[error("query error ({what}): {source}")]
    Query {
        what: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// An output file could not be created or written.
    #[error("output error ({}): {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive step did not complete.
    #[error("archive error ({}): {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ExportError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn query(what: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Query { what, source }
    }

    pub fn output(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Output { path, source }
    }

    pub fn archive(path: impl Into<PathBuf>) -> impl FnOnce(zip::result::ZipError) -> Self {
        let path = path.into();
        move |source| Self::Archive { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let err = ExportError::config("missing section 'staging'");
        assert_eq!(err.to_string(), "config error: missing section 'staging'");
    }

    #[test]
    fn output_error_names_the_path() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ExportError::output("/tmp/out/pub.dbf")(inner);
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/pub.dbf"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn query_error_names_the_query() {
        let err = ExportError::query("legacy ratings")(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("query error (legacy ratings)"));
    }
}
