use crate::warehouse::FieldType;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by query-service implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid path pattern for route '{route}' ({pattern:?})")]
    PatternCompilation {
        route: String,
        pattern: String,
        #[source]
        source: aealanlys_mux::PatternError,
    },

    #[error("failed to extract path regexp for route '{route}' ({pattern:?}): {reason}")]
    RouteIntrospection {
        route: String,
        pattern: String,
        reason: String,
    },

    #[error("failed to construct query: {0}")]
    QueryConstruction(String),

    #[error("failed to run query ({query}): {source}")]
    QueryExecution {
        query: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write record: {0}")]
    WriteRecord(#[source] BoxError),

    #[error("unexpected result shape: {0}")]
    ResultShape(#[from] ShapeError),

    #[error("failed to read route table '{path}'")]
    ReadRoutes {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse route table at line {line}: {message}")]
    ParseRoutes { line: usize, message: String },

    #[error("failed to parse route table as JSON: {0}")]
    RoutesJson(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ShapeError {
    #[error("column length was unexpected (actual: {actual}, expected: {expected})")]
    ColumnCount { actual: usize, expected: usize },

    #[error("failed to convert field ({field}, type={field_type}, value={value}) to string")]
    Unconvertible {
        field: String,
        field_type: FieldType,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
