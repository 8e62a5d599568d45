//! Contract for the query service that executes generated queries.
//!
//! No client ships with this crate; callers wrap their BigQuery client in a
//! [`QueryService`]. Implementations must not retry: a failed call is returned
//! as is and retry policy stays with the caller.

use crate::error::BoxError;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Timestamp,
    Boolean,
    Date,
    Numeric,
    Bytes,
    Record,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "STRING",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
            FieldType::Numeric => "NUMERIC",
            FieldType::Bytes => "BYTES",
            FieldType::Record => "RECORD",
        };
        f.write_str(name)
    }
}

/// A result column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A single cell as decoded by the query service.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    /// Decimal text, kept as delivered to avoid precision loss.
    Numeric(String),
    Bytes(Vec<u8>),
    Record(Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryRunStats {
    pub total_bytes_processed: i64,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation and deadline for one unit of work. Clones share the same
/// cancellation flag, so a clone handed to another thread can cancel the
/// original.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails once the context is cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

pub trait QueryService {
    type Rows: RowStream;

    /// Validates `query` and estimates its cost without running it.
    fn dry_run(&self, ctx: &Context, query: &str) -> Result<DryRunStats, BoxError>;

    /// Submits `query` and returns its result rows.
    fn run(&self, ctx: &Context, query: &str) -> Result<Self::Rows, BoxError>;
}

pub trait RowStream {
    /// Fetches the next row, paging from the service as needed. `None` once
    /// the result is exhausted.
    fn next_row(&mut self, ctx: &Context) -> Result<Option<Vec<Value>>, BoxError>;

    /// Result columns. Only guaranteed to be populated after the first call to
    /// [`RowStream::next_row`].
    fn schema(&self) -> &[Field];
}
