//! Running the statistics query and turning its rows into text records.

use crate::error::{BoxError, Error, Result, ShapeError};
use crate::grouping::PathGrouping;
use crate::query::construct_query;
use crate::warehouse::{Context, Field, FieldType, QueryService, RowStream, Value};
use chrono::SecondsFormat;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanResult {
    pub query: String,
    pub total_bytes_processed: i64,
}

/// Receives the header and then one record per result row.
pub trait RecordSink {
    fn write_record(&mut self, record: Vec<String>) -> std::result::Result<(), BoxError>;
}

impl RecordSink for Vec<Vec<String>> {
    fn write_record(&mut self, record: Vec<String>) -> std::result::Result<(), BoxError> {
        self.push(record);
        Ok(())
    }
}

/// Builds the query and asks the service for a cost estimate without running it.
pub fn dry_run<S: QueryService + ?Sized>(
    ctx: &Context,
    service: &S,
    table: &str,
    filter: Option<&str>,
    grouping: &dyn PathGrouping,
) -> Result<PlanResult> {
    let query = construct_query(table, filter, grouping)?;
    let failed = |source: BoxError| Error::QueryExecution {
        query: query.clone(),
        source,
    };

    ctx.check().map_err(|e| failed(e.into()))?;
    info!(table = %table, "submitting dry run");
    let stats = service.dry_run(ctx, &query).map_err(failed)?;
    info!(
        bytes_processed = stats.total_bytes_processed,
        "dry run completed"
    );

    Ok(PlanResult {
        query,
        total_bytes_processed: stats.total_bytes_processed,
    })
}

/// Runs the statistics query and writes the results to `sink`: a header of
/// column names once the first row arrives, then one record per row. Returns
/// the number of data rows written.
pub fn analyze<S, K>(
    ctx: &Context,
    service: &S,
    table: &str,
    filter: Option<&str>,
    grouping: &dyn PathGrouping,
    sink: &mut K,
) -> Result<u64>
where
    S: QueryService + ?Sized,
    K: RecordSink + ?Sized,
{
    let query = construct_query(table, filter, grouping)?;
    let failed = |source: BoxError| Error::QueryExecution {
        query: query.clone(),
        source,
    };

    ctx.check().map_err(|e| failed(e.into()))?;
    info!(table = %table, "running analysis query");
    let mut rows = service.run(ctx, &query).map_err(failed)?;

    let mut written = 0u64;
    loop {
        ctx.check().map_err(|e| failed(e.into()))?;
        let Some(values) = rows.next_row(ctx).map_err(failed)? else {
            break;
        };

        let schema = rows.schema();
        let record = format_row(schema, &values)?;
        if written == 0 {
            let header = schema.iter().map(|f| f.name.clone()).collect();
            sink.write_record(header).map_err(Error::WriteRecord)?;
        }
        sink.write_record(record).map_err(Error::WriteRecord)?;
        written += 1;
    }

    debug!(rows = written, "result stream exhausted");
    info!(table = %table, rows = written, "analysis completed");
    Ok(written)
}

/// Formats one row. The row must have exactly one value per schema column.
pub fn format_row(
    schema: &[Field],
    values: &[Value],
) -> std::result::Result<Vec<String>, ShapeError> {
    if values.len() != schema.len() {
        return Err(ShapeError::ColumnCount {
            actual: values.len(),
            expected: schema.len(),
        });
    }

    schema
        .iter()
        .zip(values)
        .map(|(field, value)| format_cell(field, value))
        .collect()
}

fn format_cell(field: &Field, value: &Value) -> std::result::Result<String, ShapeError> {
    let text = match (field.field_type, value) {
        (FieldType::Float, Value::Float(f)) => Some(format!("{:.2}", f)),
        (FieldType::Integer, Value::Integer(i)) => Some(i.to_string()),
        (FieldType::String, Value::String(s)) => Some(s.clone()),
        (FieldType::Timestamp, Value::Timestamp(ts)) => {
            Some(ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
        (FieldType::Float | FieldType::Integer | FieldType::String | FieldType::Timestamp, _) => {
            None
        }
        // Remaining column types go out in their natural textual form, when they have one.
        (_, Value::Bool(b)) => Some(b.to_string()),
        (_, Value::Date(d)) => Some(d.to_string()),
        (_, Value::Numeric(n)) => Some(n.clone()),
        _ => None,
    };

    text.ok_or_else(|| ShapeError::Unconvertible {
        field: field.name.clone(),
        field_type: field.field_type,
        value: format!("{:?}", value),
    })
}
