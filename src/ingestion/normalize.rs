//! Column type normalization.
//!
//! [`normalize`] turns a [`RawTable`] into a typed [`DataSet`] in four steps, each working on
//! the output of the previous one:
//!
//! 1. trim header names;
//! 2. datetime pass over every column;
//! 3. numeric pass over every column (including ones the datetime pass just claimed);
//! 4. drop columns in which every cell is missing.
//!
//! Cells that fail a pass the column adopted become [`Value::Null`]. Nothing in here fails.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::coerce::{datetime_pass, numeric_pass, Number};
use super::csv::RawTable;
use super::options::{NormalizeOptions, UnparsedText};

/// What normalization did besides typing cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Columns removed because every cell was missing, in input order.
    pub dropped_columns: Vec<String>,
    /// Columns the datetime pass claimed and the numeric pass then took over.
    pub reclassified: Vec<String>,
}

/// A normalized table plus its [`NormalizeReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub dataset: DataSet,
    pub report: NormalizeReport,
}

#[derive(Debug)]
enum Coerced {
    Text,
    Datetime(Vec<Option<NaiveDateTime>>),
    Numeric(Vec<Option<Number>>),
}

#[derive(Debug)]
struct WorkingColumn {
    name: String,
    /// Source text of cells still present.
    cells: Vec<Option<String>>,
    coerced: Coerced,
}

impl WorkingColumn {
    fn is_all_missing(&self) -> bool {
        match &self.coerced {
            Coerced::Text => self.cells.iter().all(Option::is_none),
            Coerced::Datetime(values) => values.iter().all(Option::is_none),
            Coerced::Numeric(values) => values.iter().all(Option::is_none),
        }
    }

    /// Null out source cells whose coerced value is missing.
    fn retain_cells<T>(&mut self, values: &[Option<T>]) {
        for (cell, value) in self.cells.iter_mut().zip(values) {
            if value.is_none() {
                *cell = None;
            }
        }
    }

    fn into_field_and_values(self) -> (Field, Vec<Value>) {
        match self.coerced {
            Coerced::Text => {
                let values = self
                    .cells
                    .into_iter()
                    .map(|c| c.map(Value::Utf8).unwrap_or(Value::Null))
                    .collect();
                (Field::new(self.name, DataType::Utf8), values)
            }
            Coerced::Datetime(values) => {
                let values = values
                    .into_iter()
                    .map(|v| v.map(Value::Datetime).unwrap_or(Value::Null))
                    .collect();
                (Field::new(self.name, DataType::Datetime), values)
            }
            Coerced::Numeric(values) => {
                let all_int = values
                    .iter()
                    .flatten()
                    .all(|n| matches!(n, Number::Int(_)));
                let data_type = if all_int { DataType::Int64 } else { DataType::Float64 };
                let values = values
                    .into_iter()
                    .map(|v| match (v, all_int) {
                        (None, _) => Value::Null,
                        (Some(Number::Int(i)), true) => Value::Int64(i),
                        (Some(n), _) => Value::Float64(n.as_f64()),
                    })
                    .collect();
                (Field::new(self.name, data_type), values)
            }
        }
    }
}

/// Normalize a raw table.
///
/// Row count is preserved; only columns are ever removed.
pub fn normalize(raw: RawTable, opts: &NormalizeOptions) -> Normalized {
    let row_count = raw.row_count();
    let mut columns: Vec<WorkingColumn> = raw
        .into_columns()
        .into_iter()
        .map(|(name, cells)| WorkingColumn {
            name: name.trim().to_owned(),
            cells,
            coerced: Coerced::Text,
        })
        .collect();

    for col in &mut columns {
        match datetime_pass(&col.cells, opts) {
            Ok(outcome) if outcome.succeeded() => {
                debug!(column = %col.name, parsed = outcome.successes, "datetime pass adopted");
                col.retain_cells(&outcome.values);
                col.coerced = Coerced::Datetime(outcome.values);
            }
            Ok(_) => {}
            Err(oob) => {
                debug!(
                    column = %col.name,
                    row = oob.row,
                    value = %oob.value,
                    "datetime pass skipped, number outside epoch range"
                );
            }
        }
    }

    let mut report = NormalizeReport::default();
    for col in &mut columns {
        let was_datetime = matches!(col.coerced, Coerced::Datetime(_));
        if was_datetime && !opts.recoerce_datetime_as_numeric {
            continue;
        }

        let outcome = numeric_pass(&col.cells);
        if outcome.succeeded() {
            if was_datetime {
                debug!(column = %col.name, "numeric pass took over datetime column");
                report.reclassified.push(col.name.clone());
            }
            col.retain_cells(&outcome.values);
            col.coerced = Coerced::Numeric(outcome.values);
        } else if !was_datetime && opts.unparsed_text == UnparsedText::Drop {
            col.cells.iter_mut().for_each(|c| *c = None);
        }
    }

    let (kept, dropped): (Vec<WorkingColumn>, Vec<WorkingColumn>) =
        columns.into_iter().partition(|c| !c.is_all_missing());
    report.dropped_columns = dropped.into_iter().map(|c| c.name).collect();
    if !report.dropped_columns.is_empty() {
        info!(dropped = ?report.dropped_columns, "dropped columns with no values");
    }

    let mut fields = Vec::with_capacity(kept.len());
    let mut rows: Vec<Vec<Value>> = (0..row_count)
        .map(|_| Vec::with_capacity(kept.len()))
        .collect();
    for col in kept {
        let (field, values) = col.into_field_and_values();
        debug!(column = %field.name, data_type = ?field.data_type, "classified column");
        fields.push(field);
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    Normalized {
        dataset: DataSet::new(Schema::new(fields), rows),
        report,
    }
}
