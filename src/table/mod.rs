//! Record operations over one table's in-memory data document.
//!
//! Nothing here touches the filesystem: callers load the records through
//! [`crate::storage`], hand them in, and save whatever comes back.

use log::{debug, info};

pub use self::filter::Clause;
use crate::{
    catalog::defs::{Metadata, TableSchema},
    core::{Datum, DbError, Record, ID_COLUMN},
};

pub mod filter;

/// Identity for the next insert: one past the largest `ID` present, or 1.
///
/// Derived from the data every time, so deleting every record restarts the
/// sequence. Fails once the largest `ID` is `i64::MAX`.
pub fn next_id(records: &[Record]) -> Result<i64, DbError> {
    records
        .iter()
        .filter_map(Record::id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| DbError::validation("ID sequence exhausted"))
}

/// Append one record built from `raw_values`, given in schema order without
/// `ID`. Returns the assigned identity.
///
/// All values are coerced before the record is built, so a bad value leaves
/// `records` untouched.
pub fn insert<S: AsRef<str>>(
    metadata: &Metadata,
    table_name: &str,
    records: &mut Vec<Record>,
    raw_values: &[S],
) -> Result<i64, DbError> {
    let schema = metadata.find_table_by_name(table_name)?;
    let columns = schema.value_columns().collect::<Vec<_>>();

    if raw_values.len() != columns.len() {
        return Err(DbError::validation(format!(
            "table \"{}\" expects {} values, got {}",
            table_name,
            columns.len(),
            raw_values.len()
        )));
    }

    let id = next_id(records)?;
    let mut record = Record::with_id(id);
    for ((column, typ), raw) in columns.into_iter().zip(raw_values) {
        let datum = Datum::coerce(raw.as_ref(), typ).map_err(|e| {
            DbError::new(e.kind, format!("column \"{}\": {}", column, e.message))
        })?;
        record.set(column, datum);
    }

    info!("Inserting record {} into {}", id, table_name);
    records.push(record);
    Ok(id)
}

/// Records matching `filter` (all of them when `None`), in stored order.
pub fn select<'a>(records: &'a [Record], filter: Option<&Clause>) -> Vec<&'a Record> {
    let selected = records
        .iter()
        .filter(|record| filter.map_or(true, |clause| clause.matches(record)))
        .collect::<Vec<_>>();

    debug!(
        "Selected {} of {} records{}",
        selected.len(),
        records.len(),
        filter.map(|c| format!(" where {}", c)).unwrap_or_default()
    );
    selected
}

/// Apply `set` to every record matching `filter`. Returns the positions of
/// the updated records.
///
/// New values take the column's declared type from `schema`; a column the
/// schema does not know falls back to the type of the value already stored.
///
/// Each record is updated all-or-nothing, but the call as a whole is not:
/// when a later record fails (for instance because it lacks a `set` column),
/// records already updated by this call keep their new values.
pub fn update(
    records: &mut [Record],
    schema: &TableSchema,
    set: &[Clause],
    filter: &Clause,
) -> Result<Vec<usize>, DbError> {
    let mut updated = vec![];

    for (index, record) in records.iter_mut().enumerate() {
        if !filter.matches(record) {
            continue;
        }

        let mut changes = Vec::with_capacity(set.len());
        for assignment in set {
            let current = record.get(&assignment.column).ok_or_else(|| {
                DbError::validation(format!(
                    "column \"{}\" does not exist",
                    assignment.column
                ))
            })?;
            let typ = schema
                .column_type(&assignment.column)
                .unwrap_or_else(|| current.typ());
            let datum = Datum::coerce(&assignment.value, typ).map_err(|e| {
                DbError::new(
                    e.kind,
                    format!("column \"{}\": {}", assignment.column, e.message),
                )
            })?;
            changes.push((assignment.column.as_str(), datum));
        }

        for (column, datum) in changes {
            record.set(column, datum);
        }
        debug!(
            "Updated record {}",
            record
                .get(ID_COLUMN)
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("#{}", index))
        );
        updated.push(index);
    }

    Ok(updated)
}

/// Remove every record matching `filter` and return how many went away.
pub fn delete(records: &mut Vec<Record>, filter: &Clause) -> usize {
    let before = records.len();
    records.retain(|record| !filter.matches(record));
    let removed = before - records.len();

    debug!("Deleted {} records where {}", removed, filter);
    removed
}
