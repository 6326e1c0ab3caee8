//! Windowed extraction: records of a session inside a time range, and the
//! reshape of such a slice into a flat table.

use std::collections::{BTreeMap, BTreeSet};

use contracts::{
    ColumnKey, FillPolicy, SensorKind, SensorRecord, SensorTable, Session, TableRow, TimeRange,
    Timestamp,
};

/// Records with `range.start <= timestamp <= range.end`, in session order.
///
/// Borrowed slice of the session; empty when nothing falls inside. Both
/// bounds are located by binary search.
pub fn extract<'a>(session: &'a Session, range: &TimeRange) -> &'a [SensorRecord] {
    let records = session.records();
    let lo = records.partition_point(|r| r.timestamp < range.start());
    let hi = records.partition_point(|r| r.timestamp <= range.end());
    &records[lo..hi.max(lo)]
}

/// Pivot records into one row per distinct timestamp and one column per
/// `(sensor_kind, field)` pair.
///
/// Columns are sorted by kind then field name. When two samples land on the
/// same cell the later one in input order wins.
pub fn reshape(records: &[SensorRecord], fill: FillPolicy) -> SensorTable {
    let columns: Vec<ColumnKey> = records
        .iter()
        .flat_map(|r| r.fields.keys().map(move |f| ColumnKey::new(r.sensor_kind, f.as_str())))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let index: BTreeMap<(SensorKind, &str), usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| ((c.kind, c.field.as_str()), i))
        .collect();

    let mut cells: BTreeMap<Timestamp, Vec<Option<f64>>> = BTreeMap::new();
    for record in records {
        let row = cells
            .entry(record.timestamp)
            .or_insert_with(|| vec![None; columns.len()]);
        for (field, value) in &record.fields {
            if let Some(&col) = index.get(&(record.sensor_kind, field.as_str())) {
                row[col] = Some(*value);
            }
        }
    }

    let mut rows: Vec<TableRow> = cells
        .into_iter()
        .map(|(timestamp, values)| TableRow { timestamp, values })
        .collect();

    if fill == FillPolicy::Forward {
        forward_fill(&mut rows, columns.len());
    }

    SensorTable { columns, rows }
}

fn forward_fill(rows: &mut [TableRow], width: usize) {
    let mut last: Vec<Option<f64>> = vec![None; width];
    for row in rows {
        for (cell, seen) in row.values.iter_mut().zip(last.iter_mut()) {
            if cell.is_some() {
                *seen = *cell;
            } else {
                *cell = *seen;
            }
        }
    }
}
