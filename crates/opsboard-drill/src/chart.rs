use crate::aggregate::{TimeSeriesPoint, TotalPoint};
use crate::drill::Metric;
use crate::top_n::EntityTotal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What an entity/date cell with no data renders as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValue {
    #[default]
    Zero,
    /// Leave a gap in the line.
    Blank,
}

impl MissingValue {
    fn fill(self) -> Option<f64> {
        match self {
            MissingValue::Zero => Some(0.0),
            MissingValue::Blank => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WideRow {
    pub date: String,
    pub raw_date: String,
    /// One cell per [`WideTable::columns`] entry.
    pub values: Vec<Option<f64>>,
}

/// One row per date, one column per charted entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WideTable {
    /// Column labels in legend order.
    pub columns: Vec<String>,
    /// Entity id behind each column.
    pub entity_ids: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// The cell for `entity_id` on `raw_date`, if both exist.
    pub fn value(&self, raw_date: &str, entity_id: &str) -> Option<f64> {
        let col = self.entity_ids.iter().position(|id| id == entity_id)?;
        let row = self.rows.iter().find(|row| row.raw_date == raw_date)?;
        row.values.get(col).copied().flatten()
    }
}

/// Column labels for `selected`; a name shared by several entities gets its id appended.
fn column_labels(selected: &[EntityTotal]) -> Vec<String> {
    let mut seen = HashSet::new();
    let duplicated: HashSet<&str> = selected
        .iter()
        .filter(|t| !seen.insert(t.entity_name.as_str()))
        .map(|t| t.entity_name.as_str())
        .collect();
    selected
        .iter()
        .map(|t| {
            if duplicated.contains(t.entity_name.as_str()) {
                format!("{} ({})", t.entity_name, t.entity_id)
            } else {
                t.entity_name.clone()
            }
        })
        .collect()
}

/// Pivot long-form `points` into a wide table aligned to `axis`.
///
/// Only `selected` entities become columns, in the given order. When `axis` is empty the dates of
/// `points` themselves form the axis; otherwise dates outside it are dropped.
pub fn pivot_wide(
    points: &[TimeSeriesPoint],
    selected: &[EntityTotal],
    axis: &[TotalPoint],
    metric: Metric,
    missing: MissingValue,
) -> WideTable {
    let columns = column_labels(selected);
    let entity_ids: Vec<String> = selected.iter().map(|t| t.entity_id.clone()).collect();
    let column_of: HashMap<&str, usize> = entity_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    let mut dates: Vec<(String, String)> = Vec::new();
    if axis.is_empty() {
        let mut seen = HashSet::new();
        for point in points {
            if seen.insert(point.raw_date.as_str()) {
                dates.push((point.date.clone(), point.raw_date.clone()));
            }
        }
        dates.sort_by(|a, b| a.1.cmp(&b.1));
    } else {
        dates.extend(axis.iter().map(|p| (p.date.clone(), p.raw_date.clone())));
    }

    let mut rows: Vec<WideRow> = dates
        .into_iter()
        .map(|(date, raw_date)| WideRow {
            date,
            raw_date,
            values: vec![missing.fill(); columns.len()],
        })
        .collect();
    let row_of: HashMap<String, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.raw_date.clone(), idx))
        .collect();

    let mut dropped = 0usize;
    for point in points {
        let Some(&col) = column_of.get(point.entity_id.as_str()) else {
            continue;
        };
        let Some(&row) = row_of.get(&point.raw_date) else {
            dropped += 1;
            continue;
        };
        let value = metric.pick(point.revenue, point.profit);
        let cell = &mut rows[row].values[col];
        *cell = Some(cell.unwrap_or(0.0) + value);
    }
    if dropped > 0 {
        log::debug!("pivot: {dropped} points fell outside the date axis");
    }

    WideTable {
        columns,
        entity_ids,
        rows,
    }
}
