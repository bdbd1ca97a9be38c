//! Dataset-level ingestion: JSON arrays from the API layer into normalized rows.
//!
//! A payload that is not an array is a [`ModelError`]. Inside an array, rows that cannot be
//! normalized are dropped with a warning so one bad row never blanks a whole chart.

use crate::error::{ModelError, ModelResult};
use crate::hierarchy::{Level, TeamConfiguration, TeamPicMapping};
use crate::record::Record;
use crate::rows::{BreakdownRow, HierarchyRow};
use serde::de::DeserializeOwned;

pub fn parse_json(text: &str) -> ModelResult<serde_json::Value> {
    Ok(serde_json::from_str(text)?)
}

fn rows<'a>(dataset: &str, value: &'a serde_json::Value) -> ModelResult<&'a [serde_json::Value]> {
    match value {
        serde_json::Value::Array(items) => Ok(items.as_slice()),
        // An absent dataset is an empty one.
        serde_json::Value::Null => Ok(&[][..]),
        _ => Err(ModelError::NotAnArray {
            dataset: dataset.to_string(),
        }),
    }
}

/// Schema-free records for cross-filtered tables. Every element must be an object.
pub fn records_from_json(dataset: &str, value: &serde_json::Value) -> ModelResult<Vec<Record>> {
    rows(dataset, value)?
        .iter()
        .enumerate()
        .map(|(index, row)| {
            Record::from_json(row).ok_or_else(|| ModelError::NotAnObject {
                dataset: dataset.to_string(),
                index,
            })
        })
        .collect()
}

pub fn records_from_str(dataset: &str, text: &str) -> ModelResult<Vec<Record>> {
    records_from_json(dataset, &parse_json(text)?)
}

/// Zone / publisher / media by-date rows.
pub fn hierarchy_rows_from_json(
    dataset: &str,
    value: &serde_json::Value,
) -> ModelResult<Vec<HierarchyRow>> {
    let items = rows(dataset, value)?;
    let out: Vec<HierarchyRow> = items.iter().filter_map(HierarchyRow::from_json).collect();
    if out.len() != items.len() {
        log::warn!(
            "{dataset}: dropped {} of {} rows during normalization",
            items.len() - out.len(),
            items.len()
        );
    }
    Ok(out)
}

pub fn hierarchy_rows_from_str(dataset: &str, text: &str) -> ModelResult<Vec<HierarchyRow>> {
    hierarchy_rows_from_json(dataset, &parse_json(text)?)
}

/// Upstream team (`Level::Team`) or PIC (`Level::Pic`) summaries.
pub fn breakdown_rows_from_json(
    dataset: &str,
    value: &serde_json::Value,
    level: Level,
) -> ModelResult<Vec<BreakdownRow>> {
    let items = rows(dataset, value)?;
    let out: Vec<BreakdownRow> = items
        .iter()
        .filter_map(|row| BreakdownRow::from_json(row, level))
        .collect();
    if out.len() != items.len() {
        log::warn!(
            "{dataset}: dropped {} of {} summary rows during normalization",
            items.len() - out.len(),
            items.len()
        );
    }
    Ok(out)
}

fn reference_rows<T: DeserializeOwned>(
    dataset: &str,
    value: &serde_json::Value,
) -> ModelResult<Vec<T>> {
    let mut out = Vec::new();
    for (index, row) in rows(dataset, value)?.iter().enumerate() {
        match <T as serde::Deserialize>::deserialize(row) {
            Ok(parsed) => out.push(parsed),
            Err(err) => log::warn!("{dataset}: skipping row {index}: {err}"),
        }
    }
    Ok(out)
}

pub fn teams_from_json(value: &serde_json::Value) -> ModelResult<Vec<TeamConfiguration>> {
    reference_rows("team_configuration", value)
}

pub fn pic_mappings_from_json(value: &serde_json::Value) -> ModelResult<Vec<TeamPicMapping>> {
    reference_rows("team_pic_mapping", value)
}

pub fn teams_from_str(text: &str) -> ModelResult<Vec<TeamConfiguration>> {
    teams_from_json(&parse_json(text)?)
}

pub fn pic_mappings_from_str(text: &str) -> ModelResult<Vec<TeamPicMapping>> {
    pic_mappings_from_json(&parse_json(text)?)
}
