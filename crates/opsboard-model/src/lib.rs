//! Row and hierarchy model for the Opsboard analytics core.
//!
//! This crate owns the ingestion boundary:
//! - [`Value`] / [`Record`] for schema-free rows coming out of the API layer.
//! - [`HierarchyRow`] / [`BreakdownRow`], the fixed shapes every time-series dataset is
//!   normalized into before it reaches filtering or aggregation.
//! - [`Hierarchy`], the read-only Team > PIC lookup tables.
//! - Date normalization for the `"2024-01-01"` / `{ "value": "2024-01-01" }` ambiguity.

#![forbid(unsafe_code)]

mod date;
mod error;
mod hierarchy;
pub mod ingest;
mod record;
mod rows;
mod serde_helpers;
mod value;

pub use crate::date::{format_display_date, iso_date, normalize_date, parse_date_text};
pub use crate::error::{ModelError, ModelResult};
pub use crate::hierarchy::{Hierarchy, Level, TeamConfiguration, TeamPicMapping};
pub use crate::record::Record;
pub use crate::rows::{BreakdownRow, ColumnSet, HierarchyColumn, HierarchyRow};
pub use crate::value::Value;
