//! Cross-filtering and hierarchical drill-down for Opsboard dashboards.
//!
//! - [`filter_records`] / [`CompiledFilter`]: OR-within-field, AND-across-field row filtering.
//! - [`FilterSelection`]: the clause list a dashboard page accumulates from chart clicks.
//! - [`DrillState`] + [`initial_position`]: Team > PIC > Publisher > Media > Zone navigation.
//! - [`breakdown_series`]: per-entity roll-ups with a pluggable [`SeriesSource`].
//! - [`select_top`] + [`pivot_wide`]: legend ranking and wide chart rows.
//! - [`DashboardSession`]: all of the above wired together for one dashboard tab.

#![forbid(unsafe_code)]

mod aggregate;
mod chart;
mod config;
mod crossfilter;
mod drill;
mod error;
mod position;
mod selection;
mod session;
mod top_n;

pub use crate::aggregate::{
    breakdown_series, breakdown_series_from, total_series, DataSources, PreAggregatedSource,
    Preaggregated, RawRollupSource, SeriesAccumulator, SeriesSource, TimeSeriesPoint,
    TotalPoint, UNASSIGNED_TEAM_ID,
};
pub use crate::chart::{pivot_wide, MissingValue, WideRow, WideTable};
pub use crate::config::DrillConfig;
pub use crate::crossfilter::{
    field_values, filter_records, CompiledFilter, FieldLookup, FieldProbe, FilterClause,
    MemoizedFilter,
};
pub use crate::drill::{Breadcrumb, CrumbTarget, DrillMode, DrillState, Metric, PathEntry};
pub use crate::error::{DrillError, DrillResult};
pub use crate::position::{initial_position, ActiveFilters, DrillPosition, FilterKind};
pub use crate::selection::FilterSelection;
pub use crate::session::{ChartFrame, DashboardSession, DashboardView};
pub use crate::top_n::{entity_totals, select_top, EntityTotal};

pub use opsboard_model::Level;
