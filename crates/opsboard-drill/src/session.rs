//! One dashboard tab: the page's filter selection, its breakdown chart state, and the chart frame
//! derived from both.

use crate::aggregate::{breakdown_series, total_series, DataSources, TotalPoint};
use crate::chart::{pivot_wide, WideTable};
use crate::config::DrillConfig;
use crate::crossfilter::{FilterClause, MemoizedFilter};
use crate::drill::{Breadcrumb, DrillMode, DrillState, Metric};
use crate::error::DrillResult;
use crate::position::{initial_position, ActiveFilters, DrillPosition};
use crate::selection::FilterSelection;
use crate::top_n::{select_top, EntityTotal};
use opsboard_model::{Hierarchy, Level, Record};
use serde::Serialize;
use std::sync::Arc;

/// The datasets a chart frame is computed from. Borrowed for the duration of one call.
#[derive(Clone, Copy, Debug)]
pub struct DashboardView<'a> {
    pub sources: DataSources<'a>,
    pub hierarchy: &'a Hierarchy,
}

impl<'a> DashboardView<'a> {
    pub fn new(sources: DataSources<'a>, hierarchy: &'a Hierarchy) -> Self {
        Self { sources, hierarchy }
    }

    fn start_position(&self, clauses: &[FilterClause]) -> DrillPosition {
        let filters = ActiveFilters::from_clauses(clauses);
        initial_position(&filters, self.hierarchy, self.sources.all_rows())
    }
}

/// Everything a renderer needs to draw the chart for the current state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ChartFrame {
    Total {
        series: Vec<TotalPoint>,
    },
    Breakdown {
        level: Level,
        metric: Metric,
        breadcrumbs: Vec<Breadcrumb>,
        legend: Vec<EntityTotal>,
        table: WideTable,
    },
}

#[derive(Clone, Debug, Default)]
pub struct DashboardSession {
    config: DrillConfig,
    selection: FilterSelection,
    drill: DrillState,
    table_filter: MemoizedFilter<Record>,
}

impl DashboardSession {
    pub fn new(config: DrillConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DrillConfig {
        &self.config
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn drill(&self) -> &DrillState {
        &self.drill
    }

    /// Toggle a chart-click filter. Returns whether the clause is selected afterwards.
    pub fn toggle_filter(&mut self, clause: FilterClause, view: &DashboardView<'_>) -> bool {
        let selected = self.selection.toggle(clause);
        self.filters_changed(view);
        selected
    }

    pub fn remove_filter(&mut self, field: &str, value: &str, view: &DashboardView<'_>) -> bool {
        let removed = self.selection.remove(field, value);
        if removed {
            self.filters_changed(view);
        }
        removed
    }

    pub fn clear_filters(&mut self, view: &DashboardView<'_>) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.filters_changed(view);
        }
    }

    /// Switch to another page. A different page starts with no filters.
    pub fn enter_page(&mut self, page: &str, view: &DashboardView<'_>) {
        if self.selection.enter_context(page) {
            log::debug!("page {page}: previous filters cleared");
            self.table_filter.invalidate();
            self.filters_changed(view);
        }
    }

    pub fn show_breakdown(&mut self, view: &DashboardView<'_>) {
        let start = view.start_position(self.selection.clauses());
        self.drill.enter_breakdown(start);
    }

    pub fn show_total(&mut self) {
        self.drill.enter_total();
    }

    pub fn drill_into(&mut self, id: impl Into<String>, name: impl Into<String>) -> DrillResult<()> {
        self.drill.drill_into(id, name)
    }

    pub fn navigate_to_crumb(&mut self, index: usize) -> DrillResult<()> {
        self.drill.navigate_to_crumb(index)
    }

    pub fn navigate_root(&mut self) {
        self.drill.navigate_root();
    }

    pub fn set_metric(&mut self, metric: Metric) {
        self.drill.set_metric(metric);
    }

    /// Rows of `table` that pass the current selection. Repeated calls with the same `Arc` and an
    /// unchanged selection reuse the previous result.
    pub fn filter_table(&mut self, table: &Arc<[Record]>) -> Arc<[Record]> {
        self.table_filter.filter(table, self.selection.clauses())
    }

    pub fn chart(&self, view: &DashboardView<'_>) -> ChartFrame {
        let axis = total_series(view.sources.finest_rows(), &self.config);
        match self.drill.mode() {
            DrillMode::Total => ChartFrame::Total { series: axis },
            DrillMode::Breakdown => {
                let level = self.drill.level();
                let metric = self.drill.metric();
                let points = breakdown_series(
                    level,
                    self.drill.path(),
                    &view.sources,
                    view.hierarchy,
                    &self.config,
                );
                let legend = select_top(&points, metric, self.config.top_n);
                let table = pivot_wide(&points, &legend, &axis, metric, self.config.missing);
                ChartFrame::Breakdown {
                    level,
                    metric,
                    breadcrumbs: self.drill.breadcrumbs(),
                    legend,
                    table,
                }
            }
        }
    }

    fn filters_changed(&mut self, view: &DashboardView<'_>) {
        if self.drill.mode() == DrillMode::Breakdown {
            let start = view.start_position(self.selection.clauses());
            self.drill.apply_filters(start);
        }
    }
}
