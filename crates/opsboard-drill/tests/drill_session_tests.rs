mod common;

use common::{hierarchy, sources, zones};
use opsboard_drill::{
    ChartFrame, CrumbTarget, DashboardSession, DashboardView, DrillConfig, DrillError, DrillMode,
    FilterClause, Level, Metric, MissingValue, WideTable,
};
use opsboard_model::Hierarchy;
use pretty_assertions::assert_eq;

fn breakdown(frame: ChartFrame) -> (Level, Vec<String>, Vec<String>, WideTable) {
    match frame {
        ChartFrame::Breakdown {
            level,
            breadcrumbs,
            legend,
            table,
            ..
        } => (
            level,
            breadcrumbs.into_iter().map(|c| c.label).collect(),
            legend.into_iter().map(|t| t.entity_name).collect(),
            table,
        ),
        ChartFrame::Total { .. } => panic!("expected a breakdown frame"),
    }
}

#[test]
fn breakdown_walks_the_hierarchy_and_back() {
    let rows = zones();
    let h = hierarchy();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::new(DrillConfig {
        top_n: 2,
        ..DrillConfig::default()
    });

    session.show_breakdown(&view);
    let (level, crumbs, legend, table) = breakdown(session.chart(&view));
    assert_eq!(level, Level::Team);
    assert_eq!(crumbs, vec!["All"]);
    assert_eq!(legend, vec!["Alpha", "Beta"]);
    assert_eq!(table.columns, vec!["Alpha", "Beta"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.value("2024-01-03", "t2"), Some(0.0));

    session.drill_into("t1", "Alpha").unwrap();
    session.drill_into("ann", "ann").unwrap();
    let (level, crumbs, legend, _) = breakdown(session.chart(&view));
    assert_eq!(level, Level::Pid);
    assert_eq!(crumbs, vec!["All", "Alpha", "ann"]);
    assert_eq!(legend, vec!["Daily"]);

    session.navigate_to_crumb(0).unwrap();
    let (level, _, legend, _) = breakdown(session.chart(&view));
    assert_eq!(level, Level::Pic);
    assert_eq!(legend, vec!["ann", "bob"]);

    session.navigate_root();
    assert_eq!(session.drill().level(), Level::Team);
    assert!(session.drill().is_consistent());
}

#[test]
fn metric_changes_ranking_and_cells() {
    let rows = zones();
    let h = hierarchy();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::new(DrillConfig {
        missing: MissingValue::Blank,
        ..DrillConfig::default()
    });
    session.show_breakdown(&view);
    session.set_metric(Metric::Profit);

    match session.chart(&view) {
        ChartFrame::Breakdown {
            metric,
            legend,
            table,
            ..
        } => {
            assert_eq!(metric, Metric::Profit);
            assert_eq!(legend[0].entity_name, "Alpha");
            assert_eq!(legend.len(), 3);
            assert_eq!(table.value("2024-01-01", "t1"), Some(20.0));
            assert_eq!(table.value("2024-01-03", "t2"), None);
        }
        other => panic!("expected a breakdown frame, got {other:?}"),
    }
}

#[test]
fn zone_filter_starts_the_chart_at_zones() {
    let rows = zones();
    let h = hierarchy();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::default();

    // Filters picked in total mode take effect once the breakdown opens.
    session.toggle_filter(FilterClause::new("zid", "1800"), &view);
    assert_eq!(session.drill().mode(), DrillMode::Total);
    session.show_breakdown(&view);

    let (level, crumbs, legend, _) = breakdown(session.chart(&view));
    assert_eq!(level, Level::Zid);
    assert_eq!(crumbs, vec!["All", "Alpha", "bob", "Weekly", "weekly.example"]);
    assert_eq!(legend, vec!["Top"]);
    assert_eq!(
        session.drill_into("1800", "Top"),
        Err(DrillError::TerminalLevel { level: Level::Zid })
    );

    // Removing the filter sends the chart back to the root.
    assert!(session.remove_filter("zid", "1800", &view));
    assert_eq!(session.drill().level(), Level::Team);
}

#[test]
fn team_filter_by_name_starts_at_pics() {
    let rows = zones();
    let h = hierarchy();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::default();
    session.show_breakdown(&view);

    session.toggle_filter(FilterClause::new("team", "Beta"), &view);
    let (level, crumbs, legend, _) = breakdown(session.chart(&view));
    assert_eq!(level, Level::Pic);
    assert_eq!(crumbs, vec!["All", "Beta"]);
    assert_eq!(legend, vec!["cho"]);

    // A second team makes the filter ambiguous.
    session.toggle_filter(FilterClause::new("team", "Alpha"), &view);
    assert_eq!(session.drill().level(), Level::Team);

    session.clear_filters(&view);
    assert!(session.selection().is_empty());
}

#[test]
fn total_mode_rejects_drilling_and_resets_the_path() {
    let rows = zones();
    let h = hierarchy();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::default();

    assert_eq!(session.drill_into("t1", "Alpha"), Err(DrillError::NotInBreakdown));

    session.show_breakdown(&view);
    session.drill_into("t1", "Alpha").unwrap();
    session.show_total();
    assert!(session.drill().path().is_empty());
    match session.chart(&view) {
        ChartFrame::Total { series } => assert_eq!(series.len(), 3),
        other => panic!("expected a total frame, got {other:?}"),
    }
}

#[test]
fn missing_hierarchy_yields_an_empty_breakdown() {
    let rows = zones();
    let h = Hierarchy::empty();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::default();
    session.show_breakdown(&view);

    let (_, crumbs, legend, table) = breakdown(session.chart(&view));
    assert_eq!(crumbs, vec!["All"]);
    assert!(legend.is_empty());
    assert!(table.is_empty());
}

#[test]
fn crumb_targets_navigate() {
    let rows = zones();
    let h = hierarchy();
    let view = DashboardView::new(sources(&rows), &h);
    let mut session = DashboardSession::default();
    session.show_breakdown(&view);
    session.drill_into("t1", "Alpha").unwrap();

    let crumbs = session.drill().breadcrumbs();
    assert_eq!(crumbs[1].target, CrumbTarget::Path(0));
    assert!(crumbs[1].current);
    assert_eq!(
        session.navigate_to_crumb(3),
        Err(DrillError::CrumbOutOfRange { index: 3, len: 1 })
    );
}
