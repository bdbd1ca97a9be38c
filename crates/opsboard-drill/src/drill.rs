use crate::error::{DrillError, DrillResult};
use crate::position::DrillPosition;
use opsboard_model::Level;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillMode {
    /// Top-line series only, no breakdown.
    #[default]
    Total,
    Breakdown,
}

/// The metric charted and ranked in breakdown mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Revenue,
    Profit,
}

impl Metric {
    pub fn pick(self, revenue: f64, profit: f64) -> f64 {
        match self {
            Metric::Revenue => revenue,
            Metric::Profit => profit,
        }
    }
}

/// One drilled-into entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    pub level: Level,
    pub id: String,
    pub name: String,
}

impl PathEntry {
    pub fn new(level: Level, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CrumbTarget {
    /// The "All" crumb.
    Root,
    /// Index into the drill path.
    Path(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub target: CrumbTarget,
    /// The crumb for the entity whose children are currently charted.
    pub current: bool,
}

/// Chart mode, metric and position in the hierarchy for one breakdown chart.
///
/// Invariant: `path.len() == level.depth()` and `path[i].level` is the `i`-th hierarchy level,
/// so `level` is always one step below the last path entry (or `team` for an empty path).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrillState {
    mode: DrillMode,
    metric: Metric,
    level: Level,
    path: Vec<PathEntry>,
}

impl Default for DrillState {
    fn default() -> Self {
        Self {
            mode: DrillMode::Total,
            metric: Metric::Revenue,
            level: Level::Team,
            path: Vec::new(),
        }
    }
}

impl DrillState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrillMode {
        self.mode
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn path(&self) -> &[PathEntry] {
        &self.path
    }

    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    /// Switch to breakdown mode starting at `start` (see [`crate::initial_position`]).
    pub fn enter_breakdown(&mut self, start: DrillPosition) {
        self.mode = DrillMode::Breakdown;
        self.reposition(start);
    }

    pub fn enter_total(&mut self) {
        self.mode = DrillMode::Total;
        self.path.clear();
        self.level = Level::Team;
        log::debug!("drill: total mode");
    }

    /// Re-derive the position after the external filter set changed. Ignored in total mode; the
    /// next [`DrillState::enter_breakdown`] computes a fresh start instead.
    pub fn apply_filters(&mut self, start: DrillPosition) {
        if self.mode == DrillMode::Breakdown {
            self.reposition(start);
        }
    }

    /// Drill into one entity of the current level.
    pub fn drill_into(&mut self, id: impl Into<String>, name: impl Into<String>) -> DrillResult<()> {
        if self.mode != DrillMode::Breakdown {
            return Err(DrillError::NotInBreakdown);
        }
        let Some(next) = self.level.child() else {
            return Err(DrillError::TerminalLevel { level: self.level });
        };

        let entry = PathEntry::new(self.level, id, name);
        log::debug!("drill: {} {} -> {next}", entry.level, entry.id);
        self.path.push(entry);
        self.level = next;
        Ok(())
    }

    /// Breadcrumb click on path entry `index`: keep the path up to and including that entry.
    pub fn navigate_to_crumb(&mut self, index: usize) -> DrillResult<()> {
        if self.mode != DrillMode::Breakdown {
            return Err(DrillError::NotInBreakdown);
        }
        if index >= self.path.len() {
            return Err(DrillError::CrumbOutOfRange {
                index,
                len: self.path.len(),
            });
        }
        self.path.truncate(index + 1);
        self.sync_level();
        Ok(())
    }

    /// The "All" crumb.
    pub fn navigate_root(&mut self) {
        self.path.clear();
        self.level = Level::Team;
    }

    pub fn navigate(&mut self, target: CrumbTarget) -> DrillResult<()> {
        match target {
            CrumbTarget::Root => {
                self.navigate_root();
                Ok(())
            }
            CrumbTarget::Path(index) => self.navigate_to_crumb(index),
        }
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = Vec::with_capacity(self.path.len() + 1);
        crumbs.push(Breadcrumb {
            label: "All".to_string(),
            target: CrumbTarget::Root,
            current: self.path.is_empty(),
        });
        let last = self.path.len().checked_sub(1);
        crumbs.extend(self.path.iter().enumerate().map(|(idx, entry)| Breadcrumb {
            label: entry.name.clone(),
            target: CrumbTarget::Path(idx),
            current: Some(idx) == last,
        }));
        crumbs
    }

    /// Whether the path/level invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.path.len() == self.level.depth()
            && self
                .path
                .iter()
                .enumerate()
                .all(|(idx, entry)| entry.level.depth() == idx)
    }

    fn reposition(&mut self, start: DrillPosition) {
        let DrillPosition { level, path } = start;
        log::debug!("drill: start at {level} with {} ancestors", path.len());
        self.path = path;
        self.level = level;
        if !self.is_consistent() {
            log::warn!("drill: inconsistent start position; resetting to root");
            self.navigate_root();
        }
    }

    fn sync_level(&mut self) {
        self.level = Level::from_depth(self.path.len()).unwrap_or(Level::Zid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn breakdown() -> DrillState {
        let mut state = DrillState::new();
        state.enter_breakdown(DrillPosition::root());
        state
    }

    #[test]
    fn drilling_walks_down_to_zone_and_stops() {
        let mut state = breakdown();
        for (id, level) in [
            ("t1", Level::Pic),
            ("ann", Level::Pid),
            ("17", Level::Mid),
            ("170", Level::Zid),
        ] {
            state.drill_into(id, id).unwrap();
            assert_eq!(state.level(), level);
            assert!(state.is_consistent());
        }
        assert_eq!(
            state.drill_into("z1", "z1"),
            Err(DrillError::TerminalLevel { level: Level::Zid })
        );
        assert_eq!(state.path().len(), 4);
    }

    #[test]
    fn crumb_navigation_truncates_the_path() {
        let mut state = breakdown();
        state.drill_into("t1", "Alpha").unwrap();
        state.drill_into("ann", "ann").unwrap();
        state.drill_into("17", "Daily").unwrap();

        state.navigate_to_crumb(0).unwrap();
        assert_eq!(state.level(), Level::Pic);
        assert_eq!(state.path(), &[PathEntry::new(Level::Team, "t1", "Alpha")]);

        assert_eq!(
            state.navigate_to_crumb(1),
            Err(DrillError::CrumbOutOfRange { index: 1, len: 1 })
        );

        state.navigate(CrumbTarget::Root).unwrap();
        assert_eq!(state.level(), Level::Team);
        assert!(state.path().is_empty());
    }

    #[test]
    fn total_mode_rejects_navigation() {
        let mut state = DrillState::new();
        assert_eq!(state.drill_into("t1", "t1"), Err(DrillError::NotInBreakdown));
        assert_eq!(state.navigate_to_crumb(0), Err(DrillError::NotInBreakdown));
    }

    #[test]
    fn entering_total_resets_the_path() {
        let mut state = breakdown();
        state.drill_into("t1", "Alpha").unwrap();
        state.enter_total();
        assert_eq!(state.mode(), DrillMode::Total);
        assert!(state.path().is_empty());
        assert_eq!(state.level(), Level::Team);
    }

    #[test]
    fn breadcrumbs_start_with_all_and_mark_the_current_entry() {
        let mut state = breakdown();
        assert_eq!(
            state.breadcrumbs(),
            vec![Breadcrumb {
                label: "All".into(),
                target: CrumbTarget::Root,
                current: true,
            }]
        );

        state.drill_into("t1", "Alpha").unwrap();
        state.drill_into("ann", "Ann").unwrap();
        let labels: Vec<_> = state
            .breadcrumbs()
            .into_iter()
            .map(|c| (c.label, c.current))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("All".to_string(), false),
                ("Alpha".to_string(), false),
                ("Ann".to_string(), true),
            ]
        );
    }

    #[test]
    fn inconsistent_start_falls_back_to_root() {
        let mut state = DrillState::new();
        state.enter_breakdown(DrillPosition {
            level: Level::Mid,
            path: vec![PathEntry::new(Level::Team, "t1", "t1")],
        });
        assert_eq!(state.level(), Level::Team);
        assert!(state.path().is_empty());
    }
}
