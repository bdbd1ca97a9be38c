//! Starting position of a breakdown chart derived from the page's active filters.
//!
//! A more specific filter skips ahead in the hierarchy. Priority, most specific first:
//! zone, media or product, publisher, PIC, team. The chosen filter's entity is drilled into,
//! with its ancestors reconstructed from the hierarchy tables and the dataset rows.

use crate::crossfilter::FilterClause;
use crate::drill::PathEntry;
use opsboard_model::{Hierarchy, HierarchyRow, Level};
use std::collections::BTreeMap;

/// Dashboard filters that can position a breakdown chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
    Team,
    Pic,
    Publisher,
    Media,
    Product,
    Zone,
}

impl FilterKind {
    /// Most specific first. Media and product share a rank; media is tried first.
    pub const PRIORITY: [FilterKind; 6] = [
        FilterKind::Zone,
        FilterKind::Media,
        FilterKind::Product,
        FilterKind::Publisher,
        FilterKind::Pic,
        FilterKind::Team,
    ];

    /// Map a filter field name (as used in filter clauses) to its kind.
    pub fn from_field(field: &str) -> Option<Self> {
        match field.trim().to_ascii_lowercase().as_str() {
            "team" | "team_id" | "team_name" => Some(FilterKind::Team),
            "pic" | "pic_name" => Some(FilterKind::Pic),
            "pid" | "pubname" | "pub_name" | "publisher" | "publisher_name" => {
                Some(FilterKind::Publisher)
            }
            "mid" | "medianame" | "media_name" | "media" => Some(FilterKind::Media),
            "product" => Some(FilterKind::Product),
            "zid" | "zone" | "zonename" | "zone_name" => Some(FilterKind::Zone),
            _ => None,
        }
    }
}

/// Active filter values per kind. Values are kept in first-seen order without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveFilters {
    values: BTreeMap<FilterKind, Vec<String>>,
}

impl ActiveFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clauses(clauses: &[FilterClause]) -> Self {
        let mut filters = Self::new();
        for clause in clauses {
            if let Some(kind) = FilterKind::from_field(&clause.field) {
                filters.push(kind, &clause.value);
            }
        }
        filters
    }

    pub fn with(mut self, kind: FilterKind, value: impl AsRef<str>) -> Self {
        self.push(kind, value.as_ref());
        self
    }

    pub fn push(&mut self, kind: FilterKind, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let values = self.values.entry(kind).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self, kind: FilterKind) -> &[String] {
        self.values.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// The filter value when exactly one is selected for `kind`.
    pub fn single(&self, kind: FilterKind) -> Option<&str> {
        match self.values(kind) {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// A level plus the ancestors already drilled into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrillPosition {
    pub level: Level,
    pub path: Vec<PathEntry>,
}

impl DrillPosition {
    pub fn root() -> Self {
        Self {
            level: Level::Team,
            path: Vec::new(),
        }
    }

    /// Position whose path is `path` and whose level is the one below it.
    pub fn below(path: Vec<PathEntry>) -> Self {
        let level = Level::from_depth(path.len()).unwrap_or(Level::Zid);
        Self { level, path }
    }
}

impl Default for DrillPosition {
    fn default() -> Self {
        Self::root()
    }
}

/// Where a breakdown chart starts for the given filters.
///
/// Only filters with exactly one selected value take part. When the most specific filter's
/// ancestry cannot be resolved the next one down is tried, ending at the root.
pub fn initial_position<'a, I>(
    filters: &ActiveFilters,
    hierarchy: &Hierarchy,
    rows: I,
) -> DrillPosition
where
    I: IntoIterator<Item = &'a HierarchyRow> + Clone,
{
    for kind in FilterKind::PRIORITY {
        let Some(value) = filters.single(kind) else {
            continue;
        };
        match resolve(kind, value, hierarchy, rows.clone()) {
            Some(position) => {
                log::debug!("drill start: {kind:?} filter {value:?} -> {}", position.level);
                return position;
            }
            None => log::debug!("drill start: {kind:?} filter {value:?} has no resolvable ancestry"),
        }
    }
    DrillPosition::root()
}

fn resolve<'a, I>(
    kind: FilterKind,
    value: &str,
    hierarchy: &Hierarchy,
    rows: I,
) -> Option<DrillPosition>
where
    I: IntoIterator<Item = &'a HierarchyRow>,
{
    let matches = |id: &Option<String>, name: &Option<String>| {
        id.as_deref().map(str::trim) == Some(value)
            || name.as_deref().map(str::trim) == Some(value)
    };

    match kind {
        FilterKind::Team => {
            let path = match hierarchy.find_team(value) {
                Some(team) => vec![PathEntry::new(
                    Level::Team,
                    team.team_id.trim(),
                    team.team_name.as_str(),
                )],
                None => {
                    let row = rows
                        .into_iter()
                        .find(|row| row.team_key(hierarchy) == Some(value))?;
                    chain_from_row(row, 1, hierarchy)?
                }
            };
            Some(DrillPosition::below(path))
        }
        FilterKind::Pic => {
            let team_id = match hierarchy.team_of_pic(value) {
                Some(team_id) => team_id.to_string(),
                None => rows
                    .into_iter()
                    .find(|row| row.pic_name.as_deref().map(str::trim) == Some(value))?
                    .team_key(hierarchy)?
                    .to_string(),
            };
            let team_name = hierarchy.team_display_name(&team_id).to_string();
            Some(DrillPosition::below(vec![
                PathEntry::new(Level::Team, team_id, team_name),
                PathEntry::new(Level::Pic, value, value),
            ]))
        }
        FilterKind::Publisher => {
            let row = rows
                .into_iter()
                .find(|row| matches(&row.pid, &row.pub_name))?;
            Some(DrillPosition::below(chain_from_row(row, 3, hierarchy)?))
        }
        FilterKind::Media => {
            let row = rows
                .into_iter()
                .find(|row| matches(&row.mid, &row.media_name))?;
            Some(DrillPosition::below(chain_from_row(row, 4, hierarchy)?))
        }
        FilterKind::Product => {
            let row = rows
                .into_iter()
                .find(|row| row.product.as_deref().map(str::trim) == Some(value))?;
            Some(DrillPosition::below(chain_from_row(row, 4, hierarchy)?))
        }
        FilterKind::Zone => {
            let row = rows
                .into_iter()
                .find(|row| matches(&row.zid, &row.zone_name))?;
            Some(DrillPosition::below(chain_from_row(row, 4, hierarchy)?))
        }
    }
}

/// Path entries for the first `depth` levels of `row`; `None` if any key is missing.
fn chain_from_row(row: &HierarchyRow, depth: usize, hierarchy: &Hierarchy) -> Option<Vec<PathEntry>> {
    Level::ALL[..depth]
        .iter()
        .map(|&level| {
            let id = row.key_at(level, hierarchy)?;
            let name = row.name_at(level, hierarchy).unwrap_or(id);
            Some(PathEntry::new(level, id, name))
        })
        .collect()
}
