//! Per-entity time series at any hierarchy level.
//!
//! One aggregation routine serves every level; where the rows come from is a [`SeriesSource`].
//! Upstream team/PIC summaries and on-the-fly roll-ups of raw rows are both sources, so the two
//! paths cannot drift apart.

use crate::config::DrillConfig;
use crate::drill::PathEntry;
use chrono::NaiveDate;
use opsboard_model::{
    format_display_date, iso_date, BreakdownRow, Hierarchy, HierarchyRow, Level,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Team id assigned to rows whose PIC has no team mapping.
pub const UNASSIGNED_TEAM_ID: &str = "__unassigned__";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    /// Axis label.
    pub date: String,
    /// ISO `YYYY-MM-DD`.
    pub raw_date: String,
    pub entity_id: String,
    pub entity_name: String,
    pub revenue: f64,
    pub profit: f64,
}

/// One date of the top-line series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TotalPoint {
    pub date: String,
    pub raw_date: String,
    pub revenue: f64,
    pub profit: f64,
    pub requests: f64,
    pub paid: f64,
}

/// State of an upstream pre-aggregated roll-up.
#[derive(Clone, Copy, Debug, Default)]
pub enum Preaggregated<'a> {
    #[default]
    Unavailable,
    /// Still being fetched. Aggregation waits rather than recomputing from raw rows.
    Loading,
    Ready(&'a [BreakdownRow]),
}

/// Everything the aggregator may read from, as delivered by the data layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataSources<'a> {
    /// Zone-level (finest) by-date rows.
    pub zones: &'a [HierarchyRow],
    /// Publisher-level by-date rows; preferred over `zones` at the `pid` level when it can
    /// be scoped to the drill path.
    pub publishers_by_date: &'a [HierarchyRow],
    /// Media-level by-date rows; preferred over `zones` at the `mid` level on the same
    /// terms.
    pub media_by_date: &'a [HierarchyRow],
    pub team_summary: Preaggregated<'a>,
    pub pic_summary: Preaggregated<'a>,
}

impl<'a> DataSources<'a> {
    pub fn from_zones(zones: &'a [HierarchyRow]) -> Self {
        Self {
            zones,
            ..Self::default()
        }
    }

    /// The finest non-empty raw dataset.
    pub fn finest_rows(&self) -> &'a [HierarchyRow] {
        [self.zones, self.media_by_date, self.publishers_by_date]
            .into_iter()
            .find(|rows| !rows.is_empty())
            .unwrap_or_default()
    }

    /// All raw rows, finest first.
    pub fn all_rows(&self) -> impl Iterator<Item = &'a HierarchyRow> + Clone {
        self.zones
            .iter()
            .chain(self.media_by_date.iter())
            .chain(self.publishers_by_date.iter())
    }
}

#[derive(Clone, Debug)]
struct Bucket {
    name: String,
    revenue: f64,
    profit: f64,
}

/// Sums revenue/profit per `(date, entity)`.
#[derive(Clone, Debug, Default)]
pub struct SeriesAccumulator {
    buckets: BTreeMap<(NaiveDate, String), Bucket>,
}

impl SeriesAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row's values. The first name seen for an entity is kept.
    pub fn add(&mut self, date: NaiveDate, entity_id: &str, entity_name: &str, revenue: f64, profit: f64) {
        let bucket = self
            .buckets
            .entry((date, entity_id.to_string()))
            .or_insert_with(|| Bucket {
                name: entity_name.to_string(),
                revenue: 0.0,
                profit: 0.0,
            });
        bucket.revenue += revenue;
        bucket.profit += profit;
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Points ordered by date, then entity name, then entity id.
    pub fn finish(self, config: &DrillConfig) -> Vec<TimeSeriesPoint> {
        // One entity keeps one name across dates even if rows disagreed.
        let mut names: HashMap<String, String> = HashMap::new();
        for ((_, id), bucket) in &self.buckets {
            names.entry(id.clone()).or_insert_with(|| bucket.name.clone());
        }

        let mut points: Vec<(NaiveDate, TimeSeriesPoint)> = self
            .buckets
            .into_iter()
            .map(|((date, entity_id), bucket)| {
                let entity_name = names.get(&entity_id).cloned().unwrap_or(bucket.name);
                (
                    date,
                    TimeSeriesPoint {
                        date: format_display_date(date, &config.date_display_format),
                        raw_date: iso_date(date),
                        entity_id,
                        entity_name,
                        revenue: bucket.revenue,
                        profit: bucket.profit,
                    },
                )
            })
            .collect();
        points.sort_by(|(da, a), (db, b)| {
            da.cmp(db)
                .then_with(|| a.entity_name.cmp(&b.entity_name))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });
        points.into_iter().map(|(_, point)| point).collect()
    }
}

/// A provider of per-entity rows for one hierarchy level.
pub trait SeriesSource {
    /// Short name for logging.
    fn describe(&self) -> &'static str;

    /// Feed every `(date, entity)` contribution for `level` under `path` into `sink`.
    fn collect(
        &self,
        level: Level,
        path: &[PathEntry],
        hierarchy: &Hierarchy,
        config: &DrillConfig,
        sink: &mut SeriesAccumulator,
    );
}

/// Whether `row` lies under path entry `entry`. A row whose payload never carried that level's
/// key cannot be placed and is not excluded.
fn row_under(row: &HierarchyRow, entry: &PathEntry, hierarchy: &Hierarchy) -> bool {
    if !row.carries_level(entry.level) {
        return true;
    }
    match (entry.level, row.key_at(entry.level, hierarchy)) {
        (Level::Team, None) => entry.id == UNASSIGNED_TEAM_ID,
        (_, Some(key)) => key.trim() == entry.id,
        (_, None) => false,
    }
}

/// On-the-fly roll-up of raw by-date rows.
#[derive(Clone, Copy, Debug)]
pub struct RawRollupSource<'a> {
    rows: &'a [HierarchyRow],
}

impl<'a> RawRollupSource<'a> {
    pub fn new(rows: &'a [HierarchyRow]) -> Self {
        Self { rows }
    }
}

impl SeriesSource for RawRollupSource<'_> {
    fn describe(&self) -> &'static str {
        "raw roll-up"
    }

    fn collect(
        &self,
        level: Level,
        path: &[PathEntry],
        hierarchy: &Hierarchy,
        config: &DrillConfig,
        sink: &mut SeriesAccumulator,
    ) {
        let ancestors: Vec<&PathEntry> = path.iter().filter(|e| e.level < level).collect();
        for row in self.rows {
            if !ancestors.iter().all(|entry| row_under(row, entry, hierarchy)) {
                continue;
            }
            match row.key_at(level, hierarchy) {
                Some(id) => {
                    let name = row.name_at(level, hierarchy).unwrap_or(id);
                    sink.add(row.date, id.trim(), name.trim(), row.revenue, row.profit);
                }
                // Team totals must cover every row, mapped or not.
                None if level == Level::Team => sink.add(
                    row.date,
                    UNASSIGNED_TEAM_ID,
                    &config.unassigned_team_label,
                    row.revenue,
                    row.profit,
                ),
                None => {}
            }
        }
    }
}

/// Upstream team- or PIC-level summaries.
#[derive(Clone, Copy, Debug)]
pub struct PreAggregatedSource<'a> {
    level: Level,
    rows: &'a [BreakdownRow],
}

impl<'a> PreAggregatedSource<'a> {
    pub fn new(level: Level, rows: &'a [BreakdownRow]) -> Self {
        Self { level, rows }
    }

    fn team_of<'r>(&self, row: &'r BreakdownRow, hierarchy: &'r Hierarchy) -> Option<&'r str> {
        row.parent_id
            .as_deref()
            .or_else(|| hierarchy.team_of_pic(&row.entity_id))
    }
}

impl SeriesSource for PreAggregatedSource<'_> {
    fn describe(&self) -> &'static str {
        "pre-aggregated summary"
    }

    fn collect(
        &self,
        level: Level,
        path: &[PathEntry],
        hierarchy: &Hierarchy,
        _config: &DrillConfig,
        sink: &mut SeriesAccumulator,
    ) {
        if level != self.level {
            log::warn!("{} summary asked for {level} series", self.level);
            return;
        }
        let team_scope = match level {
            Level::Pic => path.iter().find(|e| e.level == Level::Team),
            _ => None,
        };

        for row in self.rows {
            if let Some(team) = team_scope {
                let in_scope = match self.team_of(row, hierarchy) {
                    Some(team_id) => team_id.trim() == team.id,
                    None => team.id == UNASSIGNED_TEAM_ID,
                };
                if !in_scope {
                    continue;
                }
            }
            let id = row.entity_id.trim();
            let name = match (&row.entity_name, level) {
                (Some(name), _) => name.trim(),
                (None, Level::Team) => hierarchy.team_display_name(id),
                (None, _) => id,
            };
            sink.add(row.date, id, name, row.revenue, row.profit);
        }
    }
}

/// Whether a coarser by-date dataset should stand in for the zone rows: it must be non-empty and
/// carry every ancestor key of `path`, unless there are no zone rows to fall back to.
fn prefer_coarse(
    coarse: &[HierarchyRow],
    zones: &[HierarchyRow],
    level: Level,
    path: &[PathEntry],
) -> bool {
    if coarse.is_empty() {
        return false;
    }
    let scoped = coarse.iter().all(|row| {
        path.iter()
            .filter(|entry| entry.level < level)
            .all(|entry| row.carries_level(entry.level))
    });
    if !scoped && !zones.is_empty() {
        log::debug!("{level} series: coarse rows lack ancestor keys; using zone rows");
    }
    scoped || zones.is_empty()
}

/// Aggregate with an explicitly chosen source.
pub fn breakdown_series_from(
    source: &dyn SeriesSource,
    level: Level,
    path: &[PathEntry],
    hierarchy: &Hierarchy,
    config: &DrillConfig,
) -> Vec<TimeSeriesPoint> {
    if matches!(level, Level::Team | Level::Pic) && !hierarchy.is_loaded() {
        log::debug!("{level} series: hierarchy tables not loaded yet");
        return Vec::new();
    }
    let mut sink = SeriesAccumulator::new();
    source.collect(level, path, hierarchy, config, &mut sink);
    log::debug!(
        "{level} series from {}: {} points",
        source.describe(),
        sink.buckets.len()
    );
    sink.finish(config)
}

/// Per-entity series for `level` under `path`.
///
/// Team/PIC levels use the upstream summary when it is ready and non-empty, return nothing while
/// it is loading, and otherwise roll up the raw rows.
pub fn breakdown_series(
    level: Level,
    path: &[PathEntry],
    sources: &DataSources<'_>,
    hierarchy: &Hierarchy,
    config: &DrillConfig,
) -> Vec<TimeSeriesPoint> {
    let source: Box<dyn SeriesSource + '_> = match level {
        Level::Team | Level::Pic => {
            let summary = if level == Level::Team {
                sources.team_summary
            } else {
                sources.pic_summary
            };
            match summary {
                Preaggregated::Loading => {
                    log::debug!("{level} series: summary still loading");
                    return Vec::new();
                }
                Preaggregated::Ready(rows) if !rows.is_empty() => {
                    Box::new(PreAggregatedSource::new(level, rows))
                }
                _ => Box::new(RawRollupSource::new(sources.zones)),
            }
        }
        Level::Pid if prefer_coarse(sources.publishers_by_date, sources.zones, level, path) => {
            Box::new(RawRollupSource::new(sources.publishers_by_date))
        }
        Level::Mid if prefer_coarse(sources.media_by_date, sources.zones, level, path) => {
            Box::new(RawRollupSource::new(sources.media_by_date))
        }
        _ => Box::new(RawRollupSource::new(sources.zones)),
    };
    breakdown_series_from(source.as_ref(), level, path, hierarchy, config)
}

/// Top-line per-date totals of `rows`, in date order.
pub fn total_series(rows: &[HierarchyRow], config: &DrillConfig) -> Vec<TotalPoint> {
    let mut by_date: BTreeMap<NaiveDate, [f64; 4]> = BTreeMap::new();
    for row in rows {
        let sums = by_date.entry(row.date).or_insert([0.0; 4]);
        sums[0] += row.revenue;
        sums[1] += row.profit;
        sums[2] += row.requests;
        sums[3] += row.paid;
    }
    by_date
        .into_iter()
        .map(|(date, [revenue, profit, requests, paid])| TotalPoint {
            date: format_display_date(date, &config.date_display_format),
            raw_date: iso_date(date),
            revenue,
            profit,
            requests,
            paid,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn accumulator_orders_by_date_then_name() {
        let mut sink = SeriesAccumulator::new();
        sink.add(ymd(2), "b", "Bravo", 1.0, 0.0);
        sink.add(ymd(1), "b", "Bravo", 2.0, 0.0);
        sink.add(ymd(1), "a", "Zulu", 3.0, 0.0);
        sink.add(ymd(1), "b", "ignored", 4.0, 1.0);

        let points = sink.finish(&DrillConfig::default());
        let keys: Vec<_> = points
            .iter()
            .map(|p| (p.raw_date.as_str(), p.entity_name.as_str(), p.revenue))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01", "Bravo", 6.0),
                ("2024-01-01", "Zulu", 3.0),
                ("2024-01-02", "Bravo", 1.0),
            ]
        );
        assert_eq!(points[0].date, "Jan 01");
    }

    #[test]
    fn total_series_sums_every_metric_per_date() {
        let rows = vec![
            HierarchyRow {
                revenue: 10.0,
                profit: 2.0,
                requests: 100.0,
                paid: 90.0,
                ..HierarchyRow::on(ymd(2))
            },
            HierarchyRow {
                revenue: 5.0,
                profit: 1.0,
                requests: 50.0,
                paid: 40.0,
                ..HierarchyRow::on(ymd(2))
            },
            HierarchyRow {
                revenue: 1.0,
                ..HierarchyRow::on(ymd(1))
            },
        ];
        let series = total_series(&rows, &DrillConfig::default());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].raw_date, "2024-01-01");
        assert_eq!(
            (series[1].revenue, series[1].profit, series[1].requests, series[1].paid),
            (15.0, 3.0, 150.0, 130.0)
        );
    }

    #[test]
    fn finest_rows_prefers_zones() {
        let media = vec![HierarchyRow::on(ymd(1))];
        let sources = DataSources {
            media_by_date: &media,
            ..DataSources::default()
        };
        assert_eq!(sources.finest_rows().len(), 1);
        assert!(DataSources::default().finest_rows().is_empty());
    }
}
