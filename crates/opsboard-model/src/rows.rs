//! Fixed row shapes for time-series datasets.
//!
//! Every by-date dataset (zone time series, publisher/media by-date roll-ups) is normalized into
//! [`HierarchyRow`]; upstream team/PIC summaries are normalized into [`BreakdownRow`].

use crate::date::{iso_date, normalize_date};
use crate::hierarchy::{Hierarchy, Level};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Optional identifier columns of a [`HierarchyRow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HierarchyColumn {
    TeamId,
    PicName,
    Pid,
    PubName,
    Mid,
    MediaName,
    Zid,
    ZoneName,
    Product,
}

impl HierarchyColumn {
    pub const ALL: [HierarchyColumn; 9] = [
        HierarchyColumn::TeamId,
        HierarchyColumn::PicName,
        HierarchyColumn::Pid,
        HierarchyColumn::PubName,
        HierarchyColumn::Mid,
        HierarchyColumn::MediaName,
        HierarchyColumn::Zid,
        HierarchyColumn::ZoneName,
        HierarchyColumn::Product,
    ];

    /// Resolve a field name, including the accepted aliases.
    pub fn from_field(field: &str) -> Option<Self> {
        Some(match field {
            "team_id" => HierarchyColumn::TeamId,
            "pic_name" | "pic" => HierarchyColumn::PicName,
            "pid" => HierarchyColumn::Pid,
            "pubname" | "pub_name" | "publisher_name" => HierarchyColumn::PubName,
            "mid" => HierarchyColumn::Mid,
            "medianame" | "media_name" => HierarchyColumn::MediaName,
            "zid" => HierarchyColumn::Zid,
            "zonename" | "zone_name" => HierarchyColumn::ZoneName,
            "product" => HierarchyColumn::Product,
            _ => return None,
        })
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// The identifier columns a row's source payload carried, null or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnSet(u16);

impl ColumnSet {
    pub fn empty() -> Self {
        ColumnSet(0)
    }

    pub fn all() -> Self {
        HierarchyColumn::ALL.into_iter().collect()
    }

    pub fn with(mut self, column: HierarchyColumn) -> Self {
        self.insert(column);
        self
    }

    pub fn insert(&mut self, column: HierarchyColumn) {
        self.0 |= column.bit();
    }

    pub fn contains(self, column: HierarchyColumn) -> bool {
        self.0 & column.bit() != 0
    }

    /// Columns named by the keys of a JSON object.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Self {
        keys.into_iter()
            .filter_map(|key| HierarchyColumn::from_field(key))
            .collect()
    }
}

impl FromIterator<HierarchyColumn> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = HierarchyColumn>>(iter: I) -> Self {
        let mut set = ColumnSet::empty();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

/// One dated row positioned in the Team > PIC > Publisher > Media > Zone hierarchy.
///
/// Coarser datasets leave the deeper keys empty (a publisher-by-date row has no `mid`/`zid`).
/// `columns` tells a key the payload never carried apart from one that was null.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HierarchyRow {
    pub date: NaiveDate,
    pub team_id: Option<String>,
    pub pic_name: Option<String>,
    pub pid: Option<String>,
    pub pub_name: Option<String>,
    pub mid: Option<String>,
    pub media_name: Option<String>,
    pub zid: Option<String>,
    pub zone_name: Option<String>,
    pub product: Option<String>,
    pub revenue: f64,
    pub profit: f64,
    pub requests: f64,
    pub paid: f64,
    #[serde(skip)]
    pub columns: ColumnSet,
}

impl HierarchyRow {
    /// An empty row on `date` carrying every column; fill the rest with struct update syntax.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            team_id: None,
            pic_name: None,
            pid: None,
            pub_name: None,
            mid: None,
            media_name: None,
            zid: None,
            zone_name: None,
            product: None,
            revenue: 0.0,
            profit: 0.0,
            requests: 0.0,
            paid: 0.0,
            columns: ColumnSet::all(),
        }
    }

    /// Normalize one JSON row. `None` when the row is not an object of the expected shape or its
    /// date cannot be read.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let raw = match RawHierarchyRow::deserialize(json) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("skipping malformed time-series row: {err}");
                return None;
            }
        };
        let Some(date) = normalize_date(&raw.date) else {
            log::warn!("skipping time-series row with unreadable date {}", raw.date);
            return None;
        };
        Some(Self {
            date,
            team_id: raw.team_id,
            pic_name: raw.pic_name,
            pid: raw.pid,
            pub_name: raw.pub_name,
            mid: raw.mid,
            media_name: raw.media_name,
            zid: raw.zid,
            zone_name: raw.zone_name,
            product: raw.product,
            revenue: raw.revenue,
            profit: raw.profit,
            requests: raw.requests,
            paid: raw.paid,
            columns: json
                .as_object()
                .map(|fields| ColumnSet::from_keys(fields.keys()))
                .unwrap_or_else(ColumnSet::empty),
        })
    }

    /// Value of an identifier column; `None` both for null and for never-sent keys.
    pub fn column(&self, column: HierarchyColumn) -> Option<&str> {
        match column {
            HierarchyColumn::TeamId => self.team_id.as_deref(),
            HierarchyColumn::PicName => self.pic_name.as_deref(),
            HierarchyColumn::Pid => self.pid.as_deref(),
            HierarchyColumn::PubName => self.pub_name.as_deref(),
            HierarchyColumn::Mid => self.mid.as_deref(),
            HierarchyColumn::MediaName => self.media_name.as_deref(),
            HierarchyColumn::Zid => self.zid.as_deref(),
            HierarchyColumn::ZoneName => self.zone_name.as_deref(),
            HierarchyColumn::Product => self.product.as_deref(),
        }
    }

    pub fn carries(&self, column: HierarchyColumn) -> bool {
        self.columns.contains(column)
    }

    /// Whether the row's payload carried the key for `level`. Team keys come from `team_id` or,
    /// through the mapping table, from `pic_name`.
    pub fn carries_level(&self, level: Level) -> bool {
        match level {
            Level::Team => self.carries(HierarchyColumn::TeamId) || self.carries(HierarchyColumn::PicName),
            Level::Pic => self.carries(HierarchyColumn::PicName),
            Level::Pid => self.carries(HierarchyColumn::Pid),
            Level::Mid => self.carries(HierarchyColumn::Mid),
            Level::Zid => self.carries(HierarchyColumn::Zid),
        }
    }

    pub fn iso_date(&self) -> String {
        iso_date(self.date)
    }

    /// Owning team: the row's own `team_id`, else the PIC → Team mapping.
    pub fn team_key<'a>(&'a self, hierarchy: &'a Hierarchy) -> Option<&'a str> {
        self.team_id
            .as_deref()
            .or_else(|| hierarchy.team_of_pic(self.pic_name.as_deref()?))
    }

    /// The row's identifier at `level`.
    pub fn key_at<'a>(&'a self, level: Level, hierarchy: &'a Hierarchy) -> Option<&'a str> {
        match level {
            Level::Team => self.team_key(hierarchy),
            Level::Pic => self.pic_name.as_deref(),
            Level::Pid => self.pid.as_deref(),
            Level::Mid => self.mid.as_deref(),
            Level::Zid => self.zid.as_deref(),
        }
    }

    /// Display name at `level`, falling back to the identifier when no name is known.
    pub fn name_at<'a>(&'a self, level: Level, hierarchy: &'a Hierarchy) -> Option<&'a str> {
        match level {
            Level::Team => self
                .team_key(hierarchy)
                .map(|id| hierarchy.team_display_name(id)),
            Level::Pic => self.pic_name.as_deref(),
            Level::Pid => self.pub_name.as_deref().or(self.pid.as_deref()),
            Level::Mid => self.media_name.as_deref().or(self.mid.as_deref()),
            Level::Zid => self.zone_name.as_deref().or(self.zid.as_deref()),
        }
    }
}

#[derive(Deserialize)]
struct RawHierarchyRow {
    #[serde(default)]
    date: serde_json::Value,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    team_id: Option<String>,
    #[serde(default, alias = "pic", deserialize_with = "crate::serde_helpers::id_opt")]
    pic_name: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    pid: Option<String>,
    #[serde(
        default,
        alias = "pubname",
        alias = "publisher_name",
        deserialize_with = "crate::serde_helpers::id_opt"
    )]
    pub_name: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    mid: Option<String>,
    #[serde(default, alias = "medianame", deserialize_with = "crate::serde_helpers::id_opt")]
    media_name: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    zid: Option<String>,
    #[serde(default, alias = "zonename", deserialize_with = "crate::serde_helpers::id_opt")]
    zone_name: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    product: Option<String>,
    #[serde(default, alias = "rev", deserialize_with = "crate::serde_helpers::number")]
    revenue: f64,
    #[serde(default, deserialize_with = "crate::serde_helpers::number")]
    profit: f64,
    #[serde(default, deserialize_with = "crate::serde_helpers::number")]
    requests: f64,
    #[serde(default, deserialize_with = "crate::serde_helpers::number")]
    paid: f64,
}

/// A pre-aggregated per-entity, per-date roll-up computed upstream (team or PIC summaries).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub date: NaiveDate,
    pub entity_id: String,
    pub entity_name: Option<String>,
    /// Owning team for PIC-level rows, when the payload carries it.
    pub parent_id: Option<String>,
    pub revenue: f64,
    pub profit: f64,
}

impl BreakdownRow {
    pub fn new(date: NaiveDate, entity_id: impl Into<String>, revenue: f64, profit: f64) -> Self {
        Self {
            date,
            entity_id: entity_id.into(),
            entity_name: None,
            parent_id: None,
            revenue,
            profit,
        }
    }

    /// Normalize one JSON summary row for a `level` (`Team` or `Pic`) dataset.
    ///
    /// Team rows identify themselves by `entity_id` or `team_id`; PIC rows by `entity_id`,
    /// `pic_name` or `pic`, with `team_id` read as the owning team.
    pub fn from_json(json: &serde_json::Value, level: Level) -> Option<Self> {
        let raw = match RawBreakdownRow::deserialize(json) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("skipping malformed {level} summary row: {err}");
                return None;
            }
        };
        let Some(date) = normalize_date(&raw.date) else {
            log::warn!("skipping {level} summary row with unreadable date {}", raw.date);
            return None;
        };

        let (entity_id, entity_name, parent_id) = match level {
            Level::Pic => (
                raw.entity_id.or(raw.pic_name),
                raw.entity_name,
                raw.team_id,
            ),
            _ => (
                raw.entity_id.or(raw.team_id),
                raw.entity_name.or(raw.team_name),
                None,
            ),
        };
        let Some(entity_id) = entity_id else {
            log::warn!("skipping {level} summary row without an entity id");
            return None;
        };

        Some(Self {
            date,
            entity_id,
            entity_name,
            parent_id,
            revenue: raw.revenue,
            profit: raw.profit,
        })
    }

    pub fn iso_date(&self) -> String {
        iso_date(self.date)
    }
}

#[derive(Deserialize)]
struct RawBreakdownRow {
    #[serde(default)]
    date: serde_json::Value,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    entity_id: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    entity_name: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    team_id: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::id_opt")]
    team_name: Option<String>,
    #[serde(default, alias = "pic", deserialize_with = "crate::serde_helpers::id_opt")]
    pic_name: Option<String>,
    #[serde(default, alias = "rev", deserialize_with = "crate::serde_helpers::number")]
    revenue: f64,
    #[serde(default, deserialize_with = "crate::serde_helpers::number")]
    profit: f64,
}
