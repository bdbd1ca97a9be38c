use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One level of the fixed Team > PIC > Publisher > Media > Zone hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Team,
    Pic,
    Pid,
    Mid,
    Zid,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::Team, Level::Pic, Level::Pid, Level::Mid, Level::Zid];

    /// Number of levels above this one (`team` is 0).
    pub fn depth(self) -> usize {
        self as usize
    }

    pub fn from_depth(depth: usize) -> Option<Level> {
        Self::ALL.get(depth).copied()
    }

    pub fn child(self) -> Option<Level> {
        Self::from_depth(self.depth() + 1)
    }

    pub fn parent(self) -> Option<Level> {
        self.depth().checked_sub(1).and_then(Self::from_depth)
    }

    pub fn is_terminal(self) -> bool {
        self == Level::Zid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Team => "team",
            Level::Pic => "pic",
            Level::Pid => "pid",
            Level::Mid => "mid",
            Level::Zid => "zid",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team" => Ok(Level::Team),
            "pic" => Ok(Level::Pic),
            "pid" | "publisher" => Ok(Level::Pid),
            "mid" | "media" => Ok(Level::Mid),
            "zid" | "zone" => Ok(Level::Zid),
            other => Err(format!("unknown hierarchy level: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfiguration {
    #[serde(deserialize_with = "crate::serde_helpers::id")]
    pub team_id: String,
    pub team_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPicMapping {
    #[serde(deserialize_with = "crate::serde_helpers::id")]
    pub pic_name: String,
    #[serde(deserialize_with = "crate::serde_helpers::id")]
    pub team_id: String,
}

/// Read-only Team/PIC reference tables with lookup indexes.
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    teams: Vec<TeamConfiguration>,
    mappings: Vec<TeamPicMapping>,
    team_index: HashMap<String, usize>,
    pic_team: HashMap<String, String>,
}

impl Hierarchy {
    pub fn new(teams: Vec<TeamConfiguration>, mappings: Vec<TeamPicMapping>) -> Self {
        let mut team_index = HashMap::with_capacity(teams.len());
        for (idx, team) in teams.iter().enumerate() {
            // First definition wins on duplicate ids.
            team_index.entry(team.team_id.trim().to_string()).or_insert(idx);
        }

        let mut pic_team = HashMap::with_capacity(mappings.len());
        for mapping in &mappings {
            pic_team
                .entry(mapping.pic_name.trim().to_string())
                .or_insert_with(|| mapping.team_id.trim().to_string());
        }

        Self {
            teams,
            mappings,
            team_index,
            pic_team,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Both tables have been delivered. Team and PIC roll-ups are empty until then.
    pub fn is_loaded(&self) -> bool {
        !self.teams.is_empty() && !self.mappings.is_empty()
    }

    pub fn teams(&self) -> &[TeamConfiguration] {
        &self.teams
    }

    pub fn mappings(&self) -> &[TeamPicMapping] {
        &self.mappings
    }

    pub fn team_name(&self, team_id: &str) -> Option<&str> {
        let idx = *self.team_index.get(team_id.trim())?;
        Some(self.teams[idx].team_name.as_str())
    }

    /// Team display name, falling back to the raw id on a lookup miss.
    pub fn team_display_name<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.team_name(team_id).unwrap_or(team_id)
    }

    /// Resolve a team by id or by display name.
    pub fn find_team(&self, id_or_name: &str) -> Option<&TeamConfiguration> {
        let needle = id_or_name.trim();
        if let Some(&idx) = self.team_index.get(needle) {
            return Some(&self.teams[idx]);
        }
        self.teams.iter().find(|t| t.team_name.trim() == needle)
    }

    pub fn team_of_pic(&self, pic_name: &str) -> Option<&str> {
        self.pic_team.get(pic_name.trim()).map(String::as_str)
    }

    /// PICs mapped to `team_id`, in mapping-table order.
    pub fn pics_of_team<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let team_id = team_id.trim();
        self.mappings
            .iter()
            .filter(move |m| m.team_id.trim() == team_id)
            .map(|m| m.pic_name.trim())
    }
}
