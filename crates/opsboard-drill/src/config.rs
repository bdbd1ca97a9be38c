use crate::chart::MissingValue;
use crate::error::{DrillError, DrillResult};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Breakdown chart settings. Every field is optional in serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrillConfig {
    /// How many entities a breakdown chart plots; the rest are dropped.
    pub top_n: usize,
    /// What a missing entity/date cell renders as.
    pub missing: MissingValue,
    /// strftime pattern for axis labels.
    pub date_display_format: String,
    /// Legend label for rows whose PIC has no team mapping.
    pub unassigned_team_label: String,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            missing: MissingValue::Zero,
            date_display_format: "%b %d".to_string(),
            unassigned_team_label: "Unassigned".to_string(),
        }
    }
}

impl DrillConfig {
    pub fn from_json_str(text: &str) -> DrillResult<Self> {
        let config: DrillConfig =
            serde_json::from_str(text).map_err(|err| DrillError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DrillResult<()> {
        if self.top_n == 0 {
            return Err(DrillError::InvalidConfig("topN must be at least 1".into()));
        }
        if StrftimeItems::new(&self.date_display_format).any(|item| matches!(item, Item::Error)) {
            return Err(DrillError::InvalidConfig(format!(
                "unsupported date format {:?}",
                self.date_display_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_fields_take_defaults() {
        let config = DrillConfig::from_json_str(r#"{ "topN": 20 }"#).unwrap();
        assert_eq!(
            config,
            DrillConfig {
                top_n: 20,
                ..DrillConfig::default()
            }
        );
    }

    #[test]
    fn all_fields_parse() {
        let config = DrillConfig::from_json_str(
            r#"{ "topN": 5, "missing": "blank", "dateDisplayFormat": "%Y-%m-%d", "unassignedTeamLabel": "Other" }"#,
        )
        .unwrap();
        assert_eq!(config.missing, MissingValue::Blank);
        assert_eq!(config.unassigned_team_label, "Other");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DrillConfig::from_json_str(r#"{ "topN": 0 }"#),
            Err(DrillError::InvalidConfig(_))
        ));
        assert!(matches!(
            DrillConfig::from_json_str(r#"{ "dateDisplayFormat": "%Q" }"#),
            Err(DrillError::InvalidConfig(_))
        ));
        assert!(matches!(
            DrillConfig::from_json_str("{"),
            Err(DrillError::InvalidConfig(_))
        ));
    }
}
