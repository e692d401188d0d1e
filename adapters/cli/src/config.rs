use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use cookoff_core::Rules;
use cookoff_system_match::MatchConfig;
use serde::Deserialize;

/// Settings read from the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Match rules; missing keys keep their defaults.
    pub(crate) rules: Rules,
    /// Scheduler settings.
    #[serde(rename = "match")]
    pub(crate) schedule: ScheduleSection,
}

/// The `[match]` table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScheduleSection {
    pub(crate) turn_limit: Option<u32>,
    pub(crate) timeout_ms: Option<u64>,
    pub(crate) record_replay: Option<bool>,
}

impl FileConfig {
    /// Reads and parses the configuration at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }

    /// Scheduler settings, with the turn limit falling back to the rules' match length.
    pub(crate) fn match_config(&self) -> MatchConfig {
        let defaults = MatchConfig::default();
        MatchConfig {
            turn_limit: self.schedule.turn_limit.unwrap_or(self.rules.total_turns),
            per_turn_timeout: self
                .schedule
                .timeout_ms
                .map_or(defaults.per_turn_timeout, Duration::from_millis),
            record_replay: self
                .schedule
                .record_replay
                .unwrap_or(defaults.record_replay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = FileConfig::parse("").expect("empty config parses");
        assert_eq!(config.rules, Rules::default());
        assert_eq!(config.match_config(), MatchConfig::default());
    }

    #[test]
    fn tables_override_individual_keys() {
        let config = FileConfig::parse(
            r#"
                [rules]
                money_per_turn = 3
                switch_turn = 10
                charge_expiry_penalty = true

                [match]
                timeout_ms = 50
            "#,
        )
        .expect("config parses");

        assert_eq!(config.rules.money_per_turn, 3);
        assert_eq!(config.rules.switch_turn, 10);
        assert!(config.rules.charge_expiry_penalty);
        assert_eq!(config.rules.cook_progress, Rules::default().cook_progress);

        let schedule = config.match_config();
        assert_eq!(schedule.per_turn_timeout, Duration::from_millis(50));
        assert_eq!(schedule.turn_limit, 500, "turn limit follows total_turns");
    }

    #[test]
    fn turn_limit_follows_total_turns() {
        let config = FileConfig::parse("[rules]\ntotal_turns = 42\n").expect("config parses");
        assert_eq!(config.match_config().turn_limit, 42);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[match]\nturns = 3\n").is_err());
    }
}
