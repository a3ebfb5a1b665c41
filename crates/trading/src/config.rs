// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Configuration for a live trading run.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use nexus_common::{
    clock::{
        BarGranularity, SessionSchedule, TradingCalendar, WeekdayCalendar, WeekdayCalendarConfig,
    },
    logging::{
        config::{LoggerConfig, NEXUS_LOG},
        init_logging,
        logger::LogGuard,
        writer::FileWriterConfig,
    },
};
use nexus_core::correctness::{check_predicate_false, check_valid_string};
use serde::Deserialize;
use ustr::Ustr;
use uuid::Uuid;

use crate::persistence::{CheckpointEncoding, CheckpointStore};

/// The default checkpoint location, relative to the working directory.
pub const DEFAULT_CHECKPOINT_PATH: &str = "state.ckpt";

/// Configuration for a [`LiveTradingAlgorithm`](crate::LiveTradingAlgorithm).
///
/// Read from TOML; every field is optional and unknown keys are rejected:
///
/// ```toml
/// algo_id = "momentum"
/// checkpoint_path = "/var/lib/nexus/momentum.ckpt"
/// checkpoint_encoding = "msgpack"
/// bar_granularity = "minute"
/// log = "stdout=Info;fileout=Debug;LiveClock=Debug"
///
/// [log_file]
/// directory = "/var/log/nexus"
/// file_format = "json"
///
/// [calendar]
/// execution_open = "09:31:00"
/// execution_close = "16:00:00"
/// pre_market = "08:45:00"
/// timezone = "America/New_York"
/// holidays = ["2017-04-14"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LiveTradingConfig {
    pub algo_id: String,
    pub checkpoint_path: PathBuf,
    pub checkpoint_encoding: CheckpointEncoding,
    pub bar_granularity: BarGranularity,
    /// A logger spec string. When unset, `NEXUS_LOG` is read instead.
    pub log: Option<String>,
    pub log_file: Option<FileWriterConfig>,
    /// Session times. When unset, US equities defaults apply.
    pub calendar: Option<WeekdayCalendarConfig>,
}

impl Default for LiveTradingConfig {
    fn default() -> Self {
        Self {
            algo_id: "nexus-live".to_string(),
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            checkpoint_encoding: CheckpointEncoding::default(),
            bar_granularity: BarGranularity::default(),
            log: None,
            log_file: None,
            calendar: None,
        }
    }
}

impl LiveTradingConfig {
    /// Parses and validates a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, has unknown keys, or fails
    /// [`Self::validate`].
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| anyhow::anyhow!("Invalid live trading config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config '{}': {e}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Checks the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if `algo_id` is blank, `checkpoint_path` is empty, or
    /// the calendar section is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_valid_string(&self.algo_id, "algo_id")?;
        check_predicate_false(
            self.checkpoint_path.as_os_str().is_empty(),
            "`checkpoint_path` was empty",
        )?;
        if let Some(spec) = &self.log {
            LoggerConfig::from_spec(spec)?;
        }
        self.calendar()?;
        Ok(())
    }

    #[must_use]
    pub fn checkpoint_store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.checkpoint_path, self.checkpoint_encoding)
    }

    /// Builds the configured calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar section is invalid.
    pub fn calendar(&self) -> anyhow::Result<WeekdayCalendar> {
        WeekdayCalendar::new(self.calendar.clone().unwrap_or_default())
    }

    /// Returns the sessions of the configured calendar from `start` to `end` inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar is invalid or generates an invalid session.
    pub fn schedule(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<SessionSchedule> {
        Ok(self.calendar()?.sessions_in_range(start, end)?)
    }

    /// Returns the logger configuration from `log`, then `NEXUS_LOG`, then defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen spec string is invalid.
    pub fn logger_config(&self) -> anyhow::Result<LoggerConfig> {
        match &self.log {
            Some(spec) => LoggerConfig::from_spec(spec),
            None => match std::env::var(NEXUS_LOG) {
                Ok(spec) => LoggerConfig::from_spec(&spec),
                Err(_) => Ok(LoggerConfig::default()),
            },
        }
    }

    /// Initializes process logging for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the logger config is invalid or logging is
    /// already initialized.
    pub fn init_logging(&self) -> anyhow::Result<LogGuard> {
        init_logging(
            Ustr::from(self.algo_id.as_str()),
            Uuid::new_v4(),
            self.logger_config()?,
            self.log_file.clone().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use log::LevelFilter;
    use nexus_common::logging::writer::FileFormat;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_defaults_from_empty_toml() {
        let config = LiveTradingConfig::from_toml_str("").unwrap();
        assert_eq!(config, LiveTradingConfig::default());
        assert_eq!(config.checkpoint_path, PathBuf::from("state.ckpt"));
        assert_eq!(config.checkpoint_encoding, CheckpointEncoding::Json);
        assert_eq!(config.bar_granularity, BarGranularity::Minute);
    }

    #[rstest]
    fn test_full_toml() {
        let toml = r#"
            algo_id = "momentum"
            checkpoint_path = "/tmp/momentum.ckpt"
            checkpoint_encoding = "msgpack"
            bar_granularity = "daily"
            log = "stdout=Warn;LiveClock=Debug"

            [log_file]
            directory = "/tmp/logs"
            file_format = "json"

            [calendar]
            execution_open = "09:31:00"
            execution_close = "16:00:00"
            pre_market = "08:45:00"
            timezone = "America/New_York"
            holidays = ["2017-04-14"]
        "#;
        let config = LiveTradingConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.algo_id, "momentum");
        assert_eq!(config.checkpoint_store().encoding(), CheckpointEncoding::MsgPack);
        assert_eq!(config.checkpoint_store().path(), Path::new("/tmp/momentum.ckpt"));
        assert_eq!(config.bar_granularity, BarGranularity::Session);
        assert_eq!(
            config.log_file.as_ref().map(|f| f.file_format),
            Some(FileFormat::Json)
        );

        let calendar = config.calendar.as_ref().unwrap();
        assert_eq!(calendar.execution_open, NaiveTime::from_hms_opt(9, 31, 0).unwrap());
        assert_eq!(calendar.holidays, vec![NaiveDate::from_ymd_opt(2017, 4, 14).unwrap()]);
        assert_eq!(calendar.timezone.as_deref(), Some("America/New_York"));

        let logger = config.logger_config().unwrap();
        assert_eq!(logger.stdout_level, LevelFilter::Warn);
        assert_eq!(
            logger.component_level.get(&Ustr::from("LiveClock")),
            Some(&LevelFilter::Debug)
        );
    }

    #[rstest]
    #[case("unknown_key = 1")]
    #[case("algo_id = \"   \"")]
    #[case("checkpoint_path = \"\"")]
    #[case("checkpoint_encoding = \"pickle\"")]
    #[case("log = \"stdout=Loud\"")]
    #[case("[calendar]\nexecution_open = \"16:00:00\"\nexecution_close = \"09:31:00\"\npre_market = \"08:45:00\"\nutc_offset_minutes = -240")]
    #[case("[calendar]\nexecution_open = \"09:31:00\"\nexecution_close = \"16:00:00\"\npre_market = \"08:45:00\"\ntimezone = \"Mars/Olympus\"")]
    #[case("[calendar]\nexecution_open = \"09:31:00\"\nexecution_close = \"16:00:00\"\npre_market = \"08:45:00\"")]
    fn test_invalid_toml(#[case] toml: &str) {
        assert!(LiveTradingConfig::from_toml_str(toml).is_err());
    }

    #[rstest]
    fn test_schedule_skips_weekend_and_holiday() {
        let config = LiveTradingConfig::from_toml_str(
            "[calendar]\nexecution_open = \"09:31:00\"\nexecution_close = \"16:00:00\"\n\
             pre_market = \"08:45:00\"\nutc_offset_minutes = -240\nholidays = [\"2017-04-14\"]",
        )
        .unwrap();

        let schedule = config
            .schedule(
                NaiveDate::from_ymd_opt(2017, 4, 13).unwrap(),
                NaiveDate::from_ymd_opt(2017, 4, 17).unwrap(),
            )
            .unwrap();

        let dates: Vec<_> = schedule.iter().map(|s| s.session_date().to_string()).collect();
        assert_eq!(dates, vec!["2017-04-13", "2017-04-17"]);
    }

    #[rstest]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.toml");
        std::fs::write(&path, "algo_id = \"file-algo\"\ncheckpoint_path = \"a.ckpt\"").unwrap();

        let config = LiveTradingConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.algo_id, "file-algo");
        assert!(LiveTradingConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
