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

//! Logger configuration.
//!
//! A configuration is normally read from a spec string, taken from the `log`
//! key of a run config or from the `NEXUS_LOG` environment variable:
//!
//! ```text
//! stdout=Info;fileout=Debug;LiveClock=Debug;nexus_trading::persistence=Trace;is_colored
//! ```
//!
//! Entries are separated by `;`. `stdout` and `fileout` set the maximum level
//! of each output. Any other `name=level` entry overrides a level. A module
//! path (a snake_case name, or any name containing `::`) covers that module
//! and everything under it. Any other name is matched as a component.
//! The flags `is_colored`, `print_config`, `log_components_only` and
//! `use_tracing` may be given bare, or as `flag=false` (also `0`, `no`).

use std::{env, str::FromStr};

use ahash::AHashMap;
use log::LevelFilter;
use ustr::Ustr;

use crate::enums::LogLevel;

/// The environment variable read by [`LoggerConfig::from_env`].
pub const NEXUS_LOG: &str = "NEXUS_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub stdout_level: LevelFilter,
    /// `Off` disables the log file.
    pub fileout_level: LevelFilter,
    /// Overrides matched against the exact component name.
    pub component_level: AHashMap<Ustr, LevelFilter>,
    /// Overrides matched against a module path prefix, longest first.
    pub module_level: AHashMap<Ustr, LevelFilter>,
    /// Drop lines from components without an override.
    pub log_components_only: bool,
    pub is_colored: bool,
    pub print_config: bool,
    /// Also install the `tracing` bridge (requires the `tracing-bridge` feature).
    pub use_tracing: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            stdout_level: LevelFilter::Info,
            fileout_level: LevelFilter::Off,
            component_level: AHashMap::new(),
            module_level: AHashMap::new(),
            log_components_only: false,
            is_colored: true,
            print_config: false,
            use_tracing: false,
        }
    }
}

impl LoggerConfig {
    /// Parses a configuration from a spec string.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is neither a known flag nor `name=level`,
    /// or if a level is invalid.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        spec.split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(Self::default(), |mut config, entry| {
                config.apply(entry)?;
                Ok(config)
            })
    }

    /// Parses a configuration from the `NEXUS_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or its spec is invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let spec = env::var(NEXUS_LOG).map_err(|e| anyhow::anyhow!("{NEXUS_LOG}: {e}"))?;
        Self::from_spec(&spec)
    }

    fn apply(&mut self, entry: &str) -> anyhow::Result<()> {
        let (key, value) = match entry.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (entry, None),
        };

        if let Some(flag) = self.flag_mut(key) {
            *flag = value.is_none_or(parse_flag);
            return Ok(());
        }

        let Some(value) = value else {
            anyhow::bail!("Invalid log spec entry '{entry}', expected a flag or `name=level`");
        };
        if key.is_empty() {
            anyhow::bail!("Invalid log spec entry '{entry}', missing a name");
        }
        let level = parse_level(value)?;

        match key.to_ascii_lowercase().as_str() {
            "stdout" => self.stdout_level = level,
            "fileout" => self.fileout_level = level,
            _ if is_module_path(key) => {
                self.module_level.insert(Ustr::from(key), level);
            }
            _ => {
                self.component_level.insert(Ustr::from(key), level);
            }
        }
        Ok(())
    }

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key.to_ascii_lowercase().as_str() {
            "is_colored" => Some(&mut self.is_colored),
            "print_config" => Some(&mut self.print_config),
            "log_components_only" => Some(&mut self.log_components_only),
            "use_tracing" => Some(&mut self.use_tracing),
            _ => None,
        }
    }
}

impl FromStr for LoggerConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_spec(s)
    }
}

fn is_module_path(key: &str) -> bool {
    key.contains("::")
        || key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "no")
}

fn parse_level(value: &str) -> anyhow::Result<LevelFilter> {
    LogLevel::from_str(value)
        .map(LevelFilter::from)
        .map_err(|_| anyhow::anyhow!("Invalid log level '{value}'"))
}
