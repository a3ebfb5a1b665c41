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

//! Enumerations shared by the logging subsystem.

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// The log level for log messages.
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// The **OFF** log level. A level lower than all other log levels (off).
    #[strum(serialize = "OFF")]
    Off = 0,
    /// The **TRACE** log level.
    #[strum(serialize = "TRACE")]
    Trace = 1,
    /// The **DEBUG** log level.
    #[strum(serialize = "DEBUG")]
    Debug = 2,
    /// The **INFO** log level.
    #[strum(serialize = "INFO")]
    Info = 3,
    /// The **WARNING** log level.
    #[strum(to_string = "WARN", serialize = "WARNING")]
    Warning = 4,
    /// The **ERROR** log level.
    #[strum(serialize = "ERROR")]
    Error = 5,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => Self::Off,
            LogLevel::Trace => Self::Trace,
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warning => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// The log color for log messages.
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogColor {
    /// The default/normal log color.
    #[default]
    Normal = 0,
    /// The green log color, typically used with [`LogLevel::Info`] log levels and associated with success events.
    Green = 1,
    /// The blue log color, typically used with [`LogLevel::Info`] log levels and associated with user actions.
    Blue = 2,
    /// The magenta log color, typically used with [`LogLevel::Info`] log levels.
    Magenta = 3,
    /// The cyan log color, typically used with [`LogLevel::Info`] log levels.
    Cyan = 4,
    /// The yellow log color, typically used with [`LogLevel::Warning`] log levels.
    Yellow = 5,
    /// The red log color, typically used with [`LogLevel::Error`] level.
    Red = 6,
}

impl LogColor {
    /// Returns the ANSI escape sequence for the color.
    #[must_use]
    pub const fn as_ansi(&self) -> &str {
        match *self {
            Self::Normal => "",
            Self::Green => "\x1b[92m",
            Self::Blue => "\x1b[94m",
            Self::Magenta => "\x1b[35m",
            Self::Cyan => "\x1b[36m",
            Self::Yellow => "\x1b[1;33m",
            Self::Red => "\x1b[1;31m",
        }
    }
}

impl From<u8> for LogColor {
    fn from(value: u8) -> Self {
        Self::from_repr(value).unwrap_or_default()
    }
}

impl From<Level> for LogColor {
    fn from(value: Level) -> Self {
        match value {
            Level::Error => Self::Red,
            Level::Warn => Self::Yellow,
            Level::Info | Level::Debug | Level::Trace => Self::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("warning", LogLevel::Warning)]
    #[case("WARN", LogLevel::Warning)]
    #[case("info", LogLevel::Info)]
    #[case("Off", LogLevel::Off)]
    fn test_log_level_from_str(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(LogLevel::from_str(input).unwrap(), expected);
    }

    #[rstest]
    #[case(LogLevel::Off, LevelFilter::Off)]
    #[case(LogLevel::Warning, LevelFilter::Warn)]
    #[case(LogLevel::Trace, LevelFilter::Trace)]
    fn test_level_filter_from_log_level(#[case] level: LogLevel, #[case] expected: LevelFilter) {
        assert_eq!(LevelFilter::from(level), expected);
    }

    #[rstest]
    #[case(0, LogColor::Normal)]
    #[case(6, LogColor::Red)]
    #[case(42, LogColor::Normal)]
    fn test_log_color_from_u8(#[case] value: u8, #[case] expected: LogColor) {
        assert_eq!(LogColor::from(value), expected);
    }

    #[rstest]
    #[case(Level::Error, LogColor::Red)]
    #[case(Level::Warn, LogColor::Yellow)]
    #[case(Level::Debug, LogColor::Normal)]
    fn test_log_color_from_level(#[case] level: Level, #[case] expected: LogColor) {
        assert_eq!(LogColor::from(level), expected);
    }

    #[rstest]
    fn test_log_color_display() {
        assert_eq!(LogColor::Yellow.to_string(), "YELLOW");
        assert_eq!(LogColor::Normal.as_ansi(), "");
    }
}
