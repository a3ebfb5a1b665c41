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

//! Clock events and bar granularity.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use nexus_core::datetime::format_iso8601;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// The kind of a [`ClockEvent`].
#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockEventKind {
    /// A session has been entered.
    SessionStart,
    /// The pre-market preparation point of a session.
    BeforeTradingStart,
    /// A bar boundary inside the execution window.
    Bar,
    /// The session's execution window has closed.
    SessionEnd,
}

/// A timestamped clock event, consumed exactly once in emission order.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEvent {
    pub ts: DateTime<Utc>,
    pub kind: ClockEventKind,
}

impl ClockEvent {
    /// Creates a new [`ClockEvent`] instance.
    #[must_use]
    pub const fn new(ts: DateTime<Utc>, kind: ClockEventKind) -> Self {
        Self { ts, kind }
    }
}

impl Display for ClockEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", format_iso8601(self.ts), self.kind)
    }
}

/// How often bars fire inside a session's execution window.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BarGranularity {
    /// One bar per minute from execution open through execution close.
    #[default]
    Minute,
    /// A single bar at execution close.
    #[serde(alias = "daily")]
    #[strum(to_string = "session", serialize = "daily")]
    Session,
}
