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

//! Calendars producing session schedules.

use std::collections::BTreeSet;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use nexus_core::correctness::{check_ordered, check_predicate_true};
use serde::Deserialize;

use super::session::{ScheduleError, SessionSchedule, TradingSession};

/// The zone of the default calendar, US equities.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// A source of trading sessions.
pub trait TradingCalendar {
    /// Returns the sessions whose dates fall in `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if a generated session is invalid.
    fn sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SessionSchedule, ScheduleError>;
}

/// Configuration for a [`WeekdayCalendar`], in exchange-local wall time.
///
/// Local times are converted with `timezone` when set, so daylight saving
/// shifts are followed. `utc_offset_minutes` is used only without a
/// `timezone`. One of the two is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeekdayCalendarConfig {
    /// The first bar minute of each session.
    pub execution_open: NaiveTime,
    /// The last bar minute of each session.
    pub execution_close: NaiveTime,
    /// When pre-market preparation may start.
    pub pre_market: NaiveTime,
    /// An IANA zone name such as `America/New_York`.
    #[serde(default)]
    pub timezone: Option<String>,
    /// A fixed offset from UTC in minutes (east positive).
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl Default for WeekdayCalendarConfig {
    /// US equities, 09:31 to 16:00 New York time.
    fn default() -> Self {
        Self {
            execution_open: NaiveTime::from_hms_opt(9, 31, 0).unwrap_or_default(),
            execution_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            pre_market: NaiveTime::from_hms_opt(8, 45, 0).unwrap_or_default(),
            timezone: Some(DEFAULT_TIMEZONE.to_string()),
            utc_offset_minutes: None,
            holidays: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ExchangeZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ExchangeZone {
    fn from_config(config: &WeekdayCalendarConfig) -> anyhow::Result<Self> {
        match (&config.timezone, config.utc_offset_minutes) {
            (Some(name), _) => name
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|e| anyhow::anyhow!("Unknown timezone '{name}': {e}")),
            (None, Some(minutes)) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(Self::Fixed)
                .ok_or_else(|| anyhow::anyhow!("UTC offset of {minutes} minutes is out of range")),
            (None, None) => {
                anyhow::bail!("Calendar needs either `timezone` or `utc_offset_minutes`")
            }
        }
    }

    /// Converts a local wall time to UTC. An ambiguous time (a repeated hour
    /// when clocks go back) resolves to its earlier instant.
    fn to_utc(self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, ScheduleError> {
        let local = date.and_time(time);
        let resolved = match self {
            Self::Named(tz) => tz.from_local_datetime(&local).earliest().map(|dt| dt.to_utc()),
            Self::Fixed(offset) => offset.from_local_datetime(&local).earliest().map(|dt| dt.to_utc()),
        };
        resolved.ok_or_else(|| ScheduleError::NonexistentLocalTime {
            date,
            time,
            zone: self.to_string(),
        })
    }
}

impl std::fmt::Display for ExchangeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(tz) => write!(f, "{tz}"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Monday to Friday sessions with fixed local times, minus holidays.
#[derive(Debug, Clone)]
pub struct WeekdayCalendar {
    execution_open: NaiveTime,
    execution_close: NaiveTime,
    pre_market: NaiveTime,
    zone: ExchangeZone,
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    /// Creates a new [`WeekdayCalendar`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone is unknown or missing, the offset is out
    /// of range, the local times are inverted, or a time is not on a minute
    /// boundary.
    pub fn new(config: WeekdayCalendarConfig) -> anyhow::Result<Self> {
        let zone = ExchangeZone::from_config(&config)?;

        check_ordered(
            &config.execution_open,
            &config.execution_close,
            "execution_open",
            "execution_close",
        )?;
        check_ordered(
            &config.pre_market,
            &config.execution_close,
            "pre_market",
            "execution_close",
        )?;
        for (param, t) in [
            ("execution_open", config.execution_open),
            ("execution_close", config.execution_close),
            ("pre_market", config.pre_market),
        ] {
            check_predicate_true(
                t.second() == 0 && t.nanosecond() == 0,
                &format!("'{param}' must be on a minute boundary, was {t}"),
            )?;
        }

        Ok(Self {
            execution_open: config.execution_open,
            execution_close: config.execution_close,
            pre_market: config.pre_market,
            zone,
            holidays: config.holidays.into_iter().collect(),
        })
    }

    /// Returns `true` if `date` is a trading day.
    #[must_use]
    pub fn is_session(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    fn session(&self, date: NaiveDate) -> Result<TradingSession, ScheduleError> {
        TradingSession::new(
            date,
            self.zone.to_utc(date, self.execution_open)?,
            self.zone.to_utc(date, self.execution_close)?,
            self.zone.to_utc(date, self.pre_market)?,
        )
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SessionSchedule, ScheduleError> {
        let sessions = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_session(*date))
            .map(|date| self.session(date))
            .collect::<Result<Vec<_>, _>>()?;

        SessionSchedule::new(sessions)
    }
}
