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

//! Trading sessions and the validated schedule the clocks run over.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use nexus_core::datetime::{ONE_MINUTE, is_minute_aligned, session_label};

use super::events::BarGranularity;

/// A configuration error in a session or schedule, reported at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("session dates must be strictly ascending, {next} follows {previous}")]
    NonAscendingSessions {
        previous: NaiveDate,
        next: NaiveDate,
    },
    #[error("session {date}: execution open {open} is after execution close {close}")]
    InvertedWindow {
        date: NaiveDate,
        open: DateTime<Utc>,
        close: DateTime<Utc>,
    },
    #[error("session {date}: pre-market minute {pre_market} is after execution close {close}")]
    PreMarketAfterClose {
        date: NaiveDate,
        pre_market: DateTime<Utc>,
        close: DateTime<Utc>,
    },
    #[error("session {date}: local time {time} does not exist in {zone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        zone: String,
    },
    #[error("session {date}: {field} {ts} is not on a minute boundary")]
    Unaligned {
        date: NaiveDate,
        field: &'static str,
        ts: DateTime<Utc>,
    },
}

/// One trading day's scheduled window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TradingSession {
    session_date: NaiveDate,
    execution_open: DateTime<Utc>,
    execution_close: DateTime<Utc>,
    pre_market_minute: DateTime<Utc>,
}

impl TradingSession {
    /// Creates a new validated [`TradingSession`].
    ///
    /// # Errors
    ///
    /// Returns an error if the window is inverted, the pre-market minute is
    /// after the close, or any timestamp is not on a minute boundary.
    pub fn new(
        session_date: NaiveDate,
        execution_open: DateTime<Utc>,
        execution_close: DateTime<Utc>,
        pre_market_minute: DateTime<Utc>,
    ) -> Result<Self, ScheduleError> {
        for (field, ts) in [
            ("execution open", execution_open),
            ("execution close", execution_close),
            ("pre-market minute", pre_market_minute),
        ] {
            if !is_minute_aligned(ts) {
                return Err(ScheduleError::Unaligned {
                    date: session_date,
                    field,
                    ts,
                });
            }
        }

        if execution_open > execution_close {
            return Err(ScheduleError::InvertedWindow {
                date: session_date,
                open: execution_open,
                close: execution_close,
            });
        }

        if pre_market_minute > execution_close {
            return Err(ScheduleError::PreMarketAfterClose {
                date: session_date,
                pre_market: pre_market_minute,
                close: execution_close,
            });
        }

        Ok(Self {
            session_date,
            execution_open,
            execution_close,
            pre_market_minute,
        })
    }

    #[must_use]
    pub const fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    #[must_use]
    pub const fn execution_open(&self) -> DateTime<Utc> {
        self.execution_open
    }

    #[must_use]
    pub const fn execution_close(&self) -> DateTime<Utc> {
        self.execution_close
    }

    #[must_use]
    pub const fn pre_market_minute(&self) -> DateTime<Utc> {
        self.pre_market_minute
    }

    /// Midnight UTC of the session date.
    #[must_use]
    pub fn label(&self) -> DateTime<Utc> {
        session_label(self.session_date)
    }

    /// Returns the bar minutes of the session for `granularity`, in ascending order.
    #[must_use]
    pub fn bar_minutes(&self, granularity: BarGranularity) -> Vec<DateTime<Utc>> {
        match granularity {
            BarGranularity::Minute => {
                std::iter::successors(Some(self.execution_open), |m| Some(*m + ONE_MINUTE))
                    .take_while(|m| *m <= self.execution_close)
                    .collect()
            }
            BarGranularity::Session => vec![self.execution_close],
        }
    }

    /// Returns the first bar minute at or after `ts`, if any remains in the session.
    #[must_use]
    pub fn first_bar_at_or_after(
        &self,
        granularity: BarGranularity,
        ts: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let candidate = match granularity {
            BarGranularity::Minute if ts <= self.execution_open => self.execution_open,
            BarGranularity::Minute => {
                let elapsed = (ts - self.execution_open).num_minutes();
                let floor = self.execution_open + TimeDelta::minutes(elapsed);
                if floor < ts { floor + ONE_MINUTE } else { floor }
            }
            BarGranularity::Session => self.execution_close,
        };
        (candidate >= ts && candidate <= self.execution_close).then_some(candidate)
    }

    /// Returns the bar minute following `bar`, if it is still inside the window.
    #[must_use]
    pub fn next_bar_after(
        &self,
        granularity: BarGranularity,
        bar: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match granularity {
            BarGranularity::Minute => {
                let next = bar + ONE_MINUTE;
                (next <= self.execution_close).then_some(next)
            }
            BarGranularity::Session => None,
        }
    }
}

/// A validated, ascending sequence of [`TradingSession`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSchedule {
    sessions: Vec<TradingSession>,
}

impl SessionSchedule {
    /// Creates a new [`SessionSchedule`] from already validated sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the session dates are not strictly ascending.
    pub fn new(sessions: Vec<TradingSession>) -> Result<Self, ScheduleError> {
        if let Some(pair) = sessions
            .windows(2)
            .find(|pair| pair[0].session_date >= pair[1].session_date)
        {
            return Err(ScheduleError::NonAscendingSessions {
                previous: pair[0].session_date,
                next: pair[1].session_date,
            });
        }

        Ok(Self { sessions })
    }

    #[must_use]
    pub fn sessions(&self) -> &[TradingSession] {
        &self.sessions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradingSession> {
        self.sessions.iter()
    }

    /// Returns the session for `date`, if scheduled.
    #[must_use]
    pub fn session_for(&self, date: NaiveDate) -> Option<&TradingSession> {
        self.sessions
            .binary_search_by_key(&date, TradingSession::session_date)
            .ok()
            .map(|idx| &self.sessions[idx])
    }
}

impl<'a> IntoIterator for &'a SessionSchedule {
    type Item = &'a TradingSession;
    type IntoIter = std::slice::Iter<'a, TradingSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

impl IntoIterator for SessionSchedule {
    type Item = TradingSession;
    type IntoIter = std::vec::IntoIter<TradingSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.into_iter()
    }
}

impl TryFrom<Vec<TradingSession>> for SessionSchedule {
    type Error = ScheduleError;

    fn try_from(sessions: Vec<TradingSession>) -> Result<Self, Self::Error> {
        Self::new(sessions)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::stubs::{session_2017_04_20, utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 4, day).unwrap()
    }

    #[rstest]
    fn test_session_accessors(session_2017_04_20: TradingSession) {
        let session = session_2017_04_20;
        assert_eq!(session.session_date(), date(20));
        assert_eq!(session.execution_open(), utc(2017, 4, 20, 13, 31));
        assert_eq!(session.execution_close(), utc(2017, 4, 20, 20, 0));
        assert_eq!(session.pre_market_minute(), utc(2017, 4, 20, 12, 45));
        assert_eq!(session.label(), utc(2017, 4, 20, 0, 0));
    }

    #[rstest]
    fn test_inverted_window_rejected() {
        let err = TradingSession::new(
            date(20),
            utc(2017, 4, 20, 20, 0),
            utc(2017, 4, 20, 13, 31),
            utc(2017, 4, 20, 12, 45),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvertedWindow { .. }));
    }

    #[rstest]
    fn test_pre_market_after_close_rejected() {
        let err = TradingSession::new(
            date(20),
            utc(2017, 4, 20, 13, 31),
            utc(2017, 4, 20, 20, 0),
            utc(2017, 4, 20, 20, 1),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::PreMarketAfterClose { .. }));
    }

    #[rstest]
    fn test_unaligned_timestamp_rejected() {
        let err = TradingSession::new(
            date(20),
            Utc.with_ymd_and_hms(2017, 4, 20, 13, 31, 15).unwrap(),
            utc(2017, 4, 20, 20, 0),
            utc(2017, 4, 20, 12, 45),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "session 2017-04-20: execution open 2017-04-20 13:31:15 UTC is not on a minute boundary"
        );
    }

    #[rstest]
    fn test_single_minute_window_is_valid() {
        let minute = utc(2017, 4, 20, 13, 31);
        let session = TradingSession::new(date(20), minute, minute, minute).unwrap();
        assert_eq!(session.bar_minutes(BarGranularity::Minute), vec![minute]);
    }

    #[rstest]
    fn test_bar_minutes(session_2017_04_20: TradingSession) {
        let minutes = session_2017_04_20.bar_minutes(BarGranularity::Minute);
        assert_eq!(minutes.len(), 390);
        assert_eq!(minutes[0], utc(2017, 4, 20, 13, 31));
        assert_eq!(minutes[389], utc(2017, 4, 20, 20, 0));

        let daily = session_2017_04_20.bar_minutes(BarGranularity::Session);
        assert_eq!(daily, vec![utc(2017, 4, 20, 20, 0)]);
    }

    #[rstest]
    #[case(utc(2017, 4, 20, 0, 0), Some(utc(2017, 4, 20, 13, 31)))]
    #[case(utc(2017, 4, 20, 15, 0), Some(utc(2017, 4, 20, 15, 0)))]
    #[case(utc(2017, 4, 20, 20, 0), Some(utc(2017, 4, 20, 20, 0)))]
    #[case(utc(2017, 4, 20, 20, 1), None)]
    fn test_first_bar_at_or_after_minute(
        session_2017_04_20: TradingSession,
        #[case] ts: DateTime<Utc>,
        #[case] expected: Option<DateTime<Utc>>,
    ) {
        assert_eq!(
            session_2017_04_20.first_bar_at_or_after(BarGranularity::Minute, ts),
            expected
        );
    }

    #[rstest]
    fn test_first_bar_rounds_up_inside_window(session_2017_04_20: TradingSession) {
        let ts = utc(2017, 4, 20, 15, 0) + TimeDelta::seconds(20);
        assert_eq!(
            session_2017_04_20.first_bar_at_or_after(BarGranularity::Minute, ts),
            Some(utc(2017, 4, 20, 15, 1))
        );
    }

    #[rstest]
    fn test_first_bar_session_granularity(session_2017_04_20: TradingSession) {
        assert_eq!(
            session_2017_04_20.first_bar_at_or_after(BarGranularity::Session, utc(2017, 4, 20, 15, 0)),
            Some(utc(2017, 4, 20, 20, 0))
        );
    }

    #[rstest]
    fn test_next_bar_after(session_2017_04_20: TradingSession) {
        let s = session_2017_04_20;
        assert_eq!(
            s.next_bar_after(BarGranularity::Minute, utc(2017, 4, 20, 19, 59)),
            Some(utc(2017, 4, 20, 20, 0))
        );
        assert_eq!(s.next_bar_after(BarGranularity::Minute, utc(2017, 4, 20, 20, 0)), None);
        assert_eq!(s.next_bar_after(BarGranularity::Session, utc(2017, 4, 20, 20, 0)), None);
    }

    #[rstest]
    #[case(vec![21, 20])]
    #[case(vec![20, 20])]
    #[case(vec![18, 20, 19])]
    fn test_schedule_rejects_non_ascending(#[case] days: Vec<u32>) {
        let sessions = days
            .into_iter()
            .map(|d| crate::stubs::nyse_session(date(d)))
            .collect();
        let err = SessionSchedule::new(sessions).unwrap_err();
        assert!(matches!(err, ScheduleError::NonAscendingSessions { .. }));
    }

    #[rstest]
    fn test_schedule_lookup_and_iteration() {
        let schedule = SessionSchedule::new(vec![
            crate::stubs::nyse_session(date(19)),
            crate::stubs::nyse_session(date(20)),
        ])
        .unwrap();

        assert_eq!(schedule.len(), 2);
        assert!(!schedule.is_empty());
        assert!(schedule.session_for(date(20)).is_some());
        assert!(schedule.session_for(date(21)).is_none());

        let dates: Vec<_> = (&schedule).into_iter().map(TradingSession::session_date).collect();
        assert_eq!(dates, vec![date(19), date(20)]);
    }

    #[rstest]
    fn test_empty_schedule_is_valid() {
        assert!(SessionSchedule::new(vec![]).unwrap().is_empty());
    }
}
