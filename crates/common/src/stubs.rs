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

//! Session and schedule fixtures for tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rstest::fixture;

use crate::clock::{SessionSchedule, TradingSession};

/// Returns the UTC instant `y-m-d h:mi:00`.
///
/// # Panics
///
/// Panics if the arguments do not form a valid date and time.
#[must_use]
pub fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
}

/// Returns an NYSE session for `date` during daylight saving time.
///
/// Bars run 13:31 through 20:00 UTC and pre-market preparation starts at
/// 12:45 UTC (08:45 New York).
///
/// # Panics
///
/// Panics if the session cannot be built.
#[must_use]
pub fn nyse_session(date: NaiveDate) -> TradingSession {
    let at = |h, mi| date.and_hms_opt(h, mi, 0).unwrap().and_utc();
    TradingSession::new(date, at(13, 31), at(20, 0), at(12, 45)).unwrap()
}

/// Returns a schedule of NYSE sessions on the given days of April 2017.
///
/// # Panics
///
/// Panics if the days are invalid or not ascending.
#[must_use]
pub fn nyse_schedule(april_days: &[u32]) -> SessionSchedule {
    let sessions = april_days
        .iter()
        .map(|day| nyse_session(NaiveDate::from_ymd_opt(2017, 4, *day).unwrap()))
        .collect();
    SessionSchedule::new(sessions).unwrap()
}

#[fixture]
pub fn session_2017_04_20() -> TradingSession {
    nyse_session(NaiveDate::from_ymd_opt(2017, 4, 20).unwrap())
}

#[fixture]
pub fn schedule_2017_04_20() -> SessionSchedule {
    nyse_schedule(&[20])
}
