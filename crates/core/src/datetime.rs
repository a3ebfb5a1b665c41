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

//! Minute-boundary arithmetic and formatting for UTC timestamps.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, Utc};

/// The bar interval and polling quantum of the live clock.
pub const ONE_MINUTE: TimeDelta = TimeDelta::minutes(1);

/// Truncates `dt` to the start of its minute.
#[must_use]
pub fn floor_to_minute(dt: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = dt.timestamp().rem_euclid(60);
    let nanos = i64::from(dt.timestamp_subsec_nanos());
    dt - TimeDelta::seconds(seconds) - TimeDelta::nanoseconds(nanos)
}

/// Rounds `dt` up to the next minute boundary, or returns it unchanged when
/// already on one.
#[must_use]
pub fn ceil_to_minute(dt: DateTime<Utc>) -> DateTime<Utc> {
    let floored = floor_to_minute(dt);
    if floored == dt {
        dt
    } else {
        floored + ONE_MINUTE
    }
}

/// Returns `true` if `dt` sits exactly on a minute boundary.
#[must_use]
pub fn is_minute_aligned(dt: DateTime<Utc>) -> bool {
    floor_to_minute(dt) == dt
}

/// Returns midnight UTC of `date`, the label timestamp of a trading session.
#[must_use]
pub fn session_label(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Formats `dt` as an RFC 3339 string with millisecond precision and a `Z` suffix.
#[must_use]
pub fn format_iso8601(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
