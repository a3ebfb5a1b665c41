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

//! Session schedules and the clocks that walk them.
//!
//! Both clocks yield [`ClockEvent`]s over a [`SessionSchedule`]:
//!
//! - [`SimulationClock`] produces the historical event sequence directly.
//! - [`LiveClock`] reproduces that sequence in real time by polling a
//!   [`TimeSource`] with a one-minute quantum.

pub mod calendar;
pub mod events;
pub mod live;
pub mod session;
pub mod simulation;

use chrono::{DateTime, TimeDelta, Utc};

pub use self::{
    calendar::{TradingCalendar, WeekdayCalendar, WeekdayCalendarConfig},
    events::{BarGranularity, ClockEvent, ClockEventKind},
    live::LiveClock,
    session::{ScheduleError, SessionSchedule, TradingSession},
    simulation::SimulationClock,
};

/// The source of current time and the wait primitive used by [`LiveClock`].
pub trait TimeSource {
    /// Returns the current date and time as a timezone-aware `DateTime<UTC>`.
    fn utc_now(&self) -> DateTime<Utc>;

    /// Blocks for `duration`.
    fn sleep(&mut self, duration: TimeDelta);
}

/// Wall-clock time with a blocking thread sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealtimeSource;

impl TimeSource for RealtimeSource {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&mut self, duration: TimeDelta) {
        match duration.to_std() {
            Ok(duration) => std::thread::sleep(duration),
            Err(e) => log::warn!("Ignoring sleep for {duration}: {e}"),
        }
    }
}

/// A deterministic time source whose `sleep` advances the current instant.
#[derive(Debug, Clone)]
pub struct TestTimeSource {
    now: DateTime<Utc>,
    sleeps: usize,
}

impl TestTimeSource {
    /// Creates a new [`TestTimeSource`] starting at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self { now, sleeps: 0 }
    }

    /// Moves the current instant to `now`.
    pub fn set_time(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// Returns how many times `sleep` has been called.
    #[must_use]
    pub const fn sleep_count(&self) -> usize {
        self.sleeps
    }
}

impl TimeSource for TestTimeSource {
    fn utc_now(&self) -> DateTime<Utc> {
        self.now
    }

    fn sleep(&mut self, duration: TimeDelta) {
        self.now += duration;
        self.sleeps += 1;
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &mut T {
    fn utc_now(&self) -> DateTime<Utc> {
        (**self).utc_now()
    }

    fn sleep(&mut self, duration: TimeDelta) {
        (**self).sleep(duration);
    }
}
