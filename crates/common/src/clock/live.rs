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

//! The live clock, driven by wall-clock time.

use chrono::{DateTime, TimeDelta, Utc};
use log::kv::ToValue;
use nexus_core::datetime::{ONE_MINUTE, floor_to_minute};

use super::{
    TimeSource,
    events::{BarGranularity, ClockEvent, ClockEventKind},
    session::{SessionSchedule, TradingSession},
};

const COMPONENT: &str = "LiveClock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The current session has not been entered yet.
    Entering,
    /// Inside the current session.
    Trading {
        bts_pending: bool,
        next_bar: Option<DateTime<Utc>>,
    },
}

/// A real-time clock reproducing the [`SimulationClock`](super::SimulationClock) sequence.
///
/// The clock polls `time_source` with a one-minute quantum. Every timestamp is
/// taken at minute resolution from `time_source.utc_now() + clock_offset`:
///
/// - `SessionStart` is emitted on entering a session, without waiting.
/// - A session entered at or after its execution close yields nothing more.
/// - `BeforeTradingStart` fires once `now` reaches the pre-market minute, but
///   only if the session was entered no later than that minute. A session
///   entered mid-window skips it.
/// - Bars fire at their minute boundary once `now` reaches them, starting from
///   the first bar at or after the entry time.
/// - `SessionEnd` follows the last bar, at execution close.
///
/// Since `now` is floored to the minute, an event can be emitted up to 59
/// seconds after its timestamp. A start at 15:00:42 emits the 15:00 bar
/// straight away rather than waiting for 15:01.
///
/// The clock is finite and consumed by iteration. Emitted timestamps never
/// decrease within a pass, even if the time source steps backwards.
#[derive(Debug)]
pub struct LiveClock<T: TimeSource> {
    sessions: Vec<TradingSession>,
    index: usize,
    granularity: BarGranularity,
    clock_offset: TimeDelta,
    time_source: T,
    state: State,
    last_ts: Option<DateTime<Utc>>,
}

impl<T: TimeSource> LiveClock<T> {
    /// Creates a new [`LiveClock`] instance.
    #[must_use]
    pub fn new(
        schedule: SessionSchedule,
        granularity: BarGranularity,
        clock_offset: TimeDelta,
        time_source: T,
    ) -> Self {
        Self {
            sessions: schedule.into_iter().collect(),
            index: 0,
            granularity,
            clock_offset,
            time_source,
            state: State::Entering,
            last_ts: None,
        }
    }

    #[must_use]
    pub const fn granularity(&self) -> BarGranularity {
        self.granularity
    }

    #[must_use]
    pub const fn clock_offset(&self) -> TimeDelta {
        self.clock_offset
    }

    #[must_use]
    pub const fn time_source(&self) -> &T {
        &self.time_source
    }

    /// Consumes the clock, returning its time source.
    pub fn into_time_source(self) -> T {
        self.time_source
    }

    /// The current time as seen by the strategy, at full resolution.
    #[must_use]
    pub fn effective_now(&self) -> DateTime<Utc> {
        self.time_source.utc_now() + self.clock_offset
    }

    fn current_minute(&self) -> DateTime<Utc> {
        floor_to_minute(self.effective_now())
    }

    fn advance_session(&mut self) {
        self.index += 1;
        self.state = State::Entering;
    }

    fn emit(&mut self, ts: DateTime<Utc>, kind: ClockEventKind) -> ClockEvent {
        let ts = match self.last_ts {
            Some(last) if ts < last => {
                log::warn!(
                    component = COMPONENT.to_value();
                    "Time source stepped backwards, holding {kind} at {last} instead of {ts}"
                );
                last
            }
            _ => ts,
        };
        self.last_ts = Some(ts);
        log::debug!(component = COMPONENT.to_value(); "{kind} {ts}");
        ClockEvent::new(ts, kind)
    }

    fn enter(&mut self, session: TradingSession) -> ClockEvent {
        let now = self.current_minute();

        if now >= session.execution_close() {
            log::info!(
                component = COMPONENT.to_value();
                "Session {} already closed at {now}, skipping",
                session.session_date()
            );
            self.advance_session();
        } else {
            let bts_pending = now <= session.pre_market_minute();
            let next_bar = session.first_bar_at_or_after(self.granularity, now);
            self.state = State::Trading {
                bts_pending,
                next_bar,
            };
        }

        self.emit(now, ClockEventKind::SessionStart)
    }

    /// Returns the next event of the current session, or `None` if the caller must wait.
    fn poll(
        &mut self,
        session: TradingSession,
        bts_pending: bool,
        next_bar: Option<DateTime<Utc>>,
    ) -> Option<ClockEvent> {
        let now = self.current_minute();
        let pre_market = session.pre_market_minute();
        let mut bts_pending = bts_pending;

        if bts_pending && now > session.execution_close() {
            log::warn!(
                component = COMPONENT.to_value();
                "Missed pre-market minute {pre_market} of session {}",
                session.session_date()
            );
            bts_pending = false;
            self.state = State::Trading {
                bts_pending,
                next_bar,
            };
        }

        if bts_pending && now >= pre_market && next_bar.is_none_or(|bar| bar >= pre_market) {
            self.state = State::Trading {
                bts_pending: false,
                next_bar,
            };
            let ts = next_bar.map_or(now, |bar| now.min(bar));
            return Some(self.emit(ts, ClockEventKind::BeforeTradingStart));
        }

        match next_bar {
            Some(bar) if bar <= now && !(bts_pending && bar >= pre_market) => {
                self.state = State::Trading {
                    bts_pending,
                    next_bar: session.next_bar_after(self.granularity, bar),
                };
                Some(self.emit(bar, ClockEventKind::Bar))
            }
            None if !bts_pending => {
                self.advance_session();
                Some(self.emit(session.execution_close(), ClockEventKind::SessionEnd))
            }
            _ => None,
        }
    }
}

impl<T: TimeSource> Iterator for LiveClock<T> {
    type Item = ClockEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let session = *self.sessions.get(self.index)?;

            match self.state {
                State::Entering => return Some(self.enter(session)),
                State::Trading {
                    bts_pending,
                    next_bar,
                } => {
                    if let Some(event) = self.poll(session, bts_pending, next_bar) {
                        return Some(event);
                    }
                    self.time_source.sleep(ONE_MINUTE);
                }
            }
        }
    }
}
