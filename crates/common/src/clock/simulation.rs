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

//! The historical simulation clock.

use std::collections::VecDeque;

use super::{
    events::{BarGranularity, ClockEvent, ClockEventKind},
    session::{SessionSchedule, TradingSession},
};

/// Produces the historical event sequence of a schedule without waiting.
///
/// Per session: `SessionStart` at the session label, the session's bars,
/// `BeforeTradingStart` at the pre-market minute placed ahead of the first bar
/// at or after it, and `SessionEnd` at the last bar minute.
#[derive(Debug)]
pub struct SimulationClock {
    sessions: std::vec::IntoIter<TradingSession>,
    granularity: BarGranularity,
    pending: VecDeque<ClockEvent>,
}

impl SimulationClock {
    /// Creates a new [`SimulationClock`] instance.
    #[must_use]
    pub fn new(schedule: SessionSchedule, granularity: BarGranularity) -> Self {
        Self {
            sessions: schedule.into_iter(),
            granularity,
            pending: VecDeque::new(),
        }
    }

    fn session_events(&self, session: &TradingSession) -> VecDeque<ClockEvent> {
        let minutes = session.bar_minutes(self.granularity);
        let pre_market = session.pre_market_minute();
        let bts_idx = minutes.partition_point(|m| *m < pre_market);

        let mut events = VecDeque::with_capacity(minutes.len() + 3);
        events.push_back(ClockEvent::new(session.label(), ClockEventKind::SessionStart));

        for (idx, minute) in minutes.iter().enumerate() {
            if idx == bts_idx {
                events.push_back(ClockEvent::new(
                    pre_market,
                    ClockEventKind::BeforeTradingStart,
                ));
            }
            events.push_back(ClockEvent::new(*minute, ClockEventKind::Bar));
        }

        if let Some(last) = minutes.last() {
            events.push_back(ClockEvent::new(*last, ClockEventKind::SessionEnd));
        }

        events
    }
}

impl Iterator for SimulationClock {
    type Item = ClockEvent;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() {
            let session = self.sessions.next()?;
            self.pending = self.session_events(&session);
        }
        self.pending.pop_front()
    }
}
