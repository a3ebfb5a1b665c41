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

//! Trading phases and the operations each one permits.

use nexus_common::clock::ClockEventKind;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The phase of a live run, as seen by strategy callbacks.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingPhase {
    /// The driver exists but setup has not run.
    #[default]
    PreInitialized,
    /// Inside the strategy's one-time `initialize` callback.
    Initializing,
    /// Setup completed or restored, no session entered yet.
    Ready,
    /// Inside `on_session_start`.
    SessionStart,
    /// Inside `before_trading_start`.
    BeforeTradingStart,
    /// Inside `handle_data`.
    Trading,
    /// Inside `on_session_end`, or between sessions.
    SessionEnd,
}

/// A broker-facing operation gated by the [`TradingPhase`].
#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    SubmitOrder,
    CancelOrder,
}

/// A trigger moving the [`TradingPhase`] state machine.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseTrigger {
    Initialize,
    InitializeCompleted,
    Restore,
    SessionStart,
    BeforeTradingStart,
    Bar,
    SessionEnd,
}

impl From<ClockEventKind> for PhaseTrigger {
    fn from(kind: ClockEventKind) -> Self {
        match kind {
            ClockEventKind::SessionStart => Self::SessionStart,
            ClockEventKind::BeforeTradingStart => Self::BeforeTradingStart,
            ClockEventKind::Bar => Self::Bar,
            ClockEventKind::SessionEnd => Self::SessionEnd,
        }
    }
}

impl TradingPhase {
    /// Returns whether `operation` may run in this phase.
    #[must_use]
    pub const fn permits(self, operation: Operation) -> bool {
        match operation {
            Operation::SubmitOrder => matches!(self, Self::Trading),
            Operation::CancelOrder => matches!(self, Self::BeforeTradingStart | Self::Trading),
        }
    }

    /// Returns whether the one-time setup has completed or been restored.
    #[must_use]
    pub const fn is_initialized(self) -> bool {
        !matches!(self, Self::PreInitialized | Self::Initializing)
    }
}

#[rustfmt::skip]
impl TradingPhase {
    /// Transition the state machine with the phase `trigger`.
    ///
    /// A session entered at or after its close is followed directly by the
    /// next `SessionStart`, and bars preceding the pre-market minute come
    /// before `BeforeTradingStart`.
    ///
    /// # Errors
    ///
    /// Returns an error if `trigger` is invalid for the current phase.
    pub fn transition(&self, trigger: PhaseTrigger) -> anyhow::Result<Self> {
        let new_phase = match (self, trigger) {
            (Self::PreInitialized, PhaseTrigger::Initialize) => Self::Initializing,
            (Self::PreInitialized, PhaseTrigger::Restore) => Self::Ready,
            (Self::Initializing, PhaseTrigger::InitializeCompleted) => Self::Ready,
            (Self::Ready, PhaseTrigger::SessionStart) => Self::SessionStart,
            (Self::SessionStart, PhaseTrigger::SessionStart) => Self::SessionStart,
            (Self::SessionEnd, PhaseTrigger::SessionStart) => Self::SessionStart,
            (Self::SessionStart, PhaseTrigger::BeforeTradingStart) => Self::BeforeTradingStart,
            (Self::Trading, PhaseTrigger::BeforeTradingStart) => Self::BeforeTradingStart,
            (Self::SessionStart, PhaseTrigger::Bar) => Self::Trading,
            (Self::BeforeTradingStart, PhaseTrigger::Bar) => Self::Trading,
            (Self::Trading, PhaseTrigger::Bar) => Self::Trading,
            (Self::SessionStart, PhaseTrigger::SessionEnd) => Self::SessionEnd,
            (Self::BeforeTradingStart, PhaseTrigger::SessionEnd) => Self::SessionEnd,
            (Self::Trading, PhaseTrigger::SessionEnd) => Self::SessionEnd,
            _ => anyhow::bail!("Invalid phase trigger {self} -> {trigger}"),
        };
        Ok(new_phase)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(TradingPhase::Trading, true, true)]
    #[case(TradingPhase::BeforeTradingStart, false, true)]
    #[case(TradingPhase::SessionStart, false, false)]
    #[case(TradingPhase::SessionEnd, false, false)]
    #[case(TradingPhase::Initializing, false, false)]
    #[case(TradingPhase::PreInitialized, false, false)]
    #[case(TradingPhase::Ready, false, false)]
    fn test_permits(
        #[case] phase: TradingPhase,
        #[case] submit: bool,
        #[case] cancel: bool,
    ) {
        assert_eq!(phase.permits(Operation::SubmitOrder), submit);
        assert_eq!(phase.permits(Operation::CancelOrder), cancel);
    }

    #[rstest]
    fn test_only_trading_permits_submit() {
        let permitted: Vec<_> = TradingPhase::iter()
            .filter(|phase| phase.permits(Operation::SubmitOrder))
            .collect();
        assert_eq!(permitted, vec![TradingPhase::Trading]);
    }

    #[rstest]
    fn test_fresh_run_sequence() {
        let triggers = [
            PhaseTrigger::Initialize,
            PhaseTrigger::InitializeCompleted,
            PhaseTrigger::SessionStart,
            PhaseTrigger::Bar,
            PhaseTrigger::BeforeTradingStart,
            PhaseTrigger::Bar,
            PhaseTrigger::SessionEnd,
            PhaseTrigger::SessionStart,
            PhaseTrigger::SessionStart,
        ];

        let mut phase = TradingPhase::default();
        for trigger in triggers {
            phase = phase.transition(trigger).unwrap();
        }
        assert_eq!(phase, TradingPhase::SessionStart);
    }

    #[rstest]
    #[case(TradingPhase::PreInitialized, PhaseTrigger::SessionStart)]
    #[case(TradingPhase::Initializing, PhaseTrigger::Restore)]
    #[case(TradingPhase::Ready, PhaseTrigger::Initialize)]
    #[case(TradingPhase::Ready, PhaseTrigger::Bar)]
    #[case(TradingPhase::SessionEnd, PhaseTrigger::Bar)]
    #[case(TradingPhase::BeforeTradingStart, PhaseTrigger::BeforeTradingStart)]
    fn test_invalid_transition(#[case] phase: TradingPhase, #[case] trigger: PhaseTrigger) {
        let err = phase.transition(trigger).unwrap_err();
        assert!(err.to_string().starts_with("Invalid phase trigger"));
    }

    #[rstest]
    fn test_restore_skips_initializing() {
        let phase = TradingPhase::PreInitialized
            .transition(PhaseTrigger::Restore)
            .unwrap();
        assert_eq!(phase, TradingPhase::Ready);
        assert!(phase.is_initialized());
    }

    #[rstest]
    fn test_display() {
        assert_eq!(TradingPhase::BeforeTradingStart.to_string(), "BEFORE_TRADING_START");
        assert_eq!(Operation::SubmitOrder.to_string(), "SUBMIT_ORDER");
        assert_eq!(
            PhaseTrigger::from(ClockEventKind::SessionEnd),
            PhaseTrigger::SessionEnd
        );
    }
}
