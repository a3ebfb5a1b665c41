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

//! Drives a [`Strategy`] from a [`LiveClock`] with checkpointed state.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use log::kv::ToValue;
use nexus_common::clock::{
    ClockEvent, ClockEventKind, LiveClock, RealtimeSource, SessionSchedule, TimeSource,
};
use nexus_cryptography::Fingerprint;
use serde_json::Value;

use crate::{
    api::AlgorithmApi,
    broker::Broker,
    config::LiveTradingConfig,
    context::AlgorithmContext,
    error::TradingError,
    persistence::{CheckpointStore, ExclusionSet},
    phase::{PhaseTrigger, TradingPhase},
    strategy::Strategy,
};

const COMPONENT: &str = "LiveTradingAlgorithm";

/// Counts of what one live run dispatched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub events: usize,
    pub sessions: usize,
    pub bars: usize,
    pub checkpoints: usize,
}

impl Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} events, {} sessions, {} bars, {} checkpoints",
            self.events, self.sessions, self.bars, self.checkpoints
        )
    }
}

/// Runs a strategy in real time and checkpoints its context.
///
/// One-time setup runs at most once across restarts. If a checkpoint exists
/// at the configured path it is restored in place of calling
/// [`Strategy::initialize`]. A checkpoint written by different algorithm
/// source fails the run rather than being applied.
///
/// The context is checkpointed after setup and after every bar. Attributes
/// present on the context at construction are never persisted.
#[derive(Debug)]
pub struct LiveTradingAlgorithm<S: Strategy, B: Broker> {
    config: LiveTradingConfig,
    strategy: S,
    broker: B,
    schedule: SessionSchedule,
    fingerprint: Fingerprint,
    store: CheckpointStore,
    context: AlgorithmContext,
    exclude: ExclusionSet,
    phase: TradingPhase,
    checkpoints: usize,
}

impl<S: Strategy, B: Broker> LiveTradingAlgorithm<S, B> {
    /// Creates a new [`LiveTradingAlgorithm`] instance with an empty context.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(
        config: LiveTradingConfig,
        strategy: S,
        broker: B,
        schedule: SessionSchedule,
        fingerprint: Fingerprint,
    ) -> anyhow::Result<Self> {
        Self::with_context(
            config,
            strategy,
            broker,
            schedule,
            fingerprint,
            AlgorithmContext::new(),
        )
    }

    /// Creates a new [`LiveTradingAlgorithm`] instance over `context`.
    ///
    /// The attributes already on `context`, plus `algo_id` which is set here,
    /// form the exclusion set.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_context(
        config: LiveTradingConfig,
        strategy: S,
        broker: B,
        schedule: SessionSchedule,
        fingerprint: Fingerprint,
        mut context: AlgorithmContext,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        context.set_reserved("algo_id", Value::String(config.algo_id.clone()));
        let exclude = ExclusionSet::from_context(&context);
        let store = config.checkpoint_store();

        log::info!(
            component = COMPONENT.to_value();
            "Created {} for {} sessions, fingerprint {fingerprint}",
            config.algo_id,
            schedule.len()
        );

        Ok(Self {
            config,
            strategy,
            broker,
            schedule,
            fingerprint,
            store,
            context,
            exclude,
            phase: TradingPhase::PreInitialized,
            checkpoints: 0,
        })
    }

    #[must_use]
    pub const fn phase(&self) -> TradingPhase {
        self.phase
    }

    #[must_use]
    pub const fn context(&self) -> &AlgorithmContext {
        &self.context
    }

    #[must_use]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    #[must_use]
    pub const fn exclusion_set(&self) -> &ExclusionSet {
        &self.exclude
    }

    #[must_use]
    pub const fn checkpoint_store(&self) -> &CheckpointStore {
        &self.store
    }

    #[must_use]
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    #[must_use]
    pub const fn broker(&self) -> &B {
        &self.broker
    }

    /// Runs setup if it has not completed, timestamped with the broker's current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be restored or written, or
    /// if [`Strategy::initialize`] fails.
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        let now = Utc::now() + self.broker.clock_offset();
        self.initialize_at(now)
    }

    fn initialize_at(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        if self.phase.is_initialized() {
            return Ok(());
        }

        if self.store.exists() {
            log::info!(
                component = COMPONENT.to_value();
                "Checkpoint found at {}, restoring state",
                self.store.path().display()
            );
            self.store
                .restore(&mut self.context, self.fingerprint, &self.exclude)
                .map_err(TradingError::from)?;
            self.phase = self.phase.transition(PhaseTrigger::Restore)?;
            return Ok(());
        }

        log::info!(
            component = COMPONENT.to_value();
            "No checkpoint found at {}, calling initialize",
            self.store.path().display()
        );

        let snapshot = self.context.clone();
        self.phase = self.phase.transition(PhaseTrigger::Initialize)?;

        let result = {
            let mut api = AlgorithmApi::new(&mut self.context, &mut self.broker, self.phase, now);
            self.strategy.initialize(&mut api)
        };

        // Setup only counts once its checkpoint is on disk
        if let Err(e) = result.and_then(|()| self.checkpoint()) {
            log::error!(component = COMPONENT.to_value(); "Initialize failed: {e}");
            self.context = snapshot;
            self.phase = TradingPhase::PreInitialized;
            return Err(e);
        }

        self.phase = self.phase.transition(PhaseTrigger::InitializeCompleted)?;
        Ok(())
    }

    fn checkpoint(&mut self) -> anyhow::Result<()> {
        self.store
            .save(&self.context, self.fingerprint, &self.exclude)
            .map_err(TradingError::from)?;
        self.checkpoints += 1;
        Ok(())
    }

    /// Runs the schedule against wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns the first error from setup, a callback, or a checkpoint write.
    pub fn run(&mut self) -> anyhow::Result<RunStats> {
        self.run_with_time_source(RealtimeSource)
    }

    /// Runs the schedule against `time_source`, blocking until the last session ends.
    ///
    /// # Errors
    ///
    /// Returns the first error from setup, a callback, or a checkpoint write.
    /// No callback is retried.
    pub fn run_with_time_source<T: TimeSource>(
        &mut self,
        time_source: T,
    ) -> anyhow::Result<RunStats> {
        let clock_offset = self.broker.clock_offset();
        let checkpoints_before = self.checkpoints;

        self.initialize_at(time_source.utc_now() + clock_offset)?;

        log::info!(
            component = COMPONENT.to_value();
            "Starting live run with {} bars, clock offset {clock_offset}",
            self.config.bar_granularity
        );

        let clock = LiveClock::new(
            self.schedule.clone(),
            self.config.bar_granularity,
            clock_offset,
            time_source,
        );

        let mut stats = RunStats::default();
        for event in clock {
            self.dispatch(event)?;
            stats.events += 1;
            match event.kind {
                ClockEventKind::SessionStart => stats.sessions += 1,
                ClockEventKind::Bar => stats.bars += 1,
                ClockEventKind::BeforeTradingStart | ClockEventKind::SessionEnd => {}
            }
        }
        stats.checkpoints = self.checkpoints - checkpoints_before;

        log::info!(component = COMPONENT.to_value(); "Live run completed: {stats}");
        Ok(stats)
    }

    fn dispatch(&mut self, event: ClockEvent) -> anyhow::Result<()> {
        self.phase = self.phase.transition(PhaseTrigger::from(event.kind))?;

        {
            let mut api =
                AlgorithmApi::new(&mut self.context, &mut self.broker, self.phase, event.ts);
            match event.kind {
                ClockEventKind::SessionStart => self.strategy.on_session_start(&mut api)?,
                ClockEventKind::BeforeTradingStart => {
                    self.strategy.before_trading_start(&mut api)?;
                }
                ClockEventKind::Bar => self.strategy.handle_data(&mut api)?,
                ClockEventKind::SessionEnd => self.strategy.on_session_end(&mut api)?,
            }
        }

        if event.kind == ClockEventKind::Bar {
            self.checkpoint()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use nexus_common::{
        clock::{BarGranularity, TestTimeSource},
        stubs::{nyse_schedule, utc},
    };
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        error::CheckpointError,
        persistence::CheckpointEncoding,
        stubs::{CounterStrategy, RecordingBroker},
    };

    const SOURCE: &str = "def initialize(context):\n    context.counter = 0\n";

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn config(dir: &TempDir, granularity: BarGranularity) -> LiveTradingConfig {
        LiveTradingConfig {
            algo_id: "counter".to_string(),
            checkpoint_path: dir.path().join("state.ckpt"),
            bar_granularity: granularity,
            ..LiveTradingConfig::default()
        }
    }

    fn driver(
        config: LiveTradingConfig,
        strategy: CounterStrategy,
        source: &str,
    ) -> LiveTradingAlgorithm<CounterStrategy, RecordingBroker> {
        LiveTradingAlgorithm::new(
            config,
            strategy,
            RecordingBroker::default(),
            nyse_schedule(&[20]),
            Fingerprint::from_source(source),
        )
        .unwrap()
    }

    fn pre_market() -> TestTimeSource {
        TestTimeSource::new(utc(2017, 4, 20, 12, 0))
    }

    #[rstest]
    fn test_fresh_run_minute_bars(dir: TempDir) {
        let mut algo = driver(
            config(&dir, BarGranularity::Minute),
            CounterStrategy::default(),
            SOURCE,
        );

        let stats = algo.run_with_time_source(pre_market()).unwrap();

        assert_eq!(
            stats,
            RunStats {
                events: 393,
                sessions: 1,
                bars: 390,
                checkpoints: 391,
            }
        );
        assert_eq!(algo.strategy().init_calls, 1);
        assert_eq!(algo.strategy().sessions_started, 1);
        assert_eq!(algo.strategy().sessions_ended, 1);
        assert_eq!(algo.context().get::<i64>("counter").unwrap(), Some(390));
        assert_eq!(algo.phase(), TradingPhase::SessionEnd);

        let checkpoint = algo.checkpoint_store().load().unwrap();
        assert_eq!(checkpoint.payload["counter"], json!(390));
        assert_eq!(checkpoint.fingerprint, Fingerprint::from_source(SOURCE));
    }

    #[rstest]
    fn test_restart_skips_initialize(dir: TempDir) {
        let mut first = driver(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            SOURCE,
        );
        first.run_with_time_source(pre_market()).unwrap();
        assert_eq!(first.context().get::<i64>("counter").unwrap(), Some(1));

        let mut second = driver(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            SOURCE,
        );
        let stats = second.run_with_time_source(pre_market()).unwrap();

        assert_eq!(second.strategy().init_calls, 0);
        assert_eq!(stats.checkpoints, 1);
        assert_eq!(second.context().get::<i64>("counter").unwrap(), Some(2));
        assert_eq!(second.context().get::<String>("symbol").unwrap().as_deref(), Some("AAPL"));
    }

    #[rstest]
    fn test_initialize_is_idempotent(dir: TempDir) {
        let mut algo = driver(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            SOURCE,
        );

        algo.initialize().unwrap();
        algo.initialize().unwrap();

        assert_eq!(algo.strategy().init_calls, 1);
        assert_eq!(algo.phase(), TradingPhase::Ready);
        assert!(algo.checkpoint_store().exists());
    }

    #[rstest]
    fn test_incompatible_checkpoint_fails_run(dir: TempDir) {
        let mut first = driver(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            SOURCE,
        );
        first.initialize().unwrap();

        let mut second = driver(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            "def initialize(context):\n    context.counter = 100\n",
        );
        let err = second.run_with_time_source(pre_market()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TradingError>(),
            Some(TradingError::Checkpoint(CheckpointError::Incompatible { .. }))
        ));
        assert_eq!(second.strategy().init_calls, 0);
        assert!(!second.context().contains("counter"));
        assert_eq!(second.phase(), TradingPhase::PreInitialized);
    }

    #[rstest]
    fn test_pre_existing_attributes_not_persisted(dir: TempDir) {
        let mut context = AlgorithmContext::new();
        context.set("api_key", "secret").unwrap();

        let mut algo = LiveTradingAlgorithm::with_context(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            RecordingBroker::default(),
            nyse_schedule(&[20]),
            Fingerprint::from_source(SOURCE),
            context,
        )
        .unwrap();
        algo.initialize().unwrap();

        assert!(algo.exclusion_set().contains("api_key"));
        assert!(algo.exclusion_set().contains("algo_id"));

        let payload = algo.checkpoint_store().load().unwrap().payload;
        let names: Vec<_> = payload.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["counter", "symbol"]);
    }

    #[rstest]
    fn test_orders_rejected_before_trading_start(dir: TempDir) {
        let strategy = CounterStrategy {
            order_every_bar: true,
            ..CounterStrategy::default()
        };
        let mut algo = driver(config(&dir, BarGranularity::Session), strategy, SOURCE);

        algo.run_with_time_source(pre_market()).unwrap();

        assert_eq!(
            algo.strategy().rejected_in_bts,
            vec!["SUBMIT_ORDER is not permitted during BEFORE_TRADING_START".to_string()]
        );
        assert_eq!(algo.broker().submitted.len(), 1);
    }

    #[rstest]
    fn test_callback_error_propagates(dir: TempDir) {
        let strategy = CounterStrategy {
            fail_on_bar: Some(3),
            ..CounterStrategy::default()
        };
        let mut algo = driver(config(&dir, BarGranularity::Minute), strategy, SOURCE);

        let err = algo.run_with_time_source(pre_market()).unwrap_err();

        assert_eq!(err.to_string(), "bar 3 failed");
        assert_eq!(algo.strategy().bars, 3);
        let checkpoint = algo.checkpoint_store().load().unwrap();
        assert_eq!(checkpoint.payload["counter"], json!(2));
    }

    #[rstest]
    fn test_failed_initialize_can_retry(dir: TempDir) {
        let strategy = CounterStrategy {
            fail_initialize: true,
            ..CounterStrategy::default()
        };
        let mut algo = driver(config(&dir, BarGranularity::Session), strategy, SOURCE);

        assert!(algo.initialize().is_err());
        assert_eq!(algo.phase(), TradingPhase::PreInitialized);
        assert!(!algo.context().contains("counter"));
        assert!(!algo.checkpoint_store().exists());

        algo.strategy.fail_initialize = false;
        algo.initialize().unwrap();
        assert_eq!(algo.strategy().init_calls, 2);
        assert!(algo.checkpoint_store().exists());
    }

    #[rstest]
    fn test_failed_first_checkpoint_rolls_back_setup(dir: TempDir) {
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let config = LiveTradingConfig {
            checkpoint_path: blocker.join("state.ckpt"),
            ..config(&dir, BarGranularity::Session)
        };
        let mut algo = driver(config, CounterStrategy::default(), SOURCE);

        let err = algo.initialize().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TradingError>(),
            Some(TradingError::Checkpoint(CheckpointError::Io { .. }))
        ));
        assert_eq!(algo.phase(), TradingPhase::PreInitialized);
        assert!(!algo.context().contains("counter"));

        std::fs::remove_file(&blocker).unwrap();
        algo.initialize().unwrap();
        assert_eq!(algo.strategy().init_calls, 2);
        assert_eq!(algo.phase(), TradingPhase::Ready);
        assert!(algo.checkpoint_store().exists());
    }

    #[rstest]
    fn test_broker_clock_offset_shifts_run(dir: TempDir) {
        let mut algo = LiveTradingAlgorithm::new(
            config(&dir, BarGranularity::Session),
            CounterStrategy::default(),
            RecordingBroker::with_offset(TimeDelta::hours(1)),
            nyse_schedule(&[20]),
            Fingerprint::from_source(SOURCE),
        )
        .unwrap();

        // 11:00 local plus the offset enters before the pre-market minute
        let stats = algo
            .run_with_time_source(TestTimeSource::new(utc(2017, 4, 20, 11, 0)))
            .unwrap();

        assert_eq!(stats.events, 4);
        assert_eq!(algo.strategy().rejected_in_bts.len(), 1);
    }

    #[rstest]
    fn test_run_after_close_dispatches_session_start_only(dir: TempDir) {
        let mut algo = driver(
            config(&dir, BarGranularity::Minute),
            CounterStrategy::default(),
            SOURCE,
        );

        let stats = algo
            .run_with_time_source(TestTimeSource::new(utc(2017, 4, 20, 21, 0)))
            .unwrap();

        assert_eq!(
            stats,
            RunStats {
                events: 1,
                sessions: 1,
                bars: 0,
                checkpoints: 1,
            }
        );
        assert_eq!(algo.phase(), TradingPhase::SessionStart);
    }

    #[rstest]
    fn test_msgpack_checkpoints(dir: TempDir) {
        let config = LiveTradingConfig {
            checkpoint_encoding: CheckpointEncoding::MsgPack,
            ..config(&dir, BarGranularity::Session)
        };
        let mut first = driver(config.clone(), CounterStrategy::default(), SOURCE);
        first.run_with_time_source(pre_market()).unwrap();

        let mut second = driver(config, CounterStrategy::default(), SOURCE);
        second.initialize().unwrap();
        assert_eq!(second.context().get::<i64>("counter").unwrap(), Some(1));
    }
}
