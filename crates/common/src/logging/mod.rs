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

//! Logging for live runs.
//!
//! [`init_logging`] installs a [`Logger`] behind the `log` facade. Records are
//! captured as [`LogLine`](logger::LogLine)s and sent over a channel to a
//! `logging` thread, which owns the console and file writers. The thread runs
//! until the last [`LogGuard`] is dropped and writes everything still queued
//! before it exits.
//!
//! Components tag their lines with a `component` key-value:
//!
//! ```text
//! log::info!(component = "LiveClock"; "SessionStart 2017-04-20");
//! ```

pub mod config;
pub mod logger;
pub mod writer;

#[cfg(feature = "tracing-bridge")]
pub mod bridge;

use std::sync::{
    OnceLock,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use ustr::Ustr;
use uuid::Uuid;

pub use self::{config::LoggerConfig, logger::LogGuard, writer::FileWriterConfig};
use self::logger::Logger;

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static BYPASSED: AtomicBool = AtomicBool::new(false);
static COLORED: AtomicBool = AtomicBool::new(true);
static GUARDS: AtomicU8 = AtomicU8::new(0);
static FALLBACK_GUARD: OnceLock<Option<LogGuard>> = OnceLock::new();

pub fn logging_is_initialized() -> bool {
    INITIALIZED.load(Ordering::Relaxed)
}

/// Starts logging with the `NEXUS_LOG` spec, or stdout at INFO if it is unset
/// or invalid, unless logging is already running.
///
/// The guard is held for the rest of the process. Returns whether logging is
/// running afterwards.
pub fn ensure_logging_initialized() -> bool {
    if logging_is_initialized() {
        return true;
    }

    FALLBACK_GUARD.get_or_init(|| {
        let config = LoggerConfig::from_env().unwrap_or_default();
        Logger::init(Ustr::from("nexus"), Uuid::new_v4(), config, FileWriterConfig::default())
            .ok()
    });
    logging_is_initialized()
}

/// Discards every record from now on.
pub fn logging_set_bypass() {
    BYPASSED.store(true, Ordering::Relaxed);
}

/// Shuts logging down after writing what is queued, whatever guards are live.
pub fn logging_shutdown() {
    logger::shutdown();
}

pub fn logging_is_colored() -> bool {
    COLORED.load(Ordering::Relaxed)
}

/// Starts logging for the run of `algo_id`.
///
/// Call once per process and keep the guard for the duration of the run.
/// When `config.use_tracing` is set and the `tracing-bridge` feature is
/// enabled, the `tracing` subscriber is installed as well.
///
/// # Errors
///
/// Returns an error if the logger or the tracing subscriber cannot be installed.
pub fn init_logging(
    algo_id: Ustr,
    instance_id: Uuid,
    config: LoggerConfig,
    file_config: FileWriterConfig,
) -> anyhow::Result<LogGuard> {
    #[cfg(feature = "tracing-bridge")]
    let use_tracing = config.use_tracing;

    let guard = Logger::init(algo_id, instance_id, config, file_config)?;

    #[cfg(feature = "tracing-bridge")]
    if use_tracing && !bridge::tracing_is_initialized() {
        bridge::init_tracing(algo_id)?;
    }

    Ok(guard)
}
