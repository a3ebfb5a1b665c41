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

//! A `tracing` subscriber for dependencies that emit through `tracing`.
//!
//! Installed by [`init_logging`](super::init_logging) when the logger spec
//! carries `use_tracing`. Filtering follows `RUST_LOG` and falls back to
//! `warn`. Events print to stdout in the nexus line layout, with the event
//! target in place of the component:
//!
//! ```text
//! 2017-04-20T13:31:00.000Z [WARN] momentum.hyper::proto: connection reset
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use nexus_core::datetime::format_iso8601;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, FmtContext, FormatEvent, FormatFields, format::Writer},
    prelude::*,
    registry::LookupSpan,
};
use ustr::Ustr;

const DEFAULT_DIRECTIVE: &str = "warn";

static INSTALLED: AtomicBool = AtomicBool::new(false);

struct NexusLineFormat {
    algo_id: Ustr,
}

impl<S, N> FormatEvent<S, N> for NexusLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} [{}] {}.{}: ",
            format_iso8601(Utc::now()),
            meta.level().as_str(),
            self.algo_id,
            meta.target(),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[must_use]
pub fn tracing_is_initialized() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(algo_id: Ustr) -> anyhow::Result<()> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        anyhow::bail!("Tracing subscriber already installed");
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().event_format(NexusLineFormat { algo_id }))
        .try_init();

    installed.map_err(|e| {
        INSTALLED.store(false, Ordering::SeqCst);
        anyhow::anyhow!("Failed to install tracing subscriber: {e}")
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_second_install_fails() {
        if !tracing_is_initialized() {
            init_tracing(Ustr::from("momentum")).unwrap();
        }
        assert!(tracing_is_initialized());
        assert!(init_tracing(Ustr::from("momentum")).is_err());
    }
}
