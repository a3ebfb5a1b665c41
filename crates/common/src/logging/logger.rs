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

//! The `log` backend and the thread that writes its output.

use std::{
    cell::OnceCell,
    fmt::Display,
    sync::{
        Mutex, OnceLock,
        atomic::Ordering,
        mpsc::{self, Receiver, SendError, Sender},
    },
    thread::{self, JoinHandle},
};

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record, set_boxed_logger, set_max_level};
use nexus_core::{NEXUS_PREFIX, datetime::format_iso8601};
use serde::Serialize;
use ustr::Ustr;
use uuid::Uuid;

use super::{
    BYPASSED, COLORED, GUARDS, INITIALIZED,
    config::LoggerConfig,
    writer::{ConsoleWriter, FileFormat, FileWriter, FileWriterConfig, LogWriter},
};
use crate::enums::LogColor;

const THREAD_NAME: &str = "logging";
const KV_COLOR: &str = "color";
const KV_COMPONENT: &str = "component";

static SENDER: OnceLock<Sender<LogEvent>> = OnceLock::new();
static WORKER: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);

#[derive(Debug)]
pub enum LogEvent {
    Line(LogLine),
    Flush,
    /// Write whatever is queued, flush, and stop the thread.
    Close,
}

/// A record captured on the caller's thread.
///
/// `component` comes from the `component` key-value when present, otherwise
/// from the record target. `color` comes from a `color` key-value (a `u8`
/// [`LogColor`] repr), otherwise from the level.
#[derive(Clone, Debug)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub color: LogColor,
    pub component: Ustr,
    pub message: String,
}

impl LogLine {
    fn from_record(record: &Record<'_>) -> Self {
        let kv = record.key_values();
        let level = record.level();
        let color = kv
            .get(KV_COLOR.into())
            .and_then(|value| value.to_u64())
            .and_then(|repr| u8::try_from(repr).ok())
            .map_or_else(|| LogColor::from(level), LogColor::from);
        let component = kv
            .get(KV_COMPONENT.into())
            .map_or_else(
                || Ustr::from(record.target()),
                |value| Ustr::from(value.to_string().as_str()),
            );

        Self {
            timestamp: Utc::now(),
            level,
            color,
            component,
            message: record.args().to_string(),
        }
    }
}

impl Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.component, self.message)
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    algo_id: &'a str,
    level: &'a str,
    color: LogColor,
    component: &'a str,
    message: &'a str,
}

/// A line and its renderings, each built at most once.
struct RenderedLine {
    line: LogLine,
    algo_id: Ustr,
    plain: OnceCell<String>,
    colored: OnceCell<String>,
}

impl RenderedLine {
    const fn new(line: LogLine, algo_id: Ustr) -> Self {
        Self {
            line,
            algo_id,
            plain: OnceCell::new(),
            colored: OnceCell::new(),
        }
    }

    fn plain(&self) -> &str {
        self.plain.get_or_init(|| {
            let LogLine { timestamp, level, component, message, .. } = &self.line;
            let ts = format_iso8601(*timestamp);
            format!("{ts} [{level}] {}.{component}: {message}\n", self.algo_id)
        })
    }

    fn colored(&self) -> &str {
        self.colored.get_or_init(|| {
            let LogLine { timestamp, level, color, component, message } = &self.line;
            let ts = format_iso8601(*timestamp);
            let ansi = color.as_ansi();
            let algo_id = self.algo_id;
            format!("\x1b[1m{ts}\x1b[0m {ansi}[{level}] {algo_id}.{component}: {message}\x1b[0m\n")
        })
    }

    fn json(&self) -> String {
        let json = JsonLine {
            timestamp: format_iso8601(self.line.timestamp),
            algo_id: &self.algo_id,
            level: self.line.level.as_str(),
            color: self.line.color,
            component: &self.line.component,
            message: &self.line.message,
        };
        match serde_json::to_string(&json) {
            Ok(text) => text + "\n",
            Err(e) => {
                eprintln!("{NEXUS_PREFIX} Failed to encode log line as JSON: {e}");
                String::new()
            }
        }
    }
}

/// Per-component and per-module level overrides.
#[derive(Clone, Debug, Default)]
pub struct LineFilter {
    /// Sorted by descending path length, so the first match is the longest prefix.
    modules: Vec<(Ustr, LevelFilter)>,
    components: AHashMap<Ustr, LevelFilter>,
    components_only: bool,
}

impl LineFilter {
    #[must_use]
    pub fn new(config: &LoggerConfig) -> Self {
        let mut modules: Vec<_> = config.module_level.iter().map(|(k, v)| (*k, *v)).collect();
        modules.sort_by_key(|(path, _)| std::cmp::Reverse(path.len()));
        Self {
            modules,
            components: config.component_level.clone(),
            components_only: config.log_components_only,
        }
    }

    /// Returns whether a line from `component` at `level` is dropped.
    ///
    /// A module override takes precedence over a component override.
    #[must_use]
    pub fn rejects(&self, component: &Ustr, level: Level) -> bool {
        let module = self
            .modules
            .iter()
            .find(|(path, _)| is_within(component, path))
            .map(|(_, max)| *max);

        match module.or_else(|| self.components.get(component).copied()) {
            Some(max) => level > max,
            None => self.components_only,
        }
    }
}

/// Returns whether `component` is the module `path` or lies under it.
fn is_within(component: &str, path: &str) -> bool {
    component
        .strip_prefix(path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// The writers, owned by the logging thread.
struct LogSink {
    algo_id: Ustr,
    is_colored: bool,
    filter: LineFilter,
    stdout: ConsoleWriter,
    stderr: ConsoleWriter,
    file: Option<FileWriter>,
}

impl LogSink {
    fn new(
        algo_id: Ustr,
        instance_id: &str,
        config: &LoggerConfig,
        file_config: FileWriterConfig,
    ) -> Self {
        let file = if config.fileout_level == LevelFilter::Off {
            None
        } else {
            FileWriter::open(file_config, algo_id, instance_id, config.fileout_level)
                .inspect_err(|e| eprintln!("{NEXUS_PREFIX} Log file disabled: {e}"))
                .ok()
        };

        Self {
            algo_id,
            is_colored: config.is_colored,
            filter: LineFilter::new(config),
            stdout: ConsoleWriter::stdout(config.stdout_level),
            stderr: ConsoleWriter::stderr(),
            file,
        }
    }

    fn write(&mut self, line: LogLine) {
        let level = line.level;
        if self.filter.rejects(&line.component, level) {
            return;
        }

        let rendered = RenderedLine::new(line, self.algo_id);
        for console in [&mut self.stderr, &mut self.stdout] {
            if console.accepts(level) {
                let text = if self.is_colored { rendered.colored() } else { rendered.plain() };
                console.write(text);
            }
        }

        if let Some(file) = &mut self.file
            && file.accepts(level)
        {
            match file.format() {
                FileFormat::Plain => file.write(rendered.plain()),
                FileFormat::Json => file.write(&rendered.json()),
            }
        }
    }

    fn flush(&mut self) {
        self.stdout.flush();
        self.stderr.flush();
        if let Some(file) = &mut self.file {
            file.flush();
        }
    }

    fn run(mut self, rx: Receiver<LogEvent>) {
        while let Ok(event) = rx.recv() {
            match event {
                LogEvent::Line(line) => self.write(line),
                LogEvent::Flush => self.flush(),
                LogEvent::Close => {
                    for event in rx.try_iter() {
                        if let LogEvent::Line(line) = event {
                            self.write(line);
                        }
                    }
                    self.flush();
                    return;
                }
            }
        }
    }
}

/// The `log` implementation. Records are handed to the logging thread.
#[derive(Debug)]
pub struct Logger {
    pub config: LoggerConfig,
    tx: Sender<LogEvent>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        let level = metadata.level();
        !BYPASSED.load(Ordering::Relaxed)
            && (level == Level::Error
                || level <= self.config.stdout_level
                || level <= self.config.fileout_level)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Err(SendError(LogEvent::Line(line))) =
            self.tx.send(LogEvent::Line(LogLine::from_record(record)))
        {
            eprintln!("{NEXUS_PREFIX} Logging thread gone, dropped: {line}");
        }
    }

    fn flush(&self) {
        if !BYPASSED.load(Ordering::Relaxed) {
            let _ = self.tx.send(LogEvent::Flush);
        }
    }
}

impl Logger {
    /// Installs the logger and starts the logging thread.
    ///
    /// A second call while logging is running returns another guard and
    /// leaves the running configuration in place.
    ///
    /// # Errors
    ///
    /// Returns an error if another `log` implementation is installed, or the
    /// logging thread cannot be spawned.
    pub fn init(
        algo_id: Ustr,
        instance_id: Uuid,
        config: LoggerConfig,
        file_config: FileWriterConfig,
    ) -> anyhow::Result<LogGuard> {
        if !INITIALIZED.load(Ordering::SeqCst) {
            Self::install(algo_id, instance_id, config, file_config)?;
        }
        LogGuard::new().ok_or_else(|| anyhow::anyhow!("No log guard available"))
    }

    fn install(
        algo_id: Ustr,
        instance_id: Uuid,
        config: LoggerConfig,
        file_config: FileWriterConfig,
    ) -> anyhow::Result<()> {
        if config.print_config {
            println!("{NEXUS_PREFIX} Logging {config:?} to {file_config:?}");
        }

        let (tx, rx) = mpsc::channel();
        let sink = LogSink::new(algo_id, &instance_id.simple().to_string(), &config, file_config);
        let is_colored = config.is_colored;

        set_boxed_logger(Box::new(Self {
            config,
            tx: tx.clone(),
        }))?;
        SENDER
            .set(tx)
            .map_err(|_| anyhow::anyhow!("Logging cannot be installed twice in one process"))?;

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || sink.run(rx))?;
        if let Ok(mut worker) = WORKER.lock() {
            *worker = Some(handle);
        }

        set_max_level(LevelFilter::Trace);
        COLORED.store(is_colored, Ordering::SeqCst);
        INITIALIZED.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Stops accepting records, writes what is queued and joins the logging thread.
///
/// Calling it again is a no-op.
pub(crate) fn shutdown() {
    BYPASSED.store(true, Ordering::SeqCst);
    set_max_level(LevelFilter::Off);

    if let Some(tx) = SENDER.get() {
        let _ = tx.send(LogEvent::Close);
    }

    let worker = WORKER.lock().ok().and_then(|mut worker| worker.take());
    if let Some(handle) = worker
        && handle.thread().id() != thread::current().id()
    {
        let _ = handle.join();
    }
    INITIALIZED.store(false, Ordering::SeqCst);
}

/// Keeps logging running while held.
///
/// Dropping a guard flushes every writer. Dropping the last live guard shuts
/// logging down, so hold one for as long as the run lasts. At most 255 guards
/// can be live at once.
#[derive(Debug)]
pub struct LogGuard {
    tx: Sender<LogEvent>,
}

impl LogGuard {
    /// Returns a new guard, or `None` before logging is installed or when 255
    /// guards are already live.
    #[must_use]
    pub fn new() -> Option<Self> {
        let tx = SENDER.get()?.clone();
        GUARDS
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()?;
        Some(Self { tx })
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let live = GUARDS
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);

        if live == 1 {
            shutdown();
        } else {
            let _ = self.tx.send(LogEvent::Flush);
        }
    }
}
