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

//! Output sinks owned by the logging thread.

use std::{
    fs::{File, OpenOptions, create_dir_all},
    io::{self, BufWriter, Stderr, Stdout, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{NaiveDate, Utc};
use log::{Level, LevelFilter};
use nexus_core::NEXUS_PREFIX;
use regex::Regex;
use serde::Deserialize;
use strum::{Display, EnumString};
use ustr::Ustr;

static ANSI_ESCAPES: OnceLock<Option<Regex>> = OnceLock::new();

/// A destination for rendered log lines.
///
/// Write failures are reported on stderr and otherwise ignored, logging
/// never fails the caller.
pub trait LogWriter {
    /// Returns whether lines at `level` belong in this writer.
    fn accepts(&self, level: Level) -> bool;
    fn write(&mut self, text: &str);
    fn flush(&mut self);
}

#[derive(Debug)]
enum Console {
    Stdout(Stdout),
    Stderr(Stderr),
}

/// Console output.
///
/// Errors go to stderr only. Every other level up to `max_level` goes to stdout.
#[derive(Debug)]
pub struct ConsoleWriter {
    console: Console,
    max_level: LevelFilter,
}

impl ConsoleWriter {
    #[must_use]
    pub fn stdout(max_level: LevelFilter) -> Self {
        Self {
            console: Console::Stdout(io::stdout()),
            max_level,
        }
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self {
            console: Console::Stderr(io::stderr()),
            max_level: LevelFilter::Error,
        }
    }

    const fn name(&self) -> &'static str {
        match self.console {
            Console::Stdout(_) => "stdout",
            Console::Stderr(_) => "stderr",
        }
    }

    fn out(&mut self) -> &mut dyn Write {
        match &mut self.console {
            Console::Stdout(out) => out as &mut dyn Write,
            Console::Stderr(out) => out,
        }
    }
}

impl LogWriter for ConsoleWriter {
    fn accepts(&self, level: Level) -> bool {
        match self.console {
            Console::Stdout(_) => level != Level::Error && level <= self.max_level,
            Console::Stderr(_) => level == Level::Error,
        }
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out().write_all(text.as_bytes()) {
            eprintln!("{NEXUS_PREFIX} Failed writing log line to {}: {e}", self.name());
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.out().flush() {
            eprintln!("{NEXUS_PREFIX} Failed flushing {}: {e}", self.name());
        }
    }
}

/// The layout of a log file.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, Display, EnumString, Deserialize)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// One plain text line per record, ANSI codes removed.
    #[default]
    Plain,
    /// One JSON object per record.
    Json,
}

impl FileFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Plain => "log",
            Self::Json => "json",
        }
    }
}

/// Where the log file goes and how it is written.
///
/// Without a `file_name` the file is named
/// `{algo_id}_{yyyy-mm-dd}_{instance_id}` and a new one is started each UTC
/// day. With a `file_name` the same file is appended to for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileWriterConfig {
    /// Defaults to the working directory. Created when missing.
    pub directory: Option<PathBuf>,
    pub file_name: Option<String>,
    pub file_format: FileFormat,
}

impl FileWriterConfig {
    #[must_use]
    pub const fn new(
        directory: Option<PathBuf>,
        file_name: Option<String>,
        file_format: FileFormat,
    ) -> Self {
        Self {
            directory,
            file_name,
            file_format,
        }
    }

    const fn rolls_daily(&self) -> bool {
        self.file_name.is_none()
    }

    fn path_for(&self, algo_id: Ustr, instance_id: &str, date: NaiveDate) -> io::Result<PathBuf> {
        let stem = match &self.file_name {
            Some(name) => name.clone(),
            None => format!("{algo_id}_{}_{instance_id}", date.format("%Y-%m-%d")),
        };

        let dir = self.directory.clone().unwrap_or_default();
        if !dir.as_os_str().is_empty() {
            create_dir_all(&dir)?;
        }
        Ok(dir.join(format!("{stem}.{}", self.file_format.extension())))
    }
}

/// Appends log lines to a file, starting a new file when the UTC date changes.
#[derive(Debug)]
pub struct FileWriter {
    config: FileWriterConfig,
    algo_id: Ustr,
    instance_id: String,
    max_level: LevelFilter,
    path: PathBuf,
    opened_on: NaiveDate,
    out: BufWriter<File>,
}

impl FileWriter {
    /// Opens (or creates) today's log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be created.
    pub fn open(
        config: FileWriterConfig,
        algo_id: Ustr,
        instance_id: &str,
        max_level: LevelFilter,
    ) -> io::Result<Self> {
        let today = Utc::now().date_naive();
        let path = config.path_for(algo_id, instance_id, today)?;
        let out = BufWriter::new(open_append(&path)?);

        Ok(Self {
            config,
            algo_id,
            instance_id: instance_id.to_string(),
            max_level,
            path,
            opened_on: today,
            out,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn format(&self) -> FileFormat {
        self.config.file_format
    }

    fn roll_if_new_day(&mut self) {
        let today = Utc::now().date_naive();
        if !self.config.rolls_daily() || today == self.opened_on {
            return;
        }

        self.flush();
        let next = self
            .config
            .path_for(self.algo_id, &self.instance_id, today)
            .and_then(|path| open_append(&path).map(|file| (path, file)));

        match next {
            Ok((path, file)) => {
                self.out = BufWriter::new(file);
                self.path = path;
                self.opened_on = today;
            }
            // Keep writing to the current file and retry on the next line
            Err(e) => eprintln!("{NEXUS_PREFIX} Failed to start log file for {today}: {e}"),
        }
    }
}

impl LogWriter for FileWriter {
    fn accepts(&self, level: Level) -> bool {
        level <= self.max_level
    }

    fn write(&mut self, text: &str) {
        self.roll_if_new_day();
        if let Err(e) = self.out.write_all(sanitize(text).as_bytes()) {
            eprintln!("{NEXUS_PREFIX} Failed writing to {}: {e}", self.path.display());
        }
    }

    fn flush(&mut self) {
        let result = self.out.flush().and_then(|()| self.out.get_ref().sync_data());
        if let Err(e) = result {
            eprintln!("{NEXUS_PREFIX} Failed flushing {}: {e}", self.path.display());
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Removes ANSI escape sequences, then every control character except `\n`.
fn sanitize(text: &str) -> String {
    let escapes = ANSI_ESCAPES.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").ok());
    let stripped = match escapes {
        Some(re) => re.replace_all(text, ""),
        None => text.into(),
    };
    stripped
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}
