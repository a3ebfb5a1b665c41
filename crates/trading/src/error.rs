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

//! Error types for live trading.

use std::path::PathBuf;

use nexus_common::clock::ScheduleError;
use nexus_cryptography::Fingerprint;

use crate::phase::{Operation, TradingPhase};

/// An error reading or writing a checkpoint.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error at '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode checkpoint: {0}")]
    Encode(String),
    #[error("Failed to decode checkpoint '{}': {message}", .path.display())]
    Decode { path: PathBuf, message: String },
    #[error(
        "Checkpoint '{}' was written by algorithm {found}, expected {expected}",
        .path.display()
    )]
    Incompatible {
        path: PathBuf,
        expected: Fingerprint,
        found: Fingerprint,
    },
    #[error("Checkpoint '{}' has unsupported version {found}, expected {supported}", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
    #[error("No checkpoint at '{}'", .path.display())]
    NotFound { path: PathBuf },
}

impl CheckpointError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// An error raised by the live trading driver or the strategy API.
#[derive(Debug, thiserror::Error)]
pub enum TradingError {
    #[error("{operation} is not permitted during {phase}")]
    NotPermitted {
        operation: Operation,
        phase: TradingPhase,
    },
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
