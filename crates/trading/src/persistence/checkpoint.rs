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

//! Fingerprinted checkpoints of an [`AlgorithmContext`].
//!
//! A checkpoint holds every context attribute outside the [`ExclusionSet`],
//! tagged with the [`Fingerprint`] of the algorithm source that wrote it.
//! Writes go to `<path>.tmp` first and are renamed over `path` once synced,
//! so a crash mid-write leaves the previous checkpoint intact.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use ahash::AHashSet;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::kv::ToValue;
use nexus_core::{
    correctness::check_valid_string,
    serialization::{FromMsgPack, Serializable, ToMsgPack},
};
use nexus_cryptography::Fingerprint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use ustr::Ustr;

use crate::{context::AlgorithmContext, error::CheckpointError};

const COMPONENT: &str = "CheckpointStore";

/// The checkpoint format version written by this crate.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Attribute names never persisted, whatever the context holds.
pub const ALWAYS_EXCLUDED: [&str; 5] = ["broker", "clock", "driver", "time_source", "logger"];

/// The persisted state of a strategy context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub fingerprint: Fingerprint,
    pub ts_saved: DateTime<Utc>,
    pub payload: BTreeMap<String, Value>,
}

impl Serializable for Checkpoint {}

impl Checkpoint {
    /// Captures the attributes of `context` not in `exclude`.
    #[must_use]
    pub fn capture(
        context: &AlgorithmContext,
        fingerprint: Fingerprint,
        exclude: &ExclusionSet,
        ts_saved: DateTime<Utc>,
    ) -> Self {
        let payload = context
            .iter()
            .filter(|(name, _)| !exclude.contains(name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        Self {
            version: CHECKPOINT_VERSION,
            fingerprint,
            ts_saved,
            payload,
        }
    }

    /// Sets every persisted attribute on `context`, returning how many were set.
    ///
    /// Every name is checked first. A name that is blank or in `exclude`
    /// fails the whole checkpoint and leaves `context` untouched.
    fn apply(
        self,
        context: &mut AlgorithmContext,
        exclude: &ExclusionSet,
        path: &Path,
    ) -> Result<usize, CheckpointError> {
        let decode_error = |message: String| CheckpointError::Decode {
            path: path.to_path_buf(),
            message,
        };

        for name in self.payload.keys() {
            if exclude.contains(name) {
                return Err(decode_error(format!("persisted attribute '{name}' is excluded")));
            }
            check_valid_string(name, "attribute name")
                .map_err(|e| decode_error(format!("persisted attribute '{name}': {e}")))?;
        }

        let count = self.payload.len();
        for (name, value) in self.payload {
            context
                .set_value(&name, value)
                .map_err(|e| decode_error(e.to_string()))?;
        }
        Ok(count)
    }

    fn encode(&self, encoding: CheckpointEncoding) -> Result<Bytes, CheckpointError> {
        match encoding {
            CheckpointEncoding::Json => self
                .to_json_bytes()
                .map_err(|e| CheckpointError::Encode(e.to_string())),
            CheckpointEncoding::MsgPack => self
                .to_msgpack_bytes()
                .map_err(|e| CheckpointError::Encode(e.to_string())),
        }
    }

    fn decode(
        data: &[u8],
        encoding: CheckpointEncoding,
        path: &Path,
    ) -> Result<Self, CheckpointError> {
        let decoded = match encoding {
            CheckpointEncoding::Json => Self::from_json_bytes(data).map_err(|e| e.to_string()),
            CheckpointEncoding::MsgPack => {
                Self::from_msgpack_bytes(data).map_err(|e| e.to_string())
            }
        };
        decoded.map_err(|message| CheckpointError::Decode {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// The on-disk encoding of a [`Checkpoint`].
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
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckpointEncoding {
    #[default]
    Json,
    MsgPack,
}

/// Attribute names excluded from checkpoints.
///
/// Computed once, from the names present on the context when the driver is
/// built plus [`ALWAYS_EXCLUDED`]. Anything a strategy adds later is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: AHashSet<Ustr>,
}

impl ExclusionSet {
    /// Creates a new [`ExclusionSet`] from the current names of `context`.
    #[must_use]
    pub fn from_context(context: &AlgorithmContext) -> Self {
        let names = ALWAYS_EXCLUDED
            .iter()
            .map(|name| Ustr::from(*name))
            .chain(context.names())
            .collect();
        Self { names }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&Ustr::from(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Reads and writes the checkpoint file at one path.
#[derive(Clone, Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    encoding: CheckpointEncoding,
}

impl CheckpointStore {
    /// Creates a new [`CheckpointStore`] instance.
    pub fn new<P: Into<PathBuf>>(path: P, encoding: CheckpointEncoding) -> Self {
        Self {
            path: path.into(),
            encoding,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn encoding(&self) -> CheckpointEncoding {
        self.encoding
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }

    /// Saves the attributes of `context` not in `exclude`, tagged with `fingerprint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be encoded or written. The
    /// previous checkpoint, if any, is left in place.
    pub fn save(
        &self,
        context: &AlgorithmContext,
        fingerprint: Fingerprint,
        exclude: &ExclusionSet,
    ) -> Result<Checkpoint, CheckpointError> {
        let checkpoint = Checkpoint::capture(context, fingerprint, exclude, Utc::now());
        let data = checkpoint.encode(self.encoding)?;
        let tmp_path = self.tmp_path();

        if let Err(e) = self.write_atomic(&tmp_path, &data) {
            if let Err(remove_err) = fs::remove_file(&tmp_path)
                && remove_err.kind() != ErrorKind::NotFound
            {
                log::warn!(
                    component = COMPONENT.to_value();
                    "Failed to remove {}: {remove_err}",
                    tmp_path.display()
                );
            }
            return Err(e);
        }

        log::debug!(
            component = COMPONENT.to_value();
            "Saved {} attributes to {}",
            checkpoint.payload.len(),
            self.path.display()
        );
        Ok(checkpoint)
    }

    fn write_atomic(&self, tmp_path: &Path, data: &[u8]) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| CheckpointError::io(parent, e))?;
        }

        let mut file = File::create(tmp_path).map_err(|e| CheckpointError::io(tmp_path, e))?;
        file.write_all(data)
            .map_err(|e| CheckpointError::io(tmp_path, e))?;
        file.sync_all()
            .map_err(|e| CheckpointError::io(tmp_path, e))?;
        drop(file);

        fs::rename(tmp_path, &self.path).map_err(|e| CheckpointError::io(&self.path, e))
    }

    /// Reads and decodes the checkpoint without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NotFound`] if there is no checkpoint, or an
    /// error if it cannot be read, decoded, or has an unsupported version.
    pub fn load(&self) -> Result<Checkpoint, CheckpointError> {
        let data = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CheckpointError::NotFound {
                path: self.path.clone(),
            },
            _ => CheckpointError::io(&self.path, e),
        })?;

        let checkpoint = Checkpoint::decode(&data, self.encoding, &self.path)?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                path: self.path.clone(),
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(checkpoint)
    }

    /// Restores the checkpoint into `context` if it was written under `fingerprint`.
    ///
    /// Returns the number of attributes set. The checkpoint is applied whole
    /// or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Incompatible`] if the fingerprints differ,
    /// [`CheckpointError::Decode`] if it holds a blank name or one in
    /// `exclude`, or any error from [`Self::load`]. On error `context` is
    /// left untouched.
    pub fn restore(
        &self,
        context: &mut AlgorithmContext,
        fingerprint: Fingerprint,
        exclude: &ExclusionSet,
    ) -> Result<usize, CheckpointError> {
        let checkpoint = self.load()?;

        if checkpoint.fingerprint != fingerprint {
            return Err(CheckpointError::Incompatible {
                path: self.path.clone(),
                expected: fingerprint,
                found: checkpoint.fingerprint,
            });
        }

        let ts_saved = checkpoint.ts_saved;
        let count = checkpoint.apply(context, exclude, &self.path)?;
        log::info!(
            component = COMPONENT.to_value();
            "Restored {count} attributes from {} saved at {ts_saved}",
            self.path.display()
        );
        Ok(count)
    }

    /// Deletes the checkpoint, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self) -> Result<bool, CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CheckpointError::io(&self.path, e)),
        }
    }
}
