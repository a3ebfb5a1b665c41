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

//! Core primitives shared by the nexus live trading crates.
//!
//! - `correctness`: predicate checks returning `anyhow::Result` for argument validation.
//! - `datetime`: minute-boundary arithmetic for UTC timestamps.
//! - `serialization`: JSON and MsgPack encoding traits, decimal serde helpers.

#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]

pub mod correctness;
pub mod datetime;
pub mod serialization;

/// The prefix used when writing directly to stderr, outside of the logging subsystem.
pub const NEXUS_PREFIX: &str = "[nexus]";

pub use crate::serialization::Serializable;
