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

//! Common components for the nexus live trading layer.
//!
//! - `clock`: sessions, calendars, and the live and simulation clocks.
//! - `enums`: log levels and colors.
//! - `logging`: the channel-backed logger behind the `log` facade.
//!
//! # Feature flags
//!
//! - `stubs`: session and schedule fixtures for tests.
//! - `tracing-bridge`: a `tracing` subscriber for external crates.

#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]

pub mod clock;
pub mod enums;
pub mod logging;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;
