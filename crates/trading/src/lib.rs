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

//! Live strategy execution for the nexus trading layer.
//!
//! The [`LiveTradingAlgorithm`] walks a [`LiveClock`](nexus_common::clock::LiveClock)
//! in real time, dispatches each event to a [`Strategy`] callback, and
//! checkpoints the strategy's [`AlgorithmContext`] so a restarted process
//! resumes without repeating its one-time setup.
//!
//! - `algorithm`: the live execution driver.
//! - `api`: the scoped handle passed to strategy callbacks.
//! - `broker`: the broker seam and order requests.
//! - `config`: TOML run configuration.
//! - `context`: the strategy's attribute store.
//! - `persistence`: fingerprinted checkpoints of the context.
//! - `phase`: trading phases and the operations each permits.

#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]

pub mod algorithm;
pub mod api;
pub mod broker;
pub mod config;
pub mod context;
pub mod error;
pub mod persistence;
pub mod phase;
pub mod strategy;

#[cfg(test)]
pub(crate) mod stubs;

pub use crate::{
    algorithm::{LiveTradingAlgorithm, RunStats},
    api::AlgorithmApi,
    broker::{Broker, OrderId, OrderRequest},
    config::LiveTradingConfig,
    context::AlgorithmContext,
    error::{CheckpointError, TradingError},
    persistence::{Checkpoint, CheckpointEncoding, CheckpointStore},
    phase::{Operation, TradingPhase},
    strategy::Strategy,
};
