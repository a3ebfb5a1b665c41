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

//! The callback surface a live strategy implements.

use crate::api::AlgorithmApi;

/// A trading strategy driven by [`LiveTradingAlgorithm`](crate::LiveTradingAlgorithm).
///
/// State that must survive a restart is kept in the
/// [`AlgorithmContext`](crate::AlgorithmContext) reached through the API
/// handle. Fields of the implementing type are not checkpointed.
pub trait Strategy {
    /// One-time setup, skipped when a compatible checkpoint is restored.
    ///
    /// # Errors
    ///
    /// Returns an error if setup fails. The run is aborted and no checkpoint
    /// is written.
    fn initialize(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()>;

    /// Called once per bar, followed by a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the run.
    fn handle_data(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()>;

    /// Called at the pre-market minute of each session. Orders are rejected here.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the run.
    fn before_trading_start(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        let _ = api;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error to abort the run.
    fn on_session_start(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        let _ = api;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error to abort the run.
    fn on_session_end(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        let _ = api;
        Ok(())
    }
}
