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

//! The scoped handle passed to strategy callbacks.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

use crate::{
    broker::{Broker, OrderId, OrderRequest},
    context::AlgorithmContext,
    error::TradingError,
    phase::{Operation, TradingPhase},
};

/// Access to the context and broker for the duration of one callback.
///
/// Broker operations are checked against the current [`TradingPhase`]; a
/// rejected operation never reaches the broker.
pub struct AlgorithmApi<'a> {
    context: &'a mut AlgorithmContext,
    broker: &'a mut dyn Broker,
    phase: TradingPhase,
    now: DateTime<Utc>,
}

impl Debug for AlgorithmApi<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(AlgorithmApi))
            .field("phase", &self.phase)
            .field("now", &self.now)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<'a> AlgorithmApi<'a> {
    /// Creates a new [`AlgorithmApi`] instance.
    pub fn new(
        context: &'a mut AlgorithmContext,
        broker: &'a mut dyn Broker,
        phase: TradingPhase,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            context,
            broker,
            phase,
            now,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> TradingPhase {
        self.phase
    }

    /// The timestamp of the event being handled.
    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub fn context(&self) -> &AlgorithmContext {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut AlgorithmContext {
        self.context
    }

    /// Checks `operation` is permitted in the current phase.
    ///
    /// # Errors
    ///
    /// Returns [`TradingError::NotPermitted`] if it is not.
    pub fn check_permitted(&self, operation: Operation) -> Result<(), TradingError> {
        if self.phase.permits(operation) {
            Ok(())
        } else {
            Err(TradingError::NotPermitted {
                operation,
                phase: self.phase,
            })
        }
    }

    /// Submits `request` to the broker.
    ///
    /// # Errors
    ///
    /// Returns [`TradingError::NotPermitted`] outside the trading phase, or
    /// the broker's error.
    pub fn order(&mut self, request: OrderRequest) -> anyhow::Result<OrderId> {
        self.check_permitted(Operation::SubmitOrder)?;
        log::info!(
            "Submitting order {} {} {}",
            request.client_order_id,
            request.symbol,
            request.quantity
        );
        self.broker.submit_order(request)
    }

    /// Cancels the open order `order_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TradingError::NotPermitted`] outside the pre-market and
    /// trading phases, or the broker's error.
    pub fn cancel_order(&mut self, order_id: &OrderId) -> anyhow::Result<()> {
        self.check_permitted(Operation::CancelOrder)?;
        log::info!("Cancelling order {order_id}");
        self.broker.cancel_order(order_id)
    }
}
