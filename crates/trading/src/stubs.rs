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

//! Brokers and strategies for tests.

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::{
    api::AlgorithmApi,
    broker::{Broker, OrderId, OrderRequest},
    strategy::Strategy,
};

/// Records every order operation it receives.
#[derive(Debug, Default)]
pub struct RecordingBroker {
    pub offset: TimeDelta,
    pub submitted: Vec<OrderRequest>,
    pub cancelled: Vec<OrderId>,
}

impl RecordingBroker {
    pub fn with_offset(offset: TimeDelta) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }
}

impl Broker for RecordingBroker {
    fn clock_offset(&self) -> TimeDelta {
        self.offset
    }

    fn submit_order(&mut self, order: OrderRequest) -> anyhow::Result<OrderId> {
        let order_id = OrderId::from(order.client_order_id);
        self.submitted.push(order);
        Ok(order_id)
    }

    fn cancel_order(&mut self, order_id: &OrderId) -> anyhow::Result<()> {
        self.cancelled.push(*order_id);
        Ok(())
    }
}

/// Counts bars in the context attribute `counter`.
#[derive(Debug, Default)]
pub struct CounterStrategy {
    pub order_every_bar: bool,
    pub fail_initialize: bool,
    pub fail_on_bar: Option<usize>,
    pub init_calls: usize,
    pub bars: usize,
    pub sessions_started: usize,
    pub sessions_ended: usize,
    pub rejected_in_bts: Vec<String>,
}

impl Strategy for CounterStrategy {
    fn initialize(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        self.init_calls += 1;
        api.context_mut().set("counter", &0)?;
        api.context_mut().set("symbol", "AAPL")?;
        if self.fail_initialize {
            anyhow::bail!("initialize failed");
        }
        Ok(())
    }

    fn before_trading_start(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        let order = OrderRequest::new("AAPL", Decimal::ONE)?;
        if let Err(e) = api.order(order) {
            self.rejected_in_bts.push(e.to_string());
        }
        Ok(())
    }

    fn handle_data(&mut self, api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        self.bars += 1;
        if self.fail_on_bar == Some(self.bars) {
            anyhow::bail!("bar {} failed", self.bars);
        }

        let counter: i64 = api.context().get("counter")?.unwrap_or_default();
        api.context_mut().set("counter", &(counter + 1))?;

        if self.order_every_bar {
            api.order(OrderRequest::new("AAPL", Decimal::ONE)?)?;
        }
        Ok(())
    }

    fn on_session_start(&mut self, _api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        self.sessions_started += 1;
        Ok(())
    }

    fn on_session_end(&mut self, _api: &mut AlgorithmApi<'_>) -> anyhow::Result<()> {
        self.sessions_ended += 1;
        Ok(())
    }
}
