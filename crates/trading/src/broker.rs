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

//! The broker seam and the orders passed through it.

use std::fmt::{Debug, Display};

use chrono::TimeDelta;
use nexus_core::{
    correctness::{check_predicate_false, check_predicate_true, check_valid_string},
    serialization::{decimal_str, optional_decimal_str},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;
use uuid::Uuid;

/// A broker-assigned order identifier.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Ustr);

impl OrderId {
    /// Creates a new [`OrderId`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is empty or whitespace.
    pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
        let value = value.as_ref();
        check_valid_string(value, stringify!(value))?;
        Ok(Self(Ustr::from(value)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Uuid> for OrderId {
    fn from(value: Uuid) -> Self {
        Self(Ustr::from(value.to_string().as_str()))
    }
}

impl Debug for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order as requested by a strategy.
///
/// A positive `quantity` buys and a negative one sells. With neither price
/// set the order is a market order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub client_order_id: Uuid,
    pub symbol: Ustr,
    #[serde(with = "decimal_str")]
    pub quantity: Decimal,
    #[serde(default, with = "optional_decimal_str")]
    pub limit_price: Option<Decimal>,
    #[serde(default, with = "optional_decimal_str")]
    pub stop_price: Option<Decimal>,
}

impl OrderRequest {
    /// Creates a new market [`OrderRequest`] with a random client order ID.
    ///
    /// # Errors
    ///
    /// Returns an error if `symbol` is empty or `quantity` is zero.
    pub fn new<T: AsRef<str>>(symbol: T, quantity: Decimal) -> anyhow::Result<Self> {
        let symbol = symbol.as_ref();
        check_valid_string(symbol, stringify!(symbol))?;
        check_predicate_false(quantity.is_zero(), "`quantity` was zero")?;

        Ok(Self {
            client_order_id: Uuid::new_v4(),
            symbol: Ustr::from(symbol),
            quantity,
            limit_price: None,
            stop_price: None,
        })
    }

    /// Sets the limit price.
    ///
    /// # Errors
    ///
    /// Returns an error if `price` is not positive.
    pub fn with_limit_price(mut self, price: Decimal) -> anyhow::Result<Self> {
        check_predicate_true(price > Decimal::ZERO, "`limit_price` was not positive")?;
        self.limit_price = Some(price);
        Ok(self)
    }

    /// Sets the stop price.
    ///
    /// # Errors
    ///
    /// Returns an error if `price` is not positive.
    pub fn with_stop_price(mut self, price: Decimal) -> anyhow::Result<Self> {
        check_predicate_true(price > Decimal::ZERO, "`stop_price` was not positive")?;
        self.stop_price = Some(price);
        Ok(self)
    }

    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.quantity.is_sign_positive()
    }
}

/// The execution venue a live run trades through.
pub trait Broker {
    /// The offset to add to local wall-clock time to get the broker's time.
    fn clock_offset(&self) -> TimeDelta {
        TimeDelta::zero()
    }

    /// Submits `order`, returning the broker's identifier for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker rejects or fails to submit the order.
    fn submit_order(&mut self, order: OrderRequest) -> anyhow::Result<OrderId>;

    /// Cancels the open order `order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker fails to cancel the order.
    fn cancel_order(&mut self, order_id: &OrderId) -> anyhow::Result<()>;
}
