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

//! The strategy's attribute store.

use indexmap::IndexMap;
use nexus_core::correctness::check_valid_string;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use ustr::Ustr;

/// Named attributes set by a strategy, in insertion order.
///
/// Everything a strategy needs to survive a restart belongs here: the
/// checkpoint store persists attribute values, never the strategy struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgorithmContext {
    attributes: IndexMap<Ustr, Value>,
}

impl AlgorithmContext {
    /// Creates a new empty [`AlgorithmContext`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets attribute `name` to the serialized form of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty or whitespace, or if `value`
    /// cannot be represented as JSON.
    pub fn set<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> anyhow::Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| anyhow::anyhow!("Failed to serialize attribute '{name}': {e}"))?;
        self.set_value(name, value).map(|_| ())
    }

    /// Sets attribute `name` to `value`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty or whitespace.
    pub fn set_value(&mut self, name: &str, value: Value) -> anyhow::Result<Option<Value>> {
        check_valid_string(name, "name")?;
        Ok(self.attributes.insert(Ustr::from(name), value))
    }

    /// Returns attribute `name` deserialized as `T`, or `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not a valid `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<Option<T>> {
        self.get_value(name)
            .map(|value| {
                T::deserialize(value)
                    .map_err(|e| anyhow::anyhow!("Attribute '{name}' has unexpected type: {e}"))
            })
            .transpose()
    }

    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.attributes.get(&Ustr::from(name))
    }

    /// Removes attribute `name`, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.shift_remove(&Ustr::from(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(&Ustr::from(name))
    }

    pub fn names(&self) -> impl Iterator<Item = Ustr> + '_ {
        self.attributes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ustr, &Value)> {
        self.attributes.iter().map(|(name, value)| (*name, value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Sets a value the driver owns, such as the algorithm id.
    pub(crate) fn set_reserved(&mut self, name: &str, value: Value) {
        self.attributes.insert(Ustr::from(name), value);
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Position {
        symbol: String,
        quantity: i64,
    }

    #[fixture]
    fn context() -> AlgorithmContext {
        let mut context = AlgorithmContext::new();
        context.set("counter", &3).unwrap();
        context.set("symbols", &["AAPL", "MSFT"]).unwrap();
        context
    }

    #[rstest]
    fn test_typed_get(context: AlgorithmContext) {
        assert_eq!(context.get::<u32>("counter").unwrap(), Some(3));
        assert_eq!(
            context.get::<Vec<String>>("symbols").unwrap(),
            Some(vec!["AAPL".to_string(), "MSFT".to_string()])
        );
        assert_eq!(context.get::<u32>("missing").unwrap(), None);
    }

    #[rstest]
    fn test_get_wrong_type(context: AlgorithmContext) {
        let err = context.get::<String>("counter").unwrap_err();
        assert!(err.to_string().contains("Attribute 'counter'"));
    }

    #[rstest]
    fn test_struct_values(mut context: AlgorithmContext) {
        let position = Position {
            symbol: "AAPL".to_string(),
            quantity: -10,
        };
        context.set("position", &position).unwrap();
        assert_eq!(context.get::<Position>("position").unwrap(), Some(position));
    }

    #[rstest]
    fn test_set_value_returns_previous(mut context: AlgorithmContext) {
        let previous = context.set_value("counter", json!(4)).unwrap();
        assert_eq!(previous, Some(json!(3)));
        assert_eq!(context.get_value("counter"), Some(&json!(4)));
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    fn test_invalid_name(mut context: AlgorithmContext, #[case] name: &str) {
        assert!(context.set(name, &1).is_err());
        assert_eq!(context.len(), 2);
    }

    #[rstest]
    fn test_order_preserved_on_remove(mut context: AlgorithmContext) {
        context.set("last", &true).unwrap();
        assert_eq!(context.remove("symbols"), Some(json!(["AAPL", "MSFT"])));
        assert!(!context.contains("symbols"));

        let names: Vec<_> = context.names().map(|name| name.to_string()).collect();
        assert_eq!(names, vec!["counter", "last"]);
    }
}
