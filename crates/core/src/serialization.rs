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

//! JSON and MsgPack encoding traits, plus serde helpers for decimals.
//!
//! MsgPack support comes for free: every [`Serializable`] type also
//! implements [`FromMsgPack`] and [`ToMsgPack`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub trait Serializable: Serialize + for<'de> Deserialize<'de> {
    /// Decodes a value from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not valid JSON for `Self`.
    fn from_json_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Encodes the value as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `Self` cannot be represented as JSON, such as a
    /// map with non-string keys.
    fn to_json_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

pub use self::msgpack::{FromMsgPack, ToMsgPack};

pub mod msgpack {
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};

    use super::Serializable;

    pub trait FromMsgPack: for<'de> Deserialize<'de> + Sized {
        /// Decodes a value from MsgPack.
        ///
        /// # Errors
        ///
        /// Returns an error if `data` is not valid MsgPack for `Self`.
        fn from_msgpack_bytes(data: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
            rmp_serde::from_slice(data)
        }
    }

    pub trait ToMsgPack: Serialize {
        /// Encodes the value as MsgPack, keeping struct field names so that
        /// fields can be added without breaking older payloads.
        ///
        /// # Errors
        ///
        /// Returns an error if `Self` cannot be represented as MsgPack.
        fn to_msgpack_bytes(&self) -> Result<Bytes, rmp_serde::encode::Error> {
            rmp_serde::to_vec_named(self).map(Bytes::from)
        }
    }

    impl<T: Serializable> FromMsgPack for T {}

    impl<T: Serializable> ToMsgPack for T {}
}

/// `#[serde(with = "decimal_str")]` for a `Decimal` written as a string,
/// so no precision is lost to a float on the way through JSON.
pub mod decimal_str {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// # Errors
    ///
    /// Returns any error raised by `serializer`.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// # Errors
    ///
    /// Returns an error if the input is not a string holding a decimal.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let text = String::deserialize(deserializer)?;
        Decimal::from_str(&text).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "optional_decimal_str")]` for an `Option<Decimal>`, written
/// as a string or `null`. An empty string reads as `None`.
pub mod optional_decimal_str {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// # Errors
    ///
    /// Returns any error raised by `serializer`.
    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(decimal) => serializer.collect_str(decimal),
            None => serializer.serialize_none(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if a present value is not a decimal string.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) if !text.is_empty() => {
                Decimal::from_str(&text).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct SavedState {
        counter: u32,
        symbol: String,
        #[serde(default)]
        halted: bool,
    }

    impl Serializable for SavedState {}

    fn state() -> SavedState {
        SavedState {
            counter: 7,
            symbol: "AAPL".to_string(),
            halted: false,
        }
    }

    #[rstest]
    fn test_json_is_compact() {
        let bytes = state().to_json_bytes().unwrap();
        assert_eq!(&bytes[..], br#"{"counter":7,"symbol":"AAPL","halted":false}"#);
    }

    #[rstest]
    fn test_msgpack_keeps_field_names() {
        let bytes = state().to_msgpack_bytes().unwrap();
        assert!(bytes.windows(b"symbol".len()).any(|w| w == b"symbol"));
        assert_eq!(SavedState::from_msgpack_bytes(&bytes).unwrap(), state());
    }

    #[rstest]
    fn test_missing_field_with_default() {
        let parsed = SavedState::from_json_bytes(br#"{"counter":1,"symbol":"X"}"#).unwrap();
        assert!(!parsed.halted);
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(br#"{"counter":"one"}"#.as_slice())]
    fn test_json_invalid_data(#[case] data: &[u8]) {
        assert!(SavedState::from_json_bytes(data).is_err());
    }

    #[rstest]
    fn test_msgpack_invalid_data() {
        assert!(SavedState::from_msgpack_bytes(b"invalid msgpack data").is_err());
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Prices {
        #[serde(with = "decimal_str")]
        limit: Decimal,
        #[serde(default, with = "optional_decimal_str")]
        stop: Option<Decimal>,
    }

    #[rstest]
    fn test_decimals_written_as_strings() {
        let prices = Prices {
            limit: dec!(123.456789012345678),
            stop: Some(dec!(0.000000001)),
        };

        let json = serde_json::to_string(&prices).unwrap();

        assert_eq!(json, r#"{"limit":"123.456789012345678","stop":"0.000000001"}"#);
        assert_eq!(serde_json::from_str::<Prices>(&json).unwrap(), prices);
    }

    #[rstest]
    #[case(r#"{"limit":"1.5"}"#, None)]
    #[case(r#"{"limit":"1.5","stop":null}"#, None)]
    #[case(r#"{"limit":"1.5","stop":""}"#, None)]
    #[case(r#"{"limit":"1.5","stop":"1.25"}"#, Some(dec!(1.25)))]
    fn test_optional_decimal(#[case] json: &str, #[case] expected: Option<Decimal>) {
        let parsed: Prices = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.limit, dec!(1.5));
        assert_eq!(parsed.stop, expected);
    }

    #[rstest]
    #[case(r#"{"limit":1.5}"#)]
    #[case(r#"{"limit":"abc"}"#)]
    fn test_decimal_rejects_non_decimal_strings(#[case] json: &str) {
        assert!(serde_json::from_str::<Prices>(json).is_err());
    }
}
