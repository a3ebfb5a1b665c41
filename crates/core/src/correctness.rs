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

//! Functions for correctness checks similar to the *design by contract* philosophy.
//!
//! An [`anyhow::Result`] is returned with a descriptive message when the
//! condition check fails.

use std::fmt::{Debug, Display};

/// A message prefix that can be used with calls to `expect` or other assertion-related functions.
pub const FAILED: &str = "Condition failed";

/// Checks the `predicate` is true.
///
/// # Errors
///
/// Returns an error if the validation check fails.
#[inline(always)]
pub fn check_predicate_true(predicate: bool, fail_msg: &str) -> anyhow::Result<()> {
    if !predicate {
        anyhow::bail!("{fail_msg}")
    }
    Ok(())
}

/// Checks the `predicate` is false.
///
/// # Errors
///
/// Returns an error if the validation check fails.
#[inline(always)]
pub fn check_predicate_false(predicate: bool, fail_msg: &str) -> anyhow::Result<()> {
    if predicate {
        anyhow::bail!("{fail_msg}")
    }
    Ok(())
}

/// Checks the string `s` is not empty and does not consist only of whitespace.
///
/// # Errors
///
/// Returns an error if the validation check fails.
#[inline(always)]
pub fn check_valid_string<T: AsRef<str>>(s: T, param: &str) -> anyhow::Result<()> {
    let s = s.as_ref();

    if s.is_empty() {
        anyhow::bail!("invalid string for '{param}', was empty");
    }

    if s.chars().all(char::is_whitespace) {
        anyhow::bail!("invalid string for '{param}', was all whitespace");
    }

    Ok(())
}

/// Checks the values are equal.
///
/// # Errors
///
/// Returns an error if the validation check fails.
#[inline(always)]
pub fn check_equal<T: PartialEq + Debug + Display>(
    lhs: &T,
    rhs: &T,
    lhs_param: &str,
    rhs_param: &str,
) -> anyhow::Result<()> {
    if lhs != rhs {
        anyhow::bail!("'{lhs_param}' value of {lhs} was not equal to '{rhs_param}' value of {rhs}");
    }
    Ok(())
}

/// Checks `lhs` is less than or equal to `rhs`.
///
/// # Errors
///
/// Returns an error if the validation check fails.
#[inline(always)]
pub fn check_ordered<T: PartialOrd + Display>(
    lhs: &T,
    rhs: &T,
    lhs_param: &str,
    rhs_param: &str,
) -> anyhow::Result<()> {
    if lhs > rhs {
        anyhow::bail!("'{lhs_param}' value of {lhs} was after '{rhs_param}' value of {rhs}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(true)]
    fn test_check_predicate_true_when_true(#[case] predicate: bool) {
        assert!(check_predicate_true(predicate, "the predicate was false").is_ok());
    }

    #[rstest]
    fn test_check_predicate_true_when_false() {
        let err = check_predicate_true(false, "the predicate was false").unwrap_err();
        assert_eq!(err.to_string(), "the predicate was false");
    }

    #[rstest]
    fn test_check_predicate_false() {
        assert!(check_predicate_false(false, "the predicate was true").is_ok());
        assert!(check_predicate_false(true, "the predicate was true").is_err());
    }

    #[rstest]
    #[case("a")]
    #[case(" a ")]
    #[case("state.ckpt")]
    fn test_check_valid_string_with_valid_value(#[case] s: &str) {
        assert!(check_valid_string(s, "value").is_ok());
    }

    #[rstest]
    #[case("", "was empty")]
    #[case(" ", "was all whitespace")]
    #[case("\t\n", "was all whitespace")]
    fn test_check_valid_string_with_invalid_values(#[case] s: &str, #[case] expected: &str) {
        let err = check_valid_string(s, "value").unwrap_err();
        assert!(err.to_string().contains(expected));
    }

    #[rstest]
    fn test_check_equal() {
        assert!(check_equal(&1, &1, "left", "right").is_ok());
        let err = check_equal(&1, &2, "left", "right").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'left' value of 1 was not equal to 'right' value of 2"
        );
    }

    #[rstest]
    #[case(1, 2, true)]
    #[case(2, 2, true)]
    #[case(3, 2, false)]
    fn test_check_ordered(#[case] lhs: i64, #[case] rhs: i64, #[case] expected: bool) {
        assert_eq!(check_ordered(&lhs, &rhs, "lhs", "rhs").is_ok(), expected);
    }
}
