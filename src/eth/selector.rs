use std::{fmt, str::FromStr};

use alloy::{hex, primitives::keccak256};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Length in bytes of a [`FunctionSelector`].
pub const FUNCTION_SELECTOR_LENGTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("function selector {0} must be 0x-hex encoded")]
    InvalidHex(String),

    #[error("function selector must be {FUNCTION_SELECTOR_LENGTH} bytes in length, got {0}")]
    InvalidLength(usize),
}

/// The first four bytes of the call data of a function call, identifying the function to call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionSelector([u8; FUNCTION_SELECTOR_LENGTH]);

impl FunctionSelector {
    /// Parses a selector from `0x`-prefixed hex, or derives it from a human-readable signature.
    ///
    /// With a `0x`/`0X` prefix the remainder must consist of hex digits only and decode to
    /// exactly four bytes. An odd number of digits is left-padded with a single `0`. Any other
    /// input is treated as a signature such as `"transfer(address,uint256)"` and hashed with
    /// keccak-256.
    ///
    /// # Errors
    ///
    /// * [`SelectorError::InvalidHex`] - the prefixed input contains non-hex characters.
    /// * [`SelectorError::InvalidLength`] - the prefixed input does not decode to four bytes.
    pub fn from_hex(s: &str) -> Result<Self, SelectorError> {
        let Some(digits) = strip_hex_prefix(s) else {
            return Ok(Self::from_signature(s));
        };
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SelectorError::InvalidHex(s.to_owned()));
        }
        let padded = if digits.len() % 2 == 1 { format!("0{digits}") } else { digits.to_owned() };
        let decoded = hex::decode(padded).map_err(|_| SelectorError::InvalidHex(s.to_owned()))?;
        Self::from_stored(&decoded)
    }

    /// Derives the selector of a function signature: the first four bytes of its keccak-256.
    #[must_use]
    pub fn from_signature(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        let mut selector = [0u8; FUNCTION_SELECTOR_LENGTH];
        selector.copy_from_slice(&hash[..FUNCTION_SELECTOR_LENGTH]);
        Self(selector)
    }

    /// Restores a selector from its storage form.
    ///
    /// # Errors
    ///
    /// [`SelectorError::InvalidLength`] unless `bytes` is exactly four bytes long.
    pub fn from_stored(bytes: &[u8]) -> Result<Self, SelectorError> {
        <[u8; FUNCTION_SELECTOR_LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| SelectorError::InvalidLength(bytes.len()))
    }

    /// Storage form: the raw four bytes.
    #[must_use]
    pub fn to_stored(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FUNCTION_SELECTOR_LENGTH] {
        &self.0
    }

    /// Hex encoding without the `0x` prefix.
    #[must_use]
    pub fn without_prefix(&self) -> String {
        hex::encode(self.0)
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

impl From<[u8; FUNCTION_SELECTOR_LENGTH]> for FunctionSelector {
    fn from(bytes: [u8; FUNCTION_SELECTOR_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<alloy::primitives::Selector> for FunctionSelector {
    fn from(selector: alloy::primitives::Selector) -> Self {
        Self(selector.0)
    }
}

impl fmt::Display for FunctionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.without_prefix())
    }
}

impl FromStr for FunctionSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for FunctionSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FunctionSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_hex() {
        let selector = FunctionSelector::from_hex("0xa9059cbb").unwrap();
        assert_eq!(selector.as_bytes(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(FunctionSelector::from_hex("0XA9059CBB").unwrap(), selector);
    }

    #[test]
    fn odd_digit_count_is_left_padded() {
        let selector = FunctionSelector::from_hex("0x1234567").unwrap();
        assert_eq!(selector.as_bytes(), &[0x01, 0x23, 0x45, 0x67]);
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert_eq!(
            FunctionSelector::from_hex("0xzz059cbb"),
            Err(SelectorError::InvalidHex("0xzz059cbb".into()))
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(FunctionSelector::from_hex("0x"), Err(SelectorError::InvalidLength(0)));
        assert_eq!(FunctionSelector::from_hex("0xa9059c"), Err(SelectorError::InvalidLength(3)));
        assert_eq!(
            FunctionSelector::from_hex("0xa9059cbb00"),
            Err(SelectorError::InvalidLength(5))
        );
    }

    #[test]
    fn hashes_signatures() {
        let selector = FunctionSelector::from_hex("transfer(address,uint256)").unwrap();
        assert_eq!(selector.to_string(), "0xa9059cbb");
        assert_eq!(selector.without_prefix(), "a9059cbb");
    }

    #[test]
    fn matches_sol_selector() {
        use alloy::{sol, sol_types::SolCall};
        sol! {
            function transfer(address to, uint256 amount) external returns (bool);
        }
        assert_eq!(
            FunctionSelector::from(transferCall::SELECTOR),
            FunctionSelector::from_signature("transfer(address,uint256)")
        );
    }

    #[test]
    fn storage_form_round_trips() {
        for bytes in [[0u8; 4], [0xff; 4], [1, 2, 3, 4]] {
            let selector = FunctionSelector::from(bytes);
            assert_eq!(FunctionSelector::from_stored(&selector.to_stored()), Ok(selector));
        }
    }

    #[test]
    fn storage_form_rejects_other_lengths() {
        for len in [0usize, 1, 3, 5, 32] {
            let stored = vec![0xab; len];
            assert_eq!(
                FunctionSelector::from_stored(&stored),
                Err(SelectorError::InvalidLength(len))
            );
        }
    }

    #[test]
    fn json_uses_hex_string() {
        let selector = FunctionSelector::from([0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&selector).unwrap();
        assert_eq!(json, "\"0xdeadbeef\"");
        assert_eq!(serde_json::from_str::<FunctionSelector>(&json).unwrap(), selector);

        let hashed: FunctionSelector =
            serde_json::from_str("\"transfer(address,uint256)\"").unwrap();
        assert_eq!(hashed.to_string(), "0xa9059cbb");

        assert!(serde_json::from_str::<FunctionSelector>("\"0xdead\"").is_err());
    }
}
