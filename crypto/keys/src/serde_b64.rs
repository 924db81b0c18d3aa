// Copyright (c) 2018-2025 The Botho Foundation

//! Serde helpers that encode byte fields as standard base64 strings.
//!
//! Use with `#[serde(with = "prv_crypto_keys::serde_b64")]` on `Vec<u8>`
//! fields, or through [`array`] for fixed-width arrays.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

/// Encode bytes as a base64 string.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 string.
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

/// Serialize a byte slice as base64.
pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode(bytes))
}

/// Deserialize a base64 string into bytes.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let text = String::deserialize(deserializer)?;
    decode(&text).map_err(D::Error::custom)
}

/// Fixed-width variant for `[u8; 32]` fields.
pub mod array {
    use super::*;

    /// Serialize a 32 byte array as base64.
    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize(&bytes[..], serializer)
    }

    /// Deserialize a base64 string that must decode to exactly 32 bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let bytes = super::deserialize(deserializer)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &"32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Wrapper {
        #[serde(with = "crate::serde_b64")]
        data: Vec<u8>,
        #[serde(with = "crate::serde_b64::array")]
        fixed: [u8; 32],
    }

    #[test]
    fn test_fields_are_base64_strings() {
        let w = Wrapper {
            data: vec![1, 2, 3],
            fixed: [7u8; 32],
        };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"AQID\""));
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_fixed_width_rejects_short_input() {
        let json = r#"{"data":"","fixed":"AQID"}"#;
        assert!(serde_json::from_str::<Wrapper>(json).is_err());
    }
}
