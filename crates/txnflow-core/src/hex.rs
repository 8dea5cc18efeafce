//! Hex codec — chain-native hexadecimal integers to pipeline representations.
//!
//! All conversions accept an optional `0x` prefix and treat the empty string
//! as zero. On-chain wei amounts routinely exceed 64 bits, so the value path
//! goes through `U256` and is stored as a decimal string.

use alloy_primitives::U256;

use crate::error::IngestError;

/// Decode a hex string into a 64-bit signed integer.
pub fn hex_to_i64(hex_str: &str) -> Result<i64, IngestError> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if digits.is_empty() {
        return Ok(0);
    }
    i64::from_str_radix(digits, 16).map_err(|_| IngestError::MalformedHex(hex_str.to_string()))
}

/// Decode a hex string into an arbitrary-precision unsigned integer.
pub fn hex_to_u256(hex_str: &str) -> Result<U256, IngestError> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|_| IngestError::MalformedHex(hex_str.to_string()))
}

/// Decode a hex string into a decimal string, without precision loss.
///
/// This is the stored representation for the value field — readable by both
/// humans and SQL.
pub fn hex_to_decimal(hex_str: &str) -> Result<String, IngestError> {
    Ok(hex_to_u256(hex_str)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i64_with_and_without_prefix() {
        assert_eq!(hex_to_i64("0x1").unwrap(), 1);
        assert_eq!(hex_to_i64("0x5208").unwrap(), 21_000);
        assert_eq!(hex_to_i64("ff").unwrap(), 255);
    }

    #[test]
    fn empty_decodes_to_zero() {
        assert_eq!(hex_to_i64("").unwrap(), 0);
        assert_eq!(hex_to_i64("0x").unwrap(), 0);
        assert_eq!(hex_to_u256("").unwrap(), U256::ZERO);
        assert_eq!(hex_to_decimal("0x").unwrap(), "0");
    }

    #[test]
    fn malformed_digits_rejected() {
        assert!(matches!(hex_to_i64("0xzz"), Err(IngestError::MalformedHex(_))));
        assert!(matches!(hex_to_u256("not hex"), Err(IngestError::MalformedHex(_))));
        assert!(hex_to_decimal("0x12g4").is_err());
    }

    #[test]
    fn i64_roundtrip() {
        for n in [0i64, 1, 21_000, 12_345_678, i64::MAX] {
            let hex = format!("0x{n:x}");
            assert_eq!(hex_to_i64(&hex).unwrap(), n);
        }
    }

    #[test]
    fn u256_roundtrip() {
        // 1.5e18 wei and a value well past the 64-bit range
        for dec in ["1500000000000000000", "340282366920938463463374607431768211456"] {
            let n: U256 = dec.parse().unwrap();
            let hex = format!("0x{n:x}");
            assert_eq!(hex_to_u256(&hex).unwrap(), n);
            assert_eq!(hex_to_decimal(&hex).unwrap(), dec);
        }
    }

    #[test]
    fn wei_value_exceeding_i64() {
        // 100 ETH in wei does not fit in i64
        let hex = "0x56bc75e2d63100000";
        assert!(hex_to_i64(hex).is_err());
        assert_eq!(hex_to_decimal(hex).unwrap(), "100000000000000000000");
    }
}
