//! Ether amount helpers.
//!
//! Reward math runs in `f64` ether. Gateways that settle on-chain need an
//! integer wei value; reports need a fixed-precision string.

/// Number of wei in one ether.
pub const WEI_PER_ETHER: f64 = 1e18;

/// Convert an ether amount to whole wei, rounding to the nearest unit.
///
/// Returns `None` for negative, non-finite, or out-of-range amounts.
pub fn ether_to_wei(ether: f64) -> Option<u128> {
    if !ether.is_finite() || ether < 0.0 {
        return None;
    }
    let wei = (ether * WEI_PER_ETHER).round();
    if wei >= u128::MAX as f64 {
        return None;
    }
    Some(wei as u128)
}

/// Parse a vote weight written as decimal text.
///
/// Magnitudes beyond `f64` range come back as infinity instead of failing,
/// so the aggregator can reject them with the record's position.
pub fn parse_vote_weight(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Serde adapter for vote weights: a number, or a string holding one.
pub mod vote_weight {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(WeightVisitor)
    }

    struct WeightVisitor;

    impl<'de> Visitor<'de> for WeightVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            super::parse_vote_weight(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

/// Render an ether amount with six decimals, e.g. `"0.250000 ETH"`.
pub fn format_ether(ether: f64) -> String {
    format!("{ether:.6} ETH")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_fractional_ether() {
        assert_eq!(ether_to_wei(1.0), Some(1_000_000_000_000_000_000));
        assert_eq!(ether_to_wei(0.5), Some(500_000_000_000_000_000));
        assert_eq!(ether_to_wei(0.0), Some(0));
    }

    #[test]
    fn rejects_invalid_amounts() {
        assert_eq!(ether_to_wei(-1.0), None);
        assert_eq!(ether_to_wei(f64::NAN), None);
        assert_eq!(ether_to_wei(f64::INFINITY), None);
        assert_eq!(ether_to_wei(1e30), None);
    }

    #[test]
    fn vote_weight_text_saturates_out_of_range() {
        assert_eq!(parse_vote_weight(" 9 "), Some(9.0));
        assert_eq!(parse_vote_weight("-4"), Some(-4.0));
        assert_eq!(parse_vote_weight("1e400"), Some(f64::INFINITY));
        assert_eq!(parse_vote_weight("nine"), None);
    }

    #[test]
    fn formats_six_decimals() {
        assert_eq!(format_ether(250.0), "250.000000 ETH");
        assert_eq!(format_ether(0.1234567), "0.123457 ETH");
    }
}
