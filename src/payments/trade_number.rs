// Trade number encoding
//
// The gateway requires a unique merchant trade number per checkout attempt.
// Ours embeds the booking id so the webhook reconciler can find the booking
// again without any extra lookup table: a leading "B", the booking id
// zero-padded to four digits, then the last ten digits of the epoch-millis
// timestamp for uniqueness across retries.

use crate::payments::PaymentError;

/// Build the trade number for a booking: `"B" + 4-digit booking id +
/// last 10 digits of epoch millis`
pub fn encode(booking_id: i32, epoch_millis: i64) -> String {
    let millis = format!("{:010}", epoch_millis);
    let tail = &millis[millis.len() - 10..];
    format!("B{:04}{}", booking_id, tail)
}

/// Recover the booking id from a trade number.
///
/// A well-formed reference starts with `B` and carries the booking id in
/// the next four digits. Anything else is tried as a plain integer booking
/// id before being rejected as malformed.
pub fn decode(trade_no: &str) -> Result<i32, PaymentError> {
    if let Some(rest) = trade_no.strip_prefix('B') {
        // get() refuses to split a multibyte character, so hostile input
        // falls through instead of panicking
        if let Some(id_part) = rest.get(..4) {
            if let Ok(id) = id_part.parse::<i32>() {
                return Ok(id);
            }
        }
    }

    trade_no
        .parse::<i32>()
        .map_err(|_| PaymentError::MalformedTradeNumber(trade_no.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_format() {
        let trade_no = encode(7, 1_730_419_200_123);
        assert_eq!(trade_no.len(), 15);
        assert!(trade_no.starts_with("B0007"));
        assert_eq!(&trade_no[5..], "0419200123");
    }

    #[test]
    fn test_encode_pads_short_timestamps() {
        let trade_no = encode(1, 42);
        assert_eq!(trade_no, "B00010000000042");
    }

    #[test]
    fn test_decode_prefixed() {
        assert_eq!(decode("B00071234567890").unwrap(), 7);
        assert_eq!(decode("B99990000000000").unwrap(), 9999);
    }

    #[test]
    fn test_decode_plain_integer() {
        assert_eq!(decode("42").unwrap(), 42);
    }

    #[test]
    fn test_decode_malformed() {
        assert!(decode("XYZ").is_err());
        assert!(decode("").is_err());
        assert!(decode("Babc1234567890").is_err());
    }

    #[test]
    fn test_decode_multibyte_input_rejected() {
        // Must reject, not panic, when a multibyte character straddles or
        // follows the id window
        assert!(decode("Babcé123").is_err());
        assert!(decode("Bé№1234567890").is_err());
        assert!(decode("Bòó").is_err());
    }

    #[test]
    fn test_decode_short_prefixed_falls_through() {
        // Too short for the embedded id; not a plain integer either
        assert!(decode("B12").is_err());
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for id in [1, 42, 9999] {
            assert_eq!(decode(&encode(id, 1_730_419_200_123)).unwrap(), id);
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// decode(encode(id, ts)) recovers id for all ids in [1, 9999] and
    /// arbitrary timestamps
    #[test]
    fn prop_roundtrip() {
        proptest!(|(booking_id in 1i32..=9999, epoch_millis in 0i64..=4_102_444_800_000)| {
            let trade_no = encode(booking_id, epoch_millis);
            prop_assert_eq!(decode(&trade_no).unwrap(), booking_id);
        });
    }

    /// decode never panics, whatever string the gateway echoes back
    #[test]
    fn prop_decode_total_on_arbitrary_input() {
        proptest!(|(trade_no in "\\PC{0,20}")| {
            let _ = decode(&trade_no);
        });
    }

    /// Encoded trade numbers always have the fixed 15-character shape
    #[test]
    fn prop_fixed_width() {
        proptest!(|(booking_id in 1i32..=9999, epoch_millis in 0i64..=4_102_444_800_000)| {
            let trade_no = encode(booking_id, epoch_millis);
            prop_assert_eq!(trade_no.len(), 15);
            prop_assert!(trade_no.starts_with('B'));
            prop_assert!(trade_no[1..].chars().all(|c| c.is_ascii_digit()));
        });
    }
}
