// CheckMacValue signing for the payment gateway channel
//
// The gateway authenticates both the outbound checkout request and its
// webhook callback with a keyed hash over the canonicalized parameter set.
// The derivation must be bit-exact or the gateway rejects the request:
//
// 1. take every parameter except the CheckMacValue field, sorted by name
//    (ordinal string sort)
// 2. build "HashKey=<key>&k1=v1&...&HashIV=<iv>"
// 3. form-urlencode the whole string (space -> '+', reserved bytes
//    percent-escaped, lowercase hex)
// 4. un-escape %2d %5f %2e %21 %2a %28 %29 back to - _ . ! * ( )
// 5. lowercase the result
// 6. SHA-256 over the UTF-8 bytes, hex-encoded, uppercased

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Parameter name carrying the signature itself
pub const CHECK_MAC_FIELD: &str = "CheckMacValue";

/// Form-urlencode with lowercase hex escapes. Only ASCII alphanumerics are
/// kept literal; the selective un-escape pass below restores the characters
/// the gateway's reference encoder leaves bare.
fn form_urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for &byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push_str(&format!("{:02x}", byte));
            }
        }
    }
    out
}

/// Restore the percent sequences the gateway's encoder leaves unescaped
fn unescape_gateway_exceptions(encoded: &str) -> String {
    encoded
        .replace("%2d", "-")
        .replace("%5f", "_")
        .replace("%2e", ".")
        .replace("%21", "!")
        .replace("%2a", "*")
        .replace("%28", "(")
        .replace("%29", ")")
}

/// Derive the CheckMacValue for a parameter set. Any CheckMacValue entry
/// already present in `params` is excluded from the derivation.
pub fn generate(params: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> String {
    let mut raw = format!("HashKey={}", hash_key);
    for (name, value) in params {
        if name == CHECK_MAC_FIELD {
            continue;
        }
        raw.push('&');
        raw.push_str(name);
        raw.push('=');
        raw.push_str(value);
    }
    raw.push_str("&HashIV=");
    raw.push_str(hash_iv);

    let canonical = unescape_gateway_exceptions(&form_urlencode(&raw)).to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize()).to_uppercase()
}

/// Verify the CheckMacValue carried in a received parameter set.
///
/// Re-derives the signature from every parameter except the CheckMacValue
/// field itself and compares case-insensitively. Returns false when the
/// field is absent.
pub fn verify(params: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> bool {
    let Some(received) = params.get(CHECK_MAC_FIELD) else {
        return false;
    };

    let expected = generate(params, hash_key, hash_iv);
    expected.eq_ignore_ascii_case(received)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_KEY: &str = "5294y06JbISpM5x9";
    const HASH_IV: &str = "v77hoKGq4kWxNNIS";

    fn sample_params() -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("MerchantID".to_string(), "2000132".to_string());
        params.insert("MerchantTradeNo".to_string(), "B00071234567890".to_string());
        params.insert(
            "MerchantTradeDate".to_string(),
            "2025/11/01 12:00:00".to_string(),
        );
        params.insert("PaymentType".to_string(), "aio".to_string());
        params.insert("TotalAmount".to_string(), "2000".to_string());
        params.insert("TradeDesc".to_string(), "Room reservation".to_string());
        params.insert("ItemName".to_string(), "Sea View Double x 2".to_string());
        params.insert("ChoosePayment".to_string(), "ALL".to_string());
        params.insert("EncryptType".to_string(), "1".to_string());
        params
    }

    #[test]
    fn test_signature_is_uppercase_hex() {
        let mac = generate(&sample_params(), HASH_KEY, HASH_IV);
        assert_eq!(mac.len(), 64);
        assert!(mac.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let params = sample_params();
        assert_eq!(
            generate(&params, HASH_KEY, HASH_IV),
            generate(&params, HASH_KEY, HASH_IV)
        );
    }

    #[test]
    fn test_verify_roundtrip() {
        let mut params = sample_params();
        let mac = generate(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac);
        assert!(verify(&params, HASH_KEY, HASH_IV));
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let mut params = sample_params();
        let mac = generate(&params, HASH_KEY, HASH_IV).to_lowercase();
        params.insert(CHECK_MAC_FIELD.to_string(), mac);
        assert!(verify(&params, HASH_KEY, HASH_IV));
    }

    #[test]
    fn test_verify_rejects_tampered_value() {
        let mut params = sample_params();
        let mac = generate(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac);
        params.insert("TotalAmount".to_string(), "1".to_string());
        assert!(!verify(&params, HASH_KEY, HASH_IV));
    }

    #[test]
    fn test_verify_rejects_missing_signature() {
        assert!(!verify(&sample_params(), HASH_KEY, HASH_IV));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let mut params = sample_params();
        let mac = generate(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac);
        assert!(!verify(&params, "wrongkey", HASH_IV));
    }

    #[test]
    fn test_existing_check_mac_entry_is_excluded() {
        let params = sample_params();
        let mac = generate(&params, HASH_KEY, HASH_IV);

        let mut with_mac = params.clone();
        with_mac.insert(CHECK_MAC_FIELD.to_string(), "GARBAGE".to_string());
        assert_eq!(generate(&with_mac, HASH_KEY, HASH_IV), mac);
    }

    #[test]
    fn test_form_urlencode_space_and_reserved() {
        assert_eq!(form_urlencode("a b"), "a+b");
        assert_eq!(form_urlencode("a=b&c"), "a%3db%26c");
        assert_eq!(form_urlencode("x-y_z.w"), "x%2dy%5fz%2ew");
    }

    #[test]
    fn test_unescape_exceptions() {
        assert_eq!(
            unescape_gateway_exceptions("%2d%5f%2e%21%2a%28%29"),
            "-_.!*()"
        );
        // Untouched sequences stay escaped
        assert_eq!(unescape_gateway_exceptions("%26%3d"), "%26%3d");
    }
}
