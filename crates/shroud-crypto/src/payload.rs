//! Canonical payload serialization.
//!
//! Envelopes, commitments and disclosure leaves all hash or encrypt the same
//! byte form of a payload: compact JSON with object keys sorted by their
//! UTF-8 bytes at every depth. Two logically identical payloads therefore
//! always produce identical bytes, regardless of how the caller built them.

use serde_json::Value;

/// Structured transaction data. Any JSON value is accepted; selective
/// disclosure additionally requires a top-level object.
pub type Payload = Value;

/// Serialize a payload to its canonical JSON string.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Serialize a payload to its canonical JSON bytes.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    canonical_json(value).into_bytes()
}

/// Parse canonical (or any) JSON bytes back into a payload.
pub fn from_bytes(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::String(s) => write_string(s, out),
        // Null, booleans and numbers have a single compact rendering.
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_owned()).to_string());
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted_at_every_depth() {
        let value = json!({"b": 1, "a": {"z": true, "m": null}});
        assert_eq!(canonical_json(&value), r#"{"a":{"m":null,"z":true},"b":1}"#);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut first = serde_json::Map::new();
        first.insert("buyer".into(), json!("Acme"));
        first.insert("amount".into(), json!(500_000));

        let mut second = serde_json::Map::new();
        second.insert("amount".into(), json!(500_000));
        second.insert("buyer".into(), json!("Acme"));

        assert_eq!(
            canonical_bytes(&Value::Object(first)),
            canonical_bytes(&Value::Object(second))
        );
    }

    #[test]
    fn arrays_keep_their_order() {
        let value = json!([3, 1, 2]);
        assert_eq!(canonical_json(&value), "[3,1,2]");
    }

    #[test]
    fn strings_are_escaped() {
        let value = json!({"note": "line\n\"quoted\""});
        assert_eq!(canonical_json(&value), r#"{"note":"line\n\"quoted\""}"#);
    }

    #[test]
    fn scalars_render_compactly() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!(false)), "false");
        assert_eq!(canonical_json(&json!(-12)), "-12");
        assert_eq!(canonical_json(&json!(1.5)), "1.5");
    }

    #[test]
    fn canonical_bytes_parse_back_to_the_same_value() {
        let value = json!({"amount": 500_000, "buyer": "Acme", "lines": [{"sku": "A-1"}]});
        let parsed = from_bytes(&canonical_bytes(&value)).unwrap();
        assert_eq!(parsed, value);
    }
}
