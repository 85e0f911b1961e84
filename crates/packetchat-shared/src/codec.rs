//! Timestamp codec.
//!
//! Every chat event carries a fractional-seconds timestamp.  The whole-second
//! part is the message's identity within its thread: the local "sent" echo,
//! the later acknowledgment and any re-delivery of the same packet all share
//! it, which is what lets the engine correlate them.  The fraction is always
//! truncated, never rounded, so `1700000000.999` and `1700000000.001` map to
//! the same id.

use serde_json::Value;

use crate::types::MessageId;

/// Derive an id from a numeric timestamp.
///
/// Returns `None` for NaN, infinities, negative values and anything past
/// `u64::MAX` seconds.
pub fn message_id_from_timestamp(ts: f64) -> Option<MessageId> {
    if !ts.is_finite() || ts < 0.0 || ts >= u64::MAX as f64 {
        return None;
    }
    Some(MessageId(ts.trunc() as u64))
}

/// Derive an id from the decimal text form of a timestamp.
///
/// Accepts `"1700000000"` and `"1700000000.937"`.  Exponents, signs and
/// surrounding garbage are rejected rather than guessed at.
pub fn message_id_from_str(raw: &str) -> Option<MessageId> {
    let raw = raw.trim();
    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    whole.parse::<u64>().ok().map(MessageId)
}

/// Derive an id from a JSON value that is either a number or a string.
pub fn message_id_from_value(value: &Value) -> Option<MessageId> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(secs) => Some(MessageId(secs)),
            None => n.as_f64().and_then(message_id_from_timestamp),
        },
        Value::String(s) => message_id_from_str(s),
        _ => None,
    }
}

/// Fractional seconds from a JSON number or numeric string.
pub fn timestamp_from_value(value: &Value) -> Option<f64> {
    let ts = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    ts.is_finite().then_some(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_fraction() {
        assert_eq!(
            message_id_from_timestamp(1_700_000_000.999),
            Some(MessageId(1_700_000_000))
        );
        assert_eq!(
            message_id_from_str("1700000000.999"),
            Some(MessageId(1_700_000_000))
        );
        assert_eq!(message_id_from_str("1700000000"), Some(MessageId(1_700_000_000)));
        assert_eq!(message_id_from_str("1700000000."), Some(MessageId(1_700_000_000)));
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(message_id_from_timestamp(f64::NAN), None);
        assert_eq!(message_id_from_timestamp(-1.5), None);
        assert_eq!(message_id_from_timestamp(f64::INFINITY), None);
        assert_eq!(message_id_from_str(""), None);
        assert_eq!(message_id_from_str(".5"), None);
        assert_eq!(message_id_from_str("-17"), None);
        assert_eq!(message_id_from_str("1e9"), None);
        assert_eq!(message_id_from_str("17x.0"), None);
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(
            message_id_from_value(&serde_json::json!(1700000000.25)),
            Some(MessageId(1_700_000_000))
        );
        assert_eq!(
            message_id_from_value(&serde_json::json!(1700000000)),
            Some(MessageId(1_700_000_000))
        );
        assert_eq!(
            message_id_from_value(&serde_json::json!("1700000000.5")),
            Some(MessageId(1_700_000_000))
        );
        assert_eq!(message_id_from_value(&serde_json::json!(null)), None);
        assert_eq!(message_id_from_value(&serde_json::json!(true)), None);
    }

    #[test]
    fn test_same_second_same_id() {
        let a = message_id_from_timestamp(1_700_000_000.01).unwrap();
        let b = message_id_from_timestamp(1_700_000_000.98).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_millis(), 1_700_000_000_000);
    }
}
