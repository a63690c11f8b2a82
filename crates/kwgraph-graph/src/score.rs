//! Score coercion for values read back from the store.
//!
//! Drivers disagree on how a score comes back: a float, an integer, a
//! decimal string, or an arbitrary-precision decimal split into an unscaled
//! integer and a scale. This is the one place that turns all of them into
//! an `f64`; another backend only needs to feed its wire value through here.

use serde_json::Value;

/// Convert an arbitrary-precision decimal to a float: `unscaled / 10^scale`.
///
/// Lossy for values that do not fit an `f64` mantissa.
pub fn decimal_to_f64(unscaled: i128, scale: i32) -> f64 {
    unscaled as f64 / 10f64.powi(scale)
}

/// Coerce a score as returned by the driver into a float.
///
/// Recognised shapes:
/// - numbers: `0.95`, `1`
/// - numeric strings: `"0.95"`
/// - decimal objects: `{"unscaled": 95, "scale": 2}` (also `unscaledValue`,
///   and the unscaled part given as a string)
pub fn coerce_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => {
            let unscaled = map.get("unscaled").or_else(|| map.get("unscaledValue"))?;
            let unscaled = match unscaled {
                Value::Number(n) => n.as_i64().map(i128::from),
                Value::String(s) => s.trim().parse::<i128>().ok(),
                _ => None,
            }?;
            let scale = map.get("scale").and_then(Value::as_i64).unwrap_or(0);
            Some(decimal_to_f64(unscaled, i32::try_from(scale).ok()?))
        }
        _ => None,
    };
    score.filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_decimal_to_f64() {
        assert!(close(decimal_to_f64(95, 2), 0.95));
        assert!(close(decimal_to_f64(1, 0), 1.0));
        assert!(close(decimal_to_f64(123456789, 9), 0.123456789));
        assert!(close(decimal_to_f64(5, -1), 50.0));
    }

    #[test]
    fn test_coerce_score_shapes() {
        assert_eq!(coerce_score(&json!(0.5)), Some(0.5));
        assert_eq!(coerce_score(&json!(1)), Some(1.0));
        assert_eq!(coerce_score(&json!(" 0.25 ")), Some(0.25));
        assert!(close(coerce_score(&json!({"unscaled": 95, "scale": 2})).unwrap(), 0.95));
        assert!(close(
            coerce_score(&json!({"unscaledValue": "9500", "scale": 4})).unwrap(),
            0.95
        ));
    }

    #[test]
    fn test_coerce_score_rejects_garbage() {
        assert_eq!(coerce_score(&json!(null)), None);
        assert_eq!(coerce_score(&json!("high")), None);
        assert_eq!(coerce_score(&json!({"scale": 2})), None);
        assert_eq!(coerce_score(&json!([0.5])), None);
    }
}
