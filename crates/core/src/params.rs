//! Tolerant field extraction from JSON scene objects.
//!
//! A missing or wrongly typed key yields the default. Scene parsing uses
//! these for optional settings and reserves hard errors for structure.

use serde_json::Value;

/// `params[name]` as `f64`, accepting integers.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_str<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

/// `params[name]` as a point in 3-space. Arrays of any other length, or
/// with non-numeric entries, count as missing.
pub fn param_vec3(params: &Value, name: &str) -> Option<[f32; 3]> {
    match params.get(name)?.as_array()?.as_slice() {
        [x, y, z] => Some([x.as_f64()? as f32, y.as_f64()? as f32, z.as_f64()? as f32]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn f64_accepts_integers_and_falls_back() {
        let params = json!({"amount": 2, "name": "x"});
        assert_eq!(param_f64(&params, "amount", 0.0), 2.0);
        assert_eq!(param_f64(&params, "name", 0.5), 0.5);
        assert_eq!(param_f64(&params, "missing", 0.5), 0.5);
    }

    #[test]
    fn bool_and_str_read_matching_types_only() {
        let params = json!({"camera": true, "clear": "fade", "n": 1});
        assert!(param_bool(&params, "camera", false));
        assert!(!param_bool(&params, "n", false));
        assert_eq!(param_str(&params, "clear"), Some("fade"));
        assert_eq!(param_str(&params, "n"), None);
    }

    #[test]
    fn vec3_needs_exactly_three_numbers() {
        let params = json!({"eye": [0, 1, 2.5], "short": [1, 2], "bad": [1, "x", 2]});
        assert_eq!(param_vec3(&params, "eye"), Some([0.0, 1.0, 2.5]));
        assert_eq!(param_vec3(&params, "short"), None);
        assert_eq!(param_vec3(&params, "bad"), None);
        assert_eq!(param_vec3(&json!(null), "eye"), None);
    }
}
