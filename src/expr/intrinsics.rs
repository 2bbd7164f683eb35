//! The `States.*` intrinsic function family used by JSONPath-mode payload
//! templates. Each intrinsic receives already-evaluated argument values.

use crate::error::EvalError;
use serde_json::{Value, json};

/// Dispatch a `States.<Name>(...)` call given its already-evaluated arguments.
pub fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "Format" => format_(args),
        "StringToJson" => string_to_json(args),
        "JsonToString" => json_to_string(args),
        "StringSplit" => string_split(args),
        "Array" => Ok(Value::Array(args.to_vec())),
        "ArrayPartition" => array_partition(args),
        "ArrayContains" => array_contains(args),
        "ArrayRange" => array_range(args),
        "ArrayGetItem" => array_get_item(args),
        "ArrayLength" => array_length(args),
        "ArrayUnique" => array_unique(args),
        "MathAdd" => math_add(args),
        "MathRandom" => math_random(args),
        "Hash" => hash_(args),
        "Base64Encode" => base64_encode(args),
        "Base64Decode" => base64_decode(args),
        "JsonMerge" => json_merge(args),
        "UUID" => Ok(json!(uuid::Uuid::new_v4().to_string())),
        other => Err(EvalError::UnknownIntrinsic {
            name: other.to_string(),
        }),
    }
}

fn arity_err(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::BadIntrinsicArgs {
        name: name.to_string(),
        reason: format!("expected {expected} argument(s), got {got}"),
    }
}

fn as_str<'a>(name: &str, v: &'a Value) -> Result<&'a str, EvalError> {
    v.as_str().ok_or_else(|| EvalError::BadIntrinsicArgs {
        name: name.to_string(),
        reason: format!("expected a string argument, got {v}"),
    })
}

fn as_f64(name: &str, v: &Value) -> Result<f64, EvalError> {
    v.as_f64().ok_or_else(|| EvalError::BadIntrinsicArgs {
        name: name.to_string(),
        reason: format!("expected a numeric argument, got {v}"),
    })
}

fn as_array<'a>(name: &str, v: &'a Value) -> Result<&'a Vec<Value>, EvalError> {
    v.as_array().ok_or_else(|| EvalError::BadIntrinsicArgs {
        name: name.to_string(),
        reason: format!("expected an array argument, got {v}"),
    })
}

fn format_(args: &[Value]) -> Result<Value, EvalError> {
    let Some((template, rest)) = args.split_first() else {
        return Err(arity_err("Format", 1, 0));
    };
    let template = as_str("Format", template)?;
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    let mut idx = 0usize;
    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'}') {
            chars.next();
            let value = rest.get(idx).ok_or_else(|| EvalError::BadIntrinsicArgs {
                name: "Format".to_string(),
                reason: "not enough substitution arguments".to_string(),
            })?;
            out.push_str(&value_to_format_str(value));
            idx += 1;
        } else {
            out.push(c);
        }
    }
    Ok(json!(out))
}

fn value_to_format_str(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_to_json(args: &[Value]) -> Result<Value, EvalError> {
    let [v] = args else {
        return Err(arity_err("StringToJson", 1, args.len()));
    };
    let s = as_str("StringToJson", v)?;
    serde_json::from_str(s).map_err(|e| EvalError::BadIntrinsicArgs {
        name: "StringToJson".to_string(),
        reason: e.to_string(),
    })
}

fn json_to_string(args: &[Value]) -> Result<Value, EvalError> {
    let [v] = args else {
        return Err(arity_err("JsonToString", 1, args.len()));
    };
    Ok(json!(serde_json::to_string(v).unwrap_or_default()))
}

fn string_split(args: &[Value]) -> Result<Value, EvalError> {
    let [s, delim] = args else {
        return Err(arity_err("StringSplit", 2, args.len()));
    };
    let s = as_str("StringSplit", s)?;
    let delim = as_str("StringSplit", delim)?;
    let parts: Vec<Value> = if delim.is_empty() {
        s.chars().map(|c| json!(c.to_string())).collect()
    } else {
        s.split(delim).map(|p| json!(p)).collect()
    };
    Ok(Value::Array(parts))
}

fn array_partition(args: &[Value]) -> Result<Value, EvalError> {
    let [arr, size] = args else {
        return Err(arity_err("ArrayPartition", 2, args.len()));
    };
    let arr = as_array("ArrayPartition", arr)?;
    let size = as_f64("ArrayPartition", size)? as usize;
    if size == 0 {
        return Err(EvalError::BadIntrinsicArgs {
            name: "ArrayPartition".to_string(),
            reason: "partition size must be positive".to_string(),
        });
    }
    let chunks: Vec<Value> = arr
        .chunks(size)
        .map(|chunk| Value::Array(chunk.to_vec()))
        .collect();
    Ok(Value::Array(chunks))
}

fn array_contains(args: &[Value]) -> Result<Value, EvalError> {
    let [arr, needle] = args else {
        return Err(arity_err("ArrayContains", 2, args.len()));
    };
    let arr = as_array("ArrayContains", arr)?;
    Ok(json!(arr.contains(needle)))
}

fn array_range(args: &[Value]) -> Result<Value, EvalError> {
    let [start, end, step] = args else {
        return Err(arity_err("ArrayRange", 3, args.len()));
    };
    let start = as_f64("ArrayRange", start)? as i64;
    let end = as_f64("ArrayRange", end)? as i64;
    let step = as_f64("ArrayRange", step)? as i64;
    if step == 0 {
        return Err(EvalError::BadIntrinsicArgs {
            name: "ArrayRange".to_string(),
            reason: "step must not be zero".to_string(),
        });
    }
    let mut out = Vec::new();
    let mut i = start;
    if step > 0 {
        while i <= end {
            out.push(json!(i));
            i += step;
        }
    } else {
        while i >= end {
            out.push(json!(i));
            i += step;
        }
    }
    Ok(Value::Array(out))
}

fn array_get_item(args: &[Value]) -> Result<Value, EvalError> {
    let [arr, index] = args else {
        return Err(arity_err("ArrayGetItem", 2, args.len()));
    };
    let arr = as_array("ArrayGetItem", arr)?;
    let index = as_f64("ArrayGetItem", index)? as usize;
    arr.get(index).cloned().ok_or_else(|| EvalError::BadIntrinsicArgs {
        name: "ArrayGetItem".to_string(),
        reason: format!("index {index} out of bounds"),
    })
}

fn array_length(args: &[Value]) -> Result<Value, EvalError> {
    let [arr] = args else {
        return Err(arity_err("ArrayLength", 1, args.len()));
    };
    Ok(json!(as_array("ArrayLength", arr)?.len()))
}

fn array_unique(args: &[Value]) -> Result<Value, EvalError> {
    let [arr] = args else {
        return Err(arity_err("ArrayUnique", 1, args.len()));
    };
    let arr = as_array("ArrayUnique", arr)?;
    let mut seen = Vec::new();
    for v in arr {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    Ok(Value::Array(seen))
}

fn math_add(args: &[Value]) -> Result<Value, EvalError> {
    let [a, b] = args else {
        return Err(arity_err("MathAdd", 2, args.len()));
    };
    let sum = as_f64("MathAdd", a)? + as_f64("MathAdd", b)?;
    Ok(json!(sum as i64))
}

fn math_random(args: &[Value]) -> Result<Value, EvalError> {
    let [low, high] = args else {
        return Err(arity_err("MathRandom", 2, args.len()));
    };
    let low = as_f64("MathRandom", low)? as i64;
    let high = as_f64("MathRandom", high)? as i64;
    if high < low {
        return Err(EvalError::BadIntrinsicArgs {
            name: "MathRandom".to_string(),
            reason: "high bound below low bound".to_string(),
        });
    }
    Ok(json!(rand::random_range(low..=high)))
}

fn hash_(args: &[Value]) -> Result<Value, EvalError> {
    use std::hash::{Hash, Hasher};
    let [data, algorithm] = args else {
        return Err(arity_err("Hash", 2, args.len()));
    };
    let algorithm = as_str("Hash", algorithm)?;
    let serialized = serde_json::to_string(data).unwrap_or_default();
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    serialized.hash(&mut hasher);
    algorithm.hash(&mut hasher);
    Ok(json!(format!("{:x}", hasher.finish())))
}

fn base64_encode(args: &[Value]) -> Result<Value, EvalError> {
    use base64::Engine as _;
    let [v] = args else {
        return Err(arity_err("Base64Encode", 1, args.len()));
    };
    let s = as_str("Base64Encode", v)?;
    Ok(json!(base64::engine::general_purpose::STANDARD.encode(s)))
}

fn base64_decode(args: &[Value]) -> Result<Value, EvalError> {
    use base64::Engine as _;
    let [v] = args else {
        return Err(arity_err("Base64Decode", 1, args.len()));
    };
    let s = as_str("Base64Decode", v)?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| EvalError::BadIntrinsicArgs {
            name: "Base64Decode".to_string(),
            reason: e.to_string(),
        })?;
    let decoded = String::from_utf8(bytes).map_err(|e| EvalError::BadIntrinsicArgs {
        name: "Base64Decode".to_string(),
        reason: e.to_string(),
    })?;
    Ok(json!(decoded))
}

fn json_merge(args: &[Value]) -> Result<Value, EvalError> {
    let [left, right, deep] = args else {
        return Err(arity_err("JsonMerge", 3, args.len()));
    };
    let deep = deep.as_bool().unwrap_or(false);
    Ok(merge_values(left, right, deep))
}

fn merge_values(left: &Value, right: &Value, deep: bool) -> Value {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut out = l.clone();
            for (k, v) in r {
                if deep {
                    if let Some(existing) = out.get(k).cloned() {
                        out.insert(k.clone(), merge_values(&existing, v, deep));
                        continue;
                    }
                }
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        (_, right) => right.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_substitutes_placeholders_in_order() {
        let result = call("Format", &[json!("{} has {} items"), json!("cart"), json!(3)]).unwrap();
        assert_eq!(result, json!("cart has 3 items"));
    }

    #[test]
    fn math_add_returns_integer_sum() {
        assert_eq!(call("MathAdd", &[json!(7), json!(7)]).unwrap(), json!(14));
    }

    #[test]
    fn array_partition_chunks_and_leaves_remainder() {
        let result = call("ArrayPartition", &[json!([1, 2, 3, 4, 5]), json!(2)]).unwrap();
        assert_eq!(result, json!([[1, 2], [3, 4], [5]]));
    }

    #[test]
    fn unknown_intrinsic_is_rejected() {
        assert!(matches!(
            call("NotReal", &[]),
            Err(EvalError::UnknownIntrinsic { .. })
        ));
    }

    #[test]
    fn base64_round_trips() {
        let encoded = call("Base64Encode", &[json!("hello")]).unwrap();
        assert_eq!(call("Base64Decode", &[encoded]).unwrap(), json!("hello"));
    }
}
