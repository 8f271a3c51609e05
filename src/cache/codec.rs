//! Value Codec
//!
//! Maps cache values onto row store cells. Integers, doubles and booleans use
//! the store's native column types; everything else is stored as its JSON
//! text in a string column.

use serde_json::{Number, Value};

use crate::cache::CacheValue;
use crate::error::{CacheError, Result};
use crate::rowstore::ColumnValue;

// == Serialize ==
/// Encodes a cache value into its stored cell.
pub fn serialize(value: &CacheValue) -> Result<ColumnValue> {
    let cell = match value {
        Value::Bool(b) => ColumnValue::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => ColumnValue::Integer(i),
            // u64 beyond i64::MAX must keep its exact digits
            _ if n.is_u64() => ColumnValue::String(serde_json::to_string(value)?),
            (None, Some(f)) => ColumnValue::Double(f),
            (None, None) => ColumnValue::String(serde_json::to_string(value)?),
        },
        _ => ColumnValue::String(serde_json::to_string(value)?),
    };
    Ok(cell)
}

// == Deserialize ==
/// Decodes a stored cell back into the value that was cached.
pub fn deserialize(cell: &ColumnValue) -> Result<CacheValue> {
    match cell {
        ColumnValue::Integer(i) => Ok(Value::from(*i)),
        ColumnValue::Double(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| CacheError::Corruption(format!("non-finite double {}", f))),
        ColumnValue::Boolean(b) => Ok(Value::Bool(*b)),
        ColumnValue::String(text) => serde_json::from_str(text)
            .map_err(|e| CacheError::Corruption(format!("undecodable payload: {}", e))),
        ColumnValue::Binary(_) => Err(CacheError::Corruption(format!(
            "unexpected stored type [{}]",
            cell.type_name()
        ))),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_use_native_cells() {
        assert_eq!(serialize(&json!(79)).unwrap(), ColumnValue::Integer(79));
        assert_eq!(serialize(&json!(-3)).unwrap(), ColumnValue::Integer(-3));
        assert_eq!(serialize(&json!(26.5)).unwrap(), ColumnValue::Double(26.5));
        assert_eq!(serialize(&json!(true)).unwrap(), ColumnValue::Boolean(true));
        assert_eq!(serialize(&json!(false)).unwrap(), ColumnValue::Boolean(false));
    }

    #[test]
    fn test_other_values_are_opaque() {
        assert_eq!(
            serialize(&json!("100")).unwrap(),
            ColumnValue::String("\"100\"".into())
        );
        assert_eq!(serialize(&Value::Null).unwrap(), ColumnValue::String("null".into()));
        assert_eq!(
            serialize(&json!({"name": "sprocket"})).unwrap(),
            ColumnValue::String(r#"{"name":"sprocket"}"#.into())
        );
    }

    #[test]
    fn test_numeric_string_keeps_its_type() {
        let decoded = deserialize(&serialize(&json!("100")).unwrap()).unwrap();
        assert_eq!(decoded, json!("100"));
        assert!(decoded.is_string());
    }

    #[test]
    fn test_float_and_integer_stay_distinct() {
        let int = deserialize(&serialize(&json!(5)).unwrap()).unwrap();
        let float = deserialize(&serialize(&json!(5.0)).unwrap()).unwrap();

        assert!(int.is_i64());
        assert!(float.is_f64());
    }

    #[test]
    fn test_large_unsigned_is_exact() {
        let big = json!(u64::MAX);
        let decoded = deserialize(&serialize(&big).unwrap()).unwrap();
        assert_eq!(decoded.as_u64(), Some(u64::MAX));
    }

    #[test]
    fn test_null_is_a_value() {
        let decoded = deserialize(&ColumnValue::String("null".into())).unwrap();
        assert_eq!(decoded, Value::Null);
    }

    #[test]
    fn test_binary_cell_is_corruption() {
        let result = deserialize(&ColumnValue::Binary(vec![1, 2, 3]));
        assert!(matches!(result, Err(CacheError::Corruption(_))));
    }

    #[test]
    fn test_garbage_string_is_corruption() {
        let result = deserialize(&ColumnValue::String("a:1:{".into()));
        assert!(matches!(result, Err(CacheError::Corruption(_))));
    }

    #[test]
    fn test_non_finite_double_is_corruption() {
        let result = deserialize(&ColumnValue::Double(f64::NAN));
        assert!(matches!(result, Err(CacheError::Corruption(_))));
    }
}
