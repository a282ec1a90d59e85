// ── Lenient field decoders ──
//
// The normalized tree only knows integers and strings, and the
// controller mixes "yes"/"no", 1/0 and free-form numbers freely.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// A child list that may hold one element (an object) or many (an array).
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

/// Any scalar rendered as text; names like `<Name>1</Name>` arrive as numbers.
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!("expected text, got {other}"))),
    }
}

/// `yes`/`no`, `on`/`off`, `true`/`false` or `1`/`0`.
pub(crate) fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().is_some_and(|v| v != 0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "on" | "true" | "1" => Ok(true),
            "no" | "off" | "false" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!("expected yes/no, got {other:?}"))),
        },
        Value::Null => Ok(false),
        other => Err(de::Error::custom(format!("expected yes/no, got {other}"))),
    }
}

fn value_to_f64<E: de::Error>(value: &Value) -> Result<Option<f64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        other => Err(E::custom(format!("expected a number, got {other}"))),
    }
}

/// A decimal that may arrive as an integer or as text.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64::<D::Error>(&value)?.unwrap_or_default())
}

pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => value_to_f64::<D::Error>(&value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::one_or_many")]
        items: Vec<i64>,
        #[serde(default, deserialize_with = "super::yes_no")]
        flag: bool,
        #[serde(default, deserialize_with = "super::opt_text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "super::lenient_f64")]
        value: f64,
    }

    #[test]
    fn single_item_becomes_list() {
        let holder: Holder = serde_json::from_value(json!({ "items": 7 })).unwrap();
        assert_eq!(holder.items, vec![7]);
        let holder: Holder = serde_json::from_value(json!({ "items": [1, 2] })).unwrap();
        assert_eq!(holder.items, vec![1, 2]);
        let holder: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(holder.items.is_empty());
    }

    #[test]
    fn yes_no_variants() {
        for (raw, expected) in [
            (json!("yes"), true),
            (json!("No"), false),
            (json!(1), true),
            (json!(0), false),
        ] {
            let holder: Holder = serde_json::from_value(json!({ "flag": raw })).unwrap();
            assert_eq!(holder.flag, expected);
        }
        assert!(serde_json::from_value::<Holder>(json!({ "flag": "maybe" })).is_err());
    }

    #[test]
    fn numeric_names_and_decimal_text() {
        let holder: Holder =
            serde_json::from_value(json!({ "name": 1, "value": "7.25" })).unwrap();
        assert_eq!(holder.name.as_deref(), Some("1"));
        assert!((holder.value - 7.25).abs() < f64::EPSILON);
    }
}
