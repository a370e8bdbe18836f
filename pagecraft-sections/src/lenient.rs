//! Forgiving field deserializers for style-like records (design overrides,
//! block styles). Admin forms have historically written numbers as strings
//! (`"80"`, `"80px"`) and left stray types behind; these helpers accept what
//! they can and drop the rest instead of failing the whole record.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::collection::RecordId;

/// String field: non-string values become `""`.
pub fn opt_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => Some(String::new()),
    })
}

/// Non-optional string field: non-string values become `""`.
pub fn string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(de)?.unwrap_or_default())
}

/// Record identifier: strings and integers are kept, anything else is dropped.
pub fn opt_record_id<'de, D>(de: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) if !s.is_empty() => Some(RecordId::Text(s)),
        Some(Value::Number(n)) => n.as_i64().map(RecordId::Number),
        _ => None,
    })
}

/// Whole-pixel field: accepts integers, floats (rounded) and numeric strings
/// with an optional `px` suffix.
pub fn opt_px<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(de)?.as_ref().and_then(px_from_value))
}

/// Non-optional count/pixel field; garbage becomes `0`.
pub fn px<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_px(de)?.unwrap_or(0))
}

/// Signed whole-pixel field (margins may be negative).
pub fn opt_signed_px<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(de)?
        .as_ref()
        .and_then(number_from_value)
        .map(|n| n.round() as i32))
}

/// Fractional field: numbers and numeric strings.
pub fn opt_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(de)?.as_ref().and_then(number_from_value))
}

/// Nested record: anything but an object becomes the default record.
pub fn object_or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// List of records: entries that are not objects, or that still fail to
/// decode, are dropped. A non-array becomes an empty list.
pub fn records<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(de)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                debug!("dropping non-object list entry");
                return None;
            }
            serde_json::from_value(item)
                .map_err(|err| debug!("dropping undecodable list entry: {}", err))
                .ok()
        })
        .collect())
}

pub(crate) fn px_from_value(value: &Value) -> Option<u32> {
    number_from_value(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u32)
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_string")]
        color: Option<String>,
        #[serde(default, deserialize_with = "opt_px")]
        padding: Option<u32>,
        #[serde(default, deserialize_with = "opt_signed_px")]
        margin: Option<i32>,
        #[serde(default, deserialize_with = "opt_f64")]
        opacity: Option<f64>,
        #[serde(default, deserialize_with = "px")]
        columns: u32,
        #[serde(default, deserialize_with = "opt_record_id")]
        id: Option<RecordId>,
    }

    #[test]
    fn accepts_numeric_strings() {
        let p: Probe = serde_json::from_value(json!({
            "padding": "80px",
            "margin": "-12",
            "opacity": "0.4"
        }))
        .unwrap();
        assert_eq!(p.padding, Some(80));
        assert_eq!(p.margin, Some(-12));
        assert_eq!(p.opacity, Some(0.4));
        assert_eq!(p.color, None);
    }

    #[test]
    fn stray_types_do_not_fail_the_record() {
        let p: Probe = serde_json::from_value(json!({
            "color": 42,
            "padding": "auto",
            "margin": [1, 2],
            "opacity": null
        }))
        .unwrap();
        assert_eq!(p.color, Some(String::new()));
        assert_eq!(p.padding, None);
        assert_eq!(p.margin, None);
        assert_eq!(p.opacity, None);
        assert_eq!(p.columns, 0);
        assert_eq!(p.id, None);
    }

    #[test]
    fn ids_keep_their_json_type() {
        let p: Probe = serde_json::from_value(json!({ "id": 1699999 })).unwrap();
        assert_eq!(p.id, Some(RecordId::Number(1699999)));
        let p: Probe = serde_json::from_value(json!({ "id": "sec_1" })).unwrap();
        assert_eq!(p.id, Some(RecordId::Text("sec_1".to_string())));
        let p: Probe = serde_json::from_value(json!({ "id": true })).unwrap();
        assert_eq!(p.id, None);
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Item {
        #[serde(default, deserialize_with = "string")]
        name: String,
    }

    #[derive(Deserialize)]
    struct Nested {
        #[serde(default, deserialize_with = "object_or_default")]
        item: Item,
        #[serde(default, deserialize_with = "records")]
        items: Vec<Item>,
    }

    #[test]
    fn nested_records_tolerate_stray_types() {
        let n: Nested = serde_json::from_value(json!({
            "item": null,
            "items": ["oops", 4, { "name": "kept" }, { "name": 7 }]
        }))
        .unwrap();
        assert_eq!(n.item, Item::default());
        assert_eq!(
            n.items,
            vec![Item { name: "kept".to_string() }, Item { name: String::new() }]
        );

        let n: Nested = serde_json::from_value(json!({ "item": "x", "items": {} })).unwrap();
        assert_eq!(n.item, Item::default());
        assert!(n.items.is_empty());
    }

    #[test]
    fn negative_padding_is_dropped() {
        let p: Probe = serde_json::from_value(json!({ "padding": -4 })).unwrap();
        assert_eq!(p.padding, None);
    }
}
