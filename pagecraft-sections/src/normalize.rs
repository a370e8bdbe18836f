//! Rewrites stored section payloads into their current canonical shape.
//!
//! Nothing here fails. Legacy shapes are migrated, wrongly typed fields are
//! coerced to zero values and unknown keys are left alone, so a payload that
//! went through [`normalize`] once is unchanged by a second pass.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{BlogPost, CaseStudy, Service};
use crate::schema::SectionKind;

/// Keys that identify an untagged legacy record as a hero section.
///
/// This fingerprint exists only to load records written before every section
/// carried a type tag. New kinds must never be inferred this way.
const HERO_MARKERS: [&str; 3] = ["headline", "left_blocks", "design"];

/// Decide which kind a stored record is. A non-empty explicit tag always
/// wins; untagged records are only ever inferred as hero.
pub fn infer_kind(tag: Option<&str>, data: &Value) -> Option<String> {
    match tag.map(str::trim) {
        Some(tag) if !tag.is_empty() => Some(tag.to_string()),
        _ if is_hero_shaped(data) => {
            debug!("untagged section classified as hero");
            Some(SectionKind::Hero.as_str().to_string())
        }
        _ => None,
    }
}

pub fn is_hero_shaped(data: &Value) -> bool {
    data.as_object()
        .map(|map| HERO_MARKERS.iter().any(|key| map.contains_key(*key)))
        .unwrap_or(false)
}

/// Canonicalize `raw` for section kind `tag`. Unknown kinds pass through.
pub fn normalize(tag: &str, raw: Value) -> Value {
    let Some(kind) = SectionKind::parse(tag) else {
        return raw;
    };

    let mut map = match raw {
        Value::Object(map) => map,
        other => {
            debug!("'{}' payload is not an object ({}), starting empty", tag, json_kind(&other));
            Map::new()
        }
    };

    match kind {
        SectionKind::ServiceList => migrate_service_cards(&mut map),
        SectionKind::ServicesGrid => {
            migrate_service_cards(&mut map);
            clean_list_refs(&mut map, "services", &Service::default());
        }
        SectionKind::BlogGrid => clean_list_refs(&mut map, "posts", &BlogPost::default()),
        SectionKind::CaseStudyGrid => clean_list_refs(&mut map, "studies", &CaseStudy::default()),
        _ => {}
    }

    match map.get("design") {
        Some(Value::Null) => {
            map.remove("design");
        }
        Some(Value::Object(_)) | None => {}
        Some(other) => {
            debug!("'{}' design is {}, replacing with {{}}", tag, json_kind(other));
            map.insert("design".to_string(), Value::Object(Map::new()));
        }
    }

    coerce(Value::Object(map), &kind.merge_template())
}

/// Normalize and fill missing fields from the registry template
pub fn canonicalize(tag: &str, raw: Value) -> Value {
    let normalized = normalize(tag, raw);
    match SectionKind::parse(tag) {
        Some(kind) => merge_defaults(&kind.merge_template(), normalized),
        None => normalized,
    }
}

/// Fill every field missing from `normalized` with the value from `default`.
/// Present fields win; nested objects are merged recursively.
pub fn merge_defaults(default: &Value, normalized: Value) -> Value {
    match (default, normalized) {
        (Value::Object(defaults), Value::Object(mut map)) => {
            for (key, fallback) in defaults {
                match map.remove(key) {
                    None | Some(Value::Null) => {
                        map.insert(key.clone(), fallback.clone());
                    }
                    Some(present) => {
                        map.insert(key.clone(), merge_defaults(fallback, present));
                    }
                }
            }
            Value::Object(map)
        }
        (_, normalized) => normalized,
    }
}

/// Coerce `value` to the JSON shape of `template`.
///
/// A value of the wrong kind becomes the template kind's zero value. Object
/// keys known to the template are coerced recursively (a `null` is dropped so
/// the default can fill it); other keys pass through. Array elements are
/// coerced against the template's first element when it has one.
pub fn coerce(value: Value, template: &Value) -> Value {
    match (template, value) {
        (Value::Null, value) => value,
        (Value::Object(fields), Value::Object(mut map)) => {
            for (key, expected) in fields {
                match map.get_mut(key) {
                    Some(Value::Null) => {
                        map.remove(key);
                    }
                    Some(slot) => {
                        let current = slot.take();
                        *slot = coerce(current, expected);
                    }
                    None => {}
                }
            }
            Value::Object(map)
        }
        (Value::Array(sample), Value::Array(items)) => match sample.first() {
            Some(element) => Value::Array(items.into_iter().map(|item| coerce(item, element)).collect()),
            None => Value::Array(items),
        },
        (Value::String(_), value @ Value::String(_)) => value,
        (Value::Number(_), value @ Value::Number(_)) => value,
        (Value::Bool(_), value @ Value::Bool(_)) => value,
        (template, _) => zero_value(template),
    }
}

/// `""`, `0`, `false`, `[]` or `{}` depending on the kind of `template`
pub fn zero_value(template: &Value) -> Value {
    match template {
        Value::Null => Value::Null,
        Value::Bool(_) => Value::Bool(false),
        Value::Number(_) => Value::from(0),
        Value::String(_) => Value::String(String::new()),
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(_) => Value::Object(Map::new()),
    }
}

/// `cards` (pre-`services` shape) becomes `services`. Cards are appended
/// after any services already present; items without an `enabled` flag are
/// enabled and `layout` defaults to `"cards"`.
fn migrate_service_cards(map: &mut Map<String, Value>) {
    let Some(cards) = map.remove("cards") else {
        return;
    };
    let cards = match cards {
        Value::Array(cards) => cards,
        other => {
            debug!("dropping legacy 'cards' of type {}", json_kind(&other));
            Vec::new()
        }
    };
    debug!("migrating {} legacy service cards", cards.len());

    let mut services = match map.remove("services") {
        Some(Value::Array(existing)) => existing,
        _ => Vec::new(),
    };
    services.extend(cards.into_iter().map(|mut card| {
        if let Value::Object(fields) = &mut card {
            fields.entry("enabled").or_insert(Value::Bool(true));
        }
        card
    }));
    map.insert("services".to_string(), Value::Array(services));

    if matches!(map.get("layout"), None | Some(Value::Null)) {
        map.insert("layout".to_string(), Value::String("cards".to_string()));
    }
}

/// Grid entries may be slugs (legacy) or inline records. Records are
/// coerced against the shape of `record`; anything else is dropped.
fn clean_list_refs<T: Serialize>(map: &mut Map<String, Value>, field: &str, record: &T) {
    let items = match map.remove(field) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            debug!("dropping grid '{}' of type {}", field, json_kind(&other));
            return;
        }
        None => return,
    };
    let template = serde_json::to_value(record).unwrap_or(Value::Null);
    let cleaned = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(slug) => Some(Value::String(slug)),
            record @ Value::Object(_) => Some(coerce(record, &template)),
            other => {
                debug!("dropping '{}' entry of type {}", field, json_kind(&other));
                None
            }
        })
        .collect();
    map.insert(field.to_string(), Value::Array(cleaned));
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn legacy_cards_become_services() {
        let raw = json!({
            "title": "What we do",
            "cards": [
                { "title": "Design", "icons": ["pen", "grid"] },
                { "title": "Build", "icons": [], "enabled": false }
            ]
        });
        let out = normalize("service_list", raw);
        assert_eq!(out.get("cards"), None);
        assert_eq!(out["layout"], json!("cards"));
        assert_eq!(out["services"][0]["title"], json!("Design"));
        assert_eq!(out["services"][0]["icons"], json!(["pen", "grid"]));
        assert_eq!(out["services"][0]["enabled"], json!(true));
        assert_eq!(out["services"][1]["enabled"], json!(false));
    }

    #[test]
    fn existing_layout_survives_migration() {
        let out = normalize("service_list", json!({ "layout": "list", "cards": [] }));
        assert_eq!(out["layout"], json!("list"));
        assert_eq!(out["services"], json!([]));
    }

    #[test]
    fn other_kinds_ignore_cards() {
        let out = normalize("features", json!({ "cards": [1, 2] }));
        assert_eq!(out["cards"], json!([1, 2]));
    }

    #[test]
    fn grid_keeps_slugs_and_drops_garbage() {
        let out = normalize("services-grid", json!({ "services": ["seo", 4, { "title": 9 }] }));
        assert_eq!(out["services"][0], json!("seo"));
        assert_eq!(out["services"][1]["title"], json!(""));
        assert_eq!(out["services"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn blog_and_case_study_entries_are_cleaned() {
        let out = normalize("blog_grid", json!({ "posts": [{ "slug": "a", "title": 9 }, 4, "b"] }));
        assert_eq!(out["posts"][0]["title"], json!(""));
        assert_eq!(out["posts"][0]["slug"], json!("a"));
        assert_eq!(out["posts"][1], json!("b"));

        let out = normalize("case_study_grid", json!({ "studies": [4, { "client": false }] }));
        assert_eq!(out["studies"], json!([{ "client": "" }]));
    }

    #[test]
    fn wrong_kinds_become_zero_values() {
        let out = normalize(
            "stats",
            json!({ "title": 12, "items": "nope", "note": { "kept": true } }),
        );
        assert_eq!(out["title"], json!(""));
        assert_eq!(out["items"], json!([]));
        assert_eq!(out["note"], json!({ "kept": true }));
    }

    #[test]
    fn null_counts_as_absent() {
        let out = canonicalize("cta", json!({ "title": null, "button_link": null }));
        let defaults = SectionKind::Cta.default_data();
        assert_eq!(out["title"], defaults["title"]);
        assert_eq!(out["button_link"], defaults["button_link"]);
    }

    #[test]
    fn non_object_design_becomes_empty() {
        let out = normalize("text", json!({ "design": "dark" }));
        assert_eq!(out["design"], json!({}));
        let out = normalize("text", json!({ "design": null }));
        assert_eq!(out.get("design"), None);
    }

    #[test]
    fn array_items_coerced_against_first_template_item() {
        let out = normalize("stats", json!({ "items": [{ "value": 150, "label": "Clients" }, "x"] }));
        assert_eq!(out["items"], json!([{ "value": "", "label": "Clients" }, {}]));
    }

    #[test]
    fn normalization_is_idempotent_for_every_default() {
        for kind in SectionKind::ALL {
            let once = normalize(kind.as_str(), kind.default_data());
            let twice = normalize(kind.as_str(), once.clone());
            assert_eq!(twice, once, "{} not idempotent", kind.as_str());
        }
    }

    #[test]
    fn unknown_kinds_pass_through() {
        let raw = json!({ "anything": [1, "two"] });
        assert_eq!(normalize("carousel", raw.clone()), raw);
        assert_eq!(canonicalize("carousel", raw.clone()), raw);
    }

    #[test]
    fn explicit_tag_beats_fingerprint() {
        let data = json!({ "design": { "text_color": "#000000" }, "body": "x" });
        assert_eq!(infer_kind(Some("text"), &data).as_deref(), Some("text"));
        assert_eq!(infer_kind(None, &json!({ "left_blocks": [] })).as_deref(), Some("hero"));
        assert_eq!(infer_kind(Some(""), &json!({ "headline": "Hi" })).as_deref(), Some("hero"));
        assert_eq!(infer_kind(None, &json!({ "body": "x" })), None);
    }

    #[test]
    fn merge_fills_nested_objects() {
        let merged = merge_defaults(
            &json!({ "a": 1, "nested": { "x": "d", "y": "d" } }),
            json!({ "nested": { "x": "given" }, "extra": true }),
        );
        assert_eq!(
            merged,
            json!({ "a": 1, "nested": { "x": "given", "y": "d" }, "extra": true })
        );
    }
}
