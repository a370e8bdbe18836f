use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::{self, Direction, Keyed, RecordId};
use crate::content::*;
use crate::design::Design;
use crate::lenient;
use crate::normalize;
use crate::schema::SectionKind;

macro_rules! section_contents {
    ($($variant:ident($payload:ty)),* $(,)?) => {
        /// Payload of a section, one variant per known kind.
        ///
        /// `Raw` holds records whose kind is unknown, missing, or whose payload
        /// could not be decoded. It is written back exactly as it was read and
        /// renders as a diagnostic placeholder.
        #[derive(Debug, Clone, PartialEq)]
        pub enum SectionContent {
            $($variant($payload),)*
            Raw { kind: Option<String>, data: Value },
        }

        impl SectionContent {
            pub fn kind(&self) -> Option<SectionKind> {
                match self {
                    $(SectionContent::$variant(_) => Some(SectionKind::$variant),)*
                    SectionContent::Raw { .. } => None,
                }
            }

            /// The section-level design override, if any
            pub fn design(&self) -> Option<&Design> {
                match self {
                    $(SectionContent::$variant(payload) => payload.design.as_ref(),)*
                    SectionContent::Raw { .. } => None,
                }
            }

            /// Stored `data` object
            pub fn to_value(&self) -> Value {
                let encoded = match self {
                    $(SectionContent::$variant(payload) => serde_json::to_value(payload),)*
                    SectionContent::Raw { data, .. } => return data.clone(),
                };
                encoded.unwrap_or_else(|err| {
                    warn!("failed to encode section payload: {}", err);
                    Value::Object(Map::new())
                })
            }

            fn decode_typed(kind: SectionKind, data: Value) -> Result<Self, serde_json::Error> {
                Ok(match kind {
                    $(SectionKind::$variant => SectionContent::$variant(serde_json::from_value(data)?),)*
                })
            }
        }
    };
}

section_contents! {
    Hero(HeroSection),
    Text(TextSection),
    Image(ImageSection),
    Features(FeaturesSection),
    Stats(StatsSection),
    Testimonials(TestimonialsSection),
    Cta(CtaSection),
    Services(ServicesSection),
    ServiceList(ServiceListSection),
    ServicesGrid(ServicesGridSection),
    BlogGrid(BlogGridSection),
    CaseStudyGrid(CaseStudyGridSection),
    Faq(FaqSection),
    Team(TeamSection),
    Pricing(PricingSection),
    LogoCloud(LogoCloudSection),
    Contact(ContactSection),
    Gallery(GallerySection),
    Video(VideoSection),
    Newsletter(NewsletterSection),
    Timeline(TimelineSection),
    ProcessSteps(ProcessStepsSection),
    Quote(QuoteSection),
    Columns(ColumnsSection),
    Divider(DividerSection),
    Spacer(SpacerSection),
    Html(HtmlSection),
}

impl SectionContent {
    /// Decode a stored `(type, data)` pair.
    ///
    /// The kind comes from the tag, or from the legacy hero fingerprint when
    /// the tag is missing. Known kinds are normalized and merged over their
    /// template before typed decoding. Nothing here fails: anything that cannot
    /// be typed becomes [`SectionContent::Raw`] with the original data.
    pub fn decode(tag: Option<&str>, data: Value) -> Self {
        let raw = |data: Value| SectionContent::Raw {
            kind: tag.map(str::to_string),
            data,
        };

        let Some(inferred) = normalize::infer_kind(tag, &data) else {
            warn!("section without a type tag kept as raw data");
            return raw(data);
        };
        let Some(kind) = SectionKind::parse(&inferred) else {
            warn!("unknown section type '{}'", inferred);
            return raw(data);
        };

        let canonical = normalize::canonicalize(kind.as_str(), data.clone());
        match SectionContent::decode_typed(kind, canonical) {
            Ok(content) => content,
            Err(err) => {
                warn!("keeping '{}' section as raw data: {}", kind.as_str(), err);
                raw(data)
            }
        }
    }

    /// Registry example for `kind`
    pub fn default_for(kind: SectionKind) -> Self {
        SectionContent::decode(Some(kind.as_str()), kind.default_data())
    }

    /// Stored `type` tag; `None` for untagged raw records
    pub fn tag(&self) -> Option<&str> {
        match self {
            SectionContent::Raw { kind, .. } => kind.as_deref(),
            typed => typed.kind().map(|k| k.as_str()),
        }
    }

    pub fn as_hero(&self) -> Option<&HeroSection> {
        match self {
            SectionContent::Hero(hero) => Some(hero),
            _ => None,
        }
    }

    pub fn as_hero_mut(&mut self) -> Option<&mut HeroSection> {
        match self {
            SectionContent::Hero(hero) => Some(hero),
            _ => None,
        }
    }
}

/// One entry of a page's `content` sequence. Persisted as `{id, type, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SectionRecord", into = "SectionRecord")]
pub struct Section {
    pub id: Option<RecordId>,
    pub content: SectionContent,
    pub extra: Map<String, Value>,
}

impl Section {
    /// New section of `kind` with a fresh id and the registry example payload
    pub fn new(kind: SectionKind) -> Self {
        Section::with_data(kind, kind.default_data())
    }

    /// New section with a fresh id and the given payload
    pub fn with_data(kind: SectionKind, data: Value) -> Self {
        Section {
            id: Some(RecordId::Text(collection::generate_id("sec"))),
            content: SectionContent::decode(Some(kind.as_str()), data),
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> Option<SectionKind> {
        self.content.kind()
    }

    pub fn tag(&self) -> Option<&str> {
        self.content.tag()
    }

    /// Current payload as stored
    pub fn data(&self) -> Value {
        self.content.to_value()
    }

    /// Replace the whole payload, keeping id and kind
    pub fn set_data(&mut self, data: Value) {
        let tag = self.tag().map(str::to_string);
        self.content = match self.kind() {
            Some(_) => SectionContent::decode(tag.as_deref(), data),
            None => SectionContent::Raw { kind: tag, data },
        };
    }

    /// Append a blank item to the kind's item list
    pub fn push_item(&mut self) -> bool {
        let Some((field, blank)) = self.kind().and_then(|k| k.default_item()) else {
            return false;
        };
        self.edit_items(field, |items| collection::add(items, blank))
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        self.edit_item_list(|items| collection::remove_at(items, index))
    }

    pub fn move_item(&mut self, index: usize, direction: Direction) -> bool {
        self.edit_item_list(|items| collection::move_at(items, index, direction))
    }

    pub fn reorder_item(&mut self, from: usize, to: usize) -> bool {
        self.edit_item_list(|items| collection::reorder_at(items, from, to))
    }

    /// Current items of the kind's item list, as stored
    pub fn items(&self) -> Vec<Value> {
        let Some((field, _)) = self.kind().and_then(|k| k.default_item()) else {
            return Vec::new();
        };
        match self.data().get(field) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn edit_item_list(&mut self, edit: impl FnOnce(&[Value]) -> Vec<Value>) -> bool {
        match self.kind().and_then(|k| k.default_item()) {
            Some((field, _)) => self.edit_items(field, edit),
            None => false,
        }
    }

    fn edit_items(&mut self, field: &str, edit: impl FnOnce(&[Value]) -> Vec<Value>) -> bool {
        let mut data = self.data();
        let Some(map) = data.as_object_mut() else {
            return false;
        };
        let current = match map.get(field) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let updated = edit(&current);
        if updated == current {
            return false;
        }
        map.insert(field.to_string(), Value::Array(updated));
        self.set_data(data);
        true
    }
}

impl Keyed for Section {
    fn key(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!("section-{}", index),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_record_id")]
    id: Option<RecordId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    data: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<SectionRecord> for Section {
    fn from(record: SectionRecord) -> Self {
        Section {
            id: record.id,
            content: SectionContent::decode(record.kind.as_deref(), record.data),
            extra: record.extra,
        }
    }
}

impl From<Section> for SectionRecord {
    fn from(section: Section) -> Self {
        let kind = section.tag().map(str::to_string);
        SectionRecord {
            id: section.id,
            kind,
            data: section.content.to_value(),
            extra: section.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockSlot, BlockTree};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn canonical_records_round_trip() {
        for kind in SectionKind::ALL {
            let section = Section::new(kind);
            let stored = serde_json::to_value(&section).unwrap();
            let reloaded: Section = serde_json::from_value(stored.clone()).unwrap();
            assert_eq!(serde_json::to_value(&reloaded).unwrap(), stored, "{}", kind.as_str());
            assert_eq!(reloaded.kind(), Some(kind));
        }
    }

    #[test]
    fn unknown_type_is_kept_verbatim() {
        let raw = json!({ "id": "sec_x", "type": "carousel", "data": { "slides": [1, 2] } });
        let section: Section = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(section.kind(), None);
        assert_eq!(section.tag(), Some("carousel"));
        assert_eq!(serde_json::to_value(&section).unwrap(), raw);
    }

    #[test]
    fn untagged_hero_shape_is_inferred() {
        let section: Section = serde_json::from_value(json!({
            "id": 3,
            "data": { "left_blocks": [] }
        }))
        .unwrap();
        assert_eq!(section.kind(), Some(SectionKind::Hero));
        let hero = section.content.as_hero().unwrap();
        assert!(!hero.has_blocks());
    }

    #[test]
    fn tagged_text_with_design_stays_text() {
        let section: Section = serde_json::from_value(json!({
            "type": "text",
            "data": { "body": "Hello", "design": { "text_color": "ff0000" } }
        }))
        .unwrap();
        assert_eq!(section.kind(), Some(SectionKind::Text));
        assert!(section.content.design().is_some());
    }

    #[test]
    fn untagged_without_fingerprint_is_raw() {
        let raw = json!({ "data": { "body": "orphan" } });
        let section: Section = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(section.kind(), None);
        assert_eq!(serde_json::to_value(&section).unwrap(), raw);
    }

    #[test]
    fn missing_fields_are_filled_from_defaults() {
        let section: Section =
            serde_json::from_value(json!({ "id": "s1", "type": "cta", "data": { "title": "Hi" } })).unwrap();
        let data = section.data();
        assert_eq!(data["title"], json!("Hi"));
        assert_eq!(data["button_text"], json!("Contact us"));
    }

    #[test]
    fn stored_hero_without_slots_gains_no_example_blocks() {
        let section: Section = serde_json::from_value(json!({
            "type": "hero",
            "data": { "headline": "Legacy hero" }
        }))
        .unwrap();
        let hero = section.content.as_hero().unwrap();
        assert_eq!(hero.headline, "Legacy hero");
        assert!(hero.slot(BlockSlot::Left).is_empty());
    }

    #[test]
    fn positional_key_for_legacy_sections() {
        let legacy = Section {
            id: None,
            content: SectionContent::default_for(SectionKind::Quote),
            extra: Map::new(),
        };
        assert_eq!(legacy.key(4), "section-4");
        let stored = serde_json::to_value(&legacy).unwrap();
        assert_eq!(stored.get("id"), None);
    }

    #[test]
    fn stats_items_are_positional() {
        let mut section = Section::with_data(
            SectionKind::Stats,
            json!({ "title": "", "items": [{ "value": "150+", "label": "Clients" }] }),
        );
        assert!(section.remove_item(0));
        assert_eq!(section.items(), Vec::<Value>::new());
        assert!(section.push_item());
        assert_eq!(section.items(), vec![json!({ "value": "", "label": "" })]);
        assert!(!section.remove_item(5));
    }

    #[test]
    fn set_data_keeps_identity() {
        let mut section = Section::new(SectionKind::Text);
        let id = section.id.clone();
        section.set_data(json!({ "title": "New", "body": "", "alignment": "center" }));
        assert_eq!(section.id, id);
        assert_eq!(section.data()["title"], json!("New"));
    }

    #[test]
    fn malformed_blocks_keep_the_hero_typed() {
        let section: Section = serde_json::from_value(json!({
            "type": "hero",
            "data": {
                "left_blocks": [
                    "oops",
                    { "id": "blk_1", "type": "heading", "content": { "text": "Hi" }, "style": null },
                    { "id": "blk_2", "type": "paragraph", "content": null, "style": "bold" }
                ]
            }
        }))
        .unwrap();
        assert_eq!(section.kind(), Some(SectionKind::Hero));
        let left = section.content.as_hero().unwrap().slot(BlockSlot::Left);
        assert_eq!(left.len(), 2);
        assert_eq!(left[0].style, crate::blocks::BlockStyle::default());
        assert_eq!(left[1].kind(), Some(crate::blocks::BlockKind::Paragraph));
    }

    #[test]
    fn malformed_grid_entries_keep_the_grid_typed() {
        let blog: Section = serde_json::from_value(json!({
            "type": "blog_grid",
            "data": { "posts": [{ "slug": "a", "title": 9 }, 4] }
        }))
        .unwrap();
        assert_eq!(blog.kind(), Some(SectionKind::BlogGrid));
        assert_eq!(blog.data()["posts"], json!([{ "slug": "a", "title": "", "excerpt": "", "cover_image_url": "", "published_at": "" }]));

        let studies: Section = serde_json::from_value(json!({
            "type": "case_study_grid",
            "data": { "studies": [4, "launch"] }
        }))
        .unwrap();
        assert_eq!(studies.kind(), Some(SectionKind::CaseStudyGrid));
        assert_eq!(studies.data()["studies"], json!(["launch"]));
    }
}
