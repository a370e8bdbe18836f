//! Section schema registry: the closed set of section kinds, their example
//! payloads, item templates and design fallback palettes.

use serde_json::{json, Value};

use crate::blocks::{Block, BlockContent, BlockKind, BlockSlot, ButtonBlock, ButtonGroupBlock, HeadingBlock, ImageBlock, TextBlock};
use crate::design::ResolvedDesign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Hero,
    Text,
    Image,
    Features,
    Stats,
    Testimonials,
    Cta,
    Services,
    ServiceList,
    ServicesGrid,
    BlogGrid,
    CaseStudyGrid,
    Faq,
    Team,
    Pricing,
    LogoCloud,
    Contact,
    Gallery,
    Video,
    Newsletter,
    Timeline,
    ProcessSteps,
    Quote,
    Columns,
    Divider,
    Spacer,
    Html,
}

impl SectionKind {
    pub const ALL: [SectionKind; 27] = [
        SectionKind::Hero,
        SectionKind::Text,
        SectionKind::Image,
        SectionKind::Features,
        SectionKind::Stats,
        SectionKind::Testimonials,
        SectionKind::Cta,
        SectionKind::Services,
        SectionKind::ServiceList,
        SectionKind::ServicesGrid,
        SectionKind::BlogGrid,
        SectionKind::CaseStudyGrid,
        SectionKind::Faq,
        SectionKind::Team,
        SectionKind::Pricing,
        SectionKind::LogoCloud,
        SectionKind::Contact,
        SectionKind::Gallery,
        SectionKind::Video,
        SectionKind::Newsletter,
        SectionKind::Timeline,
        SectionKind::ProcessSteps,
        SectionKind::Quote,
        SectionKind::Columns,
        SectionKind::Divider,
        SectionKind::Spacer,
        SectionKind::Html,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        SectionKind::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    /// Stored `type` tag
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::Text => "text",
            SectionKind::Image => "image",
            SectionKind::Features => "features",
            SectionKind::Stats => "stats",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Cta => "cta",
            SectionKind::Services => "services",
            SectionKind::ServiceList => "service_list",
            SectionKind::ServicesGrid => "services-grid",
            SectionKind::BlogGrid => "blog_grid",
            SectionKind::CaseStudyGrid => "case_study_grid",
            SectionKind::Faq => "faq",
            SectionKind::Team => "team",
            SectionKind::Pricing => "pricing",
            SectionKind::LogoCloud => "logo_cloud",
            SectionKind::Contact => "contact",
            SectionKind::Gallery => "gallery",
            SectionKind::Video => "video",
            SectionKind::Newsletter => "newsletter",
            SectionKind::Timeline => "timeline",
            SectionKind::ProcessSteps => "process_steps",
            SectionKind::Quote => "quote",
            SectionKind::Columns => "columns",
            SectionKind::Divider => "divider",
            SectionKind::Spacer => "spacer",
            SectionKind::Html => "html",
        }
    }

    /// Builder palette label
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Hero => "Hero",
            SectionKind::Text => "Text",
            SectionKind::Image => "Image",
            SectionKind::Features => "Features",
            SectionKind::Stats => "Stats",
            SectionKind::Testimonials => "Testimonials",
            SectionKind::Cta => "Call to action",
            SectionKind::Services => "Services",
            SectionKind::ServiceList => "Service list",
            SectionKind::ServicesGrid => "Services grid",
            SectionKind::BlogGrid => "Blog grid",
            SectionKind::CaseStudyGrid => "Case studies",
            SectionKind::Faq => "FAQ",
            SectionKind::Team => "Team",
            SectionKind::Pricing => "Pricing",
            SectionKind::LogoCloud => "Logo cloud",
            SectionKind::Contact => "Contact",
            SectionKind::Gallery => "Gallery",
            SectionKind::Video => "Video",
            SectionKind::Newsletter => "Newsletter",
            SectionKind::Timeline => "Timeline",
            SectionKind::ProcessSteps => "Process steps",
            SectionKind::Quote => "Quote",
            SectionKind::Columns => "Columns",
            SectionKind::Divider => "Divider",
            SectionKind::Spacer => "Spacer",
            SectionKind::Html => "Custom HTML",
        }
    }

    /// Composite kinds hold block slots instead of fixed fields
    pub fn is_composite(&self) -> bool {
        matches!(self, SectionKind::Hero)
    }

    /// Block slots of a composite kind
    pub fn slots(&self) -> &'static [BlockSlot] {
        if self.is_composite() {
            &BlockSlot::ALL
        } else {
            &[]
        }
    }

    /// Design values used for any field a section's `design` leaves unset
    pub fn palette(&self) -> ResolvedDesign {
        match self {
            SectionKind::Hero => {
                ResolvedDesign::gradient("#0f172a", "#1e293b", "#ffffff", 96).with_overlay(0.5)
            }
            SectionKind::Cta | SectionKind::Newsletter => {
                ResolvedDesign::gradient("#6366f1", "#a855f7", "#ffffff", 80)
            }
            SectionKind::Services
            | SectionKind::ServiceList
            | SectionKind::ServicesGrid
            | SectionKind::Quote => ResolvedDesign::solid("#000000", "#ffffff", 80),
            SectionKind::Stats | SectionKind::Pricing => {
                ResolvedDesign::solid("#f8fafc", "#0f172a", 80)
            }
            SectionKind::Testimonials | SectionKind::Faq | SectionKind::Timeline => {
                ResolvedDesign::solid("#f1f5f9", "#0f172a", 80)
            }
            SectionKind::Divider => ResolvedDesign::solid("#ffffff", "#e2e8f0", 16),
            SectionKind::Spacer | SectionKind::Html => ResolvedDesign::solid("#ffffff", "#0f172a", 0),
            _ => ResolvedDesign::solid("#ffffff", "#0f172a", 64),
        }
    }

    /// Fresh example payload shown when a section of this kind is created
    pub fn default_data(&self) -> Value {
        match self {
            SectionKind::Hero => hero_example(),
            SectionKind::Text => json!({
                "title": "About us",
                "body": "Write a few paragraphs here. **Markdown** is supported.",
                "alignment": "left"
            }),
            SectionKind::Image => json!({
                "url": "",
                "alt": "",
                "caption": "",
                "full_width": false
            }),
            SectionKind::Features => json!({
                "title": "Why choose us",
                "subtitle": "",
                "columns": 3,
                "items": [
                    { "icon": "zap", "title": "Fast", "description": "Pages load in an instant." },
                    { "icon": "shield", "title": "Secure", "description": "Safe by default." },
                    { "icon": "heart", "title": "Loved", "description": "Editors enjoy using it." }
                ]
            }),
            SectionKind::Stats => json!({
                "title": "",
                "items": [
                    { "value": "150+", "label": "Clients" },
                    { "value": "12", "label": "Years" }
                ]
            }),
            SectionKind::Testimonials => json!({
                "title": "What our clients say",
                "items": [
                    {
                        "quote": "They shipped our site in two weeks.",
                        "author": "Jane Doe",
                        "role": "CEO, Acme",
                        "avatar_url": ""
                    }
                ]
            }),
            SectionKind::Cta => json!({
                "title": "Ready to start?",
                "text": "Tell us about your project.",
                "button_text": "Contact us",
                "button_link": "/contact"
            }),
            SectionKind::Services => json!({
                "title": "Our services",
                "subtitle": "",
                "items": [
                    { "icon": "code", "title": "Development", "description": "Websites and apps." },
                    { "icon": "pen", "title": "Design", "description": "Brands and interfaces." }
                ]
            }),
            SectionKind::ServiceList => json!({
                "title": "Services",
                "subtitle": "",
                "layout": "cards",
                "services": [service_example("Consulting", "briefcase")]
            }),
            SectionKind::ServicesGrid => json!({
                "title": "Services",
                "subtitle": "",
                "columns": 3,
                "limit": 0,
                "services": []
            }),
            SectionKind::BlogGrid => json!({
                "title": "Latest posts",
                "subtitle": "",
                "limit": 3,
                "posts": []
            }),
            SectionKind::CaseStudyGrid => json!({
                "title": "Case studies",
                "subtitle": "",
                "limit": 3,
                "studies": []
            }),
            SectionKind::Faq => json!({
                "title": "Frequently asked questions",
                "items": [
                    { "question": "How long does a project take?", "answer": "Usually four to six weeks." }
                ]
            }),
            SectionKind::Team => json!({
                "title": "Meet the team",
                "members": [
                    { "name": "Alex Kim", "role": "Founder", "photo_url": "", "bio": "" }
                ]
            }),
            SectionKind::Pricing => json!({
                "title": "Pricing",
                "subtitle": "",
                "plans": [
                    {
                        "name": "Starter",
                        "price": "$29",
                        "period": "month",
                        "features": ["1 site", "Email support"],
                        "cta_text": "Choose plan",
                        "cta_link": "/signup",
                        "highlighted": false
                    }
                ]
            }),
            SectionKind::LogoCloud => json!({
                "title": "Trusted by",
                "logos": [{ "url": "", "alt": "" }]
            }),
            SectionKind::Contact => json!({
                "title": "Get in touch",
                "text": "",
                "email": "hello@example.com",
                "phone": "",
                "address": "",
                "show_form": true
            }),
            SectionKind::Gallery => json!({
                "title": "",
                "columns": 3,
                "images": [{ "url": "", "alt": "", "caption": "" }]
            }),
            SectionKind::Video => json!({
                "title": "",
                "url": "",
                "caption": "",
                "autoplay": false
            }),
            SectionKind::Newsletter => json!({
                "title": "Stay in the loop",
                "text": "One email a month, no spam.",
                "placeholder": "Enter your email",
                "button_text": "Subscribe",
                "action": ""
            }),
            SectionKind::Timeline => json!({
                "title": "Our story",
                "events": [
                    { "date": "2015", "title": "Founded", "description": "" }
                ]
            }),
            SectionKind::ProcessSteps => json!({
                "title": "How it works",
                "steps": [
                    { "title": "Discover", "description": "We learn about your goals." },
                    { "title": "Build", "description": "We design and develop." }
                ]
            }),
            SectionKind::Quote => json!({
                "text": "Simplicity is the ultimate sophistication.",
                "author": "Leonardo da Vinci",
                "role": ""
            }),
            SectionKind::Columns => json!({
                "columns": [
                    { "title": "Left", "body": "" },
                    { "title": "Right", "body": "" }
                ]
            }),
            SectionKind::Divider => json!({ "thickness": 1 }),
            SectionKind::Spacer => json!({ "height": 48 }),
            SectionKind::Html => json!({ "html": "" }),
        }
    }

    /// Template that stored payloads are coerced against and merged over.
    ///
    /// Same as [`default_data`](Self::default_data) except that block slots
    /// are empty, so a stored hero missing a slot never gains example blocks.
    pub fn merge_template(&self) -> Value {
        let mut template = self.default_data();
        if let Value::Object(map) = &mut template {
            for slot in self.slots() {
                map.insert(slot.field_name().to_string(), Value::Array(Vec::new()));
            }
        }
        template
    }

    /// Name of the item array and its blank item, for list-bearing kinds
    pub fn default_item(&self) -> Option<(&'static str, Value)> {
        let (field, item) = match self {
            SectionKind::Features | SectionKind::Services => {
                ("items", json!({ "icon": "", "title": "", "description": "" }))
            }
            SectionKind::Stats => ("items", json!({ "value": "", "label": "" })),
            SectionKind::Testimonials => (
                "items",
                json!({ "quote": "", "author": "", "role": "", "avatar_url": "" }),
            ),
            SectionKind::ServiceList => ("services", service_example("", "")),
            SectionKind::Faq => ("items", json!({ "question": "", "answer": "" })),
            SectionKind::Team => (
                "members",
                json!({ "name": "", "role": "", "photo_url": "", "bio": "" }),
            ),
            SectionKind::Pricing => (
                "plans",
                json!({
                    "name": "",
                    "price": "",
                    "period": "",
                    "features": [],
                    "cta_text": "",
                    "cta_link": "",
                    "highlighted": false
                }),
            ),
            SectionKind::LogoCloud => ("logos", json!({ "url": "", "alt": "" })),
            SectionKind::Gallery => ("images", json!({ "url": "", "alt": "", "caption": "" })),
            SectionKind::Timeline => ("events", json!({ "date": "", "title": "", "description": "" })),
            SectionKind::ProcessSteps => ("steps", json!({ "title": "", "description": "" })),
            SectionKind::Columns => ("columns", json!({ "title": "", "body": "" })),
            _ => return None,
        };
        Some((field, item))
    }
}

/// Example payload for `tag`; unknown tags get an empty object.
pub fn default_for(tag: &str) -> Value {
    SectionKind::parse(tag)
        .map(|kind| kind.default_data())
        .unwrap_or_else(|| json!({}))
}

fn service_example(title: &str, icon: &str) -> Value {
    json!({
        "slug": "",
        "title": title,
        "description": "",
        "icon": icon,
        "image_url": "",
        "enabled": true
    })
}

fn hero_example() -> Value {
    let heading = block(BlockContent::Heading(HeadingBlock {
        text: "Build something people love".to_string(),
        level: 1,
        ..HeadingBlock::default()
    }));
    let tagline = block(BlockContent::Tagline(TextBlock {
        text: "NEW".to_string(),
        ..TextBlock::default()
    }));
    let paragraph = block(BlockContent::Paragraph(TextBlock {
        text: "A short sentence about what you offer and who it is for.".to_string(),
        ..TextBlock::default()
    }));
    let buttons = block(BlockContent::ButtonGroup(ButtonGroupBlock {
        buttons: vec![
            ButtonBlock {
                text: "Get started".to_string(),
                link: "#".to_string(),
                variant: "primary".to_string(),
                ..ButtonBlock::default()
            },
            ButtonBlock {
                text: "Learn more".to_string(),
                link: "#".to_string(),
                variant: "outline".to_string(),
                ..ButtonBlock::default()
            },
        ],
        ..ButtonGroupBlock::default()
    }));
    let image = block(BlockContent::Image(ImageBlock {
        alt: "Product screenshot".to_string(),
        rounded: true,
        ..ImageBlock::default()
    }));

    json!({
        "headline": "Build something people love",
        "subheadline": "",
        "cta_text": "",
        "cta_link": "",
        "layout": "split",
        "left_blocks": [tagline, heading, paragraph, buttons],
        "right_blocks": [image],
        "blocks": []
    })
}

fn block(content: BlockContent) -> Value {
    let kind = content.kind().unwrap_or(BlockKind::Paragraph);
    let mut block = Block::new(kind);
    block.content = content;
    serde_json::to_value(block).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tags_round_trip() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::parse(kind.as_str()), Some(kind));
            assert!(!kind.label().is_empty());
        }
        assert_eq!(SectionKind::parse("carousel"), None);
    }

    #[test]
    fn unknown_tag_defaults_to_empty_object() {
        assert_eq!(default_for("carousel"), json!({}));
    }

    #[test]
    fn defaults_are_independent_copies() {
        let mut first = default_for("stats");
        first["items"] = json!([]);
        assert_eq!(default_for("stats")["items"][0]["value"], json!("150+"));
    }

    #[test]
    fn hero_example_blocks_get_fresh_ids() {
        let a = default_for("hero");
        let b = default_for("hero");
        assert_ne!(a["left_blocks"][0]["id"], b["left_blocks"][0]["id"]);
        assert_eq!(a["left_blocks"][1]["type"], json!("heading"));
    }

    #[test]
    fn merge_template_empties_slots() {
        let template = SectionKind::Hero.merge_template();
        assert_eq!(template["left_blocks"], json!([]));
        assert_eq!(template["right_blocks"], json!([]));
        assert_eq!(template["headline"], json!("Build something people love"));
    }

    #[test]
    fn blank_stat_item() {
        assert_eq!(
            SectionKind::Stats.default_item(),
            Some(("items", json!({ "value": "", "label": "" })))
        );
        assert_eq!(SectionKind::Quote.default_item(), None);
    }

    #[test]
    fn only_hero_is_composite() {
        let composite: Vec<_> = SectionKind::ALL.into_iter().filter(|k| k.is_composite()).collect();
        assert_eq!(composite, vec![SectionKind::Hero]);
    }
}
