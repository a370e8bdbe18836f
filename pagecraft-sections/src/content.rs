//! Typed payloads for every known section kind.
//!
//! Payloads are decoded after normalization and default merging, so every
//! field is present by the time serde sees it; `#[serde(default)]` only
//! covers fields inside list items. Keys these structs do not know land in
//! `extra` and are written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blocks::{Block, BlockSlot, BlockTree, Logo};
use crate::catalog::{BlogPost, CaseStudy, ListRef, Service};
use crate::design::Design;
use crate::lenient;

// ─── Composite ────────────────────────────────────────────────────────────────

/// Hero banner. Block slots take precedence; a hero whose slots are all
/// empty renders from the legacy `headline`/`subheadline`/`cta_*` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroSection {
    pub headline: String,
    pub subheadline: String,
    pub cta_text: String,
    pub cta_link: String,
    pub layout: String,
    #[serde(deserialize_with = "lenient::records")]
    pub left_blocks: Vec<Block>,
    #[serde(deserialize_with = "lenient::records")]
    pub right_blocks: Vec<Block>,
    #[serde(deserialize_with = "lenient::records")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HeroSection {
    pub fn has_blocks(&self) -> bool {
        BlockSlot::ALL.iter().any(|slot| !self.slot(*slot).is_empty())
    }
}

impl BlockTree for HeroSection {
    fn slot(&self, slot: BlockSlot) -> &[Block] {
        match slot {
            BlockSlot::Left => &self.left_blocks,
            BlockSlot::Right => &self.right_blocks,
            BlockSlot::Main => &self.blocks,
        }
    }

    fn slot_mut(&mut self, slot: BlockSlot) -> &mut Vec<Block> {
        match slot {
            BlockSlot::Left => &mut self.left_blocks,
            BlockSlot::Right => &mut self.right_blocks,
            BlockSlot::Main => &mut self.blocks,
        }
    }
}

// ─── Simple content ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSection {
    pub title: String,
    /// Markdown
    pub body: String,
    pub alignment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub full_width: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Icon card used by features and services sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureItem {
    pub icon: String,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient::px")]
    pub columns: u32,
    pub items: Vec<FeatureItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatItem {
    pub value: String,
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSection {
    pub title: String,
    pub items: Vec<StatItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub role: String,
    pub avatar_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialsSection {
    pub title: String,
    pub items: Vec<Testimonial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaSection {
    pub title: String,
    pub text: String,
    pub button_text: String,
    pub button_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesSection {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<FeatureItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Services maintained inline on the page (formerly `cards`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceListSection {
    pub title: String,
    pub subtitle: String,
    /// `cards` or `list`
    pub layout: String,
    pub services: Vec<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Store-backed grids ───────────────────────────────────────────────────────

/// Grid over the services collection. Empty `services` lists every enabled
/// service; slugs pick and order them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesGridSection {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient::px")]
    pub columns: u32,
    /// `0` shows everything
    #[serde(deserialize_with = "lenient::px")]
    pub limit: u32,
    pub services: Vec<ListRef<Service>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogGridSection {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient::px")]
    pub limit: u32,
    pub posts: Vec<ListRef<BlogPost>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseStudyGridSection {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient::px")]
    pub limit: u32,
    pub studies: Vec<ListRef<CaseStudy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Extended kinds ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqSection {
    pub title: String,
    pub items: Vec<FaqItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub photo_url: String,
    pub bio: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSection {
    pub title: String,
    pub members: Vec<TeamMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPlan {
    pub name: String,
    pub price: String,
    pub period: String,
    pub features: Vec<String>,
    pub cta_text: String,
    pub cta_link: String,
    pub highlighted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSection {
    pub title: String,
    pub subtitle: String,
    pub plans: Vec<PricingPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoCloudSection {
    pub title: String,
    pub logos: Vec<Logo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSection {
    pub title: String,
    pub text: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub show_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    pub caption: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySection {
    pub title: String,
    #[serde(deserialize_with = "lenient::px")]
    pub columns: u32,
    pub images: Vec<GalleryImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSection {
    pub title: String,
    pub url: String,
    pub caption: String,
    pub autoplay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterSection {
    pub title: String,
    pub text: String,
    pub placeholder: String,
    pub button_text: String,
    /// Form endpoint; empty renders a non-submitting form
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    pub title: String,
    pub events: Vec<TimelineEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessStep {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessStepsSection {
    pub title: String,
    pub steps: Vec<ProcessStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSection {
    pub text: String,
    pub author: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnItem {
    pub title: String,
    /// Markdown
    pub body: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsSection {
    pub columns: Vec<ColumnItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerSection {
    #[serde(deserialize_with = "lenient::px")]
    pub thickness: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacerSection {
    #[serde(deserialize_with = "lenient::px")]
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSection {
    /// Sanitized on output
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
