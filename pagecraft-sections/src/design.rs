use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::lenient;

/// Color used when an override is not a recognisable hex color.
pub const REJECTED_COLOR: &str = "#ffffff";

/// How a section paints its background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Color,
    Gradient,
    Image,
}

impl BackgroundType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "color" => Some(BackgroundType::Color),
            "gradient" => Some(BackgroundType::Gradient),
            "image" => Some(BackgroundType::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundType::Color => "color",
            BackgroundType::Gradient => "gradient",
            BackgroundType::Image => "image",
        }
    }
}

/// Partial visual override attached to a section or block, exactly as stored.
///
/// Every field is optional. Values are kept verbatim (an unknown
/// `background_type` or a bare hex color survives a load/save cycle); the
/// interpretation happens in [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Design {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub background_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub gradient_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub gradient_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub background_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_f64")]
    pub overlay_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_px")]
    pub padding_top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_px")]
    pub padding_bottom: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Design {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Design::default()
    }
}

/// A fully populated design. Also used as the per-type fallback palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDesign {
    pub background_type: BackgroundType,
    pub background_color: String,
    pub gradient_from: String,
    pub gradient_to: String,
    pub background_image_url: String,
    pub overlay_opacity: f64,
    pub text_color: String,
    pub padding_top: u32,
    pub padding_bottom: u32,
}

impl ResolvedDesign {
    /// Flat color palette; gradient stops default to the accent pair used by buttons.
    pub fn solid(background: &str, text: &str, padding: u32) -> Self {
        ResolvedDesign {
            background_type: BackgroundType::Color,
            background_color: background.to_string(),
            gradient_from: "#6366f1".to_string(),
            gradient_to: "#a855f7".to_string(),
            background_image_url: String::new(),
            overlay_opacity: 0.0,
            text_color: text.to_string(),
            padding_top: padding,
            padding_bottom: padding,
        }
    }

    /// Gradient palette
    pub fn gradient(from: &str, to: &str, text: &str, padding: u32) -> Self {
        ResolvedDesign {
            background_type: BackgroundType::Gradient,
            gradient_from: from.to_string(),
            gradient_to: to.to_string(),
            ..ResolvedDesign::solid(from, text, padding)
        }
    }

    pub fn with_overlay(mut self, opacity: f64) -> Self {
        self.overlay_opacity = opacity;
        self
    }
}

/// Resolve a partial design against a type-specific fallback, field by field.
///
/// There is no page- or site-level cascade. Color overrides are normalized
/// with [`normalize_color`]; an empty override string counts as unset.
/// `overlay_opacity` is passed through unchanged, even outside `[0, 1]`.
pub fn resolve(design: Option<&Design>, fallback: &ResolvedDesign) -> ResolvedDesign {
    let Some(design) = design else {
        return fallback.clone();
    };

    let background_type = match design.background_type.as_deref() {
        None => fallback.background_type,
        Some(raw) => BackgroundType::parse(raw).unwrap_or_else(|| {
            debug!("unknown background_type '{}', using fallback", raw);
            fallback.background_type
        }),
    };

    ResolvedDesign {
        background_type,
        background_color: pick_color(design.background_color.as_deref(), &fallback.background_color),
        gradient_from: pick_color(design.gradient_from.as_deref(), &fallback.gradient_from),
        gradient_to: pick_color(design.gradient_to.as_deref(), &fallback.gradient_to),
        background_image_url: pick_text(
            design.background_image_url.as_deref(),
            &fallback.background_image_url,
        ),
        overlay_opacity: design.overlay_opacity.unwrap_or(fallback.overlay_opacity),
        text_color: pick_color(design.text_color.as_deref(), &fallback.text_color),
        padding_top: design.padding_top.unwrap_or(fallback.padding_top),
        padding_bottom: design.padding_bottom.unwrap_or(fallback.padding_bottom),
    }
}

fn pick_color(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        None | Some("") => fallback.to_string(),
        Some(v) => normalize_color(v),
    }
}

fn pick_text(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        None | Some("") => fallback.to_string(),
        Some(v) => v.to_string(),
    }
}

/// Coerce `RRGGBB` to `#RRGGBB`; keep `#RRGGBB`; anything else becomes white.
pub fn normalize_color(value: &str) -> String {
    static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let hex_regex = HEX_COLOR_REGEX
        .get_or_init(|| Regex::new(r"^#?[0-9a-fA-F]{6}$").expect("valid hex color pattern"));

    let value = value.trim();
    if !hex_regex.is_match(value) {
        debug!("rejecting color '{}'", value);
        return REJECTED_COLOR.to_string();
    }
    if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{}", value)
    }
}

/// Converts hex color + opacity to rgba() string
pub fn rgba_from_hex(hex: &str, opacity: f64) -> String {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return format!("rgba({},{},{},{})", r, g, b, opacity);
        }
    }
    format!("rgba(0,0,0,{})", opacity)
}

/// Defaults a section hands down to its blocks. Block styles override these.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTheme {
    pub text_color: String,
    pub muted_text_color: String,
    pub button_from: String,
    pub button_to: String,
    pub button_text_color: String,
    pub outline_color: String,
}

impl BlockTheme {
    pub fn from_design(design: &ResolvedDesign) -> Self {
        BlockTheme {
            text_color: design.text_color.clone(),
            muted_text_color: rgba_from_hex(&design.text_color, 0.75),
            button_from: design.gradient_from.clone(),
            button_to: design.gradient_to.clone(),
            button_text_color: REJECTED_COLOR.to_string(),
            outline_color: design.text_color.clone(),
        }
    }
}
