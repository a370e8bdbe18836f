//! Output of the renderer: a small tree of layout and content nodes that the
//! HTML serializer (or any other frontend) turns into markup.

use serde::{Deserialize, Serialize};

use crate::design::ResolvedDesign;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum VisualNode {
    Section(SectionFrame),
    Container(Container),
    Flex(Flex),
    Grid(Grid),
    Text(Text),
    Heading(Heading),
    Markdown(Markdown),
    Image(Image),
    Button(Button),
    EmailForm(EmailForm),
    Divider(Divider),
    Spacer(Spacer),
    Html(RawHtml),
    Video(Video),
    /// List data is still being fetched
    Loading(Loading),
    Notice(Notice),
    /// Unknown or undecodable section: type name plus a JSON dump
    Diagnostic(Diagnostic),
}

/// Outer wrapper of one rendered section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFrame {
    /// Section key (`data-section-id`)
    pub key: String,
    pub kind: String,
    pub design: ResolvedDesign,
    pub children: Vec<VisualNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    pub children: Vec<VisualNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignItems {
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flex {
    pub direction: FlexDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<AlignItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    pub wrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    pub children: Vec<VisualNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    pub children: Vec<VisualNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    /// 1 to 6
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

/// Markdown source; sanitized when serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markdown {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub href: String,
    pub new_tab: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailForm {
    pub placeholder: String,
    pub button_text: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_style: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spacer {
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHtml {
    /// Sanitized when serialized
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub src: String,
    pub autoplay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loading {
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: String,
    pub dump: String,
}

/// A dimension value that can be either a number (pixels) or a percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Percent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }
}

/// Presentation properties of a node. Only set fields are emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    // Dimension properties
    pub width: Option<Dimension>,
    pub max_width: Option<f64>,
    pub height: Option<f64>,

    // Spacing properties
    pub padding: Option<f64>,
    pub padding_top: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub margin_top: Option<f64>,
    pub margin_bottom: Option<f64>,

    // Color properties
    pub color: Option<String>,
    pub background_color: Option<String>,
    /// CSS gradient or `url(...)` background
    pub background: Option<String>,
    pub border_color: Option<String>,
    pub opacity: Option<f64>,

    // Typography properties
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub text_align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub uppercase: Option<bool>,

    // Border properties
    pub border_width: Option<f64>,
    pub border_radius: Option<f64>,
}

impl Style {
    /// Returns `None` for an empty style so nodes stay compact
    pub fn into_option(self) -> Option<Style> {
        if self == Style::default() {
            None
        } else {
            Some(self)
        }
    }
}

impl VisualNode {
    pub fn text(text: impl Into<String>, style: Option<Style>) -> Self {
        VisualNode::Text(Text {
            text: text.into(),
            style,
        })
    }

    pub fn heading(text: impl Into<String>, level: u8, style: Option<Style>) -> Self {
        VisualNode::Heading(Heading {
            text: text.into(),
            level: level.clamp(1, 6),
            style,
        })
    }

    pub fn column(children: Vec<VisualNode>, gap: f64) -> Self {
        VisualNode::Flex(Flex {
            direction: FlexDirection::Column,
            align: None,
            gap: Some(gap),
            wrap: false,
            style: None,
            children,
        })
    }

    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        VisualNode::Notice(Notice {
            level,
            message: message.into(),
        })
    }

    /// Child nodes, for containers
    pub fn children(&self) -> &[VisualNode] {
        match self {
            VisualNode::Section(s) => &s.children,
            VisualNode::Container(c) => &c.children,
            VisualNode::Flex(f) => &f.children,
            VisualNode::Grid(g) => &g.children,
            _ => &[],
        }
    }

    /// Depth-first iterator over this node and all descendants
    pub fn walk(&self) -> Vec<&VisualNode> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}
