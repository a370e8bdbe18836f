use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::{self, Direction, Keyed, RecordId};
use crate::lenient;
use crate::normalize::coerce;

/// The closed set of block kinds a composite section can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Heading,
    Paragraph,
    Tagline,
    EmailInput,
    Button,
    ButtonGroup,
    Image,
    LogoRow,
    Spacer,
    Divider,
    CustomHtml,
}

impl BlockKind {
    pub const ALL: [BlockKind; 11] = [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::Tagline,
        BlockKind::EmailInput,
        BlockKind::Button,
        BlockKind::ButtonGroup,
        BlockKind::Image,
        BlockKind::LogoRow,
        BlockKind::Spacer,
        BlockKind::Divider,
        BlockKind::CustomHtml,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        BlockKind::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Tagline => "tagline",
            BlockKind::EmailInput => "email_input",
            BlockKind::Button => "button",
            BlockKind::ButtonGroup => "button_group",
            BlockKind::Image => "image",
            BlockKind::LogoRow => "logo_row",
            BlockKind::Spacer => "spacer",
            BlockKind::Divider => "divider",
            BlockKind::CustomHtml => "custom_html",
        }
    }

    /// Palette label in the builder
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Heading => "Heading",
            BlockKind::Paragraph => "Paragraph",
            BlockKind::Tagline => "Tagline",
            BlockKind::EmailInput => "Email capture",
            BlockKind::Button => "Button",
            BlockKind::ButtonGroup => "Button group",
            BlockKind::Image => "Image",
            BlockKind::LogoRow => "Logo row",
            BlockKind::Spacer => "Spacer",
            BlockKind::Divider => "Divider",
            BlockKind::CustomHtml => "Custom HTML",
        }
    }
}

// ─── Block content ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingBlock {
    pub text: String,
    #[serde(deserialize_with = "lenient::px")]
    pub level: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shared by paragraph and tagline blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailInputBlock {
    pub placeholder: String,
    pub button_text: String,
    pub action: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonBlock {
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(deserialize_with = "lenient::string")]
    pub link: String,
    /// `primary`, `outline` or `ghost`
    #[serde(deserialize_with = "lenient::string")]
    pub variant: String,
    pub new_tab: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonGroupBlock {
    pub buttons: Vec<ButtonBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBlock {
    pub url: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_px")]
    pub width: Option<u32>,
    pub rounded: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logo {
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub alt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoRowBlock {
    pub title: String,
    pub logos: Vec<Logo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacerBlock {
    #[serde(deserialize_with = "lenient::px")]
    pub height: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerBlock {
    #[serde(deserialize_with = "lenient::px")]
    pub thickness: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomHtmlBlock {
    pub html: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed block payload. `Unknown` keeps unrecognised blocks intact so they
/// survive a save; they render nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Heading(HeadingBlock),
    Paragraph(TextBlock),
    Tagline(TextBlock),
    EmailInput(EmailInputBlock),
    Button(ButtonBlock),
    ButtonGroup(ButtonGroupBlock),
    Image(ImageBlock),
    LogoRow(LogoRowBlock),
    Spacer(SpacerBlock),
    Divider(DividerBlock),
    CustomHtml(CustomHtmlBlock),
    Unknown { kind: String, content: Value },
}

impl BlockContent {
    /// Content a freshly added block starts with
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Heading => BlockContent::Heading(HeadingBlock {
                text: "Your headline here".to_string(),
                level: 1,
                ..HeadingBlock::default()
            }),
            BlockKind::Paragraph => BlockContent::Paragraph(TextBlock {
                text: "Tell visitors what you do in a sentence or two.".to_string(),
                ..TextBlock::default()
            }),
            BlockKind::Tagline => BlockContent::Tagline(TextBlock {
                text: "New".to_string(),
                ..TextBlock::default()
            }),
            BlockKind::EmailInput => BlockContent::EmailInput(EmailInputBlock {
                placeholder: "Enter your email".to_string(),
                button_text: "Subscribe".to_string(),
                ..EmailInputBlock::default()
            }),
            BlockKind::Button => BlockContent::Button(button("Get started", "primary")),
            BlockKind::ButtonGroup => BlockContent::ButtonGroup(ButtonGroupBlock {
                buttons: vec![button("Get started", "primary"), button("Learn more", "outline")],
                ..ButtonGroupBlock::default()
            }),
            BlockKind::Image => BlockContent::Image(ImageBlock::default()),
            BlockKind::LogoRow => BlockContent::LogoRow(LogoRowBlock {
                title: "Trusted by".to_string(),
                ..LogoRowBlock::default()
            }),
            BlockKind::Spacer => BlockContent::Spacer(SpacerBlock {
                height: 32,
                ..SpacerBlock::default()
            }),
            BlockKind::Divider => BlockContent::Divider(DividerBlock {
                thickness: 1,
                ..DividerBlock::default()
            }),
            BlockKind::CustomHtml => BlockContent::CustomHtml(CustomHtmlBlock::default()),
        }
    }

    /// Decode a stored `(type, content)` pair. Wrongly typed fields are
    /// coerced against the kind's default content first; unknown kinds are
    /// kept verbatim.
    pub fn decode(tag: &str, content: Value) -> Self {
        let Some(kind) = BlockKind::parse(tag) else {
            return BlockContent::Unknown {
                kind: tag.to_string(),
                content,
            };
        };
        let coerced = coerce(content, &BlockContent::default_for(kind).to_value());
        match decode_typed(kind, coerced.clone()) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("keeping '{}' block undecoded: {}", tag, err);
                BlockContent::Unknown {
                    kind: tag.to_string(),
                    content: coerced,
                }
            }
        }
    }

    pub fn kind(&self) -> Option<BlockKind> {
        match self {
            BlockContent::Heading(_) => Some(BlockKind::Heading),
            BlockContent::Paragraph(_) => Some(BlockKind::Paragraph),
            BlockContent::Tagline(_) => Some(BlockKind::Tagline),
            BlockContent::EmailInput(_) => Some(BlockKind::EmailInput),
            BlockContent::Button(_) => Some(BlockKind::Button),
            BlockContent::ButtonGroup(_) => Some(BlockKind::ButtonGroup),
            BlockContent::Image(_) => Some(BlockKind::Image),
            BlockContent::LogoRow(_) => Some(BlockKind::LogoRow),
            BlockContent::Spacer(_) => Some(BlockKind::Spacer),
            BlockContent::Divider(_) => Some(BlockKind::Divider),
            BlockContent::CustomHtml(_) => Some(BlockKind::CustomHtml),
            BlockContent::Unknown { .. } => None,
        }
    }

    /// The stored `type` tag
    pub fn tag(&self) -> &str {
        match self {
            BlockContent::Unknown { kind, .. } => kind,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            BlockContent::Heading(c) => serde_json::to_value(c),
            BlockContent::Paragraph(c) | BlockContent::Tagline(c) => serde_json::to_value(c),
            BlockContent::EmailInput(c) => serde_json::to_value(c),
            BlockContent::Button(c) => serde_json::to_value(c),
            BlockContent::ButtonGroup(c) => serde_json::to_value(c),
            BlockContent::Image(c) => serde_json::to_value(c),
            BlockContent::LogoRow(c) => serde_json::to_value(c),
            BlockContent::Spacer(c) => serde_json::to_value(c),
            BlockContent::Divider(c) => serde_json::to_value(c),
            BlockContent::CustomHtml(c) => serde_json::to_value(c),
            BlockContent::Unknown { content, .. } => return content.clone(),
        };
        encoded.unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

fn button(text: &str, variant: &str) -> ButtonBlock {
    ButtonBlock {
        text: text.to_string(),
        link: "#".to_string(),
        variant: variant.to_string(),
        ..ButtonBlock::default()
    }
}

fn decode_typed(kind: BlockKind, value: Value) -> Result<BlockContent, serde_json::Error> {
    Ok(match kind {
        BlockKind::Heading => BlockContent::Heading(serde_json::from_value(value)?),
        BlockKind::Paragraph => BlockContent::Paragraph(serde_json::from_value(value)?),
        BlockKind::Tagline => BlockContent::Tagline(serde_json::from_value(value)?),
        BlockKind::EmailInput => BlockContent::EmailInput(serde_json::from_value(value)?),
        BlockKind::Button => BlockContent::Button(serde_json::from_value(value)?),
        BlockKind::ButtonGroup => BlockContent::ButtonGroup(serde_json::from_value(value)?),
        BlockKind::Image => BlockContent::Image(serde_json::from_value(value)?),
        BlockKind::LogoRow => BlockContent::LogoRow(serde_json::from_value(value)?),
        BlockKind::Spacer => BlockContent::Spacer(serde_json::from_value(value)?),
        BlockKind::Divider => BlockContent::Divider(serde_json::from_value(value)?),
        BlockKind::CustomHtml => BlockContent::CustomHtml(serde_json::from_value(value)?),
    })
}

// ─── Block style ──────────────────────────────────────────────────────────────

/// Per-block overrides layered on top of the section design
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockStyle {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_px")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_signed_px")]
    pub margin_top: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_signed_px")]
    pub margin_bottom: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Block ────────────────────────────────────────────────────────────────────

/// One block inside a slot. Persisted as `{id, type, content, style}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BlockRecord", into = "BlockRecord")]
pub struct Block {
    pub id: Option<RecordId>,
    pub content: BlockContent,
    pub style: BlockStyle,
    pub extra: Map<String, Value>,
}

impl Block {
    /// New block with a fresh id, default content and empty style
    pub fn new(kind: BlockKind) -> Self {
        Block {
            id: Some(RecordId::Text(collection::generate_id("blk"))),
            content: BlockContent::default_for(kind),
            style: BlockStyle::default(),
            extra: Map::new(),
        }
    }

    /// Block without an id, for callers that let `update_block` keep the
    /// existing one
    pub fn with_content(content: BlockContent, style: BlockStyle) -> Self {
        Block {
            id: None,
            content,
            style,
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> Option<BlockKind> {
        self.content.kind()
    }
}

impl Keyed for Block {
    fn key(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!("block-{}", index),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct BlockRecord {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_record_id")]
    id: Option<RecordId>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    style: BlockStyle,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<BlockRecord> for Block {
    fn from(record: BlockRecord) -> Self {
        Block {
            id: record.id,
            content: BlockContent::decode(&record.kind, record.content),
            style: record.style,
            extra: record.extra,
        }
    }
}

impl From<Block> for BlockRecord {
    fn from(block: Block) -> Self {
        BlockRecord {
            id: block.id,
            kind: block.content.tag().to_string(),
            content: block.content.to_value(),
            style: block.style,
            extra: block.extra,
        }
    }
}

// ─── Slots & tree operations ──────────────────────────────────────────────────

/// Named ordered group of blocks inside a composite section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSlot {
    Left,
    Right,
    Main,
}

impl BlockSlot {
    pub const ALL: [BlockSlot; 3] = [BlockSlot::Left, BlockSlot::Right, BlockSlot::Main];

    /// Key of the slot inside the section payload
    pub fn field_name(&self) -> &'static str {
        match self {
            BlockSlot::Left => "left_blocks",
            BlockSlot::Right => "right_blocks",
            BlockSlot::Main => "blocks",
        }
    }

    pub fn parse(field: &str) -> Option<Self> {
        BlockSlot::ALL.into_iter().find(|s| s.field_name() == field)
    }
}

/// Editing operations over a composite section's block slots.
///
/// Moves never cross slots; moving a block elsewhere is a remove followed by
/// an add. Out-of-range indices leave the slot untouched and return `false`.
pub trait BlockTree {
    fn slot(&self, slot: BlockSlot) -> &[Block];

    fn slot_mut(&mut self, slot: BlockSlot) -> &mut Vec<Block>;

    /// Append a new block of `kind`; returns its id
    fn add_block(&mut self, slot: BlockSlot, kind: BlockKind) -> String {
        let block = Block::new(kind);
        let id = block.key(0);
        let blocks = self.slot_mut(slot);
        *blocks = collection::add(blocks, block);
        id
    }

    /// Replace content and style at `index`, keeping the existing id
    fn update_block(&mut self, slot: BlockSlot, index: usize, mut block: Block) -> bool {
        let blocks = self.slot_mut(slot);
        let Some(existing) = blocks.get(index) else {
            return false;
        };
        block.id = existing.id.clone().or(block.id);
        *blocks = collection::replace_at(blocks, index, block);
        true
    }

    fn move_block(&mut self, slot: BlockSlot, index: usize, direction: Direction) -> bool {
        let blocks = self.slot_mut(slot);
        let moved = collection::move_at(blocks, index, direction);
        let changed = moved != *blocks;
        *blocks = moved;
        changed
    }

    fn remove_block(&mut self, slot: BlockSlot, index: usize) -> Option<Block> {
        let blocks = self.slot_mut(slot);
        let removed = blocks.get(index).cloned()?;
        *blocks = collection::remove_at(blocks, index);
        Some(removed)
    }

    fn reorder_block(&mut self, slot: BlockSlot, from: usize, to: usize) -> bool {
        let blocks = self.slot_mut(slot);
        let reordered = collection::reorder_at(blocks, from, to);
        let changed = reordered != *blocks;
        *blocks = reordered;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Default)]
    struct Slots {
        left: Vec<Block>,
        right: Vec<Block>,
        main: Vec<Block>,
    }

    impl BlockTree for Slots {
        fn slot(&self, slot: BlockSlot) -> &[Block] {
            match slot {
                BlockSlot::Left => &self.left,
                BlockSlot::Right => &self.right,
                BlockSlot::Main => &self.main,
            }
        }

        fn slot_mut(&mut self, slot: BlockSlot) -> &mut Vec<Block> {
            match slot {
                BlockSlot::Left => &mut self.left,
                BlockSlot::Right => &mut self.right,
                BlockSlot::Main => &mut self.main,
            }
        }
    }

    fn ids(blocks: &[Block]) -> Vec<String> {
        collection::keys(blocks)
    }

    #[test]
    fn add_block_generates_fresh_ids() {
        let mut tree = Slots::default();
        let a = tree.add_block(BlockSlot::Left, BlockKind::Heading);
        let b = tree.add_block(BlockSlot::Left, BlockKind::Heading);
        tree.remove_block(BlockSlot::Left, 1);
        let c = tree.add_block(BlockSlot::Left, BlockKind::Heading);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(ids(tree.slot(BlockSlot::Left)), vec![a, c]);
        assert!(tree.slot(BlockSlot::Left)[0].style == BlockStyle::default());
    }

    #[test]
    fn update_keeps_existing_id() {
        let mut tree = Slots::default();
        let id = tree.add_block(BlockSlot::Main, BlockKind::Paragraph);
        let replacement = Block::with_content(
            BlockContent::Paragraph(TextBlock {
                text: "Updated".to_string(),
                ..TextBlock::default()
            }),
            BlockStyle {
                align: Some("center".to_string()),
                ..BlockStyle::default()
            },
        );
        assert!(tree.update_block(BlockSlot::Main, 0, replacement));
        let block = &tree.slot(BlockSlot::Main)[0];
        assert_eq!(block.key(0), id);
        assert_eq!(block.style.align.as_deref(), Some("center"));

        let mut foreign = Block::new(BlockKind::Paragraph);
        foreign.id = Some(RecordId::from("someone-else"));
        tree.update_block(BlockSlot::Main, 0, foreign);
        assert_eq!(tree.slot(BlockSlot::Main)[0].key(0), id);
    }

    #[test]
    fn update_out_of_range_is_rejected() {
        let mut tree = Slots::default();
        assert!(!tree.update_block(BlockSlot::Right, 3, Block::new(BlockKind::Divider)));
        assert!(tree.slot(BlockSlot::Right).is_empty());
    }

    #[test]
    fn moves_stay_within_slot() {
        let mut tree = Slots::default();
        let a = tree.add_block(BlockSlot::Left, BlockKind::Heading);
        let b = tree.add_block(BlockSlot::Left, BlockKind::Paragraph);
        let c = tree.add_block(BlockSlot::Left, BlockKind::Button);
        let r = tree.add_block(BlockSlot::Right, BlockKind::Image);

        assert!(tree.move_block(BlockSlot::Left, 2, Direction::Up));
        assert!(tree.move_block(BlockSlot::Left, 1, Direction::Up));
        assert_eq!(ids(tree.slot(BlockSlot::Left)), vec![c.clone(), a.clone(), b.clone()]);
        assert_eq!(ids(tree.slot(BlockSlot::Right)), vec![r]);

        assert!(!tree.move_block(BlockSlot::Left, 0, Direction::Up));
        assert!(!tree.move_block(BlockSlot::Left, 2, Direction::Down));

        assert!(tree.reorder_block(BlockSlot::Left, 0, 2));
        assert_eq!(ids(tree.slot(BlockSlot::Left)), vec![a, b, c]);
    }

    #[test]
    fn block_round_trips_unknown_keys() {
        let raw = json!({
            "id": "blk_1",
            "type": "button",
            "content": { "text": "Go", "link": "/go", "variant": "ghost", "new_tab": false, "icon": "arrow" },
            "style": { "align": "left", "fontSize": 18 },
            "hidden": false
        });
        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.kind(), Some(BlockKind::Button));
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn unknown_block_type_is_preserved() {
        let raw = json!({
            "id": "blk_2",
            "type": "countdown",
            "content": { "until": "2030-01-01" },
            "style": {}
        });
        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.kind(), None);
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn wrongly_typed_content_is_coerced() {
        let block: Block = serde_json::from_value(json!({
            "id": 17,
            "type": "heading",
            "content": { "text": ["not", "text"], "level": "2" }
        }))
        .unwrap();
        assert_eq!(block.id, Some(RecordId::Number(17)));
        match block.content {
            BlockContent::Heading(h) => {
                assert_eq!(h.text, "");
                assert_eq!(h.level, 0);
            }
            other => panic!("expected heading, got {:?}", other),
        }
    }
}
