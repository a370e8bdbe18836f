use log::debug;

use crate::blocks::{Block, BlockContent, BlockStyle, ButtonBlock};
use crate::design::{self, BlockTheme};
use crate::visual::{
    Button, Container, Dimension, Divider, EmailForm, Flex, FlexDirection, Image, RawHtml, Spacer,
    Style, TextAlign, VisualNode,
};

/// Render a slot in order. Blocks of unknown type are skipped.
pub fn render_blocks(blocks: &[Block], theme: &BlockTheme) -> Vec<VisualNode> {
    blocks.iter().filter_map(|block| render_block(block, theme)).collect()
}

/// Render one block, layering its own style over the section defaults.
/// Returns `None` for blocks that produce no output.
pub fn render_block(block: &Block, theme: &BlockTheme) -> Option<VisualNode> {
    let style = &block.style;
    match &block.content {
        BlockContent::Heading(heading) => {
            let level = heading.level.clamp(1, 6) as u8;
            let mut s = base_style(style, &theme.text_color);
            s.font_size = s.font_size.or(Some(heading_size(level)));
            s.font_weight = Some(700);
            Some(VisualNode::heading(&heading.text, level, Some(s)))
        }
        BlockContent::Paragraph(paragraph) => {
            let mut s = base_style(style, &theme.muted_text_color);
            s.font_size = s.font_size.or(Some(18.0));
            Some(VisualNode::text(&paragraph.text, Some(s)))
        }
        BlockContent::Tagline(tagline) => {
            let mut s = base_style(style, &theme.text_color);
            s.font_size = s.font_size.or(Some(13.0));
            s.font_weight = Some(600);
            s.letter_spacing = Some(1.5);
            s.uppercase = Some(true);
            Some(VisualNode::text(&tagline.text, Some(s)))
        }
        BlockContent::EmailInput(input) => Some(VisualNode::EmailForm(EmailForm {
            placeholder: input.placeholder.clone(),
            button_text: input.button_text.clone(),
            action: input.action.clone(),
            button_style: Some(button_style("primary", theme)),
            style: base_style(style, &theme.text_color).into_option(),
        })),
        BlockContent::Button(button) => Some(button_node(button, theme, Some(base_style(style, &theme.text_color)))),
        BlockContent::ButtonGroup(group) => Some(VisualNode::Flex(Flex {
            direction: FlexDirection::Row,
            align: None,
            gap: Some(12.0),
            wrap: true,
            style: base_style(style, &theme.text_color).into_option(),
            children: group
                .buttons
                .iter()
                .map(|button| button_node(button, theme, None))
                .collect(),
        })),
        BlockContent::Image(image) => {
            if image.url.trim().is_empty() {
                return None;
            }
            let mut s = spacing(style);
            s.width = Some(match image.width {
                Some(px) => Dimension::Pixels(px as f64),
                None => Dimension::Percent("100%".to_string()),
            });
            if image.rounded {
                s.border_radius = Some(16.0);
            }
            Some(VisualNode::Image(Image {
                src: image.url.clone(),
                alt: image.alt.clone(),
                style: Some(s),
            }))
        }
        BlockContent::LogoRow(row) => {
            let mut children = Vec::new();
            if !row.title.trim().is_empty() {
                let mut s = base_style(style, &theme.muted_text_color);
                s.font_size = s.font_size.or(Some(14.0));
                children.push(VisualNode::text(&row.title, Some(s)));
            }
            children.push(VisualNode::Flex(Flex {
                direction: FlexDirection::Row,
                align: None,
                gap: Some(24.0),
                wrap: true,
                style: None,
                children: row
                    .logos
                    .iter()
                    .filter(|logo| !logo.url.trim().is_empty())
                    .map(|logo| {
                        VisualNode::Image(Image {
                            src: logo.url.clone(),
                            alt: logo.alt.clone(),
                            style: Some(Style {
                                height: Some(32.0),
                                opacity: Some(0.8),
                                ..Style::default()
                            }),
                        })
                    })
                    .collect(),
            }));
            Some(VisualNode::Container(Container {
                style: spacing(style).into_option(),
                children,
            }))
        }
        BlockContent::Spacer(spacer) => Some(VisualNode::Spacer(Spacer {
            size: spacer.height as f64,
        })),
        BlockContent::Divider(divider) => {
            let mut s = spacing(style);
            s.border_width = Some(divider.thickness.max(1) as f64);
            s.border_color = Some(
                style
                    .color
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .map(design::normalize_color)
                    .unwrap_or_else(|| design::rgba_from_hex(&theme.outline_color, 0.2)),
            );
            Some(VisualNode::Divider(Divider { style: Some(s) }))
        }
        BlockContent::CustomHtml(custom) => Some(VisualNode::Html(RawHtml {
            html: custom.html.clone(),
        })),
        BlockContent::Unknown { kind, .. } => {
            debug!("skipping block of unknown type '{}'", kind);
            None
        }
    }
}

/// Block style override on top of a default text color
fn base_style(style: &BlockStyle, default_color: &str) -> Style {
    let mut s = spacing(style);
    s.color = Some(
        style
            .color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(design::normalize_color)
            .unwrap_or_else(|| default_color.to_string()),
    );
    s.font_size = style.font_size.map(f64::from);
    s.text_align = style.align.as_deref().and_then(TextAlign::parse);
    s
}

fn spacing(style: &BlockStyle) -> Style {
    Style {
        margin_top: style.margin_top.map(f64::from),
        margin_bottom: style.margin_bottom.map(f64::from),
        ..Style::default()
    }
}

fn heading_size(level: u8) -> f64 {
    match level {
        1 => 52.0,
        2 => 40.0,
        3 => 30.0,
        4 => 24.0,
        5 => 20.0,
        _ => 16.0,
    }
}

pub(crate) fn button_node(button: &ButtonBlock, theme: &BlockTheme, outer: Option<Style>) -> VisualNode {
    let mut s = button_style(&button.variant, theme);
    if let Some(outer) = outer {
        s.margin_top = outer.margin_top;
        s.margin_bottom = outer.margin_bottom;
        s.font_size = outer.font_size.or(s.font_size);
    }
    VisualNode::Button(Button {
        text: button.text.clone(),
        href: button.link.clone(),
        new_tab: button.new_tab,
        style: Some(s),
    })
}

/// Primary buttons use the section gradient; outline buttons borrow the text
/// color for their border; anything else is a plain text link.
pub(crate) fn button_style(variant: &str, theme: &BlockTheme) -> Style {
    let base = Style {
        padding: Some(14.0),
        border_radius: Some(10.0),
        font_weight: Some(600),
        ..Style::default()
    };
    match variant {
        "primary" | "" => Style {
            background: Some(format!(
                "linear-gradient(135deg, {}, {})",
                theme.button_from, theme.button_to
            )),
            color: Some(theme.button_text_color.clone()),
            ..base
        },
        "outline" => Style {
            color: Some(theme.text_color.clone()),
            border_color: Some(theme.outline_color.clone()),
            border_width: Some(1.0),
            ..base
        },
        _ => Style {
            color: Some(theme.text_color.clone()),
            ..base
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockKind, HeadingBlock};
    use crate::design::ResolvedDesign;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn theme() -> BlockTheme {
        BlockTheme::from_design(&ResolvedDesign::gradient("#111111", "#222222", "#fafafa", 64))
    }

    fn style_of(node: &VisualNode) -> Style {
        match node {
            VisualNode::Heading(h) => h.style.clone().unwrap_or_default(),
            VisualNode::Text(t) => t.style.clone().unwrap_or_default(),
            VisualNode::Button(b) => b.style.clone().unwrap_or_default(),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn block_color_overrides_section_default() {
        let mut block = Block::new(BlockKind::Heading);
        assert_eq!(
            style_of(&render_block(&block, &theme()).unwrap()).color.as_deref(),
            Some("#fafafa")
        );
        block.style.color = Some("ff0000".to_string());
        block.style.align = Some("center".to_string());
        let s = style_of(&render_block(&block, &theme()).unwrap());
        assert_eq!(s.color.as_deref(), Some("#ff0000"));
        assert_eq!(s.text_align, Some(TextAlign::Center));
    }

    #[test]
    fn heading_level_is_clamped() {
        let block = Block::with_content(
            BlockContent::Heading(HeadingBlock {
                text: "Hi".to_string(),
                level: 9,
                ..HeadingBlock::default()
            }),
            BlockStyle::default(),
        );
        match render_block(&block, &theme()) {
            Some(VisualNode::Heading(h)) => assert_eq!(h.level, 6),
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn primary_button_uses_section_gradient() {
        let block = Block::new(BlockKind::Button);
        let s = style_of(&render_block(&block, &theme()).unwrap());
        assert_eq!(s.background.as_deref(), Some("linear-gradient(135deg, #111111, #222222)"));
        assert_eq!(s.color.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn unknown_and_empty_image_blocks_render_nothing() {
        let unknown: Block = serde_json::from_value(json!({
            "type": "countdown",
            "content": {},
            "style": {}
        }))
        .unwrap();
        assert_eq!(render_block(&unknown, &theme()), None);
        assert_eq!(render_block(&Block::new(BlockKind::Image), &theme()), None);

        let rendered = render_blocks(&[unknown, Block::new(BlockKind::Spacer)], &theme());
        assert_eq!(rendered, vec![VisualNode::Spacer(Spacer { size: 32.0 })]);
    }
}
