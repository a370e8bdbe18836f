use crate::blocks::{BlockSlot, BlockTree, ButtonBlock};
use crate::content::*;
use crate::design::BlockTheme;
use crate::visual::{
    AlignItems, Container, Dimension, Divider, EmailForm, Flex, FlexDirection, Grid, Image,
    Markdown, RawHtml, Spacer, Style, TextAlign, Video, VisualNode,
};

use super::blocks::{button_node, button_style, render_blocks};
use super::{card_style, header, muted};

// ─── Hero ─────────────────────────────────────────────────────────────────────

pub fn hero(hero: &HeroSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let centered = hero.layout == "centered";
    let align = centered.then_some(TextAlign::Center);

    if !hero.has_blocks() {
        return vec![legacy_hero(hero, theme, align)];
    }

    let mut nodes = Vec::new();
    let left = render_blocks(hero.slot(BlockSlot::Left), theme);
    let right = render_blocks(hero.slot(BlockSlot::Right), theme);
    if !left.is_empty() || !right.is_empty() {
        nodes.push(VisualNode::Flex(Flex {
            direction: FlexDirection::Row,
            align: Some(AlignItems::Center),
            gap: Some(48.0),
            wrap: true,
            style: None,
            children: vec![slot_column(left), slot_column(right)],
        }));
    }
    let main = render_blocks(hero.slot(BlockSlot::Main), theme);
    if !main.is_empty() {
        let mut column = slot_column(main);
        if let VisualNode::Flex(flex) = &mut column {
            flex.style = Style {
                text_align: align,
                max_width: Some(800.0),
                ..Style::default()
            }
            .into_option();
            if centered {
                flex.align = Some(AlignItems::Center);
            }
        }
        nodes.push(column);
    }
    nodes
}

fn slot_column(children: Vec<VisualNode>) -> VisualNode {
    VisualNode::Flex(Flex {
        direction: FlexDirection::Column,
        align: Some(AlignItems::Start),
        gap: Some(20.0),
        wrap: false,
        style: Some(Style {
            width: Some(Dimension::Percent("min(100%, 560px)".to_string())),
            ..Style::default()
        }),
        children,
    })
}

/// Layout used by heroes saved before block slots existed
fn legacy_hero(hero: &HeroSection, theme: &BlockTheme, align: Option<TextAlign>) -> VisualNode {
    let mut children = vec![VisualNode::heading(
        &hero.headline,
        1,
        Some(Style {
            color: Some(theme.text_color.clone()),
            font_size: Some(52.0),
            font_weight: Some(700),
            text_align: align,
            ..Style::default()
        }),
    )];
    if !hero.subheadline.trim().is_empty() {
        children.push(VisualNode::text(
            &hero.subheadline,
            Some(Style {
                color: Some(theme.muted_text_color.clone()),
                font_size: Some(20.0),
                text_align: align,
                ..Style::default()
            }),
        ));
    }
    if !hero.cta_text.trim().is_empty() {
        let cta = ButtonBlock {
            text: hero.cta_text.clone(),
            link: hero.cta_link.clone(),
            variant: "primary".to_string(),
            ..ButtonBlock::default()
        };
        children.push(button_node(&cta, theme, None));
    }
    VisualNode::column(children, 24.0)
}

// ─── Content sections ─────────────────────────────────────────────────────────

pub fn text(text: &TextSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&text.title, "", theme);
    nodes.push(VisualNode::Markdown(Markdown {
        source: text.body.clone(),
        style: Some(Style {
            color: Some(theme.text_color.clone()),
            text_align: TextAlign::parse(&text.alignment),
            max_width: Some(760.0),
            ..Style::default()
        }),
    }));
    nodes
}

pub fn image(image: &ImageSection, theme: &BlockTheme) -> Vec<VisualNode> {
    if image.url.trim().is_empty() {
        return Vec::new();
    }
    let mut nodes = vec![VisualNode::Image(Image {
        src: image.url.clone(),
        alt: image.alt.clone(),
        style: Some(Style {
            width: Some(Dimension::Percent("100%".to_string())),
            max_width: (!image.full_width).then_some(1100.0),
            border_radius: (!image.full_width).then_some(12.0),
            ..Style::default()
        }),
    })];
    if !image.caption.trim().is_empty() {
        nodes.push(VisualNode::text(&image.caption, muted(theme)));
    }
    nodes
}

pub fn features(features: &FeaturesSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&features.title, &features.subtitle, theme);
    nodes.push(icon_card_grid(&features.items, features.columns, theme));
    nodes
}

pub fn services(services: &ServicesSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&services.title, &services.subtitle, theme);
    nodes.push(icon_card_grid(&services.items, 3, theme));
    nodes
}

fn icon_card_grid(items: &[FeatureItem], columns: u32, theme: &BlockTheme) -> VisualNode {
    let cards = items
        .iter()
        .map(|item| {
            let mut children = Vec::new();
            if !item.icon.trim().is_empty() {
                children.push(VisualNode::text(
                    &item.icon,
                    Some(Style {
                        color: Some(theme.button_from.clone()),
                        font_size: Some(14.0),
                        uppercase: Some(true),
                        ..Style::default()
                    }),
                ));
            }
            children.push(item_title(&item.title, theme));
            children.push(VisualNode::text(&item.description, muted(theme)));
            card(children, theme)
        })
        .collect();
    grid(columns, cards)
}

pub fn stats(stats: &StatsSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&stats.title, "", theme);
    let cells = stats
        .items
        .iter()
        .map(|item| {
            VisualNode::column(
                vec![
                    VisualNode::text(
                        &item.value,
                        Some(Style {
                            color: Some(theme.text_color.clone()),
                            font_size: Some(44.0),
                            font_weight: Some(700),
                            text_align: Some(TextAlign::Center),
                            ..Style::default()
                        }),
                    ),
                    VisualNode::text(
                        &item.label,
                        Some(Style {
                            color: Some(theme.muted_text_color.clone()),
                            text_align: Some(TextAlign::Center),
                            ..Style::default()
                        }),
                    ),
                ],
                4.0,
            )
        })
        .collect();
    nodes.push(grid(stats.items.len().clamp(1, 4) as u32, cells));
    nodes
}

pub fn testimonials(testimonials: &TestimonialsSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&testimonials.title, "", theme);
    let cards = testimonials
        .items
        .iter()
        .map(|item| {
            let mut children = vec![VisualNode::text(
                format!("\u{201c}{}\u{201d}", item.quote),
                Some(Style {
                    color: Some(theme.text_color.clone()),
                    font_size: Some(18.0),
                    ..Style::default()
                }),
            )];
            let mut byline = Vec::new();
            if !item.avatar_url.trim().is_empty() {
                byline.push(avatar(&item.avatar_url, &item.author));
            }
            byline.push(person(&item.author, &item.role, theme));
            children.push(row(byline, 12.0));
            card(children, theme)
        })
        .collect();
    nodes.push(grid(2, cards));
    nodes
}

pub fn cta(cta: &CtaSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&cta.title, &cta.text, theme);
    if !cta.button_text.trim().is_empty() {
        let button = ButtonBlock {
            text: cta.button_text.clone(),
            link: cta.button_link.clone(),
            variant: "outline".to_string(),
            ..ButtonBlock::default()
        };
        nodes.push(centered(vec![button_node(&button, theme, None)]));
    }
    nodes
}

pub fn service_list(list: &ServiceListSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&list.title, &list.subtitle, theme);
    let entries: Vec<VisualNode> = list
        .services
        .iter()
        .filter(|service| service.enabled)
        .map(|service| {
            card(
                vec![
                    item_title(&service.title, theme),
                    VisualNode::text(&service.description, muted(theme)),
                ],
                theme,
            )
        })
        .collect();
    nodes.push(match list.layout.as_str() {
        "list" => VisualNode::column(entries, 16.0),
        _ => grid(3, entries),
    });
    nodes
}

pub fn faq(faq: &FaqSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&faq.title, "", theme);
    let entries = faq
        .items
        .iter()
        .map(|item| {
            card(
                vec![
                    item_title(&item.question, theme),
                    VisualNode::Markdown(Markdown {
                        source: item.answer.clone(),
                        style: muted(theme),
                    }),
                ],
                theme,
            )
        })
        .collect();
    nodes.push(VisualNode::column(entries, 12.0));
    nodes
}

pub fn team(team: &TeamSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&team.title, "", theme);
    let members = team
        .members
        .iter()
        .map(|member| {
            let mut children = Vec::new();
            if !member.photo_url.trim().is_empty() {
                children.push(VisualNode::Image(Image {
                    src: member.photo_url.clone(),
                    alt: member.name.clone(),
                    style: Some(Style {
                        width: Some(Dimension::Percent("100%".to_string())),
                        border_radius: Some(12.0),
                        ..Style::default()
                    }),
                }));
            }
            children.push(person(&member.name, &member.role, theme));
            if !member.bio.trim().is_empty() {
                children.push(VisualNode::text(&member.bio, muted(theme)));
            }
            VisualNode::column(children, 8.0)
        })
        .collect();
    nodes.push(grid(4, members));
    nodes
}

pub fn pricing(pricing: &PricingSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&pricing.title, &pricing.subtitle, theme);
    let plans = pricing
        .plans
        .iter()
        .map(|plan| {
            let mut children = vec![
                item_title(&plan.name, theme),
                VisualNode::text(
                    if plan.period.trim().is_empty() {
                        plan.price.clone()
                    } else {
                        format!("{} / {}", plan.price, plan.period)
                    },
                    Some(Style {
                        color: Some(theme.text_color.clone()),
                        font_size: Some(32.0),
                        font_weight: Some(700),
                        ..Style::default()
                    }),
                ),
            ];
            children.extend(
                plan.features
                    .iter()
                    .map(|feature| VisualNode::text(format!("\u{2713} {}", feature), muted(theme))),
            );
            if !plan.cta_text.trim().is_empty() {
                let button = ButtonBlock {
                    text: plan.cta_text.clone(),
                    link: plan.cta_link.clone(),
                    variant: if plan.highlighted { "primary" } else { "outline" }.to_string(),
                    ..ButtonBlock::default()
                };
                children.push(button_node(&button, theme, None));
            }
            let mut style = card_style(theme);
            if plan.highlighted {
                style.border_color = Some(theme.button_from.clone());
                style.border_width = Some(2.0);
            }
            VisualNode::Container(Container {
                style: Some(style),
                children: vec![VisualNode::column(children, 12.0)],
            })
        })
        .collect();
    nodes.push(grid(pricing.plans.len().clamp(1, 3) as u32, plans));
    nodes
}

pub fn logo_cloud(cloud: &LogoCloudSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&cloud.title, "", theme);
    let logos = cloud
        .logos
        .iter()
        .filter(|logo| !logo.url.trim().is_empty())
        .map(|logo| {
            VisualNode::Image(Image {
                src: logo.url.clone(),
                alt: logo.alt.clone(),
                style: Some(Style {
                    height: Some(40.0),
                    opacity: Some(0.8),
                    ..Style::default()
                }),
            })
        })
        .collect();
    nodes.push(centered(logos));
    nodes
}

pub fn contact(contact: &ContactSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&contact.title, &contact.text, theme);
    let details: Vec<VisualNode> = [&contact.email, &contact.phone, &contact.address]
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| VisualNode::text(value.as_str(), Some(Style {
            color: Some(theme.text_color.clone()),
            text_align: Some(TextAlign::Center),
            ..Style::default()
        })))
        .collect();
    nodes.push(VisualNode::column(details, 8.0));
    if contact.show_form {
        nodes.push(VisualNode::EmailForm(EmailForm {
            placeholder: "Your email".to_string(),
            button_text: "Send".to_string(),
            action: if contact.email.trim().is_empty() {
                String::new()
            } else {
                format!("mailto:{}", contact.email.trim())
            },
            button_style: Some(button_style("primary", theme)),
            style: None,
        }));
    }
    nodes
}

pub fn gallery(gallery: &GallerySection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&gallery.title, "", theme);
    let images = gallery
        .images
        .iter()
        .filter(|image| !image.url.trim().is_empty())
        .map(|image| {
            let mut children = vec![VisualNode::Image(Image {
                src: image.url.clone(),
                alt: image.alt.clone(),
                style: Some(Style {
                    width: Some(Dimension::Percent("100%".to_string())),
                    border_radius: Some(8.0),
                    ..Style::default()
                }),
            })];
            if !image.caption.trim().is_empty() {
                children.push(VisualNode::text(&image.caption, muted(theme)));
            }
            VisualNode::column(children, 6.0)
        })
        .collect();
    nodes.push(grid(gallery.columns, images));
    nodes
}

pub fn video(video: &VideoSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&video.title, "", theme);
    if !video.url.trim().is_empty() {
        nodes.push(VisualNode::Video(Video {
            src: video.url.clone(),
            autoplay: video.autoplay,
            style: Some(Style {
                width: Some(Dimension::Percent("100%".to_string())),
                max_width: Some(960.0),
                border_radius: Some(12.0),
                ..Style::default()
            }),
        }));
    }
    if !video.caption.trim().is_empty() {
        nodes.push(VisualNode::text(&video.caption, muted(theme)));
    }
    nodes
}

pub fn newsletter(newsletter: &NewsletterSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&newsletter.title, &newsletter.text, theme);
    nodes.push(centered(vec![VisualNode::EmailForm(EmailForm {
        placeholder: newsletter.placeholder.clone(),
        button_text: newsletter.button_text.clone(),
        action: newsletter.action.clone(),
        button_style: Some(button_style("outline", theme)),
        style: None,
    })]));
    nodes
}

pub fn timeline(timeline: &TimelineSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&timeline.title, "", theme);
    let events = timeline
        .events
        .iter()
        .map(|event| {
            row(
                vec![
                    VisualNode::text(
                        &event.date,
                        Some(Style {
                            color: Some(theme.button_from.clone()),
                            font_weight: Some(700),
                            ..Style::default()
                        }),
                    ),
                    VisualNode::column(
                        vec![
                            item_title(&event.title, theme),
                            VisualNode::text(&event.description, muted(theme)),
                        ],
                        4.0,
                    ),
                ],
                24.0,
            )
        })
        .collect();
    nodes.push(VisualNode::column(events, 24.0));
    nodes
}

pub fn process_steps(process: &ProcessStepsSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = header(&process.title, "", theme);
    let steps = process
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            card(
                vec![
                    VisualNode::text(
                        format!("{:02}", index + 1),
                        Some(Style {
                            color: Some(theme.button_from.clone()),
                            font_size: Some(28.0),
                            font_weight: Some(700),
                            ..Style::default()
                        }),
                    ),
                    item_title(&step.title, theme),
                    VisualNode::text(&step.description, muted(theme)),
                ],
                theme,
            )
        })
        .collect();
    nodes.push(grid(process.steps.len().clamp(1, 4) as u32, steps));
    nodes
}

pub fn quote(quote: &QuoteSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = vec![VisualNode::text(
        format!("\u{201c}{}\u{201d}", quote.text),
        Some(Style {
            color: Some(theme.text_color.clone()),
            font_size: Some(30.0),
            text_align: Some(TextAlign::Center),
            ..Style::default()
        }),
    )];
    if !quote.author.trim().is_empty() {
        nodes.push(centered(vec![person(&quote.author, &quote.role, theme)]));
    }
    nodes
}

pub fn columns(columns: &ColumnsSection, theme: &BlockTheme) -> Vec<VisualNode> {
    let cells = columns
        .columns
        .iter()
        .map(|column| {
            let mut children = Vec::new();
            if !column.title.trim().is_empty() {
                children.push(item_title(&column.title, theme));
            }
            children.push(VisualNode::Markdown(Markdown {
                source: column.body.clone(),
                style: Some(Style {
                    color: Some(theme.text_color.clone()),
                    ..Style::default()
                }),
            }));
            VisualNode::column(children, 8.0)
        })
        .collect();
    vec![grid(columns.columns.len().clamp(1, 4) as u32, cells)]
}

pub fn divider(divider: &DividerSection, theme: &BlockTheme) -> Vec<VisualNode> {
    vec![VisualNode::Divider(Divider {
        style: Some(Style {
            border_width: Some(divider.thickness.max(1) as f64),
            border_color: Some(theme.text_color.clone()),
            ..Style::default()
        }),
    })]
}

pub fn spacer(spacer: &SpacerSection) -> Vec<VisualNode> {
    vec![VisualNode::Spacer(Spacer {
        size: spacer.height as f64,
    })]
}

pub fn html(html: &HtmlSection) -> Vec<VisualNode> {
    vec![VisualNode::Html(RawHtml {
        html: html.html.clone(),
    })]
}

// ─── Shared pieces ────────────────────────────────────────────────────────────

pub(crate) fn item_title(text: &str, theme: &BlockTheme) -> VisualNode {
    VisualNode::heading(
        text,
        3,
        Some(Style {
            color: Some(theme.text_color.clone()),
            font_size: Some(20.0),
            font_weight: Some(600),
            ..Style::default()
        }),
    )
}

pub(crate) fn card(children: Vec<VisualNode>, theme: &BlockTheme) -> VisualNode {
    VisualNode::Container(Container {
        style: Some(card_style(theme)),
        children: vec![VisualNode::column(children, 10.0)],
    })
}

pub(crate) fn grid(columns: u32, children: Vec<VisualNode>) -> VisualNode {
    VisualNode::Grid(Grid {
        columns: columns.max(1),
        gap: Some(24.0),
        style: None,
        children,
    })
}

fn row(children: Vec<VisualNode>, gap: f64) -> VisualNode {
    VisualNode::Flex(Flex {
        direction: FlexDirection::Row,
        align: Some(AlignItems::Center),
        gap: Some(gap),
        wrap: false,
        style: None,
        children,
    })
}

fn centered(children: Vec<VisualNode>) -> VisualNode {
    VisualNode::Flex(Flex {
        direction: FlexDirection::Row,
        align: Some(AlignItems::Center),
        gap: Some(24.0),
        wrap: true,
        style: Some(Style {
            text_align: Some(TextAlign::Center),
            ..Style::default()
        }),
        children,
    })
}

fn avatar(url: &str, name: &str) -> VisualNode {
    VisualNode::Image(Image {
        src: url.to_string(),
        alt: name.to_string(),
        style: Some(Style {
            width: Some(Dimension::Pixels(44.0)),
            height: Some(44.0),
            border_radius: Some(22.0),
            ..Style::default()
        }),
    })
}

fn person(name: &str, role: &str, theme: &BlockTheme) -> VisualNode {
    let mut children = vec![VisualNode::text(
        name,
        Some(Style {
            color: Some(theme.text_color.clone()),
            font_weight: Some(600),
            ..Style::default()
        }),
    )];
    if !role.trim().is_empty() {
        children.push(VisualNode::text(role, muted(theme)));
    }
    VisualNode::column(children, 2.0)
}
