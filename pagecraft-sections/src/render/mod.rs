//! Section renderer dispatch.
//!
//! `render_section` is pure: it reads an already decoded section plus the
//! list cache and returns a [`VisualNode`] tree. It never fails; unknown
//! sections become diagnostics, lists that are not fetched yet become loading
//! placeholders and failed fetches become inline notices.

mod blocks;
mod lists;
mod simple;

pub use blocks::{render_block, render_blocks};

use log::warn;

use crate::catalog::{ListCache, ListRef, ListResource};
use crate::collection::Keyed;
use crate::design::{self, BlockTheme, ResolvedDesign};
use crate::page::Page;
use crate::section::{Section, SectionContent};
use crate::visual::{Container, Diagnostic, SectionFrame, Style, VisualNode};

/// Render one section. `index` is its position in the page, used for the
/// positional key of sections without an id.
pub fn render_section(section: &Section, index: usize, cache: &ListCache) -> VisualNode {
    let key = section.key(index);
    let Some(kind) = section.kind() else {
        return diagnostic_frame(key, section);
    };

    let resolved = design::resolve(section.content.design(), &kind.palette());
    let theme = BlockTheme::from_design(&resolved);
    let children = render_content(&section.content, &theme, cache);

    VisualNode::Section(SectionFrame {
        key,
        kind: kind.as_str().to_string(),
        design: resolved,
        children,
    })
}

/// Render every section of `page` in order under a single root container
pub fn render_page(page: &Page, cache: &ListCache) -> VisualNode {
    VisualNode::Container(Container {
        style: None,
        children: page
            .content
            .iter()
            .enumerate()
            .map(|(index, section)| render_section(section, index, cache))
            .collect(),
    })
}

/// Lists the given sections need from the store that the cache has not
/// requested yet, in first-use order without duplicates.
pub fn required_fetches(sections: &[Section], cache: &ListCache) -> Vec<ListResource> {
    let mut needed = Vec::new();
    for section in sections {
        if let Some(resource) = needed_resource(&section.content) {
            if cache.is_missing(resource) && !needed.contains(&resource) {
                needed.push(resource);
            }
        }
    }
    needed
}

/// The store list a grid section depends on. Grids whose payload already
/// carries full inline records need nothing.
pub fn needed_resource(content: &SectionContent) -> Option<ListResource> {
    match content {
        SectionContent::ServicesGrid(grid) if needs_store(&grid.services) => Some(ListResource::Services),
        SectionContent::BlogGrid(grid) if needs_store(&grid.posts) => Some(ListResource::Blogs),
        SectionContent::CaseStudyGrid(grid) if needs_store(&grid.studies) => {
            Some(ListResource::CaseStudies)
        }
        _ => None,
    }
}

fn needs_store<T>(refs: &[ListRef<T>]) -> bool {
    refs.is_empty() || refs.iter().any(|r| matches!(r, ListRef::Slug(_)))
}

fn render_content(content: &SectionContent, theme: &BlockTheme, cache: &ListCache) -> Vec<VisualNode> {
    match content {
        SectionContent::Hero(hero) => simple::hero(hero, theme),
        SectionContent::Text(text) => simple::text(text, theme),
        SectionContent::Image(image) => simple::image(image, theme),
        SectionContent::Features(features) => simple::features(features, theme),
        SectionContent::Stats(stats) => simple::stats(stats, theme),
        SectionContent::Testimonials(testimonials) => simple::testimonials(testimonials, theme),
        SectionContent::Cta(cta) => simple::cta(cta, theme),
        SectionContent::Services(services) => simple::services(services, theme),
        SectionContent::ServiceList(list) => simple::service_list(list, theme),
        SectionContent::ServicesGrid(grid) => lists::services_grid(grid, theme, cache),
        SectionContent::BlogGrid(grid) => lists::blog_grid(grid, theme, cache),
        SectionContent::CaseStudyGrid(grid) => lists::case_study_grid(grid, theme, cache),
        SectionContent::Faq(faq) => simple::faq(faq, theme),
        SectionContent::Team(team) => simple::team(team, theme),
        SectionContent::Pricing(pricing) => simple::pricing(pricing, theme),
        SectionContent::LogoCloud(logos) => simple::logo_cloud(logos, theme),
        SectionContent::Contact(contact) => simple::contact(contact, theme),
        SectionContent::Gallery(gallery) => simple::gallery(gallery, theme),
        SectionContent::Video(video) => simple::video(video, theme),
        SectionContent::Newsletter(newsletter) => simple::newsletter(newsletter, theme),
        SectionContent::Timeline(timeline) => simple::timeline(timeline, theme),
        SectionContent::ProcessSteps(steps) => simple::process_steps(steps, theme),
        SectionContent::Quote(quote) => simple::quote(quote, theme),
        SectionContent::Columns(columns) => simple::columns(columns, theme),
        SectionContent::Divider(divider) => simple::divider(divider, theme),
        SectionContent::Spacer(spacer) => simple::spacer(spacer),
        SectionContent::Html(html) => simple::html(html),
        SectionContent::Raw { .. } => Vec::new(),
    }
}

fn diagnostic_frame(key: String, section: &Section) -> VisualNode {
    let kind = section.tag().unwrap_or("(untyped)").to_string();
    warn!("rendering diagnostic for section '{}' of type '{}'", key, kind);
    let dump = serde_json::to_string_pretty(&section.data()).unwrap_or_else(|_| "null".to_string());
    VisualNode::Section(SectionFrame {
        key,
        kind: kind.clone(),
        design: ResolvedDesign::solid("#fef2f2", "#991b1b", 24),
        children: vec![VisualNode::Diagnostic(Diagnostic { kind, dump })],
    })
}

/// Title and subtitle header shared by most sections; empty strings are skipped
pub(crate) fn header(title: &str, subtitle: &str, theme: &BlockTheme) -> Vec<VisualNode> {
    let mut nodes = Vec::new();
    if !title.trim().is_empty() {
        nodes.push(VisualNode::heading(
            title,
            2,
            Style {
                color: Some(theme.text_color.clone()),
                text_align: Some(crate::visual::TextAlign::Center),
                margin_bottom: Some(12.0),
                ..Style::default()
            }
            .into_option(),
        ));
    }
    if !subtitle.trim().is_empty() {
        nodes.push(VisualNode::text(
            subtitle,
            Some(Style {
                color: Some(theme.muted_text_color.clone()),
                text_align: Some(crate::visual::TextAlign::Center),
                margin_bottom: Some(32.0),
                ..Style::default()
            }),
        ));
    }
    nodes
}

/// Bordered card used by grid items
pub(crate) fn card_style(theme: &BlockTheme) -> Style {
    Style {
        padding: Some(24.0),
        border_width: Some(1.0),
        border_color: Some(design::rgba_from_hex(&theme.outline_color, 0.15)),
        border_radius: Some(12.0),
        ..Style::default()
    }
}

pub(crate) fn muted(theme: &BlockTheme) -> Option<Style> {
    Some(Style {
        color: Some(theme.muted_text_color.clone()),
        ..Style::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Service, ListState};
    use crate::schema::SectionKind;
    use crate::visual::NoticeLevel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn section(raw: serde_json::Value) -> Section {
        serde_json::from_value(raw).unwrap()
    }

    fn frame(node: &VisualNode) -> &SectionFrame {
        match node {
            VisualNode::Section(frame) => frame,
            other => panic!("expected section frame, got {:?}", other),
        }
    }

    #[test]
    fn unknown_type_renders_diagnostic() {
        let s = section(json!({ "id": "x", "type": "carousel", "data": { "a": 1 } }));
        let node = render_section(&s, 0, &ListCache::new());
        let frame = frame(&node);
        assert_eq!(frame.kind, "carousel");
        match &frame.children[0] {
            VisualNode::Diagnostic(d) => {
                assert_eq!(d.kind, "carousel");
                assert!(d.dump.contains("\"a\": 1"));
            }
            other => panic!("expected diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn section_design_is_resolved_against_kind_palette() {
        let s = section(json!({
            "type": "services",
            "data": { "design": { "text_color": "00ff00" } }
        }));
        let node = render_section(&s, 2, &ListCache::new());
        let frame = frame(&node);
        assert_eq!(frame.key, "section-2");
        assert_eq!(frame.design.background_color, "#000000");
        assert_eq!(frame.design.text_color, "#00ff00");
    }

    #[test]
    fn grid_with_empty_services_needs_a_fetch() {
        let grid = Section::new(SectionKind::ServicesGrid);
        let text = Section::new(SectionKind::Text);
        let sections = vec![text, grid.clone(), grid];
        assert_eq!(
            required_fetches(&sections, &ListCache::new()),
            vec![ListResource::Services]
        );

        let mut cache = ListCache::new();
        cache.mark_pending(ListResource::Services);
        assert!(required_fetches(&sections, &cache).is_empty());
    }

    #[test]
    fn inline_grid_needs_nothing() {
        let grid = section(json!({
            "type": "services-grid",
            "data": { "services": [{ "slug": "a", "title": "A" }] }
        }));
        assert_eq!(needed_resource(&grid.content), None);
    }

    #[test]
    fn pending_list_renders_loading_and_failure_renders_notice() {
        let grid = Section::new(SectionKind::BlogGrid);
        let node = render_section(&grid, 0, &ListCache::new());
        assert!(node.walk().iter().any(|n| matches!(n, VisualNode::Loading(_))));

        let mut cache = ListCache::new();
        cache.mark_failed(ListResource::Blogs, "boom");
        let node = render_section(&grid, 0, &cache);
        assert!(node.walk().iter().any(|n| matches!(
            n,
            VisualNode::Notice(notice) if notice.level == NoticeLevel::Error
        )));
    }

    #[test]
    fn slug_refs_follow_reference_order() {
        let grid = section(json!({
            "type": "services-grid",
            "data": { "services": ["b", "missing", "a"] }
        }));
        let mut cache = ListCache::new();
        cache.services = Some(ListState::Ready(vec![
            Service { slug: "a".into(), title: "Alpha".into(), ..Service::default() },
            Service { slug: "b".into(), title: "Beta".into(), ..Service::default() },
        ]));
        let node = render_section(&grid, 0, &cache);
        let titles: Vec<String> = node
            .walk()
            .into_iter()
            .filter_map(|n| match n {
                VisualNode::Heading(h) if h.level == 3 => Some(h.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn page_keeps_section_order() {
        let page = Page {
            content: vec![Section::new(SectionKind::Hero), Section::new(SectionKind::Text)],
            ..Page::default()
        };
        let root = render_page(&page, &ListCache::new());
        let kinds: Vec<&str> = root
            .children()
            .iter()
            .map(|n| frame(n).kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["hero", "text"]);
    }
}
