use log::debug;

use crate::catalog::{
    self, BlogPost, CaseStudy, CatalogEntry, ListCache, ListRef, ListResource, ListState, Service,
};
use crate::content::{BlogGridSection, CaseStudyGridSection, ServicesGridSection};
use crate::design::BlockTheme;
use crate::visual::{Button, Dimension, Image, Loading, NoticeLevel, Style, VisualNode};

use super::simple::{card, grid, item_title};
use super::{header, muted, needs_store};

/// Entries a grid shows, or the node to show instead while they are unavailable
enum Entries<'a, T> {
    Ready(Vec<&'a T>),
    Placeholder(VisualNode),
}

pub fn services_grid(
    grid_data: &ServicesGridSection,
    theme: &BlockTheme,
    cache: &ListCache,
) -> Vec<VisualNode> {
    let mut nodes = header(&grid_data.title, &grid_data.subtitle, theme);
    let entries = resolve(
        &grid_data.services,
        grid_data.limit,
        ListResource::Services,
        cache.services.as_ref(),
    );
    nodes.push(match entries {
        Entries::Placeholder(node) => node,
        Entries::Ready(services) => grid(
            grid_data.columns,
            services
                .into_iter()
                .map(|service| service_card(service, theme))
                .collect(),
        ),
    });
    nodes
}

pub fn blog_grid(grid_data: &BlogGridSection, theme: &BlockTheme, cache: &ListCache) -> Vec<VisualNode> {
    let mut nodes = header(&grid_data.title, &grid_data.subtitle, theme);
    let entries = resolve(&grid_data.posts, grid_data.limit, ListResource::Blogs, cache.blogs.as_ref());
    nodes.push(match entries {
        Entries::Placeholder(node) => node,
        Entries::Ready(posts) => grid(3, posts.into_iter().map(|post| post_card(post, theme)).collect()),
    });
    nodes
}

pub fn case_study_grid(
    grid_data: &CaseStudyGridSection,
    theme: &BlockTheme,
    cache: &ListCache,
) -> Vec<VisualNode> {
    let mut nodes = header(&grid_data.title, &grid_data.subtitle, theme);
    let entries = resolve(
        &grid_data.studies,
        grid_data.limit,
        ListResource::CaseStudies,
        cache.case_studies.as_ref(),
    );
    nodes.push(match entries {
        Entries::Placeholder(node) => node,
        Entries::Ready(studies) => grid(
            3,
            studies.into_iter().map(|study| study_card(study, theme)).collect(),
        ),
    });
    nodes
}

/// Pick what a grid shows.
///
/// Inline records are used as-is. Unlisted entries (disabled services) are
/// skipped before `limit` applies. An empty list shows the whole fetched
/// collection; slugs pick entries from it in reference order. Until the
/// collection is fetched the grid shows a placeholder.
fn resolve<'a, T: CatalogEntry>(
    refs: &'a [ListRef<T>],
    limit: u32,
    resource: ListResource,
    state: Option<&'a ListState<T>>,
) -> Entries<'a, T> {
    let limit = limit as usize;

    if !needs_store(refs) {
        let inline: Vec<&T> = refs
            .iter()
            .filter_map(ListRef::as_inline)
            .filter(|item| item.is_listed())
            .collect();
        return Entries::Ready(apply_limit(inline, limit));
    }

    let available = match state {
        None | Some(ListState::Pending) => {
            return Entries::Placeholder(VisualNode::Loading(Loading {
                label: format!("Loading {}\u{2026}", resource.label()),
            }));
        }
        Some(ListState::Failed(message)) => {
            debug!("{} unavailable: {}", resource.label(), message);
            return Entries::Placeholder(VisualNode::notice(
                NoticeLevel::Error,
                format!("Could not load {}: {}", resource.label(), message),
            ));
        }
        Some(ListState::Ready(items)) => items,
    };

    if refs.is_empty() {
        return Entries::Ready(catalog::select_by_slugs(available, &[], limit));
    }

    let picked: Vec<&T> = refs
        .iter()
        .filter_map(|r| match r {
            ListRef::Inline(item) => Some(item),
            ListRef::Slug(slug) => available.iter().find(|item| item.slug() == slug.as_str()),
        })
        .filter(|item| item.is_listed())
        .collect();
    Entries::Ready(apply_limit(picked, limit))
}

fn apply_limit<T>(items: Vec<T>, limit: usize) -> Vec<T> {
    if limit == 0 {
        items
    } else {
        items.into_iter().take(limit).collect()
    }
}

fn cover(url: &str, alt: &str) -> Option<VisualNode> {
    if url.trim().is_empty() {
        return None;
    }
    Some(VisualNode::Image(Image {
        src: url.to_string(),
        alt: alt.to_string(),
        style: Some(Style {
            width: Some(Dimension::Percent("100%".to_string())),
            border_radius: Some(8.0),
            ..Style::default()
        }),
    }))
}

fn read_more(slug: &str, base: &str, theme: &BlockTheme) -> Option<VisualNode> {
    if slug.trim().is_empty() {
        return None;
    }
    Some(VisualNode::Button(Button {
        text: "Read more \u{2192}".to_string(),
        href: format!("/{}/{}", base, slug),
        new_tab: false,
        style: Some(Style {
            color: Some(theme.button_from.clone()),
            font_weight: Some(600),
            ..Style::default()
        }),
    }))
}

fn service_card(service: &Service, theme: &BlockTheme) -> VisualNode {
    let mut children: Vec<VisualNode> = cover(&service.image_url, &service.title).into_iter().collect();
    children.push(item_title(&service.title, theme));
    children.push(VisualNode::text(&service.description, muted(theme)));
    children.extend(read_more(&service.slug, "services", theme));
    card(children, theme)
}

fn post_card(post: &BlogPost, theme: &BlockTheme) -> VisualNode {
    let mut children: Vec<VisualNode> = cover(&post.cover_image_url, &post.title).into_iter().collect();
    if !post.published_at.trim().is_empty() {
        children.push(VisualNode::text(&post.published_at, muted(theme)));
    }
    children.push(item_title(&post.title, theme));
    children.push(VisualNode::text(&post.excerpt, muted(theme)));
    children.extend(read_more(&post.slug, "blog", theme));
    card(children, theme)
}

fn study_card(study: &CaseStudy, theme: &BlockTheme) -> VisualNode {
    let mut children: Vec<VisualNode> = cover(&study.cover_image_url, &study.title).into_iter().collect();
    if !study.client.trim().is_empty() {
        children.push(VisualNode::text(
            &study.client,
            Some(Style {
                color: Some(theme.button_from.clone()),
                uppercase: Some(true),
                font_size: Some(13.0),
                ..Style::default()
            }),
        ));
    }
    children.push(item_title(&study.title, theme));
    children.push(VisualNode::text(&study.summary, muted(theme)));
    children.extend(read_more(&study.slug, "case-studies", theme));
    card(children, theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn post(slug: &str) -> BlogPost {
        BlogPost {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            ..BlogPost::default()
        }
    }

    fn slugs<T: CatalogEntry>(entries: &Entries<'_, T>) -> Vec<String> {
        match entries {
            Entries::Ready(items) => items.iter().map(|i| i.slug().to_string()).collect(),
            Entries::Placeholder(node) => panic!("unexpected placeholder {:?}", node),
        }
    }

    #[test]
    fn empty_refs_show_whole_collection_up_to_limit() {
        let state = ListState::Ready(vec![post("a"), post("b"), post("c"), post("d")]);
        let entries = resolve::<BlogPost>(&[], 3, ListResource::Blogs, Some(&state));
        assert_eq!(slugs(&entries), vec!["a", "b", "c"]);
    }

    #[test]
    fn inline_records_skip_the_store() {
        let refs = vec![ListRef::Inline(post("x"))];
        let entries = resolve(&refs, 0, ListResource::Blogs, None);
        assert_eq!(slugs(&entries), vec!["x"]);
    }

    #[test]
    fn mixed_refs_keep_inline_entries_in_place() {
        let refs = vec![
            ListRef::Slug("b".to_string()),
            ListRef::Inline(post("inline")),
            ListRef::Slug("a".to_string()),
        ];
        let state = ListState::Ready(vec![post("a"), post("b")]);
        let entries = resolve(&refs, 0, ListResource::Blogs, Some(&state));
        assert_eq!(slugs(&entries), vec!["b", "inline", "a"]);
    }

    #[test]
    fn pending_state_is_a_loading_placeholder() {
        let refs = vec![ListRef::Slug("a".to_string())];
        let state = ListState::Pending;
        match resolve::<BlogPost>(&refs, 0, ListResource::Blogs, Some(&state)) {
            Entries::Placeholder(VisualNode::Loading(loading)) => {
                assert_eq!(loading.label, "Loading blog posts\u{2026}")
            }
            _ => panic!("expected loading placeholder"),
        }
    }

    fn service(slug: &str, enabled: bool) -> Service {
        Service {
            slug: slug.to_string(),
            enabled,
            ..Service::default()
        }
    }

    #[test]
    fn disabled_services_do_not_count_against_limit() {
        let state = ListState::Ready(vec![
            service("off", false),
            service("a", true),
            service("b", true),
            service("c", true),
        ]);
        let entries = resolve::<Service>(&[], 3, ListResource::Services, Some(&state));
        assert_eq!(slugs(&entries), vec!["a", "b", "c"]);

        let refs = vec![
            ListRef::Inline(service("hidden", false)),
            ListRef::Inline(service("x", true)),
            ListRef::Inline(service("y", true)),
        ];
        let entries = resolve(&refs, 2, ListResource::Services, None);
        assert_eq!(slugs(&entries), vec!["x", "y"]);

        let refs = vec![ListRef::Slug("off".to_string()), ListRef::Slug("c".to_string())];
        let entries = resolve(&refs, 1, ListResource::Services, Some(&state));
        assert_eq!(slugs(&entries), vec!["c"]);
    }
}
