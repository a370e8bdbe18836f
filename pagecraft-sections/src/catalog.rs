//! Records that live in their own store collections (services, blog posts,
//! case studies) and the per-render cache that grid sections read them from.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::collection::RecordId;
use crate::lenient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_record_id")]
    pub id: Option<RecordId>,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub image_url: String,
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Service {
    fn default() -> Self {
        Service {
            id: None,
            slug: String::new(),
            title: String::new(),
            description: String::new(),
            icon: String::new(),
            image_url: String::new(),
            enabled: true,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogPost {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_record_id")]
    pub id: Option<RecordId>,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image_url: String,
    pub published_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseStudy {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_record_id")]
    pub id: Option<RecordId>,
    pub slug: String,
    pub title: String,
    pub client: String,
    pub summary: String,
    pub cover_image_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Anything a grid can list, addressable by slug
pub trait CatalogEntry {
    fn slug(&self) -> &str;

    /// Whether grids show this entry at all
    fn is_listed(&self) -> bool {
        true
    }
}

impl CatalogEntry for Service {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn is_listed(&self) -> bool {
        self.enabled
    }
}

impl CatalogEntry for BlogPost {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl CatalogEntry for CaseStudy {
    fn slug(&self) -> &str {
        &self.slug
    }
}

/// A grid entry: either a full inline record or (legacy) a bare slug that
/// refers to a record in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ListRef<T> {
    Slug(String),
    Inline(T),
}

impl<T> ListRef<T> {
    pub fn as_inline(&self) -> Option<&T> {
        match self {
            ListRef::Inline(item) => Some(item),
            ListRef::Slug(_) => None,
        }
    }
}

impl<T: Serialize> Serialize for ListRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ListRef::Slug(slug) => serializer.serialize_str(slug),
            ListRef::Inline(item) => item.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for ListRef<T>
where
    T: serde::de::DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(slug) => Ok(ListRef::Slug(slug)),
            other => serde_json::from_value(other)
                .map(ListRef::Inline)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// A store collection that grid sections may need at render time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListResource {
    Services,
    Blogs,
    CaseStudies,
}

impl ListResource {
    /// Collection path on the content API
    pub fn path(&self) -> &'static str {
        match self {
            ListResource::Services => "services",
            ListResource::Blogs => "blogs",
            ListResource::CaseStudies => "case-studies",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListResource::Services => "services",
            ListResource::Blogs => "blog posts",
            ListResource::CaseStudies => "case studies",
        }
    }
}

/// Fetch state of one list. Absence from the cache means "not requested yet".
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Pending,
    Ready(Vec<T>),
    Failed(String),
}

/// Lists fetched for the current render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListCache {
    pub services: Option<ListState<Service>>,
    pub blogs: Option<ListState<BlogPost>>,
    pub case_studies: Option<ListState<CaseStudy>>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been requested for `resource` yet
    pub fn is_missing(&self, resource: ListResource) -> bool {
        match resource {
            ListResource::Services => self.services.is_none(),
            ListResource::Blogs => self.blogs.is_none(),
            ListResource::CaseStudies => self.case_studies.is_none(),
        }
    }

    pub fn mark_pending(&mut self, resource: ListResource) {
        match resource {
            ListResource::Services => self.services = Some(ListState::Pending),
            ListResource::Blogs => self.blogs = Some(ListState::Pending),
            ListResource::CaseStudies => self.case_studies = Some(ListState::Pending),
        }
    }

    pub fn mark_failed(&mut self, resource: ListResource, message: impl Into<String>) {
        let message = message.into();
        match resource {
            ListResource::Services => self.services = Some(ListState::Failed(message)),
            ListResource::Blogs => self.blogs = Some(ListState::Failed(message)),
            ListResource::CaseStudies => self.case_studies = Some(ListState::Failed(message)),
        }
    }

    pub fn set_services(&mut self, services: Vec<Service>) {
        self.services = Some(ListState::Ready(services));
    }

    pub fn set_blogs(&mut self, posts: Vec<BlogPost>) {
        self.blogs = Some(ListState::Ready(posts));
    }

    pub fn set_case_studies(&mut self, studies: Vec<CaseStudy>) {
        self.case_studies = Some(ListState::Ready(studies));
    }
}

/// Pick the entries a grid shows: all of `available` when `slugs` is empty,
/// otherwise the referenced entries in reference order (unknown slugs are
/// skipped). Unlisted entries are skipped before `limit` applies;
/// `limit == 0` means no limit.
pub fn select_by_slugs<'a, T: CatalogEntry>(
    available: &'a [T],
    slugs: &[&str],
    limit: usize,
) -> Vec<&'a T> {
    let picked: Vec<&T> = if slugs.is_empty() {
        available.iter().collect()
    } else {
        slugs
            .iter()
            .filter_map(|slug| available.iter().find(|item| item.slug() == *slug))
            .collect()
    };
    let picked = picked.into_iter().filter(|item| item.is_listed());
    if limit == 0 {
        picked.collect()
    } else {
        picked.take(limit).collect()
    }
}
