//! The content API as seen by the editor: plain CRUD over a few collections
//! plus three singleton settings documents.

use pagecraft_sections::{BlogPost, CaseStudy, ListResource, Page, RecordId, Service};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

use crate::error::ClientResult;

/// A CRUD collection of the content API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Pages,
    Blogs,
    CaseStudies,
    Services,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Pages,
        Resource::Blogs,
        Resource::CaseStudies,
        Resource::Services,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Pages => "pages",
            Resource::Blogs => "blogs",
            Resource::CaseStudies => "case-studies",
            Resource::Services => "services",
        }
    }
}

impl From<ListResource> for Resource {
    fn from(list: ListResource) -> Self {
        match list {
            ListResource::Services => Resource::Services,
            ListResource::Blogs => Resource::Blogs,
            ListResource::CaseStudies => Resource::CaseStudies,
        }
    }
}

/// Site-wide singleton documents under `settings/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsDoc {
    About,
    Contact,
    Header,
}

impl SettingsDoc {
    pub fn path(&self) -> &'static str {
        match self {
            SettingsDoc::About => "settings/about",
            SettingsDoc::Contact => "settings/contact",
            SettingsDoc::Header => "settings/header",
        }
    }
}

/// Backend the editor reads from and writes to.
///
/// `key` in [`get`](ContentStore::get) is an id or a slug. Writes return the
/// record as stored, which may carry a fresh id or timestamps.
pub trait ContentStore: Send + Sync {
    fn list<T>(&self, resource: Resource) -> impl Future<Output = ClientResult<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send;

    fn get<T>(&self, resource: Resource, key: &str) -> impl Future<Output = ClientResult<T>> + Send
    where
        T: DeserializeOwned + Send;

    fn create<T>(&self, resource: Resource, record: &T) -> impl Future<Output = ClientResult<T>> + Send
    where
        T: Serialize + DeserializeOwned + Send + Sync;

    fn update<T>(
        &self,
        resource: Resource,
        id: &RecordId,
        record: &T,
    ) -> impl Future<Output = ClientResult<T>> + Send
    where
        T: Serialize + DeserializeOwned + Send + Sync;

    fn delete(&self, resource: Resource, id: &RecordId) -> impl Future<Output = ClientResult<()>> + Send;

    fn settings(&self, doc: SettingsDoc) -> impl Future<Output = ClientResult<Value>> + Send;

    fn put_settings(&self, doc: SettingsDoc, value: &Value) -> impl Future<Output = ClientResult<Value>> + Send;

    // Typed shortcuts

    fn pages(&self) -> impl Future<Output = ClientResult<Vec<Page>>> + Send {
        self.list(Resource::Pages)
    }

    fn page(&self, key: &str) -> impl Future<Output = ClientResult<Page>> + Send {
        self.get(Resource::Pages, key)
    }

    fn services(&self) -> impl Future<Output = ClientResult<Vec<Service>>> + Send {
        self.list(Resource::Services)
    }

    fn blogs(&self) -> impl Future<Output = ClientResult<Vec<BlogPost>>> + Send {
        self.list(Resource::Blogs)
    }

    fn case_studies(&self) -> impl Future<Output = ClientResult<Vec<CaseStudy>>> + Send {
        self.list(Resource::CaseStudies)
    }
}

/// List bodies are either a bare array or wrapped as `{"data": [...]}`
pub(crate) fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
