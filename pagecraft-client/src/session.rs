use log::{debug, info, warn};
use pagecraft_sections::{
    html, render, ListCache, ListResource, Page, PageDraft, VisualNode,
};

use crate::error::{ClientError, ClientResult};
use crate::store::{ContentStore, Resource};

/// One editor working on one page.
///
/// Edits go through [`draft_mut`](EditorSession::draft_mut) and stay local
/// until [`save`](EditorSession::save), which writes the whole page in a
/// single request. A failed save changes nothing locally.
pub struct EditorSession<S> {
    store: S,
    draft: PageDraft,
    lists: ListCache,
}

impl<S: ContentStore> EditorSession<S> {
    /// Load an existing page by id or slug
    pub async fn open(store: S, key: &str) -> ClientResult<Self> {
        let page: Page = store.page(key).await?;
        info!("opened page '{}' with {} sections", page.slug, page.content.len());
        Ok(EditorSession {
            store,
            draft: PageDraft::new(page),
            lists: ListCache::new(),
        })
    }

    /// Start a page that does not exist in the store yet. It counts as dirty
    /// until the first successful save.
    pub fn create(store: S, title: &str, slug: &str) -> Self {
        EditorSession {
            store,
            draft: PageDraft::unsaved(Page::new(title, slug)),
            lists: ListCache::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn draft(&self) -> &PageDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PageDraft {
        &mut self.draft
    }

    pub fn lists(&self) -> &ListCache {
        &self.lists
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.is_dirty()
    }

    /// Validate and persist the whole page. New pages are created, existing
    /// pages replaced. On error the draft and its dirty flag are untouched.
    pub async fn save(&mut self) -> ClientResult<&Page> {
        let page = self.draft.commit()?;
        let result = match &page.id {
            Some(id) => self.store.update(Resource::Pages, id, &page).await,
            None => self.store.create(Resource::Pages, &page).await,
        };
        match result {
            Ok(stored) => {
                debug!("saved page '{}'", stored.slug);
                self.draft.mark_saved(stored);
                Ok(self.draft.page())
            }
            Err(ClientError::Unauthorized) => {
                warn!("save of '{}' rejected: session expired", page.slug);
                Err(ClientError::Unauthorized)
            }
            Err(err) => {
                warn!("save of '{}' failed: {}", page.slug, err);
                Err(err)
            }
        }
    }

    /// Drop local edits and load the stored page again
    pub async fn reload(&mut self) -> ClientResult<()> {
        let key = match &self.draft.saved().id {
            Some(id) => id.to_string(),
            None => self.draft.saved().slug.clone(),
        };
        let page: Page = self.store.page(&key).await?;
        self.draft = PageDraft::new(page);
        self.lists = ListCache::new();
        Ok(())
    }

    /// Fetch the lists the current sections need and have not requested yet.
    /// Failures are recorded in the cache and rendered inline; they are not
    /// returned. Returns the resources that were requested.
    pub async fn fetch_lists(&mut self) -> Vec<ListResource> {
        let needed = render::required_fetches(self.draft.sections(), &self.lists);
        for resource in &needed {
            self.lists.mark_pending(*resource);
        }
        for resource in &needed {
            debug!("fetching {}", resource.label());
            match resource {
                ListResource::Services => match self.store.services().await {
                    Ok(items) => self.lists.set_services(items),
                    Err(err) => self.record_failure(*resource, err),
                },
                ListResource::Blogs => match self.store.blogs().await {
                    Ok(items) => self.lists.set_blogs(items),
                    Err(err) => self.record_failure(*resource, err),
                },
                ListResource::CaseStudies => match self.store.case_studies().await {
                    Ok(items) => self.lists.set_case_studies(items),
                    Err(err) => self.record_failure(*resource, err),
                },
            }
        }
        needed
    }

    /// Forget fetched lists so the next render fetches them again
    pub fn invalidate_lists(&mut self) {
        self.lists = ListCache::new();
    }

    /// Render the draft as it currently is, without fetching
    pub fn preview(&self) -> VisualNode {
        render::render_page(self.draft.page(), &self.lists)
    }

    /// Fetch missing lists, then render the draft
    pub async fn render(&mut self) -> VisualNode {
        self.fetch_lists().await;
        self.preview()
    }

    pub async fn render_html(&mut self) -> ClientResult<String> {
        self.fetch_lists().await;
        Ok(html::page_to_html(self.draft.page(), &self.lists)?)
    }

    fn record_failure(&mut self, resource: ListResource, err: ClientError) {
        warn!("could not fetch {}: {}", resource.label(), err);
        self.lists.mark_failed(resource, err.to_string());
    }
}
