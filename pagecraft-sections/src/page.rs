use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blocks::{Block, BlockKind, BlockSlot, BlockTree};
use crate::collection::{self, Direction, Keyed, RecordId};
use crate::error::SectionsResult;
use crate::lenient;
use crate::schema::SectionKind;
use crate::section::Section;
use crate::validator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

/// A page as stored by the content API. `content` is always written whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_record_id")]
    pub id: Option<RecordId>,
    pub title: String,
    pub slug: String,
    pub status: PageStatus,
    pub content: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    pub fn new(title: &str, slug: &str) -> Self {
        Page {
            title: title.to_string(),
            slug: slug.to_string(),
            ..Page::default()
        }
    }

    pub fn from_json(json: &str) -> SectionsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> SectionsResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        collection::position(&self.content, id).map(|index| &self.content[index])
    }

    /// Section keys in page order
    pub fn section_ids(&self) -> Vec<String> {
        collection::keys(&self.content)
    }
}

/// In-memory editing state for one page.
///
/// Every edit goes through the draft; nothing is persisted until the caller
/// takes [`commit`](PageDraft::commit) to the store and reports success with
/// [`mark_saved`](PageDraft::mark_saved). A failed save leaves the draft and
/// its dirty flag untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDraft {
    page: Page,
    saved: Page,
    persisted: bool,
}

impl PageDraft {
    /// Draft over a page loaded from the store
    pub fn new(page: Page) -> Self {
        PageDraft {
            saved: page.clone(),
            page,
            persisted: true,
        }
    }

    /// Draft over a page the store has never seen; dirty until the first
    /// successful save
    pub fn unsaved(page: Page) -> Self {
        PageDraft {
            persisted: false,
            ..PageDraft::new(page)
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The page as last loaded or saved, or as first created
    pub fn saved(&self) -> &Page {
        &self.saved
    }

    /// False until an unsaved page is first stored
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn sections(&self) -> &[Section] {
        &self.page.content
    }

    /// True when the draft differs from what was last saved, or was never saved
    pub fn is_dirty(&self) -> bool {
        !self.persisted || self.page != self.saved
    }

    pub fn set_title(&mut self, title: &str) {
        self.page.title = title.to_string();
    }

    pub fn set_slug(&mut self, slug: &str) {
        self.page.slug = slug.to_string();
    }

    pub fn set_status(&mut self, status: PageStatus) {
        self.page.status = status;
    }

    pub fn set_meta_description(&mut self, description: Option<String>) {
        self.page.meta_description = description;
    }

    /// Append a new section with the registry example payload; returns its id
    pub fn add_section(&mut self, kind: SectionKind) -> String {
        let section = Section::new(kind);
        let id = section.key(self.page.content.len());
        self.page.content = collection::add(&self.page.content, section);
        id
    }

    /// Insert a new section at `index` (clamped to the end); returns its id
    pub fn insert_section(&mut self, index: usize, kind: SectionKind) -> String {
        let section = Section::new(kind);
        let id = section.key(index);
        self.page.content = collection::insert_at(&self.page.content, index, section);
        id
    }

    pub fn remove_section(&mut self, id: &str) -> bool {
        self.apply(|sections| collection::remove(sections, id))
    }

    pub fn move_section(&mut self, id: &str, direction: Direction) -> bool {
        self.apply(|sections| collection::move_by_id(sections, id, direction))
    }

    /// Drag-and-drop: move `from_id` to the position of `to_id`.
    /// A stale id leaves the page unchanged.
    pub fn reorder_sections(&mut self, from_id: &str, to_id: &str) -> bool {
        self.apply(|sections| collection::reorder(sections, from_id, to_id))
    }

    /// Replace a section's whole payload
    pub fn update_section(&mut self, id: &str, data: Value) -> bool {
        match self.section_mut(id) {
            Some(section) => {
                section.set_data(data);
                true
            }
            None => {
                debug!("update for stale section id '{}' ignored", id);
                false
            }
        }
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        let index = collection::position(&self.page.content, id)?;
        self.page.content.get_mut(index)
    }

    /// Add a block to a composite section; `None` if the section is missing
    /// or not composite
    pub fn add_block(&mut self, section_id: &str, slot: BlockSlot, kind: BlockKind) -> Option<String> {
        let hero = self.section_mut(section_id)?.content.as_hero_mut()?;
        Some(hero.add_block(slot, kind))
    }

    pub fn update_block(&mut self, section_id: &str, slot: BlockSlot, index: usize, block: Block) -> bool {
        self.with_blocks(section_id, |tree| tree.update_block(slot, index, block))
    }

    pub fn move_block(&mut self, section_id: &str, slot: BlockSlot, index: usize, direction: Direction) -> bool {
        self.with_blocks(section_id, |tree| tree.move_block(slot, index, direction))
    }

    pub fn remove_block(&mut self, section_id: &str, slot: BlockSlot, index: usize) -> bool {
        self.with_blocks(section_id, |tree| tree.remove_block(slot, index).is_some())
    }

    pub fn reorder_block(&mut self, section_id: &str, slot: BlockSlot, from: usize, to: usize) -> bool {
        self.with_blocks(section_id, |tree| tree.reorder_block(slot, from, to))
    }

    /// Check identities and return the page to persist. Title and slug
    /// problems do not block; see [`validator::page_warnings`].
    pub fn commit(&self) -> SectionsResult<Page> {
        validator::validate_page(&self.page)?;
        Ok(self.page.clone())
    }

    /// Record a successful save. The store's copy becomes the new baseline;
    /// the draft keeps any edits made while the save was in flight.
    pub fn mark_saved(&mut self, stored: Page) {
        if self.page.id.is_none() {
            self.page.id = stored.id.clone();
        }
        if stored.updated_at.is_some() {
            self.page.updated_at = stored.updated_at.clone();
        }
        self.saved = stored;
        self.persisted = true;
    }

    /// Drop local edits
    pub fn discard(&mut self) {
        self.page = self.saved.clone();
    }

    fn apply(&mut self, edit: impl FnOnce(&[Section]) -> Vec<Section>) -> bool {
        let updated = edit(&self.page.content);
        if updated == self.page.content {
            return false;
        }
        self.page.content = updated;
        true
    }

    fn with_blocks(&mut self, section_id: &str, edit: impl FnOnce(&mut dyn BlockTree) -> bool) -> bool {
        match self.section_mut(section_id).and_then(|s| s.content.as_hero_mut()) {
            Some(hero) => edit(hero),
            None => false,
        }
    }
}
