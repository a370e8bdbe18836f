//! # Pagecraft sections
//!
//! Content model for pages assembled from an ordered list of typed sections.
//!
//! ## Features
//! - Registry of section kinds with canonical example payloads and palettes
//! - Normalizer that migrates legacy shapes and coerces wrongly typed fields
//! - Block tree for composite sections (hero) with stable block ids
//! - Pure renderer from sections to a visual tree, plus a safe HTML serializer
//! - Ordered collection editing with stable identity under reordering
//!
//! ## Example
//! ```ignore
//! use pagecraft_sections::{html, ListCache, Page, PageDraft, SectionKind};
//!
//! let mut draft = PageDraft::new(Page::new("Home", "home"));
//! let hero = draft.add_section(SectionKind::Hero);
//! draft.add_section(SectionKind::Stats);
//!
//! let page = draft.commit().expect("valid page");
//! let document = html::page_to_html(&page, &ListCache::new()).expect("rendered");
//! assert!(document.contains(&hero));
//! ```

pub mod blocks;
pub mod catalog;
pub mod collection;
pub mod content;
pub mod design;
pub mod error;
pub mod html;
mod lenient;
pub mod normalize;
pub mod page;
pub mod render;
pub mod schema;
pub mod section;
pub mod validator;
pub mod visual;

// --- Core types ---
pub use blocks::{Block, BlockContent, BlockKind, BlockSlot, BlockStyle, BlockTree};
pub use catalog::{BlogPost, CaseStudy, ListCache, ListRef, ListResource, ListState, Service};
pub use collection::{Direction, Keyed, RecordId};
pub use design::{BlockTheme, Design, ResolvedDesign};
pub use error::{SectionsError, SectionsResult};
pub use page::{Page, PageDraft, PageStatus};
pub use schema::SectionKind;
pub use section::{Section, SectionContent};
pub use visual::VisualNode;

// --- Operations ---
pub use render::{render_page, render_section, required_fetches};
pub use validator::validate_page;

/// Parse a page from JSON, as returned by the content API
pub fn parse_page(json: &str) -> SectionsResult<Page> {
    Page::from_json(json)
}

/// Parse a page from YAML
pub fn parse_page_yaml(yaml: &str) -> SectionsResult<Page> {
    Page::from_yaml(yaml)
}

/// Parse and validate a page
pub fn load_page(json: &str) -> SectionsResult<Page> {
    let page = parse_page(json)?;
    validate_page(&page)?;
    Ok(page)
}
