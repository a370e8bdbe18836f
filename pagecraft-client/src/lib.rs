//! # Pagecraft client
//!
//! Async side of the page builder: the content API client, an in-memory
//! store with the same interface, and the editing session that owns a page
//! draft and decides when to save and what to fetch.
//!
//! ## Example
//! ```ignore
//! use pagecraft_client::{EditorSession, HttpStore};
//! use pagecraft_sections::SectionKind;
//!
//! let store = HttpStore::from_env()?;
//! let mut session = EditorSession::open(store, "home").await?;
//! session.draft_mut().add_section(SectionKind::Stats);
//! session.save().await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod session;
pub mod store;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use session::EditorSession;
pub use store::{ContentStore, Resource, SettingsDoc};
