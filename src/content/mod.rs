//! Content layer: section model, content store access, fragment resolution

pub mod resolve;
pub mod section;
pub mod store;

pub use resolve::{resolve_page, resolve_sections};
pub use section::{Fragment, PageDoc, Section};
pub use store::{ApiStore, ContentStore, MemoryStore};
