mod content;
pub use content::{Content, ContentEntry, ContentManifest};
