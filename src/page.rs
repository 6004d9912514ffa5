//! Defines the [`PageRecord`] type, the in-memory form of a single source
//! page after its frontmatter has been parsed and its body rendered.

use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The frontmatter of a page: string keys mapped to arbitrary YAML values.
pub type Metadata = BTreeMap<String, Yaml>;

/// A content page. Records are produced by [`crate::parser::Parser`] and are
/// not modified afterwards; everything downstream (talk listings, rendering)
/// only borrows them.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRecord {
    /// The site-relative URL path of the rendered page, always beginning
    /// with `/` (e.g., `/talks/rustconf.html`). Unique within a site.
    pub path: String,

    /// The parsed frontmatter.
    pub metadata: Metadata,

    /// The page body rendered to HTML.
    pub body: String,

    /// The output file the page is written to.
    pub file_path: PathBuf,
}

impl PageRecord {
    /// Looks up a frontmatter value by key.
    pub fn get(&self, key: &str) -> Option<&Yaml> {
        self.metadata.get(key)
    }
}
