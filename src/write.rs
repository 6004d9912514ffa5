use crate::page::PageRecord;
use crate::talk::{self, TalkCollection};
use crate::value::{page_value, talks_value};
use gtmpl::{Context, Template, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::PathBuf;
use url::Url;

/// Responsible for templating and writing HTML pages to disk from
/// [`PageRecord`]s.
pub struct Writer<'a> {
    /// The template every page is rendered with.
    pub layout: &'a Template,

    /// The URL for the site's root. This is made available to templates as
    /// `site_root`, and page permalinks are resolved against it.
    pub site_root: &'a Url,

    /// Selects the talk pages. The resulting listing is made available to
    /// every page template as `talks`.
    pub talks: &'a TalkCollection,
}

impl Writer<'_> {
    /// Renders a single page into a string. `talks` is the talk listing as
    /// built by [`talks_value`].
    pub fn render_page(&self, page: &PageRecord, talks: &Value) -> Result<String> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("page".to_owned(), page_value(page, self.site_root));
        m.insert("talks".to_owned(), talks.clone());
        m.insert(
            "site_root".to_owned(),
            Value::String(self.site_root.to_string()),
        );
        let context = Context::from(Value::Object(m))?;
        Ok(self.layout.render(&context)?)
    }

    /// Renders and writes every page. A page that fails to render is skipped
    /// and logged; the remaining pages are still written and the failure
    /// count is returned as [`Error::PagesFailed`]. If any talk lacks a title,
    /// the listing can't be built and every page fails with that error.
    pub fn write_pages(&self, pages: &[PageRecord]) -> Result<()> {
        let talks = self.talks.all_under(pages);
        log::info!(
            "found {} talks under `{}`",
            talks.len(),
            self.talks.prefix()
        );
        let listing = talks_value(&talks);

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut failed = 0;
        for page in pages {
            let rendered = match &listing {
                Ok(listing) => self.render_page(page, listing),
                Err(e) => Err(Error::Talk(e.clone())),
            };
            let html = match rendered {
                Ok(html) => html,
                Err(e) => {
                    log::error!("rendering page `{}`: {}", page.path, e);
                    failed += 1;
                    continue;
                }
            };
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            std::fs::write(&page.file_path, html)?;
            log::debug!("wrote `{}`", page.file_path.display());
        }

        if failed > 0 {
            return Err(Error::PagesFailed {
                failed,
                total: pages.len(),
            });
        }
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error reading a talk for the listing.
    Talk(talk::Error),

    /// An error writing the output files.
    Io(io::Error),

    /// Returned after all pages were attempted if any of them failed.
    PagesFailed { failed: usize, total: usize },
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<talk::Error> for Error {
    fn from(err: talk::Error) -> Error {
        Error::Talk(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Talk(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::PagesFailed { failed, total } => {
                write!(f, "{} of {} pages failed to render", failed, total)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Talk(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::PagesFailed { .. } => None,
        }
    }
}
