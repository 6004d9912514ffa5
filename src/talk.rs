//! Defines [`TalkCollection`] and [`TalkView`]: selecting the pages that
//! represent talks and exposing the handful of fields a listing needs.

use crate::page::PageRecord;
use serde::Deserialize;
use serde_yaml::Value as Yaml;
use std::fmt;

/// How a page path is compared against the collection prefix.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMatch {
    /// The prefix must end on a path-segment boundary: `/talks` matches
    /// `/talks` and `/talks/a` but not `/talksxyz`.
    Segment,

    /// Plain string prefix: `/talks` also matches `/talksxyz`.
    Naive,
}

impl Default for PrefixMatch {
    fn default() -> Self {
        PrefixMatch::Segment
    }
}

impl PrefixMatch {
    fn matches(self, path: &str, prefix: &str) -> bool {
        match self {
            PrefixMatch::Naive => path.starts_with(prefix),
            PrefixMatch::Segment => match path.strip_prefix(prefix) {
                None => false,
                Some(rest) => {
                    rest.is_empty()
                        || rest.starts_with('/')
                        || prefix.ends_with('/')
                }
            },
        }
    }
}

/// Selects the talk pages out of all the pages of a site. The prefix is
/// validated once on construction, so [`TalkCollection::all_under`] itself
/// cannot fail.
#[derive(Clone, Debug)]
pub struct TalkCollection {
    prefix: String,
    matching: PrefixMatch,
}

impl TalkCollection {
    /// Constructs a collection for `prefix`. Returns [`Error::InvalidPrefix`]
    /// if the prefix is empty or not rooted at `/`.
    pub fn new(prefix: &str, matching: PrefixMatch) -> Result<TalkCollection> {
        if !prefix.starts_with('/') {
            return Err(Error::InvalidPrefix(prefix.to_owned()));
        }
        Ok(TalkCollection {
            prefix: prefix.to_owned(),
            matching,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns a [`TalkView`] for every record whose path falls under the
    /// prefix, in the order the records were given.
    pub fn all_under<'a>(&self, records: &'a [PageRecord]) -> Vec<TalkView<'a>> {
        records
            .iter()
            .filter(|record| self.matching.matches(&record.path, &self.prefix))
            .map(|record| TalkView { record })
            .collect()
    }
}

/// Filters `records` down to those under `prefix` using segment-aware
/// matching. Shorthand for building a [`TalkCollection`] and calling
/// [`TalkCollection::all_under`].
pub fn all_under<'a>(
    records: &'a [PageRecord],
    prefix: &str,
) -> Result<Vec<TalkView<'a>>> {
    Ok(TalkCollection::new(prefix, PrefixMatch::Segment)?.all_under(records))
}

/// A read-only view of one talk page.
#[derive(Clone, Copy, Debug)]
pub struct TalkView<'a> {
    record: &'a PageRecord,
}

impl<'a> TalkView<'a> {
    /// The talk page's URL path.
    pub fn url(&self) -> &'a str {
        &self.record.path
    }

    /// The talk's `title` frontmatter value, exactly as authored.
    pub fn title(&self) -> Result<&'a Yaml> {
        self.attribute("title")
    }

    /// Looks up a frontmatter value, failing with
    /// [`Error::MissingAttribute`] if the page doesn't define it.
    pub fn attribute(&self, key: &str) -> Result<&'a Yaml> {
        self.record.get(key).ok_or_else(|| Error::MissingAttribute {
            path: self.record.path.clone(),
            key: key.to_owned(),
        })
    }
}

/// The result of a fallible talk operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error selecting or reading talks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when an accessor reads a frontmatter key the page lacks.
    MissingAttribute { path: String, key: String },

    /// Returned when the collection prefix is empty or doesn't begin with
    /// `/`.
    InvalidPrefix(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingAttribute { path, key } => {
                write!(f, "talk `{}` has no `{}` attribute", path, key)
            }
            Error::InvalidPrefix(prefix) => write!(
                f,
                "invalid talks prefix {:?}: must be non-empty and begin with `/`",
                prefix
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page::Metadata;
    use std::path::PathBuf;

    fn record(path: &str, title: Option<&str>) -> PageRecord {
        let mut metadata = Metadata::new();
        if let Some(title) = title {
            metadata.insert("title".to_owned(), Yaml::from(title));
        }
        PageRecord {
            path: path.to_owned(),
            metadata,
            body: String::new(),
            file_path: PathBuf::from(path.trim_start_matches('/')),
        }
    }

    fn urls<'a>(talks: &[TalkView<'a>]) -> Vec<&'a str> {
        talks.iter().map(|t| t.url()).collect()
    }

    #[test]
    fn test_all_under_keeps_matching_paths_in_order() -> Result<()> {
        let records = vec![
            record("/talks/b.html", Some("B")),
            record("/about.html", Some("About")),
            record("/talks/a.html", Some("A")),
            record("/index.html", None),
        ];
        let talks = all_under(&records, "/talks")?;
        assert_eq!(vec!["/talks/b.html", "/talks/a.html"], urls(&talks));
        Ok(())
    }

    #[test]
    fn test_all_under_empty() -> Result<()> {
        assert!(all_under(&[], "/talks")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_all_under_no_match() -> Result<()> {
        let records = vec![record("/about.html", Some("About"))];
        assert!(all_under(&records, "/talks")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_segment_matching_rejects_sibling_prefix() -> Result<()> {
        let records = vec![
            record("/talks/a", Some("A")),
            record("/talksxyz", Some("X")),
            record("/about", Some("About")),
        ];
        assert_eq!(vec!["/talks/a"], urls(&all_under(&records, "/talks")?));
        Ok(())
    }

    #[test]
    fn test_naive_matching_accepts_sibling_prefix() -> Result<()> {
        let records = vec![
            record("/talks/a", Some("A")),
            record("/talksxyz", Some("X")),
            record("/about", Some("About")),
        ];
        let collection = TalkCollection::new("/talks", PrefixMatch::Naive)?;
        assert_eq!(
            vec!["/talks/a", "/talksxyz"],
            urls(&collection.all_under(&records))
        );
        Ok(())
    }

    #[test]
    fn test_segment_matching_exact_and_trailing_slash() -> Result<()> {
        let records = vec![
            record("/talks", None),
            record("/talks/", None),
            record("/talks/a", None),
            record("/Talks/b", None),
        ];
        assert_eq!(
            vec!["/talks", "/talks/", "/talks/a"],
            urls(&all_under(&records, "/talks")?)
        );
        assert_eq!(
            vec!["/talks/", "/talks/a"],
            urls(&all_under(&records, "/talks/")?)
        );
        Ok(())
    }

    #[test]
    fn test_all_under_is_repeatable() -> Result<()> {
        let records = vec![
            record("/talks/a", Some("A")),
            record("/talks/b", Some("B")),
        ];
        let collection = TalkCollection::new("/talks", PrefixMatch::Segment)?;
        let first: Vec<_> = collection
            .all_under(&records)
            .iter()
            .map(|t| (t.url(), t.title().cloned()))
            .collect();
        let second: Vec<_> = collection
            .all_under(&records)
            .iter()
            .map(|t| (t.url(), t.title().cloned()))
            .collect();
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_title_is_returned_unchanged() -> Result<()> {
        let mut talk = record("/talks/a", None);
        let title = Yaml::from("  Ownership, Borrowing & You  ");
        talk.metadata.insert("title".to_owned(), title.clone());
        let records = vec![talk];
        let talks = all_under(&records, "/talks")?;
        assert_eq!(&title, talks[0].title()?);
        Ok(())
    }

    #[test]
    fn test_missing_title() -> Result<()> {
        let records = vec![record("/talks/untitled", None)];
        let talks = all_under(&records, "/talks")?;
        assert_eq!(1, talks.len());
        assert_eq!(
            Err(Error::MissingAttribute {
                path: "/talks/untitled".to_owned(),
                key: "title".to_owned(),
            }),
            talks[0].title()
        );
        Ok(())
    }

    #[test]
    fn test_attribute() -> Result<()> {
        let mut talk = record("/talks/a", Some("A"));
        talk.metadata
            .insert("event".to_owned(), Yaml::from("RustConf 2021"));
        let records = vec![talk];
        let talks = all_under(&records, "/talks")?;
        assert_eq!(&Yaml::from("RustConf 2021"), talks[0].attribute("event")?);
        assert_eq!(
            Err(Error::MissingAttribute {
                path: "/talks/a".to_owned(),
                key: "video".to_owned(),
            }),
            talks[0].attribute("video")
        );
        Ok(())
    }

    #[test]
    fn test_invalid_prefix() {
        assert_eq!(
            Some(Error::InvalidPrefix(String::new())),
            all_under(&[], "").err()
        );
        assert_eq!(
            Some(Error::InvalidPrefix("talks".to_owned())),
            TalkCollection::new("talks", PrefixMatch::Naive).err()
        );
    }
}
