//! Defines the [`Parser`] and [`Error`] types. Also defines the logic for
//! reading a site's source directory into memory: markdown files become
//! [`PageRecord`]s and everything else is collected as a [`StaticFile`] to be
//! copied verbatim.

use std::{
    fmt,
    fs::File,
    path::{Component, Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
    markdown,
    page::{Metadata, PageRecord},
};

const MARKDOWN_EXTENSION: &str = "md";
const HTML_EXTENSION: &str = "html";

/// Parses [`PageRecord`] objects from source files.
pub struct Parser<'a> {
    /// `output_directory` is the directory into which pages and static files
    /// will be written. A page whose source file is
    /// `{source_directory}/talks/foo.md` is written to
    /// `{output_directory}/talks/foo.html`.
    output_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(output_directory: &'a Path) -> Parser<'a> {
        Parser { output_directory }
    }

    /// Walks `source_directory` and returns every markdown file as a
    /// [`PageRecord`] along with the list of static files to copy. Entries
    /// are visited in file-name order, so the returned pages are in a stable
    /// order. Each page source file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter (may be empty)
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Markdown body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Fearless Concurrency in Practice
    /// event: RustConf 2021
    /// ---
    /// Slides and video below.
    /// ```
    pub fn parse_pages(&self, source_directory: &Path) -> Result<Pages> {
        let mut pages = Vec::new();
        let mut static_files = Vec::new();
        for result in WalkDir::new(source_directory)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }

            // strip_prefix() should never fail since WalkDir only yields
            // descendants of `source_directory`
            let relative_path = entry
                .path()
                .strip_prefix(source_directory)
                .map_err(|_| InvalidFileNameError(entry.path().to_owned()))?;

            let is_markdown = relative_path
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            if is_markdown {
                let page = self.parse_page(entry.path(), relative_path)?;
                log::debug!("parsed page `{}`", page.path);
                pages.push(page);
            } else {
                static_files.push((
                    entry.path().to_owned(),
                    self.output_directory.join(relative_path),
                ));
            }
        }
        Ok((pages, static_files))
    }

    fn parse_page(
        &self,
        source_path: &Path,
        relative_path: &Path,
    ) -> Result<PageRecord> {
        match self._parse_page(source_path, relative_path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing page `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_page(
        &self,
        source_path: &Path,
        relative_path: &Path,
    ) -> Result<PageRecord> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(source_path)?.read_to_string(&mut contents)?;

        let (metadata, body) = split_frontmatter(&contents)?;
        let output_path = relative_path.with_extension(HTML_EXTENSION);

        let mut page = PageRecord {
            path: url_path(&output_path)?,
            metadata,
            body: String::new(),
            file_path: self.output_directory.join(&output_path),
        };
        markdown::to_html(&mut page.body, body);
        Ok(page)
    }
}

/// Splits a page source into its parsed frontmatter and its markdown body.
/// Both fences must be a line of exactly `---`.
pub fn split_frontmatter(input: &str) -> Result<(Metadata, &str)> {
    let rest = strip_fence_line(input).ok_or(Error::FrontmatterMissingStartFence)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if let Some(body) = strip_fence_line(line) {
            if body.is_empty() {
                let yaml = &rest[..offset];
                let metadata = if yaml.trim().is_empty() {
                    Metadata::new()
                } else {
                    serde_yaml::from_str(yaml)?
                };
                return Ok((metadata, &rest[offset + line.len()..]));
            }
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

// Returns what follows a leading `---` line, or `None` if `input` doesn't
// begin with one.
fn strip_fence_line(input: &str) -> Option<&str> {
    const FENCE: &str = "---";
    let rest = input.strip_prefix(FENCE)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
    }
}

/// Converts a path relative to the output directory into a rooted URL path
/// (`talks/foo.html` becomes `/talks/foo.html`).
fn url_path(relative_path: &Path) -> Result<String> {
    let mut path = String::new();
    for component in relative_path.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| {
                    InvalidFileNameError(relative_path.to_owned())
                })?;
                path.push('/');
                path.push_str(segment);
            }
            _ => return Err(InvalidFileNameError(relative_path.to_owned()).into()),
        }
    }
    Ok(path)
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {
    /// Implements the [`std::error::Error`] trait for [`InvalidFileNameError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

pub type Pages = (Vec<PageRecord>, Vec<StaticFile>);

/// A source file path and the output path it is copied to.
pub type StaticFile = (PathBuf, PathBuf);

/// Represents the result of a [`PageRecord`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`PageRecord`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a page source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a page source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Page must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for directory traversal.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
