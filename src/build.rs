//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the pages
//! ([`crate::parser`]), selecting the talks ([`crate::talk`]), rendering every
//! page ([`crate::write`]), and copying static files into the output
//! directory.

use crate::config::Config;
use crate::parser::{Error as ParseError, Parser as PageParser, StaticFile};
use crate::talk::{Error as TalkError, TalkCollection};
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`] object. This calls into
/// [`PageParser::parse_pages`] and [`Writer::write_pages`] which do the
/// heavy-lifting. This function also copies the static files from the source
/// directory to the output directory.
pub fn build_site(config: &Config) -> Result<()> {
    // Validate the talks prefix before touching the output directory.
    let talks =
        TalkCollection::new(&config.talks_prefix, config.prefix_matching)?;
    check_output_directory(config)?;

    let parser = PageParser::new(&config.output_directory);
    let (pages, static_files) = parser.parse_pages(&config.source_directory)?;
    log::info!(
        "parsed {} pages and {} static files from `{}`",
        pages.len(),
        static_files.len(),
        config.source_directory.display()
    );

    let layout = parse_template(config.layout.iter())?;

    rmdir(&config.output_directory)?;

    let writer = Writer {
        layout: &layout,
        site_root: &config.site_root,
        talks: &talks,
    };
    writer.write_pages(&pages)?;

    copy_static_files(&static_files)?;

    log::info!("built site in `{}`", config.output_directory.display());
    Ok(())
}

// The output directory is deleted on every build, so refuse to use one that
// would take the project root or the sources with it.
fn check_output_directory(config: &Config) -> Result<()> {
    let output = match std::fs::canonicalize(&config.output_directory) {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    for protected in &[&config.project_root, &config.source_directory] {
        if std::fs::canonicalize(protected)?.starts_with(&output) {
            return Err(Error::UnsafeOutputDirectory {
                output: config.output_directory.clone(),
                protected: protected.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn copy_static_files(static_files: &[StaticFile]) -> Result<()> {
    for (src, dst) in static_files {
        if let Some(dir) = dst.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::copy(src, dst)?;
        log::debug!("copied `{}`", dst.display());
    }
    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a single template.
fn parse_template<P: AsRef<Path>>(
    template_files: impl Iterator<Item = P>,
) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during configuration,
/// parsing, writing, cleaning the output directory, parsing template files,
/// and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the talk collection is misconfigured.
    Talk(TalkError),

    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned when the output directory is, or contains, the project root
    /// or the source directory.
    UnsafeOutputDirectory { output: PathBuf, protected: PathBuf },

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Talk(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::UnsafeOutputDirectory { output, protected } => write!(
                f,
                "Refusing to build into '{}': cleaning it would delete '{}'",
                output.display(),
                protected.display()
            ),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Talk(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::UnsafeOutputDirectory { .. } => None,
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<TalkError> for Error {
    fn from(err: TalkError) -> Error {
        Error::Talk(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::talk::PrefixMatch;
    use std::fs;
    use url::Url;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config(root: &Path, prefix: &str) -> Config {
        Config {
            site_root: Url::parse("https://example.org/").unwrap(),
            project_root: root.to_owned(),
            source_directory: root.join("source"),
            output_directory: root.join("_site"),
            layout: vec![root.join("layout.html")],
            talks_prefix: prefix.to_owned(),
            prefix_matching: PrefixMatch::Segment,
        }
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let root = tempfile::tempdir()?;
        write(
            root.path(),
            "layout.html",
            "{{ range .talks }}[{{ .title }}]({{ .url }}){{ end }}",
        );
        write(root.path(), "source/index.md", "---\n---\n");
        write(
            root.path(),
            "source/talks/rustconf.md",
            "---\ntitle: Fearless Concurrency\n---\n",
        );
        write(root.path(), "source/talksxyz.md", "---\ntitle: Not a talk\n---\n");
        write(root.path(), "source/images/logo.svg", "<svg/>");
        write(root.path(), "_site/stale.html", "old");

        build_site(&config(root.path(), "/talks"))?;

        let site = root.path().join("_site");
        assert_eq!(
            "[Fearless Concurrency](/talks/rustconf.html)",
            fs::read_to_string(site.join("index.html"))?.trim_end()
        );
        assert!(site.join("talks/rustconf.html").is_file());
        assert!(site.join("talksxyz.html").is_file());
        assert_eq!("<svg/>", fs::read_to_string(site.join("images/logo.svg"))?);
        assert!(!site.join("stale.html").exists());
        Ok(())
    }

    #[test]
    fn test_build_site_invalid_prefix() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            build_site(&config(root.path(), "")),
            Err(Error::Talk(TalkError::InvalidPrefix(_)))
        ));
    }

    #[test]
    fn test_build_site_refuses_to_clean_sources() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "layout.html", "{{ .page.body }}");
        write(root.path(), "source/talks/a.md", "---\ntitle: A\n---\n");

        let mut config = config(root.path(), "/talks");
        for output in &[
            root.path().join("source"),
            root.path().to_owned(),
            root.path().join("source/../source"),
        ] {
            config.output_directory = output.clone();
            assert!(matches!(
                build_site(&config),
                Err(Error::UnsafeOutputDirectory { .. })
            ));
            assert!(root.path().join("source/talks/a.md").is_file());
        }
    }

    #[test]
    fn test_build_site_into_nested_output() -> Result<()> {
        let root = tempfile::tempdir()?;
        write(root.path(), "layout.html", "{{ .page.body }}");
        write(root.path(), "source/talks/a.md", "---\ntitle: A\n---\n");
        write(root.path(), "_site/stale.html", "old");

        build_site(&config(root.path(), "/talks"))?;
        assert!(root.path().join("_site/talks/a.html").is_file());
        assert!(root.path().join("source/talks/a.md").is_file());
        Ok(())
    }
}
