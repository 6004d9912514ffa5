//! Loads the project configuration from a `podium.yaml` file.

use crate::talk::PrefixMatch;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

const PROJECT_FILE: &str = "podium.yaml";
const SOURCE_DIRECTORY: &str = "source";
const DEFAULT_OUTPUT_DIRECTORY: &str = "_site";

fn default_talks_prefix() -> String {
    String::from("/talks")
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default = "default_talks_prefix")]
    talks_prefix: String,

    #[serde(default)]
    prefix_matching: PrefixMatch,

    layout: Vec<PathBuf>,
}

/// The resolved configuration for building a site.
#[derive(Debug, Clone)]
pub struct Config {
    /// The absolute URL the site is served from. Page permalinks are
    /// resolved against it.
    pub site_root: Url,

    /// The directory containing the project file.
    pub project_root: PathBuf,

    /// The directory holding the page sources and static files.
    pub source_directory: PathBuf,

    /// The directory the site is written to. It is deleted and recreated on
    /// every build.
    pub output_directory: PathBuf,

    /// The layout template files, concatenated in order.
    pub layout: Vec<PathBuf>,

    /// The URL path prefix under which talk pages live.
    pub talks_prefix: String,

    pub prefix_matching: PrefixMatch,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for `podium.yaml` and
    /// loads the first one found. If `output_directory` is `None`, the site
    /// is written to `_site` next to the project file.
    pub fn from_directory(
        dir: &Path,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    /// Loads a [`Config`] from the project file at `path`. Relative paths in
    /// the file are resolved against the file's directory.
    pub fn from_project_file(
        path: &Path,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project =
            serde_yaml::from_reader(file).map_err(|err| Error::Deserialize {
                path: path.to_owned(),
                err,
            })?;

        let project_root = match path.parent() {
            Some(parent) => parent,
            None => return Err(Error::NoParentDirectory(path.to_owned())),
        };
        log::debug!("loaded project file `{}`", path.display());

        Ok(Config {
            site_root: project.site_root,
            project_root: project_root.to_owned(),
            source_directory: project_root.join(SOURCE_DIRECTORY),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(DEFAULT_OUTPUT_DIRECTORY),
            },
            layout: project
                .layout
                .iter()
                .map(|relpath| project_root.join(relpath))
                .collect(),
            talks_prefix: project.talks_prefix,
            prefix_matching: project.prefix_matching,
        })
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the project configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no ancestor directory contains a project file.
    ProjectFileNotFound,

    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    Deserialize { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the project file path has no parent directory.
    NoParentDirectory(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE
            ),
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Deserialize { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::NoParentDirectory(path) => write!(
                f,
                "Can't get parent directory for project file '{}'",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound => None,
            Error::Open { path: _, err } => Some(err),
            Error::Deserialize { path: _, err } => Some(err),
            Error::NoParentDirectory(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_directory_searches_ancestors() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join(PROJECT_FILE),
            "site_root: https://example.org/\nlayout: [theme/base.html, theme/page.html]\n",
        )
        .unwrap();
        let nested = root.path().join("source/talks");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested, None).unwrap();
        assert_eq!("https://example.org/", config.site_root.as_str());
        assert_eq!(root.path(), config.project_root);
        assert_eq!(root.path().join("source"), config.source_directory);
        assert_eq!(root.path().join("_site"), config.output_directory);
        assert_eq!(
            vec![
                root.path().join("theme/base.html"),
                root.path().join("theme/page.html")
            ],
            config.layout
        );
        assert_eq!("/talks", config.talks_prefix);
        assert_eq!(PrefixMatch::Segment, config.prefix_matching);
    }

    #[test]
    fn test_from_project_file_overrides() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(PROJECT_FILE);
        fs::write(
            &path,
            "site_root: https://example.org/\ntalks_prefix: /speaking\nprefix_matching: naive\nlayout: [layout.html]\n",
        )
        .unwrap();

        let config =
            Config::from_project_file(&path, Some(Path::new("/tmp/out"))).unwrap();
        assert_eq!("/speaking", config.talks_prefix);
        assert_eq!(PrefixMatch::Naive, config.prefix_matching);
        assert_eq!(PathBuf::from("/tmp/out"), config.output_directory);
    }

    #[test]
    fn test_from_project_file_invalid() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(PROJECT_FILE);
        fs::write(&path, "layout: [layout.html]\n").unwrap();
        assert!(matches!(
            Config::from_project_file(&path, None),
            Err(Error::Deserialize { .. })
        ));
    }
}
