//! Path resolution for launcher arguments.
//!
//! Outside a test runner, path arguments are plain filesystem paths. Under a
//! test runner they are runfiles keys, resolved through the runfiles manifest
//! or directory the runner provides. A key that the runfiles do not know is a
//! different failure from a key that maps to a path that is not there.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ProcessError, ProcessResult};

/// Path of the runfiles manifest.
pub const RUNFILES_MANIFEST_FILE_VAR: &str = "RUNFILES_MANIFEST_FILE";

/// Path of the runfiles directory.
pub const RUNFILES_DIR_VAR: &str = "RUNFILES_DIR";

const REPO_MAPPING_KEY: &str = "_repo_mapping";

#[derive(Debug, Clone)]
enum Index {
    Manifest(HashMap<String, PathBuf>),
    Directory(PathBuf),
}

/// A runfiles tree, in manifest or directory form.
#[derive(Debug, Clone)]
pub struct Runfiles {
    index: Index,
    /// (source repo, apparent name) → canonical name.
    repo_mapping: HashMap<(String, String), String>,
}

impl Runfiles {
    /// Locates the runfiles of the current process.
    pub fn create() -> ProcessResult<Self> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            std::env::args_os().next().map(PathBuf::from),
        )
    }

    /// Locates runfiles from the given environment and program path.
    pub fn from_lookup<F>(lookup: F, argv0: Option<PathBuf>) -> ProcessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(manifest) = lookup(RUNFILES_MANIFEST_FILE_VAR).map(PathBuf::from) {
            if manifest.is_file() {
                return Self::from_manifest(&manifest);
            }
        }
        if let Some(dir) = lookup(RUNFILES_DIR_VAR).map(PathBuf::from) {
            if dir.is_dir() {
                return Self::from_directory(&dir);
            }
        }

        if let Some(argv0) = argv0 {
            let manifest = with_suffix(&argv0, ".runfiles_manifest");
            if manifest.is_file() {
                return Self::from_manifest(&manifest);
            }
            let dir = with_suffix(&argv0, ".runfiles");
            if dir.is_dir() {
                return Self::from_directory(&dir);
            }
        }

        Err(ProcessError::RunfilesUnavailable)
    }

    /// Loads a runfiles manifest: one `key path` entry per line.
    pub fn from_manifest(path: &Path) -> ProcessResult<Self> {
        let content = read_index(path)?;
        let entries: HashMap<String, PathBuf> = content
            .lines()
            .filter_map(parse_manifest_line)
            .collect();

        let repo_mapping = match entries.get(REPO_MAPPING_KEY) {
            Some(mapping) => parse_repo_mapping(&read_index(mapping)?),
            None => HashMap::new(),
        };

        Ok(Self {
            index: Index::Manifest(entries),
            repo_mapping,
        })
    }

    /// Uses a runfiles directory.
    pub fn from_directory(dir: &Path) -> ProcessResult<Self> {
        let mapping = dir.join(REPO_MAPPING_KEY);
        let repo_mapping = if mapping.is_file() {
            parse_repo_mapping(&read_index(&mapping)?)
        } else {
            HashMap::new()
        };

        Ok(Self {
            index: Index::Directory(dir.to_path_buf()),
            repo_mapping,
        })
    }

    /// Maps `key` to a path without checking that it exists.
    ///
    /// Returns `None` when a manifest has no entry for the key.
    pub fn rlocation(&self, key: &str, source_repo: Option<&str>) -> Option<PathBuf> {
        if Path::new(key).is_absolute() {
            return Some(PathBuf::from(key));
        }

        let key = self.apply_repo_mapping(key, source_repo.unwrap_or(""));
        match &self.index {
            Index::Directory(dir) => Some(dir.join(&key)),
            Index::Manifest(entries) => {
                if let Some(path) = entries.get(&key) {
                    return Some(path.clone());
                }
                // Directories are listed once; look up the longest listed parent.
                let mut prefix = key.as_str();
                while let Some((parent, _)) = prefix.rsplit_once('/') {
                    if let Some(path) = entries.get(parent) {
                        return Some(path.join(&key[parent.len() + 1..]));
                    }
                    prefix = parent;
                }
                None
            }
        }
    }

    /// Maps `key` to an existing path.
    pub fn resolve(&self, key: &str, source_repo: Option<&str>) -> ProcessResult<PathBuf> {
        let path = self
            .rlocation(key, source_repo)
            .ok_or_else(|| ProcessError::RunfileNotFound {
                key: key.to_string(),
            })?;
        if !path.exists() {
            return Err(ProcessError::RunfileMissing {
                key: key.to_string(),
                path,
            });
        }
        Ok(path)
    }

    fn apply_repo_mapping(&self, key: &str, source_repo: &str) -> String {
        let Some((apparent, rest)) = key.split_once('/') else {
            return key.to_string();
        };
        match self
            .repo_mapping
            .get(&(source_repo.to_string(), apparent.to_string()))
        {
            Some(canonical) => format!("{canonical}/{rest}"),
            None => key.to_string(),
        }
    }
}

/// Turns path arguments into existing paths.
#[derive(Debug, Clone)]
pub enum PathResolver {
    /// Arguments are filesystem paths.
    Direct,
    /// Arguments are runfiles keys.
    Runfiles {
        runfiles: Runfiles,
        source_repo: Option<String>,
    },
}

impl PathResolver {
    /// Resolves the value given to `flag`.
    pub fn resolve(&self, flag: &str, value: &str) -> ProcessResult<PathBuf> {
        match self {
            PathResolver::Direct => {
                let path = PathBuf::from(value);
                if !path.exists() {
                    return Err(ProcessError::path_not_found(flag, path));
                }
                Ok(path)
            }
            PathResolver::Runfiles {
                runfiles,
                source_repo,
            } => runfiles.resolve(value, source_repo.as_deref()),
        }
    }
}

/// Reads the test-mode launcher argv: one argument per line of a runfile.
pub fn load_test_args(
    runfiles: &Runfiles,
    key: &str,
    source_repo: Option<&str>,
) -> ProcessResult<Vec<String>> {
    let path = runfiles.resolve(key, source_repo)?;
    let content = std::fs::read_to_string(&path)
        .map_err(|source| ProcessError::TestArgsRead { path, source })?;
    Ok(content.lines().map(str::to_string).collect())
}

fn read_index(path: &Path) -> ProcessResult<String> {
    std::fs::read_to_string(path).map_err(|source| ProcessError::RunfilesRead {
        path: path.to_path_buf(),
        source,
    })
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

fn parse_manifest_line(line: &str) -> Option<(String, PathBuf)> {
    // A leading space marks an escaped entry.
    if let Some(escaped) = line.strip_prefix(' ') {
        let (key, path) = escaped.split_once(' ')?;
        return Some((unescape(key, true), PathBuf::from(unescape(path, false))));
    }
    let (key, path) = line.split_once(' ')?;
    Some((key.to_string(), PathBuf::from(path)))
}

fn unescape(value: &str, is_key: bool) -> String {
    let value = value.replace("\\n", "\n");
    let value = if is_key {
        value.replace("\\s", " ")
    } else {
        value
    };
    value.replace("\\b", "\\")
}

fn parse_repo_mapping(content: &str) -> HashMap<(String, String), String> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, ',');
            let source = fields.next()?;
            let apparent = fields.next()?;
            let canonical = fields.next()?;
            Some((
                (source.to_string(), apparent.to_string()),
                canonical.to_string(),
            ))
        })
        .collect()
}
