#![deny(missing_docs)]

//! # Feature Discovery
//!
//! Walks `<features>/<feature>/<endpoint>/` and yields every endpoint whose
//! directory holds both a contract file and a handler file. Names starting with
//! `_` or `.` disable a feature or endpoint.
//!
//! Discovery is lazy: the root is checked eagerly (an unreadable root is fatal),
//! feature and endpoint directories are listed as the iterator advances.
//! Calling [`FeatureDiscoverer::discover`] again rescans from scratch.

use crate::config::FrameworkConfig;
use crate::error::{AppError, AppResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// One discoverable endpoint: a contract file paired with a handler file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEndpoint {
    /// Feature directory name.
    pub feature: String,
    /// Endpoint directory name.
    pub endpoint: String,
    /// Location of the contract declaration.
    pub contract_path: PathBuf,
    /// Location of the handler source.
    pub handler_path: PathBuf,
}

impl FeatureEndpoint {
    /// `feature/endpoint`, used in logs and reports.
    pub fn id(&self) -> String {
        format!("{}/{}", self.feature, self.endpoint)
    }
}

/// Which half of an endpoint pair was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFile {
    /// No `<endpoint>.contract.*` file.
    Contract,
    /// No `<endpoint>.logic.*` file.
    Handler,
}

impl fmt::Display for MissingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingFile::Contract => write!(f, "contract"),
            MissingFile::Handler => write!(f, "handler"),
        }
    }
}

/// An endpoint directory holding only one of the two required files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteEndpoint {
    /// Feature directory name.
    pub feature: String,
    /// Endpoint directory name.
    pub endpoint: String,
    /// The file that was not found.
    pub missing: MissingFile,
}

impl fmt::Display for IncompleteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} has no {} file and is skipped",
            self.feature, self.endpoint, self.missing
        )
    }
}

/// Finds enabled feature endpoints under the configured features root.
pub struct FeatureDiscoverer<'a> {
    config: &'a FrameworkConfig,
}

impl<'a> FeatureDiscoverer<'a> {
    /// Creates a discoverer over `config.features_dir`.
    pub fn new(config: &'a FrameworkConfig) -> Self {
        Self { config }
    }

    /// Starts a fresh scan.
    ///
    /// Fails with [`AppError::Discovery`] when the root is missing, not a
    /// directory, or unreadable. Problems below the root only skip entries.
    pub fn discover(&self) -> AppResult<Endpoints<'a>> {
        let root = &self.config.features_dir;

        let meta = fs::metadata(root).map_err(|e| {
            AppError::Discovery(format!("Cannot access features root {:?}: {}", root, e))
        })?;
        if !meta.is_dir() {
            return Err(AppError::Discovery(format!(
                "Features root {:?} is not a directory",
                root
            )));
        }
        fs::read_dir(root).map_err(|e| {
            AppError::Discovery(format!("Cannot read features root {:?}: {}", root, e))
        })?;

        debug!(root = ?root, "scanning features");

        Ok(Endpoints {
            config: self.config,
            features: children(root),
            current: None,
            incomplete: Vec::new(),
        })
    }
}

struct FeatureCursor {
    name: String,
    endpoints: walkdir::IntoIter,
}

/// Lazy iterator over discovered endpoints, in file-name order.
pub struct Endpoints<'a> {
    config: &'a FrameworkConfig,
    features: walkdir::IntoIter,
    current: Option<FeatureCursor>,
    incomplete: Vec<IncompleteEndpoint>,
}

impl Endpoints<'_> {
    /// Endpoint directories seen so far that held only one of the two files.
    pub fn incomplete(&self) -> &[IncompleteEndpoint] {
        &self.incomplete
    }

    fn inspect_endpoint(
        &mut self,
        feature: &str,
        entry: walkdir::Result<DirEntry>,
    ) -> Option<FeatureEndpoint> {
        let (endpoint, dir) = enabled_dir(entry)?;

        let contract_path = self
            .config
            .contract_file_names(&endpoint)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        let handler_path = dir.join(self.config.handler_file_name(&endpoint));
        let has_handler = handler_path.is_file();

        let missing = match (contract_path, has_handler) {
            (Some(contract_path), true) => {
                return Some(FeatureEndpoint {
                    feature: feature.to_string(),
                    endpoint,
                    contract_path,
                    handler_path,
                });
            }
            (None, false) => {
                debug!(feature, endpoint = %endpoint, "directory holds no endpoint files");
                return None;
            }
            (None, true) => MissingFile::Contract,
            (Some(_), false) => MissingFile::Handler,
        };

        let incomplete = IncompleteEndpoint {
            feature: feature.to_string(),
            endpoint,
            missing,
        };
        warn!("{}", incomplete);
        self.incomplete.push(incomplete);
        None
    }
}

impl Iterator for Endpoints<'_> {
    type Item = FeatureEndpoint;

    fn next(&mut self) -> Option<FeatureEndpoint> {
        loop {
            if let Some(cursor) = self.current.as_mut() {
                match cursor.endpoints.next() {
                    Some(entry) => {
                        let feature = cursor.name.clone();
                        if let Some(found) = self.inspect_endpoint(&feature, entry) {
                            return Some(found);
                        }
                        continue;
                    }
                    None => self.current = None,
                }
            }

            let entry = self.features.next()?;
            if let Some((name, dir)) = enabled_dir(entry) {
                debug!(feature = %name, "entering feature");
                self.current = Some(FeatureCursor {
                    name,
                    endpoints: children(&dir),
                });
            }
        }
    }
}

/// Immediate children of `dir`, sorted by name.
fn children(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

/// Returns the name and path of an enabled directory entry.
fn enabled_dir(entry: walkdir::Result<DirEntry>) -> Option<(String, PathBuf)> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            debug!(error = %e, "skipping unreadable entry");
            return None;
        }
    };

    if !entry.file_type().is_dir() {
        return None;
    }

    let name = entry.file_name().to_str()?.to_string();
    if is_disabled(&name) {
        debug!(name = %name, "skipping disabled directory");
        return None;
    }

    Some((name, entry.into_path()))
}

/// Leading `_` or `.` marks a directory as disabled or hidden.
pub fn is_disabled(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}
