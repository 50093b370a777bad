//! API index repository.
//!
//! Owns the two kinds of API metadata the completion matcher consults:
//!
//! - the **full-name index**: every fully-qualified class name listed in
//!   the `apiindex.json` file of each configured search path, merged in
//!   path order with duplicates dropped;
//! - the **class documents**: per-class `<ClassName>.json` trees, loaded
//!   lazily on first request and cached for the life of the repository.
//!
//! Every lookup is best-effort.  A missing or malformed file means "no data
//! for this source", never an error surfaced to the caller.
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::Deserialize;

use crate::api::ApiNode;
use crate::error::IndexError;

/// Name of the index file expected in each search path.
pub const INDEX_FILE_NAME: &str = "apiindex.json";

/// On-disk shape of `apiindex.json`.  Other keys the generator writes
/// (such as `__index__`) are ignored.
#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(rename = "__fullNames__")]
    full_names: Vec<String>,
}

/// Ordered, duplicate-free list of fully-qualified class names.
#[derive(Debug, Clone, Default)]
pub struct FullNameIndex {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl FullNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless it is already present.  Returns `true` when
    /// the name was new.
    pub fn insert(&mut self, name: String) -> bool {
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FullNameIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = FullNameIndex::new();
        for name in iter {
            index.insert(name.into());
        }
        index
    }
}

/// Read the `__fullNames__` list from one `apiindex.json` file.
pub fn read_index_file(path: &Path) -> Result<Vec<String>, IndexError> {
    let content = read_file(path)?;
    let index: IndexFile = serde_json::from_str(&content).map_err(|source| IndexError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(index.full_names)
}

/// Read and parse one `<ClassName>.json` class document.
pub fn read_class_file(path: &Path) -> Result<ApiNode, IndexError> {
    let content = read_file(path)?;
    let parse_error = |source: serde_json::Error| IndexError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // Derived `Deserialize` would also accept a JSON array for a struct.
    let value: serde_json::Value = serde_json::from_str(&content).map_err(parse_error)?;
    if !value.is_object() {
        return Err(parse_error(serde::de::Error::custom(
            "class document root must be an object",
        )));
    }
    serde_json::from_value(value).map_err(parse_error)
}

fn read_file(path: &Path) -> Result<String, IndexError> {
    if !path.is_file() {
        return Err(IndexError::Missing {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge the `apiindex.json` files of all search paths into one index.
///
/// Paths are visited in the order given and names keep the order in which
/// they were first seen.  A path without an index file is skipped; a broken
/// index file is logged and skipped while the remaining paths still load.
pub fn load_full_name_index(search_paths: &[PathBuf], debug: bool) -> FullNameIndex {
    let mut index = FullNameIndex::new();

    for dir in search_paths {
        let path = dir.join(INDEX_FILE_NAME);
        match read_index_file(&path) {
            Ok(names) => {
                if debug {
                    tracing::debug!("Collecting API data from file system path {}", path.display());
                }
                for name in names {
                    index.insert(name);
                }
            }
            Err(e) if e.is_missing() => {
                if debug {
                    tracing::debug!("Couldn't load API data: {e}");
                }
            }
            Err(e) => {
                tracing::debug!("Skipping API index: {e}");
            }
        }
    }

    index
}

/// Loaded API metadata for one set of search paths.
///
/// The full-name index is immutable once built; to pick up new files a
/// fresh repository is loaded.  Class documents are cached on first
/// successful load and never evicted.  Failed loads are not cached, so a
/// class file that appears later is found on the next request.
#[derive(Debug)]
pub struct IndexRepository {
    search_paths: Vec<PathBuf>,
    full_names: FullNameIndex,
    class_docs: Mutex<HashMap<String, Arc<ApiNode>>>,
    /// Number of class-file existence checks performed against the file
    /// system.  Cache hits do not touch it.
    fs_probes: AtomicUsize,
    debug: bool,
}

impl Default for IndexRepository {
    fn default() -> Self {
        Self::with_index(Vec::new(), FullNameIndex::new(), false)
    }
}

impl IndexRepository {
    /// Load the full-name index from `search_paths` and return a repository
    /// that resolves class documents against the same paths.
    pub fn load(search_paths: Vec<PathBuf>, debug: bool) -> Self {
        let full_names = load_full_name_index(&search_paths, debug);
        Self::with_index(search_paths, full_names, debug)
    }

    /// Build a repository around an already-assembled full-name index.
    pub fn with_index(search_paths: Vec<PathBuf>, full_names: FullNameIndex, debug: bool) -> Self {
        Self {
            search_paths,
            full_names,
            class_docs: Mutex::new(HashMap::new()),
            fs_probes: AtomicUsize::new(0),
            debug,
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn full_names(&self) -> &FullNameIndex {
        &self.full_names
    }

    /// Whether verbose per-lookup diagnostics are enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Get the API document for `class_name`, loading it on first use.
    ///
    /// Probes each search path for `<class_name>.json`; the first path
    /// where the file exists wins.  When no path has the file, or the file
    /// cannot be parsed, an empty document is returned and nothing is
    /// cached.
    pub fn class_document(&self, class_name: &str) -> Arc<ApiNode> {
        let mut docs = self.class_docs.lock();
        if let Some(doc) = docs.get(class_name) {
            return Arc::clone(doc);
        }

        let file_name = format!("{class_name}.json");
        for dir in &self.search_paths {
            let path = dir.join(&file_name);
            self.fs_probes.fetch_add(1, Ordering::Relaxed);
            if !path.is_file() {
                continue;
            }

            return match read_class_file(&path) {
                Ok(doc) => {
                    let doc = Arc::new(doc);
                    docs.insert(class_name.to_string(), Arc::clone(&doc));
                    doc
                }
                Err(e) => {
                    tracing::debug!("Couldn't load class API for {class_name}: {e}");
                    Arc::new(ApiNode::default())
                }
            };
        }

        if self.debug {
            tracing::debug!("Couldn't load class API for {class_name}");
        }
        Arc::new(ApiNode::default())
    }

    /// Number of class documents currently cached.
    pub fn cached_class_count(&self) -> usize {
        self.class_docs.lock().len()
    }

    /// Total class-file probes made so far.  Used by tests to observe
    /// cache hits.
    pub fn fs_probe_count(&self) -> usize {
        self.fs_probes.load(Ordering::Relaxed)
    }
}
