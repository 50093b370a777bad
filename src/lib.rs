use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tower_lsp::Client;

pub mod api;
pub mod buffer;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod matcher;
mod server;
mod util;

pub use buffer::{OpenDocument, SourceBuffer};
pub use config::{Settings, SettingsPatch};
pub use index::{FullNameIndex, IndexRepository};
pub use matcher::{CompletionCandidate, CompletionMatcher, Completions};

pub struct Backend {
    name: String,
    version: String,
    /// Maps a document URI to its latest synced content.
    open_files: Arc<RwLock<HashMap<String, OpenDocument>>>,
    workspace_root: Arc<RwLock<Option<PathBuf>>>,
    settings: Arc<RwLock<Settings>>,
    /// The loaded API index.  Replaced wholesale on reload so requests in
    /// flight keep the repository they started with.
    repository: Arc<RwLock<Arc<IndexRepository>>>,
    client: Option<Client>,
}

impl Backend {
    pub fn new(client: Client, settings: Settings) -> Self {
        Self::with_parts(Some(client), settings)
    }

    pub fn new_test() -> Self {
        Self::with_parts(None, Settings::default())
    }

    /// A client-less backend with the given settings.  The index is not
    /// loaded until `initialized` (or [`Backend::reload_index`]) runs.
    pub fn new_test_with_settings(settings: Settings) -> Self {
        Self::with_parts(None, settings)
    }

    fn with_parts(client: Option<Client>, settings: Settings) -> Self {
        Self {
            name: "QxCompleteLSP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_files: Arc::new(RwLock::new(HashMap::new())),
            workspace_root: Arc::new(RwLock::new(None)),
            settings: Arc::new(RwLock::new(settings)),
            repository: Arc::new(RwLock::new(Arc::new(IndexRepository::default()))),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.read().clone()
    }

    /// The currently loaded repository.
    pub fn repository(&self) -> Arc<IndexRepository> {
        Arc::clone(&self.repository.read())
    }

    /// Public helper for tests: the synced content of a document.
    pub fn get_document(&self, uri: &str) -> Option<OpenDocument> {
        self.open_files.read().get(uri).cloned()
    }

    /// Load a fresh repository from the current settings and swap it in.
    ///
    /// The new repository starts with an empty class-document cache.
    pub fn reload_index(&self) -> Arc<IndexRepository> {
        let settings = self.settings();
        let paths = settings.resolved_api_paths(self.workspace_root().as_deref());
        let repository = Arc::new(IndexRepository::load(paths, settings.autocomplete_debug));
        *self.repository.write() = Arc::clone(&repository);
        repository
    }
}
