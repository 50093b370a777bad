/// LSP server trait implementation.
///
/// This module contains the `impl LanguageServer for Backend` block,
/// which handles the LSP protocol messages (initialize, didOpen, didChange,
/// didClose, didChangeConfiguration, completion).
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::buffer::{OpenDocument, SourceBuffer, editor_prefix};
use crate::config::SettingsPatch;
use crate::matcher::CompletionMatcher;

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract and store the workspace root path
        #[allow(deprecated)]
        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok());

        if let Some(root) = workspace_root {
            *self.workspace_root.write() = Some(root);
        }

        if let Some(options) = params.initialization_options.as_ref() {
            match SettingsPatch::from_json(options) {
                Ok(patch) => self.settings.write().apply(patch),
                Err(e) => tracing::warn!("Ignoring initializationOptions: {e}"),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    ..CompletionOptions::default()
                }),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let repository = self.reload_index();
        let message = format!(
            "QxCompleteLSP initialized! Loaded {} class name(s) from {} API path(s)",
            repository.full_names().len(),
            repository.search_paths().len()
        );
        tracing::info!("{message}");
        self.log(MessageType::INFO, message).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let uri = doc.uri.to_string();

        self.open_files.write().insert(
            uri.clone(),
            OpenDocument::new(uri.clone(), doc.language_id, doc.text),
        );

        tracing::debug!("Opened file: {uri}");
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last()
            && let Some(doc) = self.open_files.write().get_mut(&uri)
        {
            doc.text = change.text;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.open_files.write().remove(&uri);
        tracing::debug!("Closed file: {uri}");
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let patch = match SettingsPatch::from_json(&params.settings) {
            Ok(patch) => patch,
            Err(e) => {
                self.log(MessageType::WARNING, format!("Ignoring settings change: {e}"))
                    .await;
                return;
            }
        };
        if patch.is_empty() {
            return;
        }

        self.settings.write().apply(patch);
        let repository = self.reload_index();
        self.log(
            MessageType::INFO,
            format!(
                "Settings changed; reloaded {} class name(s) from {} API path(s)",
                repository.full_names().len(),
                repository.search_paths().len()
            ),
        )
        .await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;

        let Some(doc) = self.get_document(&uri) else {
            return Ok(None);
        };
        let Some(line_before_cursor) = doc.line_text(position) else {
            return Ok(None);
        };

        let prefix = editor_prefix(line_before_cursor);
        let repository = self.repository();
        let completions =
            CompletionMatcher::new(&repository).query_completions(&doc, prefix, &[position]);

        // No candidates: leave the client's own word completion alone.
        if !completions.inhibit_defaults {
            return Ok(None);
        }

        let items = Self::build_completion_items(&completions, position, line_before_cursor);
        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }
}
