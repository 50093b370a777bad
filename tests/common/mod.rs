#![allow(dead_code)]

use qxcomplete_lsp::{Backend, Settings};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

pub fn create_test_backend() -> Backend {
    Backend::new_test()
}

/// A temporary API directory holding an `apiindex.json` and class
/// documents, as produced by the qooxdoo API generator.
pub struct ApiDir {
    dir: tempfile::TempDir,
}

impl ApiDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        ApiDir { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Write `apiindex.json` listing `names` under `__fullNames__`.
    pub fn write_index(&self, names: &[&str]) -> &Self {
        let index = json!({
            "__index__": {},
            "__fullNames__": names,
        });
        self.write_raw("apiindex.json", &index.to_string())
    }

    /// Write `<class_name>.json`.
    pub fn write_class(&self, class_name: &str, doc: &Value) -> &Self {
        self.write_raw(&format!("{class_name}.json"), &doc.to_string())
    }

    pub fn write_raw(&self, file_name: &str, content: &str) -> &Self {
        fs::write(self.dir.path().join(file_name), content).expect("failed to write API file");
        self
    }
}

fn params_node(params: &[&str]) -> Value {
    let children: Vec<Value> = params
        .iter()
        .map(|name| json!({ "type": "param", "attributes": { "name": name } }))
        .collect();
    json!({ "type": "params", "children": children })
}

fn method_node(name: &str, params: &[&str]) -> Value {
    json!({
        "type": "method",
        "attributes": { "name": name },
        "children": [params_node(params)],
    })
}

/// Build a class document with an optional constructor and the given
/// static methods.
pub fn class_doc(constructor: Option<&[&str]>, statics: &[(&str, &[&str])]) -> Value {
    let mut children = Vec::new();
    if let Some(params) = constructor {
        children.push(json!({
            "type": "constructor",
            "children": [method_node("ctor", params)],
        }));
    }
    if !statics.is_empty() {
        let methods: Vec<Value> = statics
            .iter()
            .map(|(name, params)| method_node(name, params))
            .collect();
        children.push(json!({ "type": "methods-static", "children": methods }));
    }
    json!({ "type": "class", "attributes": {}, "children": children })
}

/// A backend whose settings point at `dirs` with the index already loaded.
pub fn create_api_backend(dirs: &[&ApiDir]) -> Backend {
    let settings = Settings {
        autocomplete_api_paths: dirs.iter().map(|d| d.path_buf()).collect(),
        autocomplete_debug: false,
    };
    let backend = Backend::new_test_with_settings(settings);
    backend.reload_index();
    backend
}

pub async fn open_document(backend: &Backend, uri: &Url, language_id: &str, text: &str) {
    backend
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: language_id.to_string(),
                version: 1,
                text: text.to_string(),
            },
        })
        .await;
}

pub async fn completion_at(
    backend: &Backend,
    uri: &Url,
    line: u32,
    character: u32,
) -> Option<CompletionResponse> {
    backend
        .completion(CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position { line, character },
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
            context: None,
        })
        .await
        .unwrap()
}

/// Open a JavaScript file and request completion at the given position.
pub async fn complete_js(
    backend: &Backend,
    text: &str,
    line: u32,
    character: u32,
) -> Vec<CompletionItem> {
    let uri = Url::parse("file:///app/source/class/app/Application.js").unwrap();
    open_document(backend, &uri, "javascript", text).await;
    match completion_at(backend, &uri, line, character).await {
        Some(CompletionResponse::Array(items)) => items,
        Some(CompletionResponse::List(list)) => list.items,
        None => vec![],
    }
}
