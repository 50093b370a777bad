/// Helpers for the LSP layer: client logging and conversion of matcher
/// candidates into `CompletionItem`s.
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::buffer::editor_prefix;
use crate::matcher::{CandidateKind, CompletionCandidate, Completions, ReplaceRange, line_token};

impl Backend {
    pub(crate) async fn log(&self, typ: MessageType, message: String) {
        if let Some(client) = &self.client {
            client.log_message(typ, message).await;
        }
    }

    /// Convert matcher output into completion items.
    ///
    /// `line_before_cursor` is the same text the matcher saw; it fixes the
    /// ranges the insertion texts replace.  Items carry a `sort_text` so
    /// clients keep the matcher's order.
    pub(crate) fn build_completion_items(
        completions: &Completions,
        position: Position,
        line_before_cursor: &str,
    ) -> Vec<CompletionItem> {
        // LSP columns are UTF-16 code units.
        let cursor = line_before_cursor.encode_utf16().count() as u32;
        let prefix_len = editor_prefix(line_before_cursor).encode_utf16().count() as u32;
        let token_len = line_token(line_before_cursor).encode_utf16().count() as u32;

        completions
            .candidates
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let replaced = match candidate.replaces {
                    ReplaceRange::Prefix => prefix_len,
                    ReplaceRange::Token => token_len,
                };
                let range = Range {
                    start: Position {
                        line: position.line,
                        character: cursor - replaced,
                    },
                    end: Position {
                        line: position.line,
                        character: cursor,
                    },
                };
                build_item(candidate, range, i)
            })
            .collect()
    }
}

fn build_item(candidate: &CompletionCandidate, range: Range, index: usize) -> CompletionItem {
    let (kind, detail) = match candidate.kind {
        CandidateKind::StaticMethod => (CompletionItemKind::METHOD, "static method"),
        CandidateKind::Constructor => (CompletionItemKind::CLASS, "class (constructor)"),
        CandidateKind::Class => (CompletionItemKind::CLASS, "class"),
        CandidateKind::Namespace => (CompletionItemKind::MODULE, "namespace"),
    };

    // Clients filter on the text in the replaced range, so the filter text
    // has to start the way that range does.
    let filter_text = match candidate.replaces {
        ReplaceRange::Prefix => candidate.insertion_text.clone(),
        ReplaceRange::Token => candidate.label.clone(),
    };

    CompletionItem {
        label: candidate.label.clone(),
        kind: Some(kind),
        detail: Some(detail.to_string()),
        filter_text: Some(filter_text),
        sort_text: Some(format!("{index:05}")),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: candidate.insertion_text.clone(),
        })),
        ..CompletionItem::default()
    }
}
