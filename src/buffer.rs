//! Buffer access for the completion matcher.
//!
//! The matcher needs exactly two things from the editor: whether a
//! location is inside JavaScript source, and the text of the line at that
//! location.  [`SourceBuffer`] names those two capabilities;
//! [`OpenDocument`] implements them for documents synced over LSP.
use tower_lsp::lsp_types::Position;

/// LSP language ids treated as JavaScript source.
const SOURCE_LANGUAGE_IDS: &[&str] = &["javascript", "javascriptreact"];

/// File extensions treated as JavaScript source when the language id is
/// something else.
const SOURCE_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs"];

/// Editor-side view of a text buffer.
pub trait SourceBuffer {
    /// Whether `position` lies in the JavaScript source scope.
    fn in_source_scope(&self, position: Position) -> bool;

    /// Text of the line containing `position`, up to `position`.
    fn line_text(&self, position: Position) -> Option<&str>;
}

/// A text document opened by the client.
#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub uri: String,
    pub language_id: String,
    pub text: String,
}

impl OpenDocument {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            text: text.into(),
        }
    }

    /// Whether the whole document is JavaScript.
    pub fn is_javascript(&self) -> bool {
        if SOURCE_LANGUAGE_IDS.contains(&self.language_id.as_str()) {
            return true;
        }
        let path = self.uri.split(['?', '#']).next().unwrap_or(&self.uri);
        SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }
}

impl SourceBuffer for OpenDocument {
    fn in_source_scope(&self, position: Position) -> bool {
        self.is_javascript() && self.line_text(position).is_some()
    }

    fn line_text(&self, position: Position) -> Option<&str> {
        let line = self.text.split('\n').nth(position.line as usize)?;
        let line = line.strip_suffix('\r').unwrap_or(line);

        Some(&line[..utf16_to_byte_offset(line, position.character)])
    }
}

/// Byte offset of the UTF-16 column `character` in `line`.
///
/// A column past the end clamps to the line length; a column that falls
/// inside a surrogate pair stops before that character.
fn utf16_to_byte_offset(line: &str, character: u32) -> usize {
    let col = character as usize;
    let mut units = 0;
    for (idx, c) in line.char_indices() {
        units += c.len_utf16();
        if units > col {
            return idx;
        }
    }
    line.len()
}

/// The word the editor is about to replace: the identifier characters
/// (`[A-Za-z0-9_$]`) immediately before the end of `line_before_cursor`.
pub fn editor_prefix(line_before_cursor: &str) -> &str {
    let start = line_before_cursor
        .char_indices()
        .rev()
        .take_while(|&(_, c)| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(line_before_cursor.len());
    &line_before_cursor[start..]
}
