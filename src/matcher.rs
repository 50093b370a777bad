//! Completion matching over the API index.
//!
//! Given the text before the cursor and the editor's prefix (the word the
//! editor will replace), the matcher walks every known full name and
//! applies two independent rules:
//!
//! - **exact class**: the token names a known class exactly, so offer the
//!   class's static methods whose name contains the prefix;
//! - **prefix**: the full name starts with the token, so offer the rest of
//!   the name, with constructor parameters when the match is a class one
//!   segment away.
//!
//! A name can satisfy both rules and then contributes a candidate for
//! each.  The final list is sorted by label, then insertion text.
use std::sync::LazyLock;

use regex::Regex;
use tower_lsp::lsp_types::Position;

use crate::api::ApiNode;
use crate::buffer::SourceBuffer;
use crate::index::IndexRepository;

/// Leading run of the token up to the first uppercase letter and the
/// word characters that follow it: `qx.ui.form.Button.foo` yields
/// `qx.ui.form.Button`.
static QUERY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?[A-Z][A-Za-z0-9_]*").expect("query class pattern is valid")
});

/// What a candidate completes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// `Class.method(params)` from the exact-class rule.
    StaticMethod,
    /// A class name with its constructor parameter list appended.
    Constructor,
    /// A class name inserted without parameters (no constructor found, or
    /// the class is deeper than the next segment).
    Class,
    /// A namespace / package segment.
    Namespace,
}

/// Which part of the line the insertion text replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceRange {
    /// Only the editor prefix (the word being typed).
    Prefix,
    /// The whole line token: the insertion text is fully qualified.
    Token,
}

/// One completion proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    /// Text shown in the completion menu.
    pub label: String,
    /// Text inserted when the candidate is accepted.
    pub insertion_text: String,
    pub kind: CandidateKind,
    pub replaces: ReplaceRange,
}

/// Result of one completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completions {
    /// Candidates sorted by label, ties broken by insertion text.
    pub candidates: Vec<CompletionCandidate>,
    /// Set whenever there are candidates: the editor should hide its own
    /// word-based suggestions so only these are shown.
    pub inhibit_defaults: bool,
}

impl Completions {
    fn from_candidates(mut candidates: Vec<CompletionCandidate>) -> Self {
        candidates.sort_by(|a, b| {
            a.label
                .cmp(&b.label)
                .then_with(|| a.insertion_text.cmp(&b.insertion_text))
        });
        let inhibit_defaults = !candidates.is_empty();
        Self {
            candidates,
            inhibit_defaults,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// `(label, insertion_text)` pairs, mostly for assertions.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.candidates
            .iter()
            .map(|c| (c.label.as_str(), c.insertion_text.as_str()))
            .collect()
    }
}

/// The last whitespace-separated token of `line`.
///
/// Only ASCII whitespace separates tokens.  A line ending in whitespace
/// yields an empty token.
pub fn line_token(line: &str) -> &str {
    line.rsplit(is_token_separator).next().unwrap_or("")
}

/// Space, tab, line feed, carriage return, form feed and vertical tab.
fn is_token_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c' | '\x0b')
}

/// The class reference embedded at the start of a line token, if any.
///
/// ```
/// use qxcomplete_lsp::matcher::query_class;
///
/// assert_eq!(query_class("qx.ui.form.Button.foo"), Some("qx.ui.form.Button"));
/// assert_eq!(query_class("qx.ui.form"), None);
/// ```
pub fn query_class(token: &str) -> Option<&str> {
    QUERY_CLASS.find(token).map(|m| m.as_str())
}

/// Whether a name segment looks like a class (leading ASCII uppercase).
pub fn is_class_segment(segment: &str) -> bool {
    segment.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Whether the final segment of a dotted full name is a class.
pub fn is_class_name(full_name: &str) -> bool {
    is_class_segment(full_name.rsplit('.').next().unwrap_or(full_name))
}

fn with_params(name: &str, params: &[String]) -> String {
    format!("{}({})", name, params.join(", "))
}

/// Produces completion candidates from an [`IndexRepository`].
pub struct CompletionMatcher<'a> {
    repository: &'a IndexRepository,
}

impl<'a> CompletionMatcher<'a> {
    pub fn new(repository: &'a IndexRepository) -> Self {
        Self { repository }
    }

    /// Answer a completion request from the host.
    ///
    /// Only the first location is considered.  Locations outside the
    /// JavaScript source scope produce nothing.
    pub fn query_completions<B: SourceBuffer + ?Sized>(
        &self,
        buffer: &B,
        prefix: &str,
        locations: &[Position],
    ) -> Completions {
        let Some(&location) = locations.first() else {
            return Completions::default();
        };
        if !buffer.in_source_scope(location) {
            return Completions::default();
        }
        let Some(line) = buffer.line_text(location) else {
            return Completions::default();
        };
        self.complete_line(line, prefix)
    }

    /// Match the text before the cursor against every known full name.
    pub fn complete_line(&self, line: &str, prefix: &str) -> Completions {
        let line_text = line_token(line);
        let queried = query_class(line_text);

        let mut candidates = Vec::new();
        for class_name in self.repository.full_names().iter() {
            if queried == Some(class_name) {
                self.push_static_methods(class_name, prefix, &mut candidates);
            }
            if class_name.starts_with(line_text) {
                candidates.push(self.prefix_candidate(class_name, line_text, prefix));
            }
        }

        Completions::from_candidates(candidates)
    }

    /// Exact-class rule: static methods whose name contains `prefix`.
    fn push_static_methods(
        &self,
        class_name: &str,
        prefix: &str,
        candidates: &mut Vec<CompletionCandidate>,
    ) {
        let doc = self.repository.class_document(class_name);
        for method in doc.static_methods() {
            if !method.name.contains(prefix) {
                continue;
            }
            let label = format!("{}.{}", class_name, method.name);
            let insertion_text = with_params(&label, &method.params);
            candidates.push(CompletionCandidate {
                label,
                insertion_text,
                kind: CandidateKind::StaticMethod,
                replaces: ReplaceRange::Token,
            });
        }
    }

    /// Prefix rule: complete the remainder of `class_name` after
    /// `line_text`.
    fn prefix_candidate(
        &self,
        class_name: &str,
        line_text: &str,
        prefix: &str,
    ) -> CompletionCandidate {
        let is_class = is_class_name(class_name);
        let query_depth = line_text.split('.').count();
        let match_depth = class_name.split('.').count();

        // Only a class at most one segment past the token gets its
        // constructor looked up.
        let mut ctor_params = None;
        if is_class && query_depth + 1 >= match_depth {
            let doc = self.repository.class_document(class_name);
            ctor_params = doc.constructor().map(ApiNode::method_params);
        }

        let mut completion = format!("{}{}", prefix, &class_name[line_text.len()..]);
        let mut replaces = ReplaceRange::Prefix;
        // Without a dot the editor swaps out the whole token, so the
        // insertion has to carry the full name.
        if !completion.contains('.') {
            completion = class_name.to_string();
            replaces = ReplaceRange::Token;
        }

        let kind = match ctor_params {
            Some(params) => {
                completion = with_params(&completion, &params);
                CandidateKind::Constructor
            }
            None if is_class => CandidateKind::Class,
            None => CandidateKind::Namespace,
        };

        if self.repository.debug() {
            tracing::debug!(
                prefix,
                line_text,
                class_name,
                completion = completion.as_str(),
                "prefix completion"
            );
        }

        CompletionCandidate {
            label: class_name.to_string(),
            insertion_text: completion,
            kind,
            replaces,
        }
    }
}
