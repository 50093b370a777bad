mod common;

use common::{ApiDir, class_doc};
use qxcomplete_lsp::IndexRepository;
use qxcomplete_lsp::index::load_full_name_index;
use std::io;
use std::sync::Arc;
use tracing::Level;

/// In-memory sink for formatted log output.
#[derive(Clone, Default)]
struct CapturedLog(Arc<parking_lot::Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber at `level` and return what it logged.
fn capture_logs(level: Level, f: impl FnOnce()) -> String {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    log.contents()
}

// ─── Full-name index loading ────────────────────────────────────────────────

#[test]
fn test_load_merges_paths_in_order_without_duplicates() {
    let framework = ApiDir::new();
    framework.write_index(&["qx.Class", "qx.ui.form.Button", "qx.ui.form"]);
    let app = ApiDir::new();
    app.write_index(&["app.Application", "qx.Class", "app.view.Main"]);

    let index = load_full_name_index(&[framework.path_buf(), app.path_buf()], false);
    assert_eq!(
        index.as_slice(),
        [
            "qx.Class",
            "qx.ui.form.Button",
            "qx.ui.form",
            "app.Application",
            "app.view.Main",
        ]
    );
}

#[test]
fn test_same_name_twice_in_one_file_kept_once() {
    let api = ApiDir::new();
    api.write_index(&["qx.Class", "qx.Class"]);

    let index = load_full_name_index(&[api.path_buf()], false);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_paths_without_index_are_skipped() {
    let empty = ApiDir::new();
    let api = ApiDir::new();
    api.write_index(&["qx.Class"]);

    let index = load_full_name_index(
        &[empty.path_buf(), api.path().join("does-not-exist"), api.path_buf()],
        true,
    );
    assert_eq!(index.as_slice(), ["qx.Class"]);
}

#[test]
fn test_no_valid_source_yields_empty_index() {
    let empty = ApiDir::new();
    let index = load_full_name_index(&[empty.path_buf()], false);
    assert!(index.is_empty());

    let index = load_full_name_index(&[], false);
    assert!(index.is_empty());
}

#[test]
fn test_broken_index_does_not_stop_other_paths() {
    let broken = ApiDir::new();
    broken.write_raw("apiindex.json", "{ \"__fullNames__\": [");
    let api = ApiDir::new();
    api.write_index(&["qx.Class"]);

    let repo = IndexRepository::load(vec![broken.path_buf(), api.path_buf()], false);
    assert_eq!(repo.full_names().as_slice(), ["qx.Class"]);
}

// ─── Class documents ────────────────────────────────────────────────────────

#[test]
fn test_class_document_is_cached_after_first_load() {
    let api = ApiDir::new();
    api.write_index(&["qx.ui.form.Button"]);
    api.write_class(
        "qx.ui.form.Button",
        &class_doc(Some(&["label", "icon"]), &[]),
    );
    let repo = IndexRepository::load(vec![api.path_buf()], false);

    let first = repo.class_document("qx.ui.form.Button");
    let probes_after_first = repo.fs_probe_count();
    assert_eq!(probes_after_first, 1);

    let second = repo.class_document("qx.ui.form.Button");
    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        repo.fs_probe_count(),
        probes_after_first,
        "second lookup should be served from the cache"
    );
    assert_eq!(repo.cached_class_count(), 1);
}

#[test]
fn test_missing_class_document_is_empty_and_not_cached() {
    let api = ApiDir::new();
    let other = ApiDir::new();
    let repo = IndexRepository::load(vec![api.path_buf(), other.path_buf()], true);

    let doc = repo.class_document("qx.Missing");
    assert!(doc.is_empty());
    assert_eq!(repo.fs_probe_count(), 2);
    assert_eq!(repo.cached_class_count(), 0);

    // Failures are re-probed: a file that appears later is picked up.
    repo.class_document("qx.Missing");
    assert_eq!(repo.fs_probe_count(), 4);

    other.write_class("qx.Missing", &class_doc(Some(&["a"]), &[]));
    let doc = repo.class_document("qx.Missing");
    assert!(!doc.is_empty());
    assert_eq!(repo.cached_class_count(), 1);
}

#[test]
fn test_first_path_with_class_file_wins() {
    let first = ApiDir::new();
    first.write_class("qx.Class", &class_doc(Some(&["fromFirst"]), &[]));
    let second = ApiDir::new();
    second.write_class("qx.Class", &class_doc(Some(&["fromSecond"]), &[]));

    let repo = IndexRepository::load(vec![first.path_buf(), second.path_buf()], false);
    let doc = repo.class_document("qx.Class");
    let ctor = doc.constructor().expect("constructor");
    assert_eq!(ctor.method_params(), vec!["fromFirst"]);
    assert_eq!(repo.fs_probe_count(), 1);
}

#[test]
fn test_unparseable_class_document_degrades_to_empty() {
    let broken = ApiDir::new();
    broken.write_raw("qx.Class.json", "not json at all");
    let fallback = ApiDir::new();
    fallback.write_class("qx.Class", &class_doc(Some(&["x"]), &[]));

    let repo = IndexRepository::load(vec![broken.path_buf(), fallback.path_buf()], false);

    // The first existing file decides; a broken one yields no data.
    let doc = repo.class_document("qx.Class");
    assert!(doc.is_empty());
    assert_eq!(repo.cached_class_count(), 0);
}

#[test]
fn test_static_methods_through_repository() {
    let api = ApiDir::new();
    api.write_class(
        "qx.Class",
        &class_doc(
            None,
            &[
                ("define", &["name", "config"]),
                ("__foo", &[]),
                ("isDefined", &["name"]),
            ],
        ),
    );
    let repo = IndexRepository::load(vec![api.path_buf()], false);

    let doc = repo.class_document("qx.Class");
    let statics: Vec<(String, Vec<String>)> = doc
        .static_methods()
        .into_iter()
        .map(|m| (m.name, m.params))
        .collect();
    assert_eq!(
        statics,
        vec![
            (
                "define".to_string(),
                vec!["name".to_string(), "config".to_string()]
            ),
            ("isDefined".to_string(), vec!["name".to_string()]),
        ]
    );
    assert!(doc.constructor().is_none());
}

// ─── Logging ────────────────────────────────────────────────────────────────

#[test]
fn test_parse_failures_stay_below_warn() {
    let broken = ApiDir::new();
    broken.write_raw("apiindex.json", "{ \"__fullNames__\": [");
    broken.write_raw("qx.Class.json", "not json at all");

    let load_and_lookup = || {
        let repo = IndexRepository::load(vec![broken.path_buf()], false);
        assert!(repo.full_names().is_empty());
        assert!(repo.class_document("qx.Class").is_empty());
    };

    let at_warn = capture_logs(Level::WARN, load_and_lookup);
    assert!(at_warn.is_empty(), "unexpected warn output: {at_warn}");

    let at_debug = capture_logs(Level::DEBUG, load_and_lookup);
    assert!(at_debug.contains("Skipping API index"), "{at_debug}");
    assert!(at_debug.contains("qx.Class"), "{at_debug}");
}
