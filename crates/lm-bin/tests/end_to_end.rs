//! File-level round trip through the library crates: the same read → plan →
//! apply → write sequence the binary performs.

use core_config::LogConfig;
use core_detect::detect_all;
use core_edit::{apply_plan, delete_plan, insert_plan};
use core_source::{Document, Selection};

const ORIGINAL: &str = "function add(a, b) {\n  return a + b;\n}\n";

#[test]
fn file_round_trip_insert_detect_delete() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.js");
    std::fs::write(&path, ORIGINAL).unwrap();
    let cfg = LogConfig::default();

    // read, plan an insert for parameter `a`, write back
    let content = std::fs::read_to_string(&path).unwrap();
    let doc = Document::from_str("sample.js", &content).unwrap();
    let plan = insert_plan(&doc, &Selection::new(0, "a"), &cfg, 4).unwrap();
    let edited = apply_plan(&doc, &plan);
    std::fs::write(&path, edited.text()).unwrap();

    // a fresh read finds exactly the inserted statement, at the body start
    let reread =
        Document::from_str("sample.js", &std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        reread.line_text(1).unwrap(),
        "  console.log(\"🚀 ~ add ~ a:\", a);"
    );
    let found = detect_all(&reread, "console.log", "🚀", "~");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start_line(), 1);
    assert!(found[0].is_own_tag);

    // deleting our statements restores the original file byte-for-byte
    let cleaned = apply_plan(&reread, &delete_plan(&reread, &cfg, false));
    std::fs::write(&path, cleaned.text()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), ORIGINAL);
}
