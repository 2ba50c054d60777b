//! Test fixtures: small Blink and WebKit IDL trees.
//!
//! Fixture paths contain "tests", which the default exclusion pattern
//! rejects, so integration tests stage a copy under a temp directory laid
//! out like a real source checkout.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path to a fixture tree (`blink` or `webkit`)
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Copy fixture tree `name` to `<tmp>/<dest>` and return both.
pub fn stage(name: &str, dest: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path().join(dest);
    copy_tree(&fixture_path(name), &root).expect("Failed to copy fixture tree");
    (dir, root)
}

/// Blink fixtures at `<tmp>/third_party/WebKit/Source`.
pub fn stage_blink() -> (TempDir, PathBuf) {
    stage("blink", "third_party/WebKit/Source")
}

/// WebKit fixtures at `<tmp>/Source/WebCore`, the path that selects the
/// legacy dialect.
pub fn stage_webkit() -> (TempDir, PathBuf) {
    stage("webkit", "Source/WebCore")
}

/// Config for WebKit runs that strips `#` lines with sed instead of gcc.
pub const SED_PREPROCESS_CONFIG: &str = r#"
[preprocess]
command = ["sed", "/^#/d"]
"#;

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
