//! Common test helpers and utilities shared across the test suite.

use marc2xml::{LexReader, Record, Result};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Path of a fixture under `tests/data`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Parse every record in an in-memory `.lex` source.
#[allow(dead_code)]
pub fn parse_lex(data: &str) -> Result<Vec<Record>> {
    LexReader::new(Cursor::new(data.as_bytes().to_vec())).collect()
}

/// Write `contents` to `name` inside `dir` and return the path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write test file");
    path
}
