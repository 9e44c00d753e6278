use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blockport::partial_import::Fragment;
use serde::de::DeserializeOwned;

pub fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

pub fn load_fixture(relative_path: &str) -> io::Result<Vec<u8>> {
    fs::read(fixtures_root().join(relative_path))
}

pub fn load_fixture_json<T: DeserializeOwned>(relative_path: &str) -> io::Result<T> {
    let bytes = load_fixture(relative_path)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Building block shipped under `fixtures/blocks/<name>.json`.
pub fn load_block(name: &str) -> io::Result<Fragment> {
    load_fixture_json(&format!("blocks/{}.json", name))
}
