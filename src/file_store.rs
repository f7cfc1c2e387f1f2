// Named JSON blob store. A fixed set of blobs lives as pretty-printed
// .json files under the config directory; a missing or corrupt file
// reads as an empty object.

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Blob names the agent persists.
pub const FILES: [&str; 5] = ["dependency", "pull", "sse", "state", "stats"];

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn is_known(name: &str) -> bool {
        FILES.contains(&name)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn read(&self, name: &str) -> anyhow::Result<serde_json::Value> {
        let path = self.path(name);
        if !Path::new(&path).exists() {
            return Ok(serde_json::json!({}));
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|_| serde_json::json!({})))
    }

    pub fn write(&self, name: &str, contents: &serde_json::Value) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(name);
        let pretty = serde_json::to_string_pretty(contents)?;
        std::fs::write(&path, pretty).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        assert_eq!(store.read("state").expect("read"), serde_json::json!({}));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        let value = serde_json::json!({ "paused": true, "count": 3 });
        store.write("pull", &value).expect("write");
        assert_eq!(store.read("pull").expect("read"), value);
    }

    #[test]
    fn corrupt_file_reads_as_empty_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("stats.json"), "{not json").expect("write");
        let store = FileStore::new(dir.path());
        assert_eq!(store.read("stats").expect("read"), serde_json::json!({}));
    }

    #[test]
    fn known_names() {
        assert!(FileStore::is_known("dependency"));
        assert!(!FileStore::is_known("other"));
    }
}
