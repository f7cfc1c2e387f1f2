// Named log streams as flat .log files: append with a UTC timestamp
// prefix, read whole, delete one, or purge a whole group by prefix.

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};

pub struct LogStore {
    dir: PathBuf,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.log", name))
    }

    pub fn append(&self, name: &str, message: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let line = format!(
            "[{}] {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message
        );
        let path = self.path(name);
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Whole log contents; a missing log reads as an empty string.
    pub fn read(&self, name: &str) -> anyhow::Result<String> {
        let path = self.path(name);
        if !Path::new(&path).exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }

    pub fn delete(&self, name: &str) -> anyhow::Result<()> {
        let path = self.path(name);
        if Path::new(&path).exists() {
            std::fs::remove_file(&path).with_context(|| format!("deleting {}", path.display()))?;
        }
        Ok(())
    }

    /// Remove every log whose file name starts with the group prefix.
    /// Returns how many files were removed.
    pub fn purge_group(&self, group: &str) -> anyhow::Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with(group) && name.ends_with(".log") {
                std::fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_prefixes_timestamp_and_read_returns_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LogStore::new(dir.path());
        store.append("app", "first").expect("append");
        store.append("app", "second").expect("append");
        let contents = store.read("app").expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LogStore::new(dir.path());
        assert_eq!(store.read("nope").expect("read"), "");
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LogStore::new(dir.path());
        store.append("gone", "x").expect("append");
        store.delete("gone").expect("delete");
        store.delete("gone").expect("delete again");
        assert_eq!(store.read("gone").expect("read"), "");
    }

    #[test]
    fn purge_group_removes_matching_logs_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LogStore::new(dir.path());
        store.append("docker-pull", "a").expect("append");
        store.append("docker-update", "b").expect("append");
        store.append("app", "c").expect("append");
        let removed = store.purge_group("docker").expect("purge");
        assert_eq!(removed, 2);
        assert_eq!(store.read("app").expect("read").lines().count(), 1);
    }

    #[test]
    fn purge_group_on_missing_dir_is_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LogStore::new(dir.path().join("absent"));
        assert_eq!(store.purge_group("docker").expect("purge"), 0);
    }
}
