use gallery_ref::{ContentHash, ProjectId, VersionChainKey};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error as ThisError;

mod import;
pub mod store;
pub mod validate;
pub use import::{load_export, merge_sorted, ImportStats, Outcome};
pub use store::{Registration, Settings, Submission, SubmissionType, VoteCategory, Votes};
pub use validate::Rejection;

/// The submissions database, in the shape the live bot loads.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Database {
    #[serde(default)]
    pub submissions: BTreeMap<String, Submission>,
    #[serde(default)]
    pub user_projects: BTreeMap<String, Vec<ProjectId>>,
    #[serde(default)]
    pub file_hashes: BTreeMap<ContentHash, Registration>,
    #[serde(default)]
    pub link_registry: BTreeMap<String, Registration>,
    #[serde(default)]
    pub sticky_messages: BTreeMap<String, Value>,
    #[serde(default)]
    pub project_versions: BTreeMap<VersionChainKey, Vec<String>>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Failed to open file {path}, cause: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write file {path}, cause: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Json error, cause: {0}")]
    Json(#[from] serde_json::Error),
}

impl Database {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        let db: Database = serde_json::from_reader(BufReader::new(file))?;
        info!(
            "loaded {} submissions from {}",
            db.submissions.len(),
            path.display()
        );
        Ok(db)
    }

    /// Writes the whole database to a temp file next to `path` and renames it
    /// into place. On failure the temp file is removed and `path` is untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<(), Error> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let write_error = |source: io::Error| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            if pretty {
                serde_json::to_writer_pretty(&mut writer, self)?;
            } else {
                serde_json::to_writer(&mut writer, self)?;
            }
            writer.write_all(b"\n").map_err(write_error)?;
            writer.flush().map_err(write_error)?;
        }

        tmp.persist(path).map_err(|err| write_error(err.error))?;
        info!(
            "saved {} submissions to {}",
            self.submissions.len(),
            path.display()
        );
        Ok(())
    }

    // queries

    pub fn get_submission(&self, message_id: &str) -> Option<&Submission> {
        self.submissions.get(message_id)
    }

    /// All submissions of one project, oldest first.
    pub fn submissions_by_project(&self, project_id: &ProjectId) -> Vec<&Submission> {
        let mut submissions: Vec<&Submission> = self
            .submissions
            .values()
            .filter(|submission| &submission.project_id == project_id)
            .collect();
        submissions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        submissions
    }

    /// The submissions of a version chain, in the order they joined it.
    pub fn version_history(&self, key: &VersionChainKey) -> Vec<&Submission> {
        self.project_versions
            .get(key)
            .map(|chain| {
                chain
                    .iter()
                    .filter_map(|message_id| self.submissions.get(message_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn projects_of(&self, author_id: &str) -> &[ProjectId] {
        self.user_projects
            .get(author_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_empty_database_shape() {
        let value = serde_json::to_value(Database::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "submissions": {},
                "user_projects": {},
                "file_hashes": {},
                "link_registry": {},
                "sticky_messages": {},
                "project_versions": {},
                "settings": { "sticky_enabled": true, "last_spotlight_week": null }
            })
        );
    }

    #[test]
    fn test_settings_keep_unknown_keys() {
        let value = json!({
            "settings": {
                "sticky_enabled": false,
                "last_spotlight_week": "2024-W10",
                "spotlight_channel": "123"
            }
        });
        let db: Database = serde_json::from_value(value).unwrap();
        assert!(!db.settings.sticky_enabled);
        assert_eq!(db.settings.last_spotlight_week, Some(json!("2024-W10")));
        assert_eq!(
            serde_json::to_value(&db.settings).unwrap()["spotlight_channel"],
            json!("123")
        );
    }

    #[test]
    fn test_new_uses_settings() {
        let db = Database::new(Settings {
            sticky_enabled: false,
            ..Settings::default()
        });
        assert!(!db.settings.sticky_enabled);
        assert!(db.submissions.is_empty());
    }

    #[test]
    fn test_failed_save_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("submissions_db.json");
        fs::create_dir(&output).unwrap();

        let err = Database::default().save(&output, false).unwrap_err();
        assert!(matches!(err, Error::WriteFile { .. }));

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("submissions_db.json")]);
        assert!(output.is_dir());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Database::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::OpenFile { .. }));
    }
}
