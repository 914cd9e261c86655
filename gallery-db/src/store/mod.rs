use gallery_ref::{ContentHash, ProjectId, Version};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

mod file_hashes;
mod link_registry;
mod project_versions;
mod submissions;
mod user_projects;
mod votes;
pub(crate) use self::file_hashes::insert_file_hashes;
pub(crate) use self::link_registry::insert_links;
pub(crate) use self::project_versions::resolve_version;
pub(crate) use self::submissions::insert_submission;
pub(crate) use self::user_projects::insert_user_project;
pub use self::votes::{aggregate_reactions, category_for, Tally, VoteCategory, Votes};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Project,
    Artwork,
}

impl SubmissionType {
    /// Picks the pipeline from the source channel's name.
    pub fn from_channel_name(name: &str) -> Option<Self> {
        if name.contains("project") {
            Some(SubmissionType::Project)
        } else if name.contains("artwork") {
            Some(SubmissionType::Artwork)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Submission {
    pub project_id: ProjectId,
    pub message_id: String,
    pub author_id: String,
    pub submission_type: SubmissionType,
    pub version: Version,
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_links: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub content_hashes: Vec<ContentHash>,
    pub votes: Votes,
    pub voters: BTreeMap<String, VoteCategory>,
    // thread activity is filled in by the live bot
    #[serde(default)]
    pub thread_message_count: u64,
    #[serde(default)]
    pub thread_participants: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_voted_at: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub channel_id: Option<String>,
    #[serde(default)]
    pub linked_submissions: Vec<String>,
}

/// Who registered a file hash or link: `[author_id, message_id, project_id]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "(String, String, ProjectId)", into = "(String, String, ProjectId)")]
pub struct Registration {
    pub author_id: String,
    pub message_id: String,
    pub project_id: ProjectId,
}

impl From<(String, String, ProjectId)> for Registration {
    fn from((author_id, message_id, project_id): (String, String, ProjectId)) -> Self {
        Self {
            author_id,
            message_id,
            project_id,
        }
    }
}

impl From<Registration> for (String, String, ProjectId) {
    fn from(value: Registration) -> Self {
        (value.author_id, value.message_id, value.project_id)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub sticky_enabled: bool,
    #[serde(default)]
    pub last_spotlight_week: Option<Value>,
    // anything else the live bot keeps here
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sticky_enabled: true,
            last_spotlight_week: None,
            extra: BTreeMap::new(),
        }
    }
}
