use base64::engine::{general_purpose::URL_SAFE_NO_PAD as b64url, Engine};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{convert::TryFrom, fmt, num::ParseIntError};
use thiserror::Error as ThisError;

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefError {
    #[error("Does not match as {ref_type}: {input}")]
    BadFormat {
        ref_type: &'static str,
        input: String,
    },
    #[error("Failed to parse version number: {0}")]
    ParseVersion(#[from] ParseIntError),
}

/// Length of the hex prefix kept from the title digest.
pub const TITLE_FINGERPRINT_LEN: usize = 8;

/// How many trailing characters of an author id go into a project id.
pub const AUTHOR_SUFFIX_LEN: usize = 6;

/// How many trailing characters of a message id go into an artwork id.
pub const MESSAGE_SUFFIX_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct TitleFingerprint(String);

impl TitleFingerprint {
    pub fn from_title(title: &str) -> Self {
        let normalized = Self::normalize(title);
        let digest = format!("{:x}", Sha256::digest(normalized.as_bytes()));
        Self(digest[..TITLE_FINGERPRINT_LEN].to_string())
    }

    /// Case-folds and trims a title, and drops trailing update markers like
    /// `(update)`, `(v2)` or `[fixed]` so resubmissions land on the same
    /// fingerprint. Other bracketed parts, e.g. `(1984)`, stay.
    pub fn normalize(title: &str) -> String {
        lazy_static! {
            static ref QUALIFIER_RE: Regex = Regex::new(
                r"\s*[(\[]\s*(updated?|updates|fixed|fix|patched|v\d+(\.\d+)*|version \d+(\.\d+)*)\s*[)\]]\s*$"
            )
            .unwrap();
            static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
        }

        let mut normalized = title.trim().to_lowercase();
        loop {
            let stripped = QUALIFIER_RE.replace(&normalized, "").into_owned();
            if stripped == normalized || stripped.trim().is_empty() {
                break;
            }
            normalized = stripped;
        }
        SPACE_RE.replace_all(normalized.trim(), " ").into_owned()
    }

    pub fn from_string(string: String) -> Result<Self, RefError> {
        if !Self::is_match(string.as_str()) {
            Err(RefError::BadFormat {
                ref_type: "TitleFingerprint",
                input: string,
            })
        } else {
            Ok(Self(string))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn single_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^[0-9a-f]{8}$").unwrap();
        }
        &*RE
    }

    pub fn is_match(string: &str) -> bool {
        Self::single_regex().is_match(string)
    }
}

impl fmt::Display for TitleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TitleFingerprint {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TitleFingerprint::from_string(value)
    }
}

impl From<TitleFingerprint> for String {
    fn from(value: TitleFingerprint) -> String {
        value.0
    }
}

/// Stand-in for a content address: the digest of an attachment URL, since
/// the bytes behind it are not available at import time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(Vec<u8>);

impl ContentHash {
    pub fn from_url(url: &str) -> Self {
        Self(Sha256::digest(url.as_bytes()).to_vec())
    }

    pub fn from_string(string: String) -> Result<Self, RefError> {
        if !Self::is_match(string.as_str()) {
            return Err(RefError::BadFormat {
                ref_type: "ContentHash",
                input: string,
            });
        }
        match b64url.decode(string.as_str()) {
            Ok(data) => Ok(Self(data)),
            Err(_) => Err(RefError::BadFormat {
                ref_type: "ContentHash",
                input: string,
            }),
        }
    }

    pub fn single_regex() -> &'static Regex {
        lazy_static! {
            // 32 bytes, unpadded url-safe base64
            static ref RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{43}$").unwrap();
        }
        &*RE
    }

    pub fn is_match(string: &str) -> bool {
        Self::single_regex().is_match(string)
    }

    pub fn urlsafe_data(&self) -> String {
        b64url.encode(&self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.urlsafe_data())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ContentHash::from_string(value)
    }
}

impl From<ContentHash> for String {
    fn from(value: ContentHash) -> String {
        value.urlsafe_data()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProjectId {
    Project {
        author_suffix: String,
        fingerprint: TitleFingerprint,
    },
    Artwork {
        author_suffix: String,
        message_suffix: String,
    },
}

impl ProjectId {
    pub fn for_project(author_id: &str, fingerprint: &TitleFingerprint) -> Self {
        ProjectId::Project {
            author_suffix: tail(author_id, AUTHOR_SUFFIX_LEN),
            fingerprint: fingerprint.clone(),
        }
    }

    /// Every artwork post is its own project, so the id leans on the message.
    pub fn for_artwork(author_id: &str, message_id: &str) -> Self {
        ProjectId::Artwork {
            author_suffix: tail(author_id, AUTHOR_SUFFIX_LEN),
            message_suffix: tail(message_id, MESSAGE_SUFFIX_LEN),
        }
    }

    /// Parses from the right: the fingerprint or message suffix never holds a
    /// `:`, while the author suffix may hold one or be empty.
    pub fn from_string(string: String) -> Result<Self, RefError> {
        if let Some((author_suffix, fingerprint)) = string
            .strip_prefix("project:")
            .and_then(|rest| rest.rsplit_once(':'))
        {
            if TitleFingerprint::is_match(fingerprint) {
                return Ok(ProjectId::Project {
                    author_suffix: author_suffix.to_string(),
                    fingerprint: TitleFingerprint(fingerprint.to_string()),
                });
            }
        } else if let Some((author_suffix, message_suffix)) = string
            .strip_prefix("artwork:")
            .and_then(|rest| rest.rsplit_once(':'))
        {
            return Ok(ProjectId::Artwork {
                author_suffix: author_suffix.to_string(),
                message_suffix: message_suffix.to_string(),
            });
        }
        Err(RefError::BadFormat {
            ref_type: "ProjectId",
            input: string,
        })
    }

    pub fn is_match(string: &str) -> bool {
        Self::from_string(string.to_string()).is_ok()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Project {
                author_suffix,
                fingerprint,
            } => write!(f, "project:{}:{}", author_suffix, fingerprint),
            ProjectId::Artwork {
                author_suffix,
                message_suffix,
            } => write!(f, "artwork:{}:{}", author_suffix, message_suffix),
        }
    }
}

impl TryFrom<String> for ProjectId {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ProjectId::from_string(value)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> String {
        value.to_string()
    }
}

/// Groups the submissions of one author under one normalized title.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionChainKey {
    pub author_id: String,
    pub fingerprint: TitleFingerprint,
}

impl VersionChainKey {
    pub fn new(author_id: &str, fingerprint: &TitleFingerprint) -> Self {
        Self {
            author_id: author_id.to_string(),
            fingerprint: fingerprint.clone(),
        }
    }

    pub fn from_string(string: String) -> Result<Self, RefError> {
        if let Some((author_id, fingerprint)) = string.rsplit_once(':') {
            if TitleFingerprint::is_match(fingerprint) {
                return Ok(Self {
                    author_id: author_id.to_string(),
                    fingerprint: TitleFingerprint(fingerprint.to_string()),
                });
            }
        }
        Err(RefError::BadFormat {
            ref_type: "VersionChainKey",
            input: string,
        })
    }
}

impl fmt::Display for VersionChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.author_id, self.fingerprint)
    }
}

impl TryFrom<String> for VersionChainKey {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VersionChainKey::from_string(value)
    }
}

impl From<VersionChainKey> for String {
    fn from(value: VersionChainKey) -> String {
        value.to_string()
    }
}

/// A major version, rendered as `"<major>.0"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(u32);

impl Version {
    pub const FIRST: Version = Version(1);

    pub fn new(major: u32) -> Self {
        Self(major)
    }

    pub fn major(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn from_string(string: String) -> Result<Self, RefError> {
        if !Self::single_regex().is_match(string.as_str()) {
            return Err(RefError::BadFormat {
                ref_type: "Version",
                input: string,
            });
        }
        let major = string.split('.').next().unwrap_or_default();
        Ok(Self(major.parse()?))
    }

    pub fn single_regex() -> &'static Regex {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^\d+(\.\d+)?$").unwrap();
        }
        &*RE
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::FIRST
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.0", self.0)
    }
}

impl TryFrom<String> for Version {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Version::from_string(value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> String {
        value.to_string()
    }
}

/// Matches http(s) urls inside free text. Brackets and quotes end a match so
/// markdown links like `[x](https://..)` yield just the url.
pub fn url_multi_regex() -> &'static Regex {
    lazy_static! {
        static ref RE: Regex = Regex::new(r#"https?://[^\s<>()\[\]"']+"#).unwrap();
    }
    &*RE
}

/// Last `n` characters of `string`, or all of it when shorter.
pub fn tail(string: &str, n: usize) -> String {
    let count = string.chars().count();
    string.chars().skip(count.saturating_sub(n)).collect()
}
