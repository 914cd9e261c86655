// Chat-export schema: one document per channel, messages in export order.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnError};
use std::io::Read;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Export {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub channel: Option<Channel>,
    pub messages: Vec<Msg>,
}

impl Export {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Tags every message with the channel it was exported from.
    pub fn tag(self, channel_name: &str) -> Vec<SourcedMsg> {
        let channel_id = self.channel.map(|channel| channel.id);
        self.messages
            .into_iter()
            .map(|msg| SourcedMsg {
                channel_name: channel_name.to_string(),
                channel_id: channel_id.clone(),
                msg,
            })
            .collect()
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Msg {
    #[serde(deserialize_with = "deserialize_message_id")]
    pub id: String,
    pub timestamp: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub content: String,
    pub author: Author,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, alias = "is_bot")]
    pub is_bot: bool,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, alias = "file_name", alias = "filename")]
    pub file_name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, alias = "content_type")]
    pub content_type: Option<String>,
}

impl Attachment {
    /// Image judged by extension alone, on the url (query stripped) or the filename.
    pub fn has_image_extension(&self) -> bool {
        has_image_extension(self.url.as_str()) || has_image_extension(self.file_name.as_str())
    }

    /// Image judged by extension or by declared content type.
    pub fn is_image(&self) -> bool {
        self.has_image_extension()
            || self
                .content_type
                .as_deref()
                .map_or(false, |content_type| content_type.contains("image"))
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reaction {
    pub emoji: Emoji,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub count: Option<u64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub users: Vec<User>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Emoji {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub code: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, alias = "is_bot")]
    pub is_bot: bool,
}

#[derive(Clone, Debug)]
pub struct SourcedMsg {
    pub channel_name: String,
    pub channel_id: Option<String>,
    pub msg: Msg,
}

/// Message ids key the database and end project ids, so they must be
/// present and free of `:`.
fn deserialize_message_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    if id.is_empty() || id.contains(':') {
        return Err(de::Error::custom(format!("invalid message id {:?}", id)));
    }
    Ok(id)
}

pub fn has_image_extension(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit_once('.') {
        Some((_, extension)) => IMAGE_EXTENSIONS
            .iter()
            .any(|image| extension.eq_ignore_ascii_case(image)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attachment(url: &str, file_name: &str, content_type: Option<&str>) -> Attachment {
        Attachment {
            url: url.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_export() {
        let value = json!({
            "guild": { "id": "1", "name": "jam" },
            "channel": { "id": "55", "name": "projects" },
            "messages": [{
                "id": "100",
                "type": "Default",
                "timestamp": "2023-04-01T10:00:00.000+00:00",
                "content": "# Hi",
                "author": { "id": "9", "name": "ana", "isBot": false },
                "attachments": [{ "id": "1", "url": "https://cdn/x.png", "fileName": "x.png", "fileSizeBytes": 10 }],
                "reactions": [{
                    "emoji": { "id": "", "name": "🔥", "code": "fire", "isAnimated": false },
                    "count": 2,
                    "users": [{ "id": "3", "name": "bo", "isBot": false }, { "id": "4", "name": "robo", "isBot": true }]
                }]
            }]
        });
        let export: Export = serde_json::from_value(value).unwrap();
        assert_eq!(export.channel.as_ref().unwrap().id, "55");
        let msg = &export.messages[0];
        assert_eq!(msg.author.id, "9");
        assert_eq!(msg.attachments[0].file_name, "x.png");
        assert_eq!(msg.reactions[0].emoji.code.as_deref(), Some("fire"));
        assert!(msg.reactions[0].users[1].is_bot);
    }

    #[test]
    fn test_lenient_fields() {
        let value = json!({
            "messages": [{
                "id": "100",
                "timestamp": "2023-04-01T10:00:00.000+00:00",
                "content": null,
                "author": { "id": "9", "is_bot": "nope" },
                "attachments": [{ "url": "https://cdn/x", "file_name": "x.bin", "content_type": "image/png" }]
            }]
        });
        let export: Export = serde_json::from_value(value).unwrap();
        let msg = &export.messages[0];
        assert_eq!(msg.content, "");
        assert!(!msg.author.is_bot);
        assert!(msg.reactions.is_empty());
        assert_eq!(msg.attachments[0].content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_missing_timestamp_is_an_error() {
        let value = json!({
            "messages": [{ "id": "100", "content": "hi", "author": { "id": "9" } }]
        });
        assert!(serde_json::from_value::<Export>(value).is_err());
    }

    #[test]
    fn test_bad_message_id_is_an_error() {
        for id in ["", "12:34"] {
            let value = json!({
                "messages": [{ "id": id, "timestamp": "a", "author": { "id": "9" } }]
            });
            assert!(serde_json::from_value::<Export>(value).is_err());
        }
    }

    #[test]
    fn test_tag() {
        let value = json!({
            "channel": { "id": "55" },
            "messages": [
                { "id": "1", "timestamp": "a", "author": { "id": "9" } },
                { "id": "2", "timestamp": "b", "author": { "id": "9" } }
            ]
        });
        let export: Export = serde_json::from_value(value).unwrap();
        let tagged = export.tag("artwork");
        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|sourced| sourced.channel_name == "artwork"));
        assert_eq!(tagged[1].channel_id.as_deref(), Some("55"));
    }

    #[test]
    fn test_image_extension() {
        assert!(has_image_extension("https://cdn/a/b/shot.PNG?ex=1&is=2"));
        assert!(has_image_extension("art.webp"));
        assert!(!has_image_extension("https://cdn/a/build.zip?x=y.png"));
        assert!(!has_image_extension("README"));
    }

    #[test]
    fn test_attachment_is_image() {
        assert!(attachment("https://cdn/x", "x.jpeg", None).has_image_extension());
        assert!(!attachment("https://cdn/x", "x", Some("image/png")).has_image_extension());
        assert!(attachment("https://cdn/x", "x", Some("image/png")).is_image());
        assert!(!attachment("https://cdn/x.mp4", "x.mp4", Some("video/mp4")).is_image());
    }
}
