use gallery_msg::Attachment;
use thiserror::Error as ThisError;

/// Why a post was not accepted as a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum Rejection {
    #[error("post has no content")]
    EmptyContent,
    #[error("post has no # heading for a title")]
    MissingTitle,
    #[error("post has no - bullet lines for a description")]
    MissingDescription,
    #[error("project post has only images and no links")]
    ImageOnly,
    #[error("project post has no links or attachments")]
    NoMedia,
    #[error("artwork post has no image attachment")]
    NoImage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPost {
    pub title: String,
    pub description: String,
    /// Links found in the text, then attachment urls.
    pub media_links: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtworkPost {
    pub thumbnail_url: String,
}

pub fn validate_project_post(
    content: &str,
    attachments: &[Attachment],
) -> Result<ProjectPost, Rejection> {
    if content.trim().is_empty() {
        return Err(Rejection::EmptyContent);
    }

    let parts = gallery_markdown::parse(content);
    let title = parts.title.ok_or(Rejection::MissingTitle)?;
    let description = parts.description.ok_or(Rejection::MissingDescription)?;

    let links = parts.links;
    if links.is_empty()
        && !attachments.is_empty()
        && attachments.iter().all(Attachment::has_image_extension)
    {
        return Err(Rejection::ImageOnly);
    }
    if links.is_empty() && attachments.is_empty() {
        return Err(Rejection::NoMedia);
    }

    let mut media_links = links;
    media_links.extend(attachments.iter().map(|attachment| attachment.url.clone()));

    Ok(ProjectPost {
        title,
        description,
        media_links,
    })
}

pub fn validate_artwork_post(attachments: &[Attachment]) -> Result<ArtworkPost, Rejection> {
    attachments
        .iter()
        .find(|attachment| attachment.is_image())
        .map(|attachment| ArtworkPost {
            thumbnail_url: attachment.url.clone(),
        })
        .ok_or(Rejection::NoImage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(url: &str, file_name: &str) -> Attachment {
        Attachment {
            url: url.to_string(),
            file_name: file_name.to_string(),
            content_type: None,
        }
    }

    const POST: &str = "# My Game\n- cool platformer\n- made in 2 weeks";

    #[test]
    fn test_project_rules_in_order() {
        let zip = vec![attachment("https://cdn/game.zip", "game.zip")];
        assert_eq!(validate_project_post("  ", &zip), Err(Rejection::EmptyContent));
        assert_eq!(
            validate_project_post("- just bullets", &zip),
            Err(Rejection::MissingTitle)
        );
        assert_eq!(
            validate_project_post("# Title only", &zip),
            Err(Rejection::MissingDescription)
        );
        assert_eq!(validate_project_post(POST, &[]), Err(Rejection::NoMedia));
    }

    #[test]
    fn test_image_only_project_is_rejected() {
        let jpg = vec![attachment("https://cdn/shot.jpg?ex=1", "shot.jpg")];
        assert_eq!(validate_project_post(POST, &jpg), Err(Rejection::ImageOnly));
    }

    #[test]
    fn test_images_with_link_are_accepted() {
        let content = format!("{}\n- play: https://ana.itch.io/game", POST);
        let png = vec![attachment("https://cdn/shot.png", "shot.png")];
        let post = validate_project_post(&content, &png).unwrap();
        assert_eq!(
            post.media_links,
            vec!["https://ana.itch.io/game", "https://cdn/shot.png"]
        );
    }

    #[test]
    fn test_link_without_attachments_is_accepted() {
        let content = format!("{}\nhttps://ana.itch.io/game", POST);
        let post = validate_project_post(&content, &[]).unwrap();
        assert_eq!(post.title, "My Game");
        assert_eq!(post.description, "cool platformer\nmade in 2 weeks");
        assert_eq!(post.media_links, vec!["https://ana.itch.io/game"]);
    }

    #[test]
    fn test_mixed_attachments_are_accepted() {
        let attachments = vec![
            attachment("https://cdn/shot.png", "shot.png"),
            attachment("https://cdn/game.zip", "game.zip"),
        ];
        let post = validate_project_post(POST, &attachments).unwrap();
        assert_eq!(post.media_links.len(), 2);
    }

    #[test]
    fn test_artwork_thumbnail_is_first_image() {
        let mut typed = attachment("https://cdn/blob", "blob");
        typed.content_type = Some("image/png".to_string());
        let attachments = vec![
            attachment("https://cdn/notes.txt", "notes.txt"),
            typed,
            attachment("https://cdn/b.gif", "b.gif"),
        ];
        assert_eq!(
            validate_artwork_post(&attachments).unwrap().thumbnail_url,
            "https://cdn/blob"
        );
    }

    #[test]
    fn test_artwork_without_image_is_rejected() {
        let attachments = vec![attachment("https://cdn/clip.mp4", "clip.mp4")];
        assert_eq!(validate_artwork_post(&attachments), Err(Rejection::NoImage));
        assert_eq!(validate_artwork_post(&[]), Err(Rejection::NoImage));
    }
}
