use gallery_ref::url_multi_regex;
use lazy_static::lazy_static;
use regex::Regex;

/// The pieces of a post the project rules care about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostParts {
    pub title: Option<String>,
    pub description: Option<String>,
    pub links: Vec<String>,
}

pub fn parse(text: &str) -> PostParts {
    let bullets = bullets(text);
    PostParts {
        title: heading(text),
        description: if bullets.is_empty() {
            None
        } else {
            Some(bullets.join("\n"))
        },
        links: links(text),
    }
}

/// Text of the first `#`, `##` or `###` heading line.
pub fn heading(text: &str) -> Option<String> {
    heading_regex()
        .captures(text)
        .map(|caps| caps["text"].trim().to_string())
}

/// Text of every `-` bullet line, in order.
pub fn bullets(text: &str) -> Vec<String> {
    bullet_regex()
        .captures_iter(text)
        .map(|caps| caps["text"].trim().to_string())
        .collect()
}

/// Every http(s) url in the text, in order of first appearance.
pub fn links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for mat in url_multi_regex().find_iter(text) {
        let link = mat.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if !links.iter().any(|existing| existing == link) {
            links.push(link.to_string());
        }
    }
    links
}

pub fn heading_regex() -> &'static Regex {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?m)^[ \t]*#{1,3}[ \t]+(?P<text>\S.*?)\s*$").unwrap();
    }
    &*RE
}

pub fn bullet_regex() -> &'static Regex {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?m)^[ \t]*-[ \t]+(?P<text>\S.*?)\s*$").unwrap();
    }
    &*RE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_post() {
        let parts = parse("# My Game\n- cool platformer\n- made in 2 weeks");
        assert_eq!(parts.title.as_deref(), Some("My Game"));
        assert_eq!(
            parts.description.as_deref(),
            Some("cool platformer\nmade in 2 weeks")
        );
        assert!(parts.links.is_empty());
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading("## My Game (update)").as_deref(), Some("My Game (update)"));
        assert_eq!(heading("intro\n###   Spaced   \n").as_deref(), Some("Spaced"));
        assert_eq!(heading("#### Too deep"), None);
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("no heading here"), None);
    }

    #[test]
    fn test_bullets_skip_other_lines() {
        let text = "# T\nsome prose\n- one\r\n  - two\n-three\n---";
        assert_eq!(bullets(text), vec!["one", "two"]);
    }

    #[test]
    fn test_links() {
        let text = "try https://ana.itch.io/game. source: <https://github.com/ana/game>\n\
                    again https://ana.itch.io/game";
        assert_eq!(
            links(text),
            vec!["https://ana.itch.io/game", "https://github.com/ana/game"]
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(parse(""), PostParts::default());
    }
}
