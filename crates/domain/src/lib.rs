use serde::{Deserialize, Serialize};
use std::fmt;

mod category;
mod registration;

pub use category::Category;
pub use registration::{MIN_PASSWORD_LEN, Registration, ValidationError};

/// An authenticated account as reported by the identity backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Where a video is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Vimeo,
    Dailymotion,
    /// Raw embed markup or an embeddable URL stored in `video_id`
    Embed,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Youtube => "youtube",
            Self::Vimeo => "vimeo",
            Self::Dailymotion => "dailymotion",
            Self::Embed => "embed",
        };
        f.write_str(name)
    }
}

/// A checklist note attached to a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Represents a bookmarked video resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    pub platform: Platform,
    pub video_id: String,
    pub class: String,
    pub subject: String,
    pub user_id: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl Video {
    /// Resolve what the player should load for this video
    pub fn player_source(&self) -> PlayerSource {
        match self.platform {
            Platform::Embed if self.video_id.contains("<iframe") => {
                PlayerSource::Embed(self.video_id.clone())
            }
            Platform::Embed => PlayerSource::Embed(format!(
                "<iframe src=\"{}\" width=\"100%\" height=\"100%\" \
                 frameborder=\"0\" allowfullscreen></iframe>",
                self.video_id
            )),
            _ => PlayerSource::Url(self.video_url.clone()),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Player input derived from a [`Video`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PlayerSource {
    /// HTML markup to inject as-is
    Embed(String),
    /// A URL the media player can open
    Url(String),
}

/// A video before the store assigns it an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    pub platform: Platform,
    pub video_id: String,
    pub class: String,
    pub subject: String,
    pub user_id: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl NewVideo {
    pub fn with_id(self, id: String) -> Video {
        Video {
            id,
            title: self.title,
            video_url: self.video_url,
            platform: self.platform,
            video_id: self.video_id,
            class: self.class,
            subject: self.subject,
            user_id: self.user_id,
            watched: self.watched,
            favorite: self.favorite,
            todos: self.todos,
        }
    }
}

/// Fields to merge into a stored video. `None` leaves the stored value untouched.
///
/// The owner is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<Todo>>,
}

impl VideoPatch {
    pub fn watched(value: bool) -> Self {
        Self {
            watched: Some(value),
            ..Default::default()
        }
    }

    pub fn favorite(value: bool) -> Self {
        Self {
            favorite: Some(value),
            ..Default::default()
        }
    }

    pub fn todos(todos: Vec<Todo>) -> Self {
        Self {
            todos: Some(todos),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the supplied fields into `video`
    pub fn apply_to(self, video: &mut Video) {
        if let Some(title) = self.title {
            video.title = title;
        }
        if let Some(video_url) = self.video_url {
            video.video_url = video_url;
        }
        if let Some(platform) = self.platform {
            video.platform = platform;
        }
        if let Some(video_id) = self.video_id {
            video.video_id = video_id;
        }
        if let Some(class) = self.class {
            video.class = class;
        }
        if let Some(subject) = self.subject {
            video.subject = subject;
        }
        if let Some(watched) = self.watched {
            video.watched = watched;
        }
        if let Some(favorite) = self.favorite {
            video.favorite = favorite;
        }
        if let Some(todos) = self.todos {
            video.todos = todos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algebra() -> Video {
        NewVideo {
            title: "Algebra 1".to_string(),
            video_url: "https://www.youtube.com/watch?v=abc123".to_string(),
            platform: Platform::Youtube,
            video_id: "abc123".to_string(),
            class: "10".to_string(),
            subject: "Math".to_string(),
            user_id: "u1".to_string(),
            watched: false,
            favorite: false,
            todos: Vec::new(),
        }
        .with_id("v1".to_string())
    }

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let original = algebra();
        let mut video = original.clone();
        VideoPatch::watched(true).apply_to(&mut video);

        assert!(video.watched);
        assert_eq!(
            Video {
                watched: false,
                ..video
            },
            original
        );
    }

    #[test]
    fn test_empty_patch() {
        assert!(VideoPatch::default().is_empty());
        assert!(!VideoPatch::favorite(false).is_empty());
    }

    #[test]
    fn test_video_defaults_when_flags_absent() {
        let json = r#"{
            "id": "v1",
            "title": "Algebra 1",
            "platform": "youtube",
            "videoId": "abc123",
            "class": "10",
            "subject": "Math",
            "userId": "u1"
        }"#;
        let video: Video = serde_json::from_str(json).unwrap();
        assert!(!video.watched);
        assert!(!video.favorite);
        assert!(video.todos.is_empty());
        assert_eq!(video.video_url, "");
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let value = serde_json::to_value(VideoPatch::favorite(true)).unwrap();
        assert_eq!(value, serde_json::json!({ "favorite": true }));
    }

    #[test]
    fn test_embed_markup_used_verbatim() {
        let markup = r#"<iframe src="https://player.example/1"></iframe>"#;
        let video = Video {
            platform: Platform::Embed,
            video_id: markup.to_string(),
            ..algebra()
        };
        assert_eq!(video.player_source(), PlayerSource::Embed(markup.to_string()));
    }

    #[test]
    fn test_embed_url_wrapped_in_iframe() {
        let video = Video {
            platform: Platform::Embed,
            video_id: "https://player.example/1".to_string(),
            ..algebra()
        };
        match video.player_source() {
            PlayerSource::Embed(html) => {
                assert!(html.starts_with("<iframe src=\"https://player.example/1\""));
                assert!(html.contains("allowfullscreen"));
            }
            other => panic!("expected embed markup, got {other:?}"),
        }
    }

    #[test]
    fn test_hosted_platform_plays_url() {
        assert_eq!(
            algebra().player_source(),
            PlayerSource::Url("https://www.youtube.com/watch?v=abc123".to_string())
        );
    }

    #[test]
    fn test_platform_wire_names() {
        assert_eq!(serde_json::to_string(&Platform::Dailymotion).unwrap(), "\"dailymotion\"");
        assert_eq!(Platform::Vimeo.to_string(), "vimeo");
    }
}
