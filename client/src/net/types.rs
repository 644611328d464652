//! Wire DTOs for the client/backend boundary.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON. Optional or late-added fields carry
//! `#[serde(default)]` so older backends still deserialize.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The signed-in user as returned by `GET /users/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Account creation timestamp (backend ISO-8601 string).
    pub created_at: String,
}

/// Public identity of a pin's owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub username: String,
    pub email: String,
}

impl Owner {
    /// Uppercased first letter of the username, for avatar badges.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.username.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    /// Client route listing pins with this tag.
    #[must_use]
    pub fn route_path(&self) -> String {
        format!("/tag/{}", urlencoding::encode(&self.name))
    }
}

/// A user-submitted image post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Backend-relative image path; resolve with `ClientConfig::asset_url`.
    #[serde(rename = "image_url")]
    pub image_ref: String,
    pub owner_id: i64,
    /// Whether the current viewer has saved this pin.
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub owner: Owner,
}

impl Pin {
    #[must_use]
    pub fn route_path(&self) -> String {
        format!("/pin/{}", self.id)
    }

    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Author of a comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    #[serde(rename = "user")]
    pub author: CommentAuthor,
}

/// Response of `POST /token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Image attached to a new pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, guessing the MIME type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self { file_name, content_type, bytes }
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Validated multipart payload for `POST /pins/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPin {
    pub title: String,
    pub description: Option<String>,
    pub image: ImageUpload,
    pub tags: Vec<String>,
}
