//! Wire models of the Picshare API.

use serde::{Deserialize, Serialize};

/// Maximum length of a picture comment.
pub const MAX_COMMENT_LENGTH: usize = 140;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_ttl: i64,
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: u64,
    pub username: String,
}

/// A user's profile page: public pictures always, private ones only for
/// the user themselves and their friends.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub user: UserSummary,
    pub private_access: bool,
    pub public_pictures: Vec<PictureSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_pictures: Option<Vec<PictureSummary>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureSummary {
    pub picture_id: u64,
    pub title: String,
    pub author: String,
    pub is_public: bool,
    /// Path of the stored image, relative to the media root
    pub image_path: String,
    pub submitted_at: i64,
    pub like_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureDetail {
    pub picture: PictureSummary,
    /// Whether the requesting user has liked this picture
    pub liked: bool,
    /// Usernames tagged on the picture
    pub tags: Vec<String>,
    pub comments: Vec<CommentView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub comment_id: u64,
    pub author: String,
    pub content: String,
    pub submitted_at: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendView {
    pub friendship_id: u64,
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    pub request_id: u64,
    pub from: String,
    pub to: String,
}

/// Everything shown on a user's control panel.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanel {
    pub user: UserSummary,
    pub friends: Vec<FriendView>,
    pub friend_requests: Vec<FriendRequestView>,
    pub pictures: Vec<PictureSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestCreate {
    pub user_id: u64,
}

/// Reply to a pending friend request: `accept` or `decline`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResolution {
    pub response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    pub tag_username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
}
