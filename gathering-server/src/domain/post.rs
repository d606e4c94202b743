use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post as persisted in the data file. The like count is not stored:
/// `liked_by` is the single source of truth and the count is derived
/// when building a [`PostResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    // Имя и аватар автора копируются при создании и дальше не синхронизируются
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: String,
    pub content: String,
    pub image: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub liked_by: Vec<i64>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub author_id: i64,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author_id: i64,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub likes: i64,
    pub liked_by: Vec<i64>,
    pub comments: Vec<Comment>,
    pub timestamp: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author_name: post.author_name,
            author_avatar: post.author_avatar,
            content: post.content,
            image: post.image,
            link: post.link,
            likes: post.liked_by.len() as i64,
            liked_by: post.liked_by,
            comments: post.comments,
            timestamp: post.timestamp,
        }
    }
}
