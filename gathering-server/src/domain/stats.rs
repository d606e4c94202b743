use serde::Serialize;

// Структура для ответа /api/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub total_likes: i64,
}
