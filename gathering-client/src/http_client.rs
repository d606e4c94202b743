use crate::error::GatheringClientError;
use crate::models::{
    Comment, CreateCommentRequest, CreatePostRequest, ErrorResponse, Health, LikeRequest,
    LoginRequest, Post, SignupRequest, Stats, UpdateUserRequest, User,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GatheringClient {
    client: Client,
    base_url: String,
    current_user: Option<User>,
}

impl GatheringClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            current_user: None,
        }
    }

    /// The API issues no tokens: the remembered user plays the role of a
    /// session and is submitted as the author of posts, likes and comments.
    pub fn set_current_user(&mut self, user: User) {
        self.current_user = Some(user);
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn clear_current_user(&mut self) {
        self.current_user = None;
    }

    fn author(&self) -> Result<&User, GatheringClientError> {
        self.current_user
            .as_ref()
            .ok_or(GatheringClientError::NotLoggedIn)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ==================== Аккаунт ====================

    pub async fn signup(&mut self, req: SignupRequest) -> Result<User, GatheringClientError> {
        tracing::debug!("Signup called for email: {}", req.email);

        let url = self.url("/api/signup");
        let response = self.client.post(&url).json(&req).send().await?;

        let user = Self::handle_response::<User>(response).await?;
        self.current_user = Some(user.clone());
        Ok(user)
    }

    pub async fn login(&mut self, req: LoginRequest) -> Result<User, GatheringClientError> {
        tracing::debug!("Login called for email: {}", req.email);

        let url = self.url("/api/login");
        let response = self.client.post(&url).json(&req).send().await?;

        let user = Self::handle_response::<User>(response).await?;
        self.current_user = Some(user.clone());
        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, GatheringClientError> {
        let url = self.url(&format!("/api/users/{}", id));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn update_user(
        &mut self,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<User, GatheringClientError> {
        let url = self.url(&format!("/api/users/{}", id));
        let response = self.client.put(&url).json(&req).send().await?;

        let user = Self::handle_response::<User>(response).await?;
        // Обновили свой профиль — освежаем и запомненного пользователя
        if self.current_user.as_ref().is_some_and(|u| u.id == user.id) {
            self.current_user = Some(user.clone());
        }
        Ok(user)
    }

    // ==================== Лента ====================

    pub async fn list_posts(&self) -> Result<Vec<Post>, GatheringClientError> {
        let url = self.url("/api/posts");
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn create_post(
        &self,
        content: impl Into<String>,
        image: Option<String>,
        link: Option<String>,
    ) -> Result<Post, GatheringClientError> {
        let author = self.author()?;
        let req = CreatePostRequest {
            author_id: author.id,
            author_name: author.name.clone(),
            author_avatar: Some(author.avatar.clone()),
            content: content.into(),
            image,
            link,
        };

        let url = self.url("/api/posts");
        let response = self.client.post(&url).json(&req).send().await?;
        Self::handle_response(response).await
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, GatheringClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), GatheringClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.client.delete(&url).send().await?;
        Self::handle_confirmation(response).await
    }

    pub async fn toggle_like(&self, post_id: i64) -> Result<Post, GatheringClientError> {
        let author = self.author()?;
        let req = LikeRequest {
            user_id: author.id,
        };

        let url = self.url(&format!("/api/posts/{}/like", post_id));
        let response = self.client.post(&url).json(&req).send().await?;
        Self::handle_response(response).await
    }

    // ==================== Комментарии ====================

    pub async fn add_comment(
        &self,
        post_id: i64,
        text: impl Into<String>,
    ) -> Result<Comment, GatheringClientError> {
        let author = self.author()?;
        let req = CreateCommentRequest {
            author_id: author.id,
            author_name: author.name.clone(),
            author_avatar: Some(author.avatar.clone()),
            text: text.into(),
        };

        let url = self.url(&format!("/api/posts/{}/comments", post_id));
        let response = self.client.post(&url).json(&req).send().await?;
        Self::handle_response(response).await
    }

    pub async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), GatheringClientError> {
        let url = self.url(&format!("/api/posts/{}/comments/{}", post_id, comment_id));
        let response = self.client.delete(&url).send().await?;
        Self::handle_confirmation(response).await
    }

    // ==================== Служебное ====================

    pub async fn stats(&self) -> Result<Stats, GatheringClientError> {
        let url = self.url("/api/stats");
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn health(&self) -> Result<Health, GatheringClientError> {
        let url = self.url("/api/health");
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    // ==================== Обработка ответов ====================

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatheringClientError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json::<T>().await?),
            StatusCode::UNAUTHORIZED => Err(GatheringClientError::Unauthorized(
                Self::error_message(response).await?,
            )),
            StatusCode::NOT_FOUND => Err(GatheringClientError::NotFound),
            StatusCode::BAD_REQUEST => Err(GatheringClientError::InvalidRequest(
                Self::error_message(response).await?,
            )),
            _ => {
                let error_text = Self::error_message(response).await?;
                Err(GatheringClientError::TransportError(format!(
                    "HTTP {}: {}",
                    status, error_text
                )))
            }
        }
    }

    async fn handle_confirmation(
        response: reqwest::Response,
    ) -> Result<(), GatheringClientError> {
        Self::handle_response::<serde_json::Value>(response)
            .await
            .map(|_| ())
    }

    async fn error_message(response: reqwest::Response) -> Result<String, GatheringClientError> {
        let text = response.text().await?;
        Ok(serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text))
    }
}
