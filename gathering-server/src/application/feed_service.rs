use crate::data::Store;
use crate::domain::post::{
    Comment, CreateCommentRequest, CreatePostRequest, LikeRequest, Post, PostResponse,
};
use crate::domain::stats::StatsResponse;
use crate::domain::DomainError;
use crate::infrastructure::ids::IdGenerator;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FeedService {
    store: Arc<dyn Store>,
    ids: Arc<IdGenerator>,
    write_lock: Arc<Mutex<()>>,
}

impl FeedService {
    pub fn new(store: Arc<dyn Store>, ids: Arc<IdGenerator>, write_lock: Arc<Mutex<()>>) -> Self {
        Self {
            store,
            ids,
            write_lock,
        }
    }

    /// The feed: every post, newest first. Ids are creation-time derived,
    /// so descending id order is newest-first.
    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, DomainError> {
        let db = self.store.load().await?;

        let mut posts = db.posts;
        posts.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn create_post(&self, req: CreatePostRequest) -> Result<PostResponse, DomainError> {
        if req.content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Post content is required".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        let post = Post {
            id: self.ids.next_id(),
            author_id: req.author_id,
            author_name: req.author_name,
            author_avatar: req.author_avatar.unwrap_or_default(),
            content: req.content,
            image: req.image,
            link: req.link,
            liked_by: Vec::new(),
            comments: Vec::new(),
            timestamp: Utc::now(),
        };

        db.posts.push(post.clone());
        self.store.save(&db).await?;

        tracing::info!("Post created: id={}, author_id={}", post.id, post.author_id);
        Ok(PostResponse::from(post))
    }

    pub async fn get_post(&self, id: i64) -> Result<PostResponse, DomainError> {
        let db = self.store.load().await?;

        db.posts
            .into_iter()
            .find(|p| p.id == id)
            .map(PostResponse::from)
            .ok_or(DomainError::PostNotFound)
    }

    /// Removes the post record entirely, comments included.
    pub async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        let before = db.posts.len();
        db.posts.retain(|p| p.id != id);
        if db.posts.len() == before {
            return Err(DomainError::PostNotFound);
        }

        self.store.save(&db).await?;

        tracing::info!("Post deleted: id={}", id);
        Ok(())
    }

    /// Flips like membership on each call: present in `likedBy` removes,
    /// absent appends. The count in the response is derived from `likedBy`.
    pub async fn toggle_like(
        &self,
        post_id: i64,
        req: LikeRequest,
    ) -> Result<PostResponse, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        let post = db
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(DomainError::PostNotFound)?;

        if let Some(pos) = post.liked_by.iter().position(|&u| u == req.user_id) {
            post.liked_by.remove(pos);
            tracing::debug!("Post {} unliked by user {}", post_id, req.user_id);
        } else {
            post.liked_by.push(req.user_id);
            tracing::debug!("Post {} liked by user {}", post_id, req.user_id);
        }
        let updated = post.clone();

        self.store.save(&db).await?;
        Ok(PostResponse::from(updated))
    }

    pub async fn add_comment(
        &self,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        let post = db
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(DomainError::PostNotFound)?;

        let comment = Comment {
            id: self.ids.next_id(),
            author_id: req.author_id,
            author_name: req.author_name,
            author_avatar: req.author_avatar.unwrap_or_default(),
            text: req.text,
            timestamp: Utc::now(),
        };

        post.comments.push(comment.clone());
        self.store.save(&db).await?;

        tracing::info!("Comment created: id={}, post_id={}", comment.id, post_id);
        Ok(comment)
    }

    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        let post = db
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(DomainError::PostNotFound)?;

        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        if post.comments.len() == before {
            return Err(DomainError::CommentNotFound);
        }

        self.store.save(&db).await?;

        tracing::info!("Comment deleted: id={}, post_id={}", comment_id, post_id);
        Ok(())
    }

    /// Pure read; no persistence side effect.
    pub async fn stats(&self) -> Result<StatsResponse, DomainError> {
        let db = self.store.load().await?;

        Ok(StatsResponse {
            total_users: db.users.len() as i64,
            total_posts: db.posts.len() as i64,
            total_comments: db.posts.iter().map(|p| p.comments.len() as i64).sum(),
            total_likes: db.posts.iter().map(|p| p.liked_by.len() as i64).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::InMemoryStore;

    fn service() -> FeedService {
        FeedService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(IdGenerator::new()),
            Arc::new(Mutex::new(())),
        )
    }

    fn post_req(author_id: i64, author_name: &str, content: &str) -> CreatePostRequest {
        CreatePostRequest {
            author_id,
            author_name: author_name.to_string(),
            author_avatar: None,
            content: content.to_string(),
            image: None,
            link: None,
        }
    }

    fn comment_req(author_id: i64, text: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            author_id,
            author_name: "Ada".to_string(),
            author_avatar: None,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_the_same_post() {
        let feed = service();

        let created = feed
            .create_post(post_req(1, "Ada", "hello"))
            .await
            .unwrap();
        assert_eq!(created.likes, 0);
        assert!(created.liked_by.is_empty());
        assert!(created.comments.is_empty());

        let fetched = feed.get_post(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.content, "hello");
        assert_eq!(fetched.timestamp, created.timestamp);
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let feed = service();

        let err = feed.create_post(post_req(1, "Ada", "")).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = feed
            .create_post(post_req(1, "Ada", "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn feed_is_newest_first() {
        let feed = service();

        let first = feed.create_post(post_req(1, "Ada", "one")).await.unwrap();
        let second = feed.create_post(post_req(1, "Ada", "two")).await.unwrap();
        let third = feed.create_post(post_req(2, "Bob", "three")).await.unwrap();

        let posts = feed.list_posts().await.unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn like_toggles_on_and_off() {
        let feed = service();
        let post = feed.create_post(post_req(1, "Ada", "hello")).await.unwrap();

        let liked = feed
            .toggle_like(post.id, LikeRequest { user_id: 2 })
            .await
            .unwrap();
        assert_eq!(liked.likes, 1);
        assert_eq!(liked.liked_by, vec![2]);

        let unliked = feed
            .toggle_like(post.id, LikeRequest { user_id: 2 })
            .await
            .unwrap();
        assert_eq!(unliked.likes, 0);
        assert!(unliked.liked_by.is_empty());
    }

    #[tokio::test]
    async fn like_count_always_matches_liked_by() {
        let feed = service();
        let post = feed.create_post(post_req(1, "Ada", "hello")).await.unwrap();

        // Произвольная последовательность переключений
        for user_id in [2, 3, 2, 4, 3, 3] {
            let updated = feed
                .toggle_like(post.id, LikeRequest { user_id })
                .await
                .unwrap();
            assert_eq!(updated.likes as usize, updated.liked_by.len());
        }

        let final_state = feed.get_post(post.id).await.unwrap();
        assert_eq!(final_state.liked_by, vec![4, 3]);
        assert_eq!(final_state.likes, 2);
    }

    #[tokio::test]
    async fn deleting_a_post_removes_it_everywhere() {
        let feed = service();
        let post = feed.create_post(post_req(1, "Ada", "hello")).await.unwrap();
        feed.add_comment(post.id, comment_req(2, "nice"))
            .await
            .unwrap();

        feed.delete_post(post.id).await.unwrap();

        assert!(feed.list_posts().await.unwrap().is_empty());
        assert!(matches!(
            feed.get_post(post.id).await.unwrap_err(),
            DomainError::PostNotFound
        ));
        assert!(matches!(
            feed.delete_post(post.id).await.unwrap_err(),
            DomainError::PostNotFound
        ));
        assert!(matches!(
            feed.add_comment(post.id, comment_req(2, "again"))
                .await
                .unwrap_err(),
            DomainError::PostNotFound
        ));
    }

    #[tokio::test]
    async fn comment_add_then_delete_leaves_post_empty() {
        let feed = service();
        let post = feed.create_post(post_req(1, "Ada", "hello")).await.unwrap();

        let comment = feed
            .add_comment(post.id, comment_req(2, "nice post"))
            .await
            .unwrap();
        assert_eq!(comment.text, "nice post");
        assert_eq!(comment.author_avatar, "");

        feed.delete_comment(post.id, comment.id).await.unwrap();
        assert!(feed.get_post(post.id).await.unwrap().comments.is_empty());

        let err = feed.delete_comment(post.id, comment.id).await.unwrap_err();
        assert!(matches!(err, DomainError::CommentNotFound));
    }

    #[tokio::test]
    async fn stats_count_users_posts_comments_and_likes() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let ids = Arc::new(IdGenerator::new());
        let lock = Arc::new(Mutex::new(()));
        let feed = FeedService::new(store.clone(), ids.clone(), lock.clone());

        // Двое пользователей прямо в датасете; сервис аккаунтов тут не нужен
        let mut db = store.load().await.unwrap();
        for (id, email) in [(1, "ada@x.com"), (2, "bob@x.com")] {
            db.users.push(crate::domain::User {
                id,
                name: format!("user-{}", id),
                email: email.to_string(),
                password: "$argon2id$fake".to_string(),
                bio: "New user".to_string(),
                avatar: String::new(),
                followers: 0,
                following: 0,
                created_at: Utc::now(),
            });
        }
        store.save(&db).await.unwrap();

        let p1 = feed.create_post(post_req(1, "Ada", "one")).await.unwrap();
        let p2 = feed.create_post(post_req(2, "Bob", "two")).await.unwrap();
        feed.create_post(post_req(1, "Ada", "three")).await.unwrap();

        feed.add_comment(p1.id, comment_req(2, "first")).await.unwrap();
        feed.add_comment(p2.id, comment_req(1, "second")).await.unwrap();

        for user_id in [3, 4, 5] {
            feed.toggle_like(p1.id, LikeRequest { user_id }).await.unwrap();
        }
        for user_id in [3, 4] {
            feed.toggle_like(p2.id, LikeRequest { user_id }).await.unwrap();
        }

        let stats = feed.stats().await.unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.total_comments, 2);
        assert_eq!(stats.total_likes, 5);
    }
}
