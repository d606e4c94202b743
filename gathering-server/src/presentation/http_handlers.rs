use crate::application::{AuthService, FeedService};
use crate::domain::post::{CreateCommentRequest, CreatePostRequest, LikeRequest};
use crate::domain::user::{LoginRequest, SignupRequest, UpdateUserRequest};
use crate::domain::DomainError;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

// Преобразование DomainError в HttpResponse
fn error_to_response(err: DomainError) -> HttpResponse {
    let status_code = err.to_status_code();
    let message = err.to_string();

    match status_code {
        400 => HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        401 => HttpResponse::Unauthorized().json(serde_json::json!({ "error": message })),
        404 => HttpResponse::NotFound().json(serde_json::json!({ "error": message })),
        _ => HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": "Internal server error" })),
    }
}

// ============== Auth Handlers ==============

pub async fn signup(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<SignupRequest>,
) -> impl Responder {
    match auth_service.signup(req.into_inner()).await {
        Ok(user) => HttpResponse::Created().json(user),
        Err(err) => error_to_response(err),
    }
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    match auth_service.login(req.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => error_to_response(err),
    }
}

// ============== User Handlers ==============

pub async fn get_user(
    auth_service: web::Data<Arc<AuthService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let user_id = path.into_inner();

    match auth_service.get_user(user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_user(
    auth_service: web::Data<Arc<AuthService>>,
    path: web::Path<i64>,
    req: web::Json<UpdateUserRequest>,
) -> impl Responder {
    let user_id = path.into_inner();

    tracing::info!("Updating profile for user_id={}", user_id);

    match auth_service.update_user(user_id, req.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => error_to_response(err),
    }
}

// ============== Post Handlers ==============

pub async fn list_posts(feed_service: web::Data<Arc<FeedService>>) -> impl Responder {
    match feed_service.list_posts().await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_post(
    feed_service: web::Data<Arc<FeedService>>,
    req: web::Json<CreatePostRequest>,
) -> impl Responder {
    match feed_service.create_post(req.into_inner()).await {
        Ok(post) => HttpResponse::Created().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn get_post(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::info!("Getting post with id={}", post_id);

    match feed_service.get_post(post_id).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_post(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    match feed_service.delete_post(post_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "Post deleted" })),
        Err(err) => error_to_response(err),
    }
}

pub async fn toggle_like(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
    req: web::Json<LikeRequest>,
) -> impl Responder {
    let post_id = path.into_inner();

    match feed_service.toggle_like(post_id, req.into_inner()).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

// ============== Comment Handlers ==============

pub async fn add_comment(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
    req: web::Json<CreateCommentRequest>,
) -> impl Responder {
    let post_id = path.into_inner();

    match feed_service.add_comment(post_id, req.into_inner()).await {
        Ok(comment) => HttpResponse::Created().json(comment),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_comment(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();

    match feed_service.delete_comment(post_id, comment_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "Comment deleted" })),
        Err(err) => error_to_response(err),
    }
}

// ============== Stats & Health ==============

pub async fn get_stats(feed_service: web::Data<Arc<FeedService>>) -> impl Responder {
    match feed_service.stats().await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => error_to_response(err),
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "message": "Gathering API is running"
    }))
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Endpoint not found" }))
}

/// Route table, shared by `main` and the in-process API tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Тело, не прошедшее десериализацию, отдаём как {"error": ...}
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        )
        .into()
    });

    cfg.app_data(json_config).service(
        web::scope("/api")
            // Аутентификация
            .route("/signup", web::post().to(signup))
            .route("/login", web::post().to(login))
            // Профили
            .route("/users/{id}", web::get().to(get_user))
            .route("/users/{id}", web::put().to(update_user))
            // Лента
            .route("/posts", web::get().to(list_posts))
            .route("/posts", web::post().to(create_post))
            .route("/posts/{id}", web::get().to(get_post))
            .route("/posts/{id}", web::delete().to(delete_post))
            .route("/posts/{id}/like", web::post().to(toggle_like))
            .route("/posts/{id}/comments", web::post().to(add_comment))
            .route(
                "/posts/{id}/comments/{comment_id}",
                web::delete().to(delete_comment),
            )
            // Служебные
            .route("/stats", web::get().to(get_stats))
            .route("/health", web::get().to(health))
            .default_service(web::route().to(not_found)),
    )
    .default_service(web::route().to(not_found));
}
