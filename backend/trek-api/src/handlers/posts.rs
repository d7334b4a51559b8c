/// Post endpoints: create, list, join, leave, delete.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::handlers::require_fields;
use crate::middleware::UserId;
use crate::services::{LeaveOutcome, PostService};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub image: Option<String>,
}

pub async fn create_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    require_fields(&[&req.title, &req.description, &req.location])?;

    let service = PostService::new((**pool).clone());
    let (post, group) = service
        .create_post(
            user_id.0,
            req.title.trim(),
            req.description.trim(),
            req.location.trim(),
            req.image.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Post created successfully",
        "post": post,
        "group": group,
    })))
}

pub async fn list_posts(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let posts = service.list_posts().await?;

    Ok(HttpResponse::Ok().json(posts))
}

pub async fn join_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let group_id = service.join_post(*post_id, user_id.0).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Joined post successfully",
        "groupId": group_id,
    })))
}

pub async fn leave_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let message = match service.leave_post(*post_id, user_id.0).await? {
        LeaveOutcome::Left => "You have left the post and group successfully",
        LeaveOutcome::Dissolved => "Post and associated group deleted successfully",
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": message })))
}

pub async fn delete_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete_post(*post_id, user_id.0).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post and associated group deleted successfully",
    })))
}
