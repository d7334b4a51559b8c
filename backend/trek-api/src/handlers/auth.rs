/// Auth endpoints: signup, login, logout, plus the ping probe.
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::handlers::require_fields;
use crate::models::UserSummary;
use crate::services::{SessionStore, UserService, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Pong!" }))
}

pub async fn signup(
    pool: web::Data<PgPool>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    require_fields(&[&req.name, &req.email, &req.password])?;

    let service = UserService::new((**pool).clone());
    let user = service
        .register(req.name.trim(), req.email.trim(), &req.password)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User registered successfully",
        "user": user,
    })))
}

pub async fn login(
    pool: web::Data<PgPool>,
    sessions: web::Data<Arc<dyn SessionStore>>,
    config: web::Data<Config>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    require_fields(&[&req.email, &req.password])?;

    let service = UserService::new((**pool).clone());
    let user = service.authenticate(req.email.trim(), &req.password).await?;
    let token = sessions.create(user.id).await?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(config.session.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(config.session.ttl_secs as i64))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "message": "Logged in successfully",
        "user": UserSummary::from(user),
    })))
}

pub async fn logout(
    sessions: web::Data<Arc<dyn SessionStore>>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        sessions.revoke(cookie.value()).await?;
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.make_removal();

    Ok(HttpResponse::Ok().cookie(removal).json(serde_json::json!({
        "message": "Logged out successfully",
    })))
}
