/// HTTP handlers and the API route table.
pub mod auth;
pub mod groups;
pub mod posts;

use actix_web::web;

use crate::error::{AppError, Result};
use crate::middleware::SessionAuth;

/// Register the `/api` routes. Shared by `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/ping", web::get().to(auth::ping))
            .route("/signup", web::post().to(auth::signup))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout))
            // Listings are public; registered before the authenticated
            // /posts scope so they match first.
            .route("/posts/listPosts", web::get().to(posts::list_posts))
            .route("/groups/listGroups", web::get().to(groups::list_groups))
            .service(
                web::scope("/posts")
                    .wrap(SessionAuth)
                    .route("/createPost", web::post().to(posts::create_post))
                    .route("/join/{post_id}", web::post().to(posts::join_post))
                    .route("/leave/{post_id}", web::post().to(posts::leave_post))
                    .route("/delete/{post_id}", web::delete().to(posts::delete_post)),
            ),
    );
}

/// Presence check for required request fields.
pub(crate) fn require_fields(fields: &[&str]) -> Result<()> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(AppError::Validation("All fields are required".to_string()));
    }
    Ok(())
}
