/// Group endpoints.
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::error::Result;
use crate::services::GroupService;

pub async fn list_groups(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = GroupService::new((**pool).clone());
    let groups = service.list_groups().await?;

    Ok(HttpResponse::Ok().json(groups))
}
