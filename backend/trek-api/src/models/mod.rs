/// Data models for the trek API.
///
/// Wire DTOs serialize as camelCase because the mobile client was written
/// against that shape (`createdBy`, `groupId`, ...).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account row. The password hash never leaves the service layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, embedded in API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// A trek listing. `group_id` is back-filled inside the creation
/// transaction, so committed rows always reference their paired group.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: String,
    pub created_by: Uuid,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The chat/membership companion paired 1:1 with a post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub post_id: Uuid,
    pub group_name: String,
    pub admin: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post with creator and group expanded, as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: String,
    pub created_by: UserSummary,
    pub group: Option<Group>,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group with its member set expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    pub id: Uuid,
    pub post_id: Uuid,
    pub group_name: String,
    pub admin: Uuid,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}
