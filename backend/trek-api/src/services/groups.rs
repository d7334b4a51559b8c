/// Group listing service.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::GroupDetail;

pub struct GroupService {
    pool: PgPool,
}

impl GroupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All groups with their member sets, oldest first.
    pub async fn list_groups(&self) -> Result<Vec<GroupDetail>> {
        let rows = sqlx::query_as::<_, GroupListRow>(
            r#"
            SELECT g.id, g.post_id, g.group_name, g.admin, g.created_at,
                   ARRAY(
                       SELECT gm.user_id FROM group_members gm
                       WHERE gm.group_id = g.id
                       ORDER BY gm.joined_at
                   ) AS members
            FROM groups g
            ORDER BY g.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| GroupDetail {
                id: row.id,
                post_id: row.post_id,
                group_name: row.group_name,
                admin: row.admin,
                members: row.members,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct GroupListRow {
    id: Uuid,
    post_id: Uuid,
    group_name: String,
    admin: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    members: Vec<Uuid>,
}
