/// Post/group lifecycle service.
///
/// Every operation that touches both a post and its paired group runs inside
/// a single transaction, so the mirrored membership sets and the 1:1 link
/// can never be observed half-written. The post row is locked (`FOR UPDATE`)
/// before membership checks, which closes the duplicate-join race of the
/// check-then-act variety.
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Group, Post, PostDetail, UserSummary};

/// Outcome of a leave request, used by the handler to pick the response
/// message.
#[derive(Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user was removed from both membership sets.
    Left,
    /// The leaving user was the creator; the post and group were deleted.
    Dissolved,
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post and its paired group in one transaction.
    ///
    /// The creator becomes admin and sole initial member on both sides, and
    /// the post's `group_id` is back-filled before commit, so an orphan post
    /// without a group cannot be committed.
    pub async fn create_post(
        &self,
        user_id: Uuid,
        title: &str,
        description: &str,
        location: &str,
        image: Option<&str>,
    ) -> Result<(Post, Group)> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, description, location, image, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, location, image, created_by, group_id,
                      created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(image.unwrap_or(""))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (post_id, group_name, admin)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, group_name, admin, created_at
            "#,
        )
        .bind(post.id)
        .bind(derive_group_name(title))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET group_id = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, title, description, location, image, created_by, group_id,
                      created_at, updated_at
            "#,
        )
        .bind(group.id)
        .bind(post.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO post_members (post_id, user_id) VALUES ($1, $2)")
            .bind(post.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(group.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(post_id = %post.id, group_id = %group.id, creator = %user_id, "post created");

        Ok((post, group))
    }

    /// Add a user to a post and its paired group.
    ///
    /// Not idempotent: a second join by the same user is a conflict, and the
    /// membership sets are left untouched.
    pub async fn join_post(&self, post_id: Uuid, user_id: Uuid) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let post = lock_post(&mut tx, post_id).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO post_members (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "You are already in this group".to_string(),
            ));
        }

        let group_id = post.group_id.ok_or_else(|| {
            AppError::NotFound("Associated group not found".to_string())
        })?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%post_id, %group_id, %user_id, "user joined post");

        Ok(group_id)
    }

    /// Remove a user from a post and its paired group.
    ///
    /// Policy: the creator cannot leave without dissolving the group, so a
    /// creator leave is routed to the delete path.
    pub async fn leave_post(&self, post_id: Uuid, user_id: Uuid) -> Result<LeaveOutcome> {
        let mut tx = self.pool.begin().await?;

        let post = lock_post(&mut tx, post_id).await?;

        let group_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM groups WHERE post_id = $1")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;
        let group_id = group_id
            .ok_or_else(|| AppError::NotFound("Associated group not found".to_string()))?;

        let is_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM post_members WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !is_member {
            return Err(AppError::Validation(
                "You are not a member of this post".to_string(),
            ));
        }

        if post.created_by == user_id {
            delete_pair(&mut tx, post_id).await?;
            tx.commit().await?;
            tracing::info!(%post_id, %user_id, "creator left; post and group dissolved");
            return Ok(LeaveOutcome::Dissolved);
        }

        sqlx::query("DELETE FROM post_members WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%post_id, %group_id, %user_id, "user left post");

        Ok(LeaveOutcome::Left)
    }

    /// Delete a post and its paired group. Creator only.
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let post = lock_post(&mut tx, post_id).await?;

        if post.created_by != user_id {
            return Err(AppError::Forbidden(
                "Only the post creator can delete this post".to_string(),
            ));
        }

        delete_pair(&mut tx, post_id).await?;
        tx.commit().await?;

        tracing::info!(%post_id, %user_id, "post and group deleted");

        Ok(())
    }

    /// All posts with creator and group expanded, oldest first.
    pub async fn list_posts(&self) -> Result<Vec<PostDetail>> {
        let rows = sqlx::query_as::<_, PostListRow>(
            r#"
            SELECT p.id, p.title, p.description, p.location, p.image,
                   p.created_at, p.updated_at,
                   u.id AS creator_id, u.name AS creator_name, u.email AS creator_email,
                   g.id AS group_id, g.group_name, g.admin AS group_admin,
                   g.created_at AS group_created_at,
                   ARRAY(
                       SELECT pm.user_id FROM post_members pm
                       WHERE pm.post_id = p.id
                       ORDER BY pm.joined_at
                   ) AS members
            FROM posts p
            JOIN users u ON u.id = p.created_by
            LEFT JOIN groups g ON g.post_id = p.id
            ORDER BY p.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostDetail::from).collect())
    }
}

/// Load and row-lock a post, or fail with the client-facing not-found error.
async fn lock_post(tx: &mut Transaction<'_, Postgres>, post_id: Uuid) -> Result<Post> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, description, location, image, created_by, group_id,
               created_at, updated_at
        FROM posts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut **tx)
    .await?;

    post.ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

/// Delete a post and its group; memberships go with them via cascades.
async fn delete_pair(tx: &mut Transaction<'_, Postgres>, post_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM groups WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Group names are derived from the post title.
pub fn derive_group_name(title: &str) -> String {
    format!("{} - Trekking Group", title)
}

#[derive(sqlx::FromRow)]
struct PostListRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    image: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    creator_id: Uuid,
    creator_name: String,
    creator_email: String,
    group_id: Option<Uuid>,
    group_name: Option<String>,
    group_admin: Option<Uuid>,
    group_created_at: Option<chrono::DateTime<chrono::Utc>>,
    members: Vec<Uuid>,
}

impl From<PostListRow> for PostDetail {
    fn from(row: PostListRow) -> Self {
        let group = match (row.group_id, row.group_name, row.group_admin, row.group_created_at) {
            (Some(id), Some(group_name), Some(admin), Some(created_at)) => Some(Group {
                id,
                post_id: row.id,
                group_name,
                admin,
                created_at,
            }),
            _ => None,
        };

        PostDetail {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            image: row.image,
            created_by: UserSummary {
                id: row.creator_id,
                name: row.creator_name,
                email: row.creator_email,
            },
            group,
            members: row.members,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
