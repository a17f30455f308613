// 关注存储
// 包含关注关系和关注计数的数据库操作

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::FollowStore;
use crate::database::StoreError;
use crate::database::models::{FollowCountEntity, FollowEntity, FollowStatus};

const FOLLOW_COLUMNS: &str =
    "id, user_id, followed_user_id, follow_status, create_time, update_time";

/// 关注存储库，关注关系和计数的修改都在事务中完成
pub struct FollowOperation {
    db: Arc<PgPool>,
}

impl FollowOperation {
    /// 创建新的关注存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

/// 计数行不存在时以 delta 为初值创建
async fn bump_follow_count(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    delta: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO follow_count (user_id, follow_count, fans_count, create_time, update_time)
        VALUES ($1, GREATEST($2, 0), 0, NOW(), NOW())
        ON CONFLICT (user_id)
        DO UPDATE SET
            follow_count = GREATEST(follow_count.follow_count + $2, 0),
            update_time = NOW()
        "#,
    )
    .bind(user_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn bump_fans_count(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    delta: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO follow_count (user_id, follow_count, fans_count, create_time, update_time)
        VALUES ($1, 0, GREATEST($2, 0), NOW(), NOW())
        ON CONFLICT (user_id)
        DO UPDATE SET
            fans_count = GREATEST(follow_count.fans_count + $2, 0),
            update_time = NOW()
        "#,
    )
    .bind(user_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl FollowStore for FollowOperation {
    async fn find_edge(
        &self,
        user_id: i64,
        followed_user_id: i64,
    ) -> Result<Option<FollowEntity>, StoreError> {
        let edge = sqlx::query_as::<_, FollowEntity>(&format!(
            "SELECT {FOLLOW_COLUMNS} FROM follow WHERE user_id = $1 AND followed_user_id = $2"
        ))
        .bind(user_id)
        .bind(followed_user_id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(edge)
    }

    async fn follow(
        &self,
        user_id: i64,
        followed_user_id: i64,
    ) -> Result<Option<FollowEntity>, StoreError> {
        let mut tx = self.db.begin().await?;

        // 只有真正发生状态变化时才会返回一行，并发的重复关注在这里被过滤
        let edge = sqlx::query_as::<_, FollowEntity>(&format!(
            r#"
            INSERT INTO follow (user_id, followed_user_id, follow_status, create_time, update_time)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (user_id, followed_user_id)
            DO UPDATE SET follow_status = EXCLUDED.follow_status, update_time = NOW()
            WHERE follow.follow_status <> EXCLUDED.follow_status
            RETURNING {FOLLOW_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(followed_user_id)
        .bind(FollowStatus::Follow as i32)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(edge) = edge else {
            tx.rollback().await?;
            return Ok(None);
        };

        bump_follow_count(&mut tx, user_id, 1).await?;
        bump_fans_count(&mut tx, followed_user_id, 1).await?;
        tx.commit().await?;

        Ok(Some(edge))
    }

    async fn unfollow(&self, user_id: i64, followed_user_id: i64) -> Result<bool, StoreError> {
        let mut tx = self.db.begin().await?;

        let changed = sqlx::query(
            r#"
            UPDATE follow
            SET follow_status = $3, update_time = NOW()
            WHERE user_id = $1 AND followed_user_id = $2 AND follow_status = $4
            "#,
        )
        .bind(user_id)
        .bind(followed_user_id)
        .bind(FollowStatus::Unfollow as i32)
        .bind(FollowStatus::Follow as i32)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if changed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        bump_follow_count(&mut tx, user_id, -1).await?;
        bump_fans_count(&mut tx, followed_user_id, -1).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn following_page(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowEntity>, StoreError> {
        let edges = sqlx::query_as::<_, FollowEntity>(&format!(
            "SELECT {FOLLOW_COLUMNS} FROM follow \
             WHERE user_id = $1 AND follow_status = $2 \
             ORDER BY date_trunc('second', update_time) DESC, \
             followed_user_id::text COLLATE \"C\" DESC OFFSET $3 LIMIT $4"
        ))
        .bind(user_id)
        .bind(FollowStatus::Follow as i32)
        .bind(offset)
        .bind(limit)
        .fetch_all(&*self.db)
        .await?;

        Ok(edges)
    }

    async fn fans_page(
        &self,
        followed_user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowEntity>, StoreError> {
        let edges = sqlx::query_as::<_, FollowEntity>(&format!(
            "SELECT {FOLLOW_COLUMNS} FROM follow \
             WHERE followed_user_id = $1 AND follow_status = $2 \
             ORDER BY date_trunc('second', update_time) DESC, \
             user_id::text COLLATE \"C\" DESC OFFSET $3 LIMIT $4"
        ))
        .bind(followed_user_id)
        .bind(FollowStatus::Follow as i32)
        .bind(offset)
        .bind(limit)
        .fetch_all(&*self.db)
        .await?;

        Ok(edges)
    }

    async fn following_edges(
        &self,
        user_id: i64,
        followed_user_ids: &[i64],
    ) -> Result<Vec<FollowEntity>, StoreError> {
        if followed_user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let edges = sqlx::query_as::<_, FollowEntity>(&format!(
            "SELECT {FOLLOW_COLUMNS} FROM follow \
             WHERE user_id = $1 AND followed_user_id = ANY($2) AND follow_status = $3"
        ))
        .bind(user_id)
        .bind(followed_user_ids)
        .bind(FollowStatus::Follow as i32)
        .fetch_all(&*self.db)
        .await?;

        Ok(edges)
    }

    async fn fans_edges(
        &self,
        followed_user_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<FollowEntity>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let edges = sqlx::query_as::<_, FollowEntity>(&format!(
            "SELECT {FOLLOW_COLUMNS} FROM follow \
             WHERE followed_user_id = $1 AND user_id = ANY($2) AND follow_status = $3"
        ))
        .bind(followed_user_id)
        .bind(user_ids)
        .bind(FollowStatus::Follow as i32)
        .fetch_all(&*self.db)
        .await?;

        Ok(edges)
    }

    async fn counts_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<FollowCountEntity>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let counts = sqlx::query_as::<_, FollowCountEntity>(
            "SELECT user_id, follow_count, fans_count FROM follow_count WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&*self.db)
        .await?;

        Ok(counts)
    }
}
