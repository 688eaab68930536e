//! Repositorio de notificaciones
//!
//! Las escrituras corren fuera de la transacción primaria del workflow
//! (post-commit): usan el pool directamente.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::models::user::UserRole;
use crate::utils::errors::AppError;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_for_user(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, title, message, link, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(notification_type)
        .bind(title)
        .bind(message)
        .bind(link)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Fan-out por rol: una fila por usuario activo con el rol
    pub async fn insert_for_role(
        &self,
        role: UserRole,
        notification_type: &str,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, title, message, link, read, created_at)
            SELECT gen_random_uuid(), id, $2, $3, $4, $5, FALSE, $6
            FROM users
            WHERE role = $1 AND active
            "#,
        )
        .bind(role)
        .bind(notification_type)
        .bind(title)
        .bind(message)
        .bind(link)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
