//! Fan-out de notificaciones
//!
//! Dado una transición ya confirmada, decide a qué usuarios o roles
//! notificar. El envío es best-effort: corre después del commit de la
//! transacción primaria y sus fallos se loguean, nunca se propagan ni
//! causan rollback.

use async_trait::async_trait;
use futures::future::join_all;
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::models::user::UserRole;
use crate::repositories::notification_repository::NotificationRepository;
use crate::utils::errors::{AppError, AppResult};

/// Destinatario de una notificación pendiente de despacho
#[derive(Debug, Clone)]
pub enum Recipient {
    User(Uuid),
    Role(UserRole),
}

/// Notificación decidida por un servicio de workflow, aún sin enviar
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub recipient: Recipient,
    pub notification_type: &'static str,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

impl NotificationDraft {
    pub fn for_user(
        user_id: Uuid,
        notification_type: &'static str,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            recipient: Recipient::User(user_id),
            notification_type,
            title: title.into(),
            message: message.into(),
            link,
        }
    }

    pub fn for_role(
        role: UserRole,
        notification_type: &'static str,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            recipient: Recipient::Role(role),
            notification_type,
            title: title.into(),
            message: message.into(),
            link,
        }
    }
}

/// Sumidero de notificaciones consumido por los servicios de workflow
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_user(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<()>;

    async fn notify_role(
        &self,
        role: UserRole,
        notification_type: &str,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<()>;

    /// Despacho best-effort de un lote de borradores. Los errores se
    /// loguean y se descartan; la operación primaria ya quedó confirmada.
    async fn dispatch(&self, drafts: Vec<NotificationDraft>) {
        let sends = drafts.into_iter().map(|draft| async move {
            let result = match draft.recipient {
                Recipient::User(user_id) => {
                    self.notify_user(
                        user_id,
                        draft.notification_type,
                        &draft.title,
                        &draft.message,
                        draft.link.as_deref(),
                    )
                    .await
                }
                Recipient::Role(role) => {
                    self.notify_role(
                        role,
                        draft.notification_type,
                        &draft.title,
                        &draft.message,
                        draft.link.as_deref(),
                    )
                    .await
                }
            };

            if let Err(e) = result {
                tracing::warn!(
                    "Fallo al despachar notificación '{}': {}",
                    draft.notification_type,
                    e
                );
            }
        });

        join_all(sends).await;
    }
}

/// Implementación respaldada por la tabla de notificaciones
pub struct NotificationService {
    repository: NotificationRepository,
}

impl NotificationService {
    pub fn new(repository: NotificationRepository) -> Self {
        Self { repository }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        self.repository.list_for_user(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        self.repository
            .mark_read(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification with id '{}' not found", id)))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        self.repository.mark_all_read(user_id).await
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn notify_user(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<()> {
        self.repository
            .insert_for_user(user_id, notification_type, title, message, link)
            .await?;
        Ok(())
    }

    async fn notify_role(
        &self,
        role: UserRole,
        notification_type: &str,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<()> {
        let delivered = self
            .repository
            .insert_for_role(role, notification_type, title, message, link)
            .await?;
        tracing::debug!(
            "Notificación '{}' entregada a {} usuarios con rol {:?}",
            notification_type,
            delivered,
            role
        );
        Ok(())
    }
}
