//! DTOs de notificaciones

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::notification::Notification;

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            notification_type: notification.notification_type,
            title: notification.title,
            message: notification.message,
            link: notification.link,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}
