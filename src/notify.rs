// src/notify.rs

use std::sync::Arc;
use tracing::info;

use crate::error::CoreError;
use crate::models::{Notification, User};
use crate::store::NotificationSink;

// Fan-out helper over the notification sink: one message, many
// recipients, each with their own cleared flag.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub async fn create_and_notify(
        &self,
        msg: &str,
        users: &[User],
    ) -> Result<Notification, CoreError> {
        let notification = self.sink.create(msg).await?;
        for user in users {
            self.sink.notify_user(user.id, notification.id).await?;
        }
        info!(recipients = users.len(), "notification sent: {}", msg);
        Ok(notification)
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<Notification>, CoreError> {
        self.sink.get_for_user(user_id).await
    }

    pub async fn clear(&self, user_id: i64, notification_id: i64) -> Result<(), CoreError> {
        self.sink.clear(user_id, notification_id).await
    }

    pub async fn clear_all(&self, user_id: i64) -> Result<(), CoreError> {
        self.sink.clear_all(user_id).await
    }
}
