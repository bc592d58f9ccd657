use tracing::debug;

use super::NotificationService;
use crate::errors::{Result, SetukpaError};
use crate::models::notifications::responses::NotificationListResponse;
use crate::models::users::entities::Principal;

pub async fn list_notifications(
    service: &NotificationService,
    principal: &Principal,
) -> Result<NotificationListResponse> {
    let items = service
        .storage()
        .list_notifications_by_user(principal.user_id)
        .await?;
    let unread_count = items.iter().filter(|n| !n.is_read).count() as i64;

    debug!(
        "User {} has {} notifications ({} unread)",
        principal.user_id,
        items.len(),
        unread_count
    );
    Ok(NotificationListResponse {
        items,
        unread_count,
    })
}

pub async fn mark_read(
    service: &NotificationService,
    principal: &Principal,
    notification_id: i64,
) -> Result<()> {
    let updated = service
        .storage()
        .mark_notification_as_read(notification_id, principal.user_id)
        .await?;
    if updated {
        Ok(())
    } else {
        Err(SetukpaError::not_found(format!(
            "通知 {notification_id} 不存在"
        )))
    }
}
