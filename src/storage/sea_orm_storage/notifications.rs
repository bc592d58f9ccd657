//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::Column;
use crate::entity::prelude::*;
use crate::errors::{Result, SetukpaError};
use crate::models::notifications::entities::{CreateNotificationRequest, Notification};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建通知
    pub async fn create_notification_impl(
        &self,
        req: CreateNotificationRequest,
    ) -> Result<Notification> {
        let model = NotificationActiveModel {
            user_id: Set(req.user_id),
            paper_id: Set(req.paper_id),
            kind: Set(req.kind.to_string()),
            message: Set(req.message),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("创建通知失败: {e}")))?;

        Ok(result.into_notification())
    }

    /// 列出用户的通知，最新的在前
    pub async fn list_notifications_by_user_impl(&self, user_id: i64) -> Result<Vec<Notification>> {
        let rows = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_notification()).collect())
    }

    /// 标记通知为已读，只能标记自己的通知
    pub async fn mark_notification_as_read_impl(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(notification_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
