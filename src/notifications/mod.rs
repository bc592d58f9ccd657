//! 工作流通知
//!
//! 服务层在状态变化后发布 `WorkflowEvent`。`publish` 是同步且不阻塞的，
//! 事件经 mpsc 通道交给后台任务写入通知表；投递失败只记录日志，不影响已完成的操作。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{Result, SetukpaError};
use crate::models::notifications::entities::{CreateNotificationRequest, WorkflowEvent};
use crate::storage::Storage;

pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: WorkflowEvent) -> Result<()>;
}

/// 关闭通知时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotificationSink;

impl NotificationSink for NoopNotificationSink {
    fn publish(&self, event: WorkflowEvent) -> Result<()> {
        debug!("Notifications disabled, dropping {} event", event.kind);
        Ok(())
    }
}

/// 通过后台任务持久化通知
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl NotificationDispatcher {
    /// 启动后台任务。所有发送端被丢弃后任务自行结束
    pub fn spawn(storage: Arc<dyn Storage>) -> (Arc<Self>, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WorkflowEvent>();

        let handle = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                deliver(storage.as_ref(), event).await;
            }
            debug!("Notification dispatcher stopped");
        });

        (Arc::new(Self { sender }), handle)
    }
}

impl NotificationSink for NotificationDispatcher {
    fn publish(&self, event: WorkflowEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|e| {
                SetukpaError::notification_delivery(format!("通知队列已关闭: {}", e.0.kind))
            })
    }
}

async fn deliver(storage: &dyn Storage, event: WorkflowEvent) {
    for user_id in &event.recipients {
        let req = CreateNotificationRequest {
            user_id: *user_id,
            paper_id: Some(event.paper_id),
            kind: event.kind,
            message: event.message.clone(),
        };
        match storage.create_notification(req).await {
            Ok(n) => debug!("Notification {} delivered to user {}", n.id, user_id),
            Err(e) => warn!(
                "Failed to persist {} notification for user {}: {}",
                event.kind, user_id, e
            ),
        }
    }
}
