pub mod list;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::notifications::responses::NotificationListResponse;
use crate::models::users::entities::Principal;
use crate::storage::Storage;

pub struct NotificationService {
    storage: Arc<dyn Storage>,
}

impl NotificationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub(crate) fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// 调用者自己的通知
    pub async fn list_notifications(
        &self,
        principal: &Principal,
    ) -> Result<NotificationListResponse> {
        list::list_notifications(self, principal).await
    }

    /// 标记通知为已读
    pub async fn mark_read(&self, principal: &Principal, notification_id: i64) -> Result<()> {
        list::mark_read(self, principal, notification_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::NotificationService;
    use crate::errors::SetukpaError;
    use crate::models::notifications::entities::NotificationKind;
    use crate::models::papers::entities::ChapterStatus;
    use crate::models::papers::requests::{ReviewChapterRequest, ReviewDecision};
    use crate::runtime::lifetime::{shutdown::shutdown, startup::StartupContext};
    use crate::services::WorkflowSettings;
    use crate::services::fixtures::{ClosedSink, Fixture};

    #[tokio::test]
    async fn test_workflow_events_become_notifications() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let context = StartupContext::new(fx.storage.clone(), WorkflowSettings::default(), true);

        {
            let papers = context.paper_service();
            let paper = papers.open_paper(&fx.student, assignment.id).await.unwrap();
            let submitted = papers
                .submit_chapter(&fx.student, paper.id, 0, paper.structure[0].version)
                .await
                .unwrap();
            papers
                .review_chapter(
                    &fx.advisor,
                    paper.id,
                    0,
                    ReviewChapterRequest {
                        decision: ReviewDecision::Revise,
                        comment: Some("Kurang referensi".into()),
                        version: submitted.version,
                    },
                )
                .await
                .unwrap();
        }
        let service = context.notification_service();
        shutdown(context).await;

        let advisor_inbox = service.list_notifications(&fx.advisor).await.unwrap();
        let kinds: Vec<_> = advisor_inbox.items.iter().map(|n| n.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&NotificationKind::PaperCreated));
        assert!(kinds.contains(&NotificationKind::ChapterSubmitted));
        assert_eq!(advisor_inbox.unread_count, 2);

        let student_inbox = service.list_notifications(&fx.student).await.unwrap();
        assert_eq!(student_inbox.items.len(), 1);
        assert_eq!(student_inbox.items[0].kind, NotificationKind::ChapterRevision);

        let first = advisor_inbox.items[0].id;
        service.mark_read(&fx.advisor, first).await.unwrap();
        let advisor_inbox = service.list_notifications(&fx.advisor).await.unwrap();
        assert_eq!(advisor_inbox.unread_count, 1);

        // 不能标记别人的通知
        let err = service.mark_read(&fx.student, first).await.unwrap_err();
        assert!(matches!(err, SetukpaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_disabled_notifications_store_nothing() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let context = StartupContext::new(fx.storage.clone(), WorkflowSettings::default(), false);

        context
            .paper_service()
            .open_paper(&fx.student, assignment.id)
            .await
            .unwrap();
        let service = context.notification_service();
        shutdown(context).await;

        let inbox = service.list_notifications(&fx.advisor).await.unwrap();
        assert!(inbox.items.is_empty());
        assert_eq!(inbox.unread_count, 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_completed_operation() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let papers = fx.papers_with(Arc::new(ClosedSink));

        // 开题会通知指导老师，投递失败不影响结果
        let paper = papers.open_paper(&fx.student, assignment.id).await.unwrap();
        let submitted = papers
            .submit_chapter(&fx.student, paper.id, 0, paper.structure[0].version)
            .await
            .unwrap();
        assert_eq!(submitted.status, ChapterStatus::Submitted);

        let stored = fx.storage.get_paper_by_id(paper.id).await.unwrap().unwrap();
        assert_eq!(stored.structure[0].status, ChapterStatus::Submitted);
        assert_eq!(stored.structure[0].version, submitted.version);

        let inbox = NotificationService::new(fx.storage.clone())
            .list_notifications(&fx.advisor)
            .await
            .unwrap();
        assert!(inbox.items.is_empty());
    }
}
