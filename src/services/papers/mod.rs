pub mod chapters;
pub mod detail;
pub mod final_document;
pub mod open;

use std::sync::Arc;

use super::WorkflowSettings;
use crate::errors::Result;
use crate::models::papers::entities::{Chapter, Paper};
use crate::models::papers::requests::{AttachFinalFileRequest, ReviewChapterRequest, ReviewDecision};
use crate::models::papers::responses::PaperDetail;
use crate::models::users::entities::Principal;
use crate::notifications::NotificationSink;
use crate::storage::Storage;

pub struct PaperService {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn NotificationSink>,
    settings: Arc<WorkflowSettings>,
}

impl PaperService {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn NotificationSink>,
        settings: Arc<WorkflowSettings>,
    ) -> Self {
        Self {
            storage,
            notifier,
            settings,
        }
    }

    pub(crate) fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    /// 学员开始写作：已有论文时直接返回，否则按模板创建
    pub async fn open_paper(&self, principal: &Principal, assignment_id: i64) -> Result<Paper> {
        open::open_paper(self, principal, assignment_id).await
    }

    /// 获取论文及展示分数
    pub async fn get_paper(&self, principal: &Principal, paper_id: i64) -> Result<PaperDetail> {
        detail::get_paper(self, principal, paper_id).await
    }

    /// 修改章节内容
    pub async fn update_chapter_content(
        &self,
        principal: &Principal,
        paper_id: i64,
        index: i32,
        content: String,
        version: i64,
    ) -> Result<Chapter> {
        chapters::update_chapter_content(self, principal, paper_id, index, content, version).await
    }

    /// 提交章节供审阅
    pub async fn submit_chapter(
        &self,
        principal: &Principal,
        paper_id: i64,
        index: i32,
        version: i64,
    ) -> Result<Chapter> {
        chapters::submit_chapter(self, principal, paper_id, index, version).await
    }

    /// 审阅章节
    pub async fn review_chapter(
        &self,
        principal: &Principal,
        paper_id: i64,
        index: i32,
        req: ReviewChapterRequest,
    ) -> Result<Chapter> {
        chapters::review_chapter(self, principal, paper_id, index, req).await
    }

    /// 重新打开已通过的章节
    pub async fn reopen_chapter(
        &self,
        principal: &Principal,
        paper_id: i64,
        index: i32,
        comment: Option<String>,
        version: i64,
    ) -> Result<Chapter> {
        chapters::reopen_chapter(self, principal, paper_id, index, comment, version).await
    }

    /// 上传终稿（定稿）
    pub async fn attach_final_file(
        &self,
        principal: &Principal,
        paper_id: i64,
        req: AttachFinalFileRequest,
        version: i64,
    ) -> Result<Paper> {
        final_document::attach_final_file(self, principal, paper_id, req, version).await
    }

    /// 审阅终稿
    pub async fn review_final_document(
        &self,
        principal: &Principal,
        paper_id: i64,
        decision: ReviewDecision,
        version: i64,
    ) -> Result<Paper> {
        final_document::review_final_document(self, principal, paper_id, decision, version).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::errors::SetukpaError;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::models::notifications::entities::NotificationKind;
    use crate::models::papers::entities::{
        ChapterStatus, ContentApprovalStatus, FinalApprovalStatus,
    };
    use crate::models::papers::requests::{
        AttachFinalFileRequest, ReviewChapterRequest, ReviewDecision,
    };
    use crate::services::fixtures::Fixture;

    fn final_file() -> AttachFinalFileRequest {
        AttachFinalFileRequest {
            name: "naskah-final.pdf".into(),
            url: "https://files.example.org/naskah-final.pdf".into(),
            size: 512 * 1024,
        }
    }

    #[tokio::test]
    async fn test_open_paper_creates_draft_structure_once() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let service = fx.papers();

        let paper = service.open_paper(&fx.student, assignment.id).await.unwrap();
        assert_eq!(paper.student_id, fx.student.user_id);
        assert_eq!(
            paper.structure.len(),
            fx.settings.workflow.default_chapters.len()
        );
        assert!(
            paper
                .structure
                .iter()
                .all(|c| c.status == ChapterStatus::Draft && c.content.is_empty())
        );
        assert_eq!(paper.content_approval_status, ContentApprovalStatus::Pending);
        assert_eq!(paper.final_approval_status, FinalApprovalStatus::NotSubmitted);

        let again = service.open_paper(&fx.student, assignment.id).await.unwrap();
        assert_eq!(again.id, paper.id);

        let events = fx.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, NotificationKind::PaperCreated);
        assert_eq!(events[0].recipients, vec![fx.advisor.user_id]);
    }

    #[tokio::test]
    async fn test_open_paper_respects_visibility_and_window() {
        let fx = Fixture::new().await;
        let service = fx.papers();

        let draft = fx
            .assignment(AssignmentStatus::Draft, None, None, None)
            .await;
        let err = service.open_paper(&fx.student, draft.id).await.unwrap_err();
        assert_eq!(err.code(), "E008");

        let other_batch = fx
            .assignment(AssignmentStatus::Published, Some(fx.batch_id + 100), None, None)
            .await;
        let err = service
            .open_paper(&fx.student, other_batch.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E008");

        let missed = fx
            .assignment(
                AssignmentStatus::Published,
                None,
                None,
                Some(Utc::now() - Duration::days(1)),
            )
            .await;
        let err = service.open_paper(&fx.student, missed.id).await.unwrap_err();
        assert!(matches!(err, SetukpaError::InvalidTransition(_)));

        let err = service
            .open_paper(&fx.advisor, missed.id)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_concurrent_chapter_edit_is_stale() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let service = fx.papers();
        let paper = service.open_paper(&fx.student, assignment.id).await.unwrap();
        let read_version = paper.structure[0].version;

        let first = service
            .update_chapter_content(&fx.student, paper.id, 0, "<p>A</p>".into(), read_version)
            .await
            .unwrap();
        assert_eq!(first.version, read_version + 1);

        let err = service
            .update_chapter_content(&fx.student, paper.id, 0, "<p>B</p>".into(), read_version)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");
        assert!(err.is_retryable());

        let detail = service.get_paper(&fx.student, paper.id).await.unwrap();
        assert_eq!(detail.paper.structure[0].content, "<p>A</p>");
        assert!(detail.paper.content.contains('A'));

        // 其它章节的版本不受影响
        let second = service
            .update_chapter_content(
                &fx.student,
                paper.id,
                1,
                "<p>C</p>".into(),
                paper.structure[1].version,
            )
            .await
            .unwrap();
        assert_eq!(second.content, "<p>C</p>");
    }

    #[tokio::test]
    async fn test_chapter_transitions_are_checked() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let service = fx.papers();
        let paper = service.open_paper(&fx.student, assignment.id).await.unwrap();

        let err = service
            .review_chapter(
                &fx.advisor,
                paper.id,
                0,
                ReviewChapterRequest {
                    decision: ReviewDecision::Approve,
                    comment: None,
                    version: paper.structure[0].version,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::InvalidTransition(_)));

        let err = service
            .submit_chapter(&fx.student, paper.id, 9, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::OutOfRange(_)));

        let submitted = service
            .submit_chapter(&fx.student, paper.id, 0, paper.structure[0].version)
            .await
            .unwrap();
        let err = service
            .update_chapter_content(
                &fx.student,
                paper.id,
                0,
                "<p>late</p>".into(),
                submitted.version,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::InvalidTransition(_)));

        let revised = service
            .review_chapter(
                &fx.advisor,
                paper.id,
                0,
                ReviewChapterRequest {
                    decision: ReviewDecision::Revise,
                    comment: Some("Perbaiki latar belakang".into()),
                    version: submitted.version,
                },
            )
            .await
            .unwrap();
        assert_eq!(revised.status, ChapterStatus::Revision);
        assert_eq!(revised.feedback_history.len(), 1);
        assert_eq!(revised.feedback_history[0].author_id, fx.advisor.user_id);

        let detail = service.get_paper(&fx.advisor, paper.id).await.unwrap();
        assert_eq!(
            detail.paper.content_approval_status,
            ContentApprovalStatus::Rejected
        );
    }

    #[tokio::test]
    async fn test_unrelated_users_are_denied() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let service = fx.papers();
        let paper = service.open_paper(&fx.student, assignment.id).await.unwrap();

        let err = service.get_paper(&fx.classmate, paper.id).await.unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));

        let err = service
            .update_chapter_content(&fx.advisor, paper.id, 0, "x".into(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));

        let submitted = service
            .submit_chapter(&fx.student, paper.id, 0, paper.structure[0].version)
            .await
            .unwrap();
        let err = service
            .review_chapter(
                &fx.student,
                paper.id,
                0,
                ReviewChapterRequest {
                    decision: ReviewDecision::Approve,
                    comment: None,
                    version: submitted.version,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));

        // 被分配的考官可以查看
        assert!(service.get_paper(&fx.examiner, paper.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_final_document_requires_complete_content() {
        let fx = Fixture::new().await;
        let assignment = fx.open_assignment().await;
        let service = fx.papers();
        let paper = service.open_paper(&fx.student, assignment.id).await.unwrap();

        let err = service
            .attach_final_file(&fx.student, paper.id, final_file(), paper.version)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::IncompleteContent(_)));

        let err = service
            .review_final_document(&fx.advisor, paper.id, ReviewDecision::Approve, paper.version)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_final_document_lifecycle() {
        let fx = Fixture::new().await;
        let paper = fx.approved_paper().await;
        let service = fx.papers();
        assert_eq!(paper.content_approval_status, ContentApprovalStatus::Approved);

        let mut bad_name = final_file();
        bad_name.name = "naskah.exe".into();
        let err = service
            .attach_final_file(&fx.student, paper.id, bad_name, paper.version)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::Validation(_)));

        let attached = service
            .attach_final_file(&fx.student, paper.id, final_file(), paper.version)
            .await
            .unwrap();
        assert_eq!(attached.final_approval_status, FinalApprovalStatus::Pending);
        assert_eq!(attached.version, paper.version + 1);

        // 使用旧版本号审阅
        let err = service
            .review_final_document(&fx.advisor, paper.id, ReviewDecision::Approve, paper.version)
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let approved = service
            .review_final_document(
                &fx.advisor,
                paper.id,
                ReviewDecision::Approve,
                attached.version,
            )
            .await
            .unwrap();
        assert_eq!(approved.final_approval_status, FinalApprovalStatus::Approved);

        let err = service
            .reopen_chapter(
                &fx.admin,
                paper.id,
                0,
                None,
                approved.structure[0].version,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_reopen_returns_chapter_to_draft() {
        let fx = Fixture::new().await;
        let paper = fx.approved_paper().await;
        let service = fx.papers();

        let reopened = service
            .reopen_chapter(
                &fx.admin,
                paper.id,
                1,
                Some("Tambahkan kesimpulan".into()),
                paper.structure[1].version,
            )
            .await
            .unwrap();
        assert_eq!(reopened.status, ChapterStatus::Draft);
        assert_eq!(reopened.feedback_history.len(), 2);

        let detail = service.get_paper(&fx.student, paper.id).await.unwrap();
        assert_eq!(
            detail.paper.content_approval_status,
            ContentApprovalStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_reopened_chapter_blocks_final_approval() {
        let fx = Fixture::new().await;
        let paper = fx.approved_paper().await;
        let service = fx.papers();

        let attached = service
            .attach_final_file(&fx.student, paper.id, final_file(), paper.version)
            .await
            .unwrap();
        assert_eq!(attached.final_approval_status, FinalApprovalStatus::Pending);

        let reopened = service
            .reopen_chapter(
                &fx.admin,
                paper.id,
                0,
                Some("Lengkapi data".into()),
                attached.structure[0].version,
            )
            .await
            .unwrap();
        assert_eq!(reopened.status, ChapterStatus::Draft);

        let err = service
            .review_final_document(
                &fx.advisor,
                paper.id,
                ReviewDecision::Approve,
                attached.version,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::IncompleteContent(_)));

        let detail = service.get_paper(&fx.advisor, paper.id).await.unwrap();
        assert_eq!(
            detail.paper.final_approval_status,
            FinalApprovalStatus::Pending
        );
        assert_eq!(
            detail.paper.content_approval_status,
            ContentApprovalStatus::Pending
        );

        // 退回终稿仍然可以
        let returned = service
            .review_final_document(
                &fx.advisor,
                paper.id,
                ReviewDecision::Revise,
                attached.version,
            )
            .await
            .unwrap();
        assert_eq!(returned.final_approval_status, FinalApprovalStatus::Rejected);
    }
}
