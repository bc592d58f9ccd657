pub mod examiner;
pub mod overview;
pub mod rubric;

use std::sync::Arc;

use super::WorkflowSettings;
use crate::errors::Result;
use crate::models::grades::entities::{ExaminerGrade, FinalScore, Grade};
use crate::models::grades::requests::{ExaminerGradeRequest, RubricGradeRequest};
use crate::models::papers::responses::PaperDetail;
use crate::models::users::entities::Principal;
use crate::notifications::NotificationSink;
use crate::storage::Storage;

pub struct GradeService {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn NotificationSink>,
    settings: Arc<WorkflowSettings>,
}

impl GradeService {
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

    /// 指导老师按评分细则打分
    pub async fn grade_rubric(
        &self,
        principal: &Principal,
        paper_id: i64,
        req: RubricGradeRequest,
    ) -> Result<Grade> {
        rubric::grade_rubric(self, principal, paper_id, req).await
    }

    /// 考官打分
    pub async fn grade_examiner(
        &self,
        principal: &Principal,
        paper_id: i64,
        req: ExaminerGradeRequest,
    ) -> Result<ExaminerGrade> {
        examiner::grade_examiner(self, principal, paper_id, req).await
    }

    /// 设置或清除覆盖分数
    pub async fn override_grade(
        &self,
        principal: &Principal,
        paper_id: i64,
        grade: Option<f64>,
        version: i64,
    ) -> Result<PaperDetail> {
        overview::override_grade(self, principal, paper_id, grade, version).await
    }

    /// 计算展示分数
    pub async fn final_score(&self, principal: &Principal, paper_id: i64) -> Result<FinalScore> {
        overview::final_score(self, principal, paper_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::SetukpaError;
    use crate::models::grades::entities::{RubricScores, ScoreSource};
    use crate::models::grades::requests::{ExaminerGradeRequest, RubricGradeRequest};
    use crate::models::notifications::entities::NotificationKind;
    use crate::services::fixtures::Fixture;

    fn rubric(content: f64, structure: f64, language: f64, format: f64) -> RubricGradeRequest {
        RubricGradeRequest {
            scores: RubricScores {
                content,
                structure,
                language,
                format,
            },
            advisor_feedback: Some("  Baik  ".into()),
        }
    }

    fn examiner_score(score: f64) -> ExaminerGradeRequest {
        ExaminerGradeRequest {
            score,
            feedback: None,
        }
    }

    #[tokio::test]
    async fn test_rubric_total_is_sum_of_components() {
        let fx = Fixture::new().await;
        let paper = fx.approved_paper().await;
        let service = fx.grades();

        let grade = service
            .grade_rubric(&fx.advisor, paper.id, rubric(30.0, 25.0, 17.0, 10.0))
            .await
            .unwrap();
        assert_eq!(grade.final_score, 82.0);
        assert_eq!(grade.advisor_feedback.as_deref(), Some("Baik"));

        // 再次评分覆盖原记录
        let regraded = service
            .grade_rubric(&fx.advisor, paper.id, rubric(20.0, 20.0, 20.0, 20.0))
            .await
            .unwrap();
        assert_eq!(regraded.id, grade.id);
        assert_eq!(regraded.final_score, 80.0);

        let err = service
            .grade_rubric(&fx.advisor, paper.id, rubric(30.0, 25.0, 21.0, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::ScoreRange(_)));

        let kinds: Vec<_> = fx.sink.events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds.iter().filter(|k| **k == NotificationKind::AdvisorGraded).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_final_score_precedence() {
        let fx = Fixture::new().await;
        let paper = fx.approved_paper().await;
        let service = fx.grades();

        let score = service.final_score(&fx.student, paper.id).await.unwrap();
        assert_eq!(score.score, None);
        assert_eq!(score.source, ScoreSource::None);

        service
            .grade_examiner(&fx.examiner, paper.id, examiner_score(70.0))
            .await
            .unwrap();
        service
            .grade_examiner(&fx.second_examiner, paper.id, examiner_score(90.0))
            .await
            .unwrap();
        let score = service.final_score(&fx.student, paper.id).await.unwrap();
        assert_eq!(score.score, Some(80.0));
        assert_eq!(score.source, ScoreSource::Examiner);
        assert_eq!(score.examiner_count, 2);

        service
            .grade_rubric(&fx.advisor, paper.id, rubric(30.0, 25.0, 20.0, 10.0))
            .await
            .unwrap();
        let score = service.final_score(&fx.student, paper.id).await.unwrap();
        assert_eq!(score.score, Some(85.0));
        assert_eq!(score.source, ScoreSource::Advisor);
        assert_eq!(score.examiner_score, Some(80.0));

        let detail = service
            .override_grade(&fx.examiner, paper.id, Some(80.0), paper.version)
            .await
            .unwrap();
        assert_eq!(detail.paper.grade, Some(80.0));
        assert_eq!(detail.final_score.score, Some(80.0));
        assert_eq!(detail.final_score.source, ScoreSource::Override);

        // 清除覆盖分数后回到指导老师评分
        let cleared = service
            .override_grade(&fx.admin, paper.id, None, detail.paper.version)
            .await
            .unwrap();
        assert_eq!(cleared.final_score.source, ScoreSource::Advisor);
        assert_eq!(cleared.final_score.score, Some(85.0));
    }

    #[tokio::test]
    async fn test_grading_permissions_and_ranges() {
        let fx = Fixture::new().await;
        let paper = fx.approved_paper().await;
        let service = fx.grades();

        let err = service
            .grade_examiner(&fx.advisor, paper.id, examiner_score(75.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));

        let err = service
            .grade_rubric(&fx.student, paper.id, rubric(1.0, 1.0, 1.0, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));

        let err = service
            .grade_examiner(&fx.examiner, paper.id, examiner_score(100.5))
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::ScoreRange(_)));

        let err = service
            .override_grade(&fx.examiner, paper.id, Some(-1.0), paper.version)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::ScoreRange(_)));

        let err = service
            .override_grade(&fx.examiner, paper.id, Some(90.0), paper.version + 7)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");

        let err = service.final_score(&fx.classmate, paper.id).await.unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));
    }
}
