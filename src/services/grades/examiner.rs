use tracing::info;

use super::GradeService;
use crate::errors::Result;
use crate::models::grades::entities::ExaminerGrade;
use crate::models::grades::requests::{ExaminerGradeRequest, UpsertExaminerGradeRequest};
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::users::entities::Principal;
use crate::services::access::{authorize_paper, load_paper, notify, student_recipients};
use crate::workflow::Operation;
use crate::workflow::grading::validate_score;

pub async fn grade_examiner(
    service: &GradeService,
    principal: &Principal,
    paper_id: i64,
    req: ExaminerGradeRequest,
) -> Result<ExaminerGrade> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    let student = authorize_paper(storage, principal, Operation::GradeExaminer, &paper).await?;

    validate_score("考官评分", req.score)?;

    let grade = storage
        .upsert_examiner_grade(UpsertExaminerGradeRequest {
            paper_id,
            examiner_id: principal.user_id,
            score: req.score,
            feedback: req
                .feedback
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
        })
        .await?;

    info!(
        "Paper {} graded by examiner {}: {}",
        paper_id, principal.user_id, grade.score
    );
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::ExaminerGraded,
            paper_id,
            principal.user_id,
            student_recipients(&student, principal),
            format!("《{}》已由考官评分", paper.title),
        ),
    );
    Ok(grade)
}
