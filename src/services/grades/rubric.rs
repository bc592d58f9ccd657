use tracing::info;

use super::GradeService;
use crate::errors::Result;
use crate::models::grades::entities::Grade;
use crate::models::grades::requests::{RubricGradeRequest, UpsertGradeRequest};
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::users::entities::Principal;
use crate::services::access::{authorize_paper, load_paper, notify, student_recipients};
use crate::workflow::Operation;
use crate::workflow::grading::advisor_final_score;

pub async fn grade_rubric(
    service: &GradeService,
    principal: &Principal,
    paper_id: i64,
    req: RubricGradeRequest,
) -> Result<Grade> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    let student = authorize_paper(storage, principal, Operation::GradeRubric, &paper).await?;

    let final_score = advisor_final_score(&req.scores, &service.settings.grading.rubric)?;
    let feedback = req
        .advisor_feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());

    let grade = storage
        .upsert_grade(UpsertGradeRequest {
            paper_id,
            advisor_id: principal.user_id,
            scores: req.scores,
            final_score,
            advisor_feedback: feedback,
        })
        .await?;

    info!(
        "Paper {} graded by advisor {}: {}",
        paper_id, principal.user_id, grade.final_score
    );
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::AdvisorGraded,
            paper_id,
            principal.user_id,
            student_recipients(&student, principal),
            format!("《{}》已由指导老师评分", paper.title),
        ),
    );
    Ok(grade)
}
