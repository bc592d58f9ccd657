use tracing::{debug, info, warn};

use super::GradeService;
use crate::errors::Result;
use crate::models::grades::entities::FinalScore;
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::papers::responses::PaperDetail;
use crate::models::users::entities::Principal;
use crate::services::access::{
    authorize_paper, final_score_of, load_paper, notify, student_recipients,
};
use crate::workflow::Operation;
use crate::workflow::grading::validate_score;

pub async fn override_grade(
    service: &GradeService,
    principal: &Principal,
    paper_id: i64,
    grade: Option<f64>,
    version: i64,
) -> Result<PaperDetail> {
    let storage = service.storage();
    let mut paper = load_paper(storage, paper_id).await?;
    let student = authorize_paper(storage, principal, Operation::OverrideGrade, &paper).await?;

    if let Some(score) = grade {
        validate_score("覆盖分数", score)?;
    }
    paper.grade = grade;

    let paper = storage
        .update_paper(&paper, version)
        .await
        .inspect_err(|e| {
            if e.is_retryable() {
                warn!("Stale write on paper {} (version {})", paper_id, version);
            }
        })?;

    info!(
        "Paper {} override grade set to {:?} by user {}",
        paper_id, paper.grade, principal.user_id
    );
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::GradeOverridden,
            paper_id,
            principal.user_id,
            student_recipients(&student, principal),
            format!("《{}》的成绩已更新", paper.title),
        ),
    );

    let final_score = final_score_of(storage, &paper).await?;
    Ok(PaperDetail { paper, final_score })
}

pub async fn final_score(
    service: &GradeService,
    principal: &Principal,
    paper_id: i64,
) -> Result<FinalScore> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    authorize_paper(storage, principal, Operation::ViewPaper, &paper).await?;

    let score = final_score_of(storage, &paper).await?;
    debug!(
        "Final score of paper {}: {:?} from {:?}",
        paper_id, score.score, score.source
    );
    Ok(score)
}
