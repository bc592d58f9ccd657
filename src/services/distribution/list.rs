use tracing::debug;

use super::DistributionService;
use crate::errors::{Result, SetukpaError};
use crate::models::assignments::responses::AssignmentEntry;
use crate::models::users::entities::{Principal, UserRole};
use crate::services::access::{final_score_of, load_user, relation_to_student};
use crate::workflow::distribution::resolve_student_assignments;
use crate::workflow::{Operation, authorize};

pub async fn list_student_assignments(
    service: &DistributionService,
    principal: &Principal,
    student_id: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<AssignmentEntry>> {
    let storage = service.storage();
    let student = load_user(storage, student_id).await?;
    if student.role != UserRole::Siswa {
        return Err(SetukpaError::validation(format!(
            "用户 {student_id} 不是学员"
        )));
    }

    let relation = relation_to_student(storage, principal, &student).await?;
    authorize(principal, Operation::ViewPaper, &relation)?;

    let assignments = storage.list_assignments().await?;
    let papers = storage.list_papers_by_student(student_id).await?;

    let mut scored = Vec::with_capacity(papers.len());
    for paper in papers {
        let score = final_score_of(storage, &paper).await?;
        scored.push((paper, score));
    }

    let entries = resolve_student_assignments(&student, &assignments, scored, now)?;
    debug!(
        "Resolved {} assignments for student {}",
        entries.len(),
        student_id
    );
    Ok(entries)
}
