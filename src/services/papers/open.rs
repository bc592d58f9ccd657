use tracing::{debug, info};

use super::PaperService;
use crate::errors::{Result, SetukpaError};
use crate::models::assignments::responses::AssignmentLifecycleStatus;
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::papers::entities::Paper;
use crate::models::papers::requests::CreatePaperRequest;
use crate::models::users::entities::Principal;
use crate::services::access::{advisor_recipients, load_user, notify};
use crate::workflow::chapter::initialize_structure;
use crate::workflow::distribution::{is_visible, time_status};
use crate::workflow::{Operation, PaperRelation, authorize};

pub async fn open_paper(
    service: &PaperService,
    principal: &Principal,
    assignment_id: i64,
) -> Result<Paper> {
    let storage = service.storage();

    // 只能为自己开题
    authorize(
        principal,
        Operation::OpenPaper,
        &PaperRelation {
            is_owner: true,
            ..Default::default()
        },
    )?;

    if let Some(existing) = storage
        .get_paper_by_assignment_and_student(assignment_id, principal.user_id)
        .await?
    {
        debug!(
            "Paper {} already exists for assignment {} / student {}",
            existing.id, assignment_id, principal.user_id
        );
        return Ok(existing);
    }

    let student = load_user(storage, principal.user_id).await?;
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| SetukpaError::not_found(format!("任务 {assignment_id} 不存在")))?;

    if !is_visible(&assignment, &student) {
        return Err(SetukpaError::not_found(format!(
            "任务 {assignment_id} 对该学员不可见"
        )));
    }
    match time_status(&assignment, chrono::Utc::now()) {
        AssignmentLifecycleStatus::Scheduled => {
            return Err(SetukpaError::invalid_transition("任务尚未开放"));
        }
        AssignmentLifecycleStatus::Missed => {
            return Err(SetukpaError::invalid_transition("任务已过截止时间"));
        }
        _ => {}
    }

    let template = match assignment.template_id {
        Some(template_id) => storage.get_template_by_id(template_id).await?,
        None => None,
    };
    let structure = initialize_structure(
        template.as_ref(),
        &service.settings.workflow.default_chapters,
    );

    let req = CreatePaperRequest {
        student_id: student.id,
        assignment_id,
        title: assignment.title.clone(),
        subject: assignment.subject.clone(),
        structure,
    };

    let paper = match storage.create_paper(req).await {
        Ok(paper) => paper,
        // 并发开题时另一个请求已经创建
        Err(SetukpaError::Conflict(_)) => storage
            .get_paper_by_assignment_and_student(assignment_id, student.id)
            .await?
            .ok_or_else(|| SetukpaError::database_operation("论文冲突后无法读取"))?,
        Err(e) => return Err(e),
    };

    info!(
        "Paper {} opened by student {} for assignment {} ({} chapters)",
        paper.id,
        student.id,
        assignment_id,
        paper.structure.len()
    );

    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::PaperCreated,
            paper.id,
            principal.user_id,
            advisor_recipients(&student, principal),
            format!("{} 开始撰写《{}》", student.name, paper.title),
        ),
    );

    Ok(paper)
}
