use tracing::{debug, info};

use super::DistributionService;
use crate::errors::{Result, SetukpaError};
use crate::models::assignments::entities::AssignmentStatus;
use crate::models::assignments::responses::ProvisionSummary;
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::papers::requests::CreatePaperRequest;
use crate::models::users::entities::Principal;
use crate::services::access::notify;
use crate::workflow::chapter::initialize_structure;
use crate::workflow::{Operation, authorize_global};

pub async fn provision_assignment(
    service: &DistributionService,
    principal: &Principal,
    assignment_id: i64,
) -> Result<ProvisionSummary> {
    authorize_global(principal, Operation::ProvisionPapers)?;
    let storage = service.storage();

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| SetukpaError::not_found(format!("任务 {assignment_id} 不存在")))?;
    if assignment.status == AssignmentStatus::Draft {
        return Err(SetukpaError::invalid_transition("草稿任务不能分发"));
    }

    let template = match assignment.template_id {
        Some(template_id) => storage.get_template_by_id(template_id).await?,
        None => None,
    };

    // 未指定批次的任务适用于所有学员
    let students = storage.list_students(assignment.batch_id).await?;
    let mut created = Vec::new();
    let mut skipped_existing = 0;

    for student in students {
        if storage
            .get_paper_by_assignment_and_student(assignment_id, student.id)
            .await?
            .is_some()
        {
            skipped_existing += 1;
            continue;
        }

        let req = CreatePaperRequest {
            student_id: student.id,
            assignment_id,
            title: assignment.title.clone(),
            subject: assignment.subject.clone(),
            structure: initialize_structure(
                template.as_ref(),
                &service.settings.workflow.default_chapters,
            ),
        };
        let paper = match storage.create_paper(req).await {
            Ok(paper) => paper,
            Err(SetukpaError::Conflict(_)) => {
                debug!(
                    "Paper for student {} created concurrently, skipping",
                    student.id
                );
                skipped_existing += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        notify(
            service.notifier(),
            WorkflowEvent::new(
                NotificationKind::PaperCreated,
                paper.id,
                principal.user_id,
                vec![student.id],
                format!("新任务《{}》已分发", assignment.title),
            ),
        );
        created.push(paper.id);
    }

    info!(
        "Assignment {} provisioned by user {}: {} created, {} existing",
        assignment_id,
        principal.user_id,
        created.len(),
        skipped_existing
    );

    Ok(ProvisionSummary {
        assignment_id,
        created,
        skipped_existing,
    })
}
