use tracing::{info, warn};

use super::PaperService;
use crate::errors::{Result, SetukpaError};
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::papers::entities::{FinalApprovalStatus, FinalFile, Paper};
use crate::models::papers::requests::{AttachFinalFileRequest, ReviewDecision};
use crate::models::users::entities::Principal;
use crate::services::access::{
    advisor_recipients, authorize_paper, load_paper, notify, student_recipients,
};
use crate::utils::validate_final_file;
use crate::workflow::Operation;
use crate::workflow::approval::{finalize, review_final};

async fn persist(service: &PaperService, paper: &Paper, version: i64) -> Result<Paper> {
    service
        .storage()
        .update_paper(paper, version)
        .await
        .inspect_err(|e| {
            if e.is_retryable() {
                warn!("Stale write on paper {} (version {})", paper.id, version);
            }
        })
}

pub async fn attach_final_file(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
    req: AttachFinalFileRequest,
    version: i64,
) -> Result<Paper> {
    let storage = service.storage();
    let mut paper = load_paper(storage, paper_id).await?;
    let student =
        authorize_paper(storage, principal, Operation::UploadFinalDocument, &paper).await?;

    let checked = validate_final_file(
        &req.name,
        req.size,
        &service.settings.workflow.final_document,
    );
    if !checked.is_valid {
        return Err(SetukpaError::validation(checked.error_message()));
    }
    if req.url.trim().is_empty() {
        return Err(SetukpaError::validation("终稿地址不能为空"));
    }

    paper.final_approval_status = finalize(&paper.structure, paper.final_approval_status)?;
    paper.final_file = Some(FinalFile {
        name: req.name.trim().to_string(),
        url: req.url,
        size: req.size,
        uploaded_at: chrono::Utc::now(),
    });
    let saved = persist(service, &paper, version).await?;

    info!(
        "Final document attached to paper {} by user {}",
        paper_id, principal.user_id
    );
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::FinalDocumentUploaded,
            paper_id,
            principal.user_id,
            advisor_recipients(&student, principal),
            format!("{} 上传了《{}》的终稿", student.name, saved.title),
        ),
    );
    Ok(saved)
}

pub async fn review_final_document(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
    decision: ReviewDecision,
    version: i64,
) -> Result<Paper> {
    let storage = service.storage();
    let mut paper = load_paper(storage, paper_id).await?;
    let student =
        authorize_paper(storage, principal, Operation::ReviewFinalDocument, &paper).await?;

    paper.final_approval_status = review_final(
        &paper.structure,
        paper.final_approval_status,
        paper.final_file.is_some(),
        decision,
    )?;
    let saved = persist(service, &paper, version).await?;

    info!(
        "Final document of paper {} reviewed by user {}: {}",
        paper_id, principal.user_id, saved.final_approval_status
    );

    let verdict = if saved.final_approval_status == FinalApprovalStatus::Approved {
        "已批准"
    } else {
        "被退回"
    };
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::FinalDocumentReviewed,
            paper_id,
            principal.user_id,
            student_recipients(&student, principal),
            format!("《{}》的终稿{}", saved.title, verdict),
        ),
    );
    Ok(saved)
}
