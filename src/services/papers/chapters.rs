use tracing::{info, warn};

use super::PaperService;
use crate::errors::{Result, SetukpaError};
use crate::models::notifications::entities::{NotificationKind, WorkflowEvent};
use crate::models::papers::entities::{Chapter, FinalApprovalStatus};
use crate::models::papers::requests::{ReviewChapterRequest, ReviewDecision};
use crate::models::users::entities::Principal;
use crate::services::access::{
    advisor_recipients, authorize_paper, load_paper, notify, student_recipients,
};
use crate::workflow::approval::apply_transition;
use crate::workflow::chapter::{self, chapter_at};
use crate::workflow::{ChapterAction, Operation};

/// 写入章节，版本冲突时记录日志
async fn persist(
    service: &PaperService,
    paper_id: i64,
    updated: &Chapter,
    version: i64,
) -> Result<Chapter> {
    service
        .storage()
        .update_chapter(paper_id, updated, version)
        .await
        .inspect_err(|e| {
            if e.is_retryable() {
                warn!(
                    "Stale write on paper {} chapter {} (version {})",
                    paper_id, updated.index, version
                );
            }
        })
}

pub async fn update_chapter_content(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
    index: i32,
    content: String,
    version: i64,
) -> Result<Chapter> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    authorize_paper(storage, principal, Operation::EditChapter, &paper).await?;

    let updated = chapter::update_chapter_content(&paper.structure, index, content)?;
    let saved = persist(service, paper_id, &updated, version).await?;

    info!(
        "Chapter {} of paper {} edited by user {} (version {})",
        index, paper_id, principal.user_id, saved.version
    );
    Ok(saved)
}

pub async fn submit_chapter(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
    index: i32,
    version: i64,
) -> Result<Chapter> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    let student = authorize_paper(storage, principal, Operation::SubmitChapter, &paper).await?;

    let current = chapter_at(&paper.structure, index)?;
    let updated = apply_transition(current, ChapterAction::Submit, principal, None)?;
    let saved = persist(service, paper_id, &updated, version).await?;

    info!(
        "Chapter {} of paper {} submitted by user {}",
        index, paper_id, principal.user_id
    );
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::ChapterSubmitted,
            paper_id,
            principal.user_id,
            advisor_recipients(&student, principal),
            format!("{} 提交了《{}》的「{}」", student.name, paper.title, saved.title),
        ),
    );
    Ok(saved)
}

pub async fn review_chapter(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
    index: i32,
    req: ReviewChapterRequest,
) -> Result<Chapter> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    let student = authorize_paper(storage, principal, Operation::ReviewChapter, &paper).await?;

    let current = chapter_at(&paper.structure, index)?;
    let updated = apply_transition(
        current,
        ChapterAction::Review(req.decision),
        principal,
        req.comment.as_deref(),
    )?;
    let saved = persist(service, paper_id, &updated, req.version).await?;

    info!(
        "Chapter {} of paper {} reviewed by user {}: {}",
        index, paper_id, principal.user_id, saved.status
    );

    let (kind, verdict) = match req.decision {
        ReviewDecision::Approve => (NotificationKind::ChapterApproved, "已通过"),
        ReviewDecision::Revise => (NotificationKind::ChapterRevision, "需要修改"),
    };
    notify(
        service.notifier(),
        WorkflowEvent::new(
            kind,
            paper_id,
            principal.user_id,
            student_recipients(&student, principal),
            format!("《{}》的「{}」{}", paper.title, saved.title, verdict),
        ),
    );
    Ok(saved)
}

pub async fn reopen_chapter(
    service: &PaperService,
    principal: &Principal,
    paper_id: i64,
    index: i32,
    comment: Option<String>,
    version: i64,
) -> Result<Chapter> {
    let storage = service.storage();
    let paper = load_paper(storage, paper_id).await?;
    let student = authorize_paper(storage, principal, Operation::ReopenChapter, &paper).await?;

    // 终稿已批准后内容冻结
    if paper.final_approval_status == FinalApprovalStatus::Approved {
        return Err(SetukpaError::invalid_transition(
            "终稿已批准，不能重新打开章节",
        ));
    }

    let current = chapter_at(&paper.structure, index)?;
    let updated = apply_transition(
        current,
        ChapterAction::Reopen,
        principal,
        comment.as_deref(),
    )?;
    let saved = persist(service, paper_id, &updated, version).await?;

    info!(
        "Chapter {} of paper {} reopened by user {}",
        index, paper_id, principal.user_id
    );
    notify(
        service.notifier(),
        WorkflowEvent::new(
            NotificationKind::ChapterReopened,
            paper_id,
            principal.user_id,
            student_recipients(&student, principal),
            format!("《{}》的「{}」已重新打开", paper.title, saved.title),
        ),
    );
    Ok(saved)
}
