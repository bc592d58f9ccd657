//! 审批状态机
//!
//! 章节：DRAFT -> SUBMITTED -> {APPROVED | REVISION}，REVISION -> SUBMITTED 重新提交，
//! APPROVED 只能由管理员重新打开回到 DRAFT。
//! 论文内容状态由章节状态汇总得出；终稿状态在上传终稿后单独流转。

use crate::errors::{Result, SetukpaError};
use crate::models::papers::entities::{
    Chapter, ChapterStatus, ContentApprovalStatus, FeedbackEntry, FinalApprovalStatus,
};
use crate::models::papers::requests::ReviewDecision;
use crate::models::users::entities::Principal;

/// 章节上的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterAction {
    Submit,
    Review(ReviewDecision),
    Reopen,
}

impl std::fmt::Display for ChapterAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChapterAction::Submit => write!(f, "submit"),
            ChapterAction::Review(ReviewDecision::Approve) => write!(f, "approve"),
            ChapterAction::Review(ReviewDecision::Revise) => write!(f, "revise"),
            ChapterAction::Reopen => write!(f, "reopen"),
        }
    }
}

/// 计算动作后的章节状态，非法迁移返回 InvalidTransition
pub fn next_status(current: ChapterStatus, action: ChapterAction) -> Result<ChapterStatus> {
    use ChapterStatus::*;

    match (current, action) {
        (Draft | Revision, ChapterAction::Submit) => Ok(Submitted),
        (Submitted, ChapterAction::Review(ReviewDecision::Approve)) => Ok(Approved),
        (Submitted, ChapterAction::Review(ReviewDecision::Revise)) => Ok(Revision),
        (Approved, ChapterAction::Reopen) => Ok(Draft),
        (from, action) => Err(SetukpaError::invalid_transition(format!(
            "章节状态 {from} 不允许执行 {action}"
        ))),
    }
}

/// 对章节执行动作，有评语时追加一条审阅记录
pub fn apply_transition(
    chapter: &Chapter,
    action: ChapterAction,
    actor: &Principal,
    comment: Option<&str>,
) -> Result<Chapter> {
    let status = next_status(chapter.status, action)?;
    let now = chrono::Utc::now();

    let mut updated = chapter.clone();
    updated.status = status;
    updated.updated_at = now;

    if let Some(text) = comment.map(str::trim).filter(|t| !t.is_empty()) {
        updated.feedback_history.push(FeedbackEntry {
            author_id: actor.user_id,
            author_role: actor.role,
            text: text.to_string(),
            created_at: now,
        });
    }

    Ok(updated)
}

/// 汇总章节状态得到论文内容审批状态
///
/// 全部章节通过才是 APPROVED；任一章节需修改为 REJECTED；其余为 PENDING。
pub fn content_approval_status(structure: &[Chapter]) -> ContentApprovalStatus {
    if structure.is_empty() {
        return ContentApprovalStatus::Pending;
    }
    if structure.iter().all(|c| c.status == ChapterStatus::Approved) {
        ContentApprovalStatus::Approved
    } else if structure.iter().any(|c| c.status == ChapterStatus::Revision) {
        ContentApprovalStatus::Rejected
    } else {
        ContentApprovalStatus::Pending
    }
}

/// 定稿前检查所有章节都已通过
pub fn ensure_content_complete(structure: &[Chapter]) -> Result<()> {
    let pending: Vec<&str> = structure
        .iter()
        .filter(|c| c.status != ChapterStatus::Approved)
        .map(|c| c.title.as_str())
        .collect();

    if structure.is_empty() || !pending.is_empty() {
        return Err(SetukpaError::incomplete_content(format!(
            "以下章节尚未通过审阅: {}",
            pending.join(", ")
        )));
    }
    Ok(())
}

/// 上传终稿（定稿）：内容必须全部通过，且终稿尚未被批准
pub fn finalize(
    structure: &[Chapter],
    current: FinalApprovalStatus,
) -> Result<FinalApprovalStatus> {
    ensure_content_complete(structure)?;
    match current {
        FinalApprovalStatus::Approved => Err(SetukpaError::invalid_transition(
            "终稿已批准，不能重新上传",
        )),
        _ => Ok(FinalApprovalStatus::Pending),
    }
}

/// 审阅终稿：必须已上传终稿且处于待审状态；批准时内容仍须全部通过
pub fn review_final(
    structure: &[Chapter],
    current: FinalApprovalStatus,
    has_final_file: bool,
    decision: ReviewDecision,
) -> Result<FinalApprovalStatus> {
    if !has_final_file {
        return Err(SetukpaError::invalid_transition("尚未上传终稿"));
    }
    if current != FinalApprovalStatus::Pending {
        return Err(SetukpaError::invalid_transition(format!(
            "终稿状态为 {current}，不能审阅"
        )));
    }
    match decision {
        ReviewDecision::Approve => {
            // 上传后可能有章节被重新打开
            ensure_content_complete(structure)?;
            Ok(FinalApprovalStatus::Approved)
        }
        ReviewDecision::Revise => Ok(FinalApprovalStatus::Rejected),
    }
}
