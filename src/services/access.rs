//! 服务层共用的加载与鉴权
//!
//! 调用者与论文的关系由存储中的数据推导：学员本人、学员的指导老师、被分配的考官。

use tracing::warn;

use crate::errors::{Result, SetukpaError};
use crate::models::grades::entities::FinalScore;
use crate::models::notifications::entities::WorkflowEvent;
use crate::models::papers::entities::Paper;
use crate::models::users::entities::{Principal, User, UserRole};
use crate::notifications::NotificationSink;
use crate::storage::Storage;
use crate::workflow::{Operation, PaperRelation, authorize, compute_final_score};

pub(crate) async fn load_paper(storage: &dyn Storage, paper_id: i64) -> Result<Paper> {
    storage
        .get_paper_by_id(paper_id)
        .await?
        .ok_or_else(|| SetukpaError::not_found(format!("论文 {paper_id} 不存在")))
}

pub(crate) async fn load_user(storage: &dyn Storage, user_id: i64) -> Result<User> {
    storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| SetukpaError::not_found(format!("用户 {user_id} 不存在")))
}

/// 计算调用者与某学员之间的关系
pub(crate) async fn relation_to_student(
    storage: &dyn Storage,
    principal: &Principal,
    student: &User,
) -> Result<PaperRelation> {
    let is_examiner = principal.role == UserRole::Penguji
        && storage
            .list_examiner_ids(student.id)
            .await?
            .contains(&principal.user_id);

    Ok(PaperRelation {
        is_owner: principal.user_id == student.id,
        is_advisor: student.pembimbing_id == Some(principal.user_id),
        is_examiner,
    })
}

/// 对论文鉴权，返回论文所属学员
pub(crate) async fn authorize_paper(
    storage: &dyn Storage,
    principal: &Principal,
    operation: Operation,
    paper: &Paper,
) -> Result<User> {
    let student = load_user(storage, paper.student_id).await?;
    let relation = relation_to_student(storage, principal, &student).await?;
    authorize(principal, operation, &relation)?;
    Ok(student)
}

/// 读取当前评分并汇总
pub(crate) async fn final_score_of(storage: &dyn Storage, paper: &Paper) -> Result<FinalScore> {
    let advisor = storage.get_grade_by_paper_id(paper.id).await?;
    let examiners = storage.list_examiner_grades_by_paper(paper.id).await?;
    Ok(compute_final_score(paper.grade, advisor.as_ref(), &examiners))
}

/// 发布通知，失败只记录日志
pub(crate) fn notify(sink: &dyn NotificationSink, event: WorkflowEvent) {
    let kind = event.kind;
    let paper_id = event.paper_id;
    if event.recipients.is_empty() {
        return;
    }
    if let Err(e) = sink.publish(event) {
        warn!("Failed to publish {} event for paper {}: {}", kind, paper_id, e);
    }
}

/// 学员的指导老师（排除调用者本人）
pub(crate) fn advisor_recipients(student: &User, actor: &Principal) -> Vec<i64> {
    student
        .pembimbing_id
        .filter(|id| *id != actor.user_id)
        .into_iter()
        .collect()
}

/// 学员本人（排除调用者本人）
pub(crate) fn student_recipients(student: &User, actor: &Principal) -> Vec<i64> {
    if student.id == actor.user_id {
        Vec::new()
    } else {
        vec![student.id]
    }
}
