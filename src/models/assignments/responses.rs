use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Assignment;
use crate::models::grades::entities::FinalScore;

/// 学员视角下任务的生命周期状态
///
/// 没有论文时由时间推导（前三项），有论文时由论文自身状态决定。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentLifecycleStatus {
    Scheduled,
    Available,
    Missed,
    InProgress,
    UnderReview,
    Revision,
    ContentApproved,
    FinalReview,
    Completed,
    Graded,
}

/// 学员任务列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentEntry {
    pub assignment: Assignment,
    pub status: AssignmentLifecycleStatus,
    pub paper_id: Option<i64>,
    pub final_score: Option<FinalScore>,
}

/// 引用已删除任务的论文
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct DanglingPaper {
    pub paper_id: i64,
    pub student_id: i64,
    pub assignment_id: i64,
}

/// 预分发结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct ProvisionSummary {
    pub assignment_id: i64,
    pub created: Vec<i64>,
    pub skipped_existing: usize,
}
