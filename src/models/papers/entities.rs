use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::UserRole;

// 章节状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub enum ChapterStatus {
    Draft,     // 草稿
    Submitted, // 已提交，待审阅
    Approved,  // 已通过
    Revision,  // 需修改
}

impl std::fmt::Display for ChapterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChapterStatus::Draft => write!(f, "DRAFT"),
            ChapterStatus::Submitted => write!(f, "SUBMITTED"),
            ChapterStatus::Approved => write!(f, "APPROVED"),
            ChapterStatus::Revision => write!(f, "REVISION"),
        }
    }
}

impl std::str::FromStr for ChapterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ChapterStatus::Draft),
            "SUBMITTED" => Ok(ChapterStatus::Submitted),
            "APPROVED" => Ok(ChapterStatus::Approved),
            // 旧数据中存在 REJECTED，与 REVISION 等价
            "REVISION" | "REJECTED" => Ok(ChapterStatus::Revision),
            _ => Err(format!("Invalid chapter status: {s}")),
        }
    }
}

// 论文内容审批状态（由章节状态汇总得出）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub enum ContentApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

// 终稿审批状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub enum FinalApprovalStatus {
    NotSubmitted, // 尚未上传终稿
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for FinalApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalApprovalStatus::NotSubmitted => write!(f, "NOT_SUBMITTED"),
            FinalApprovalStatus::Pending => write!(f, "PENDING"),
            FinalApprovalStatus::Approved => write!(f, "APPROVED"),
            FinalApprovalStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl std::str::FromStr for FinalApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_SUBMITTED" => Ok(FinalApprovalStatus::NotSubmitted),
            "PENDING" => Ok(FinalApprovalStatus::Pending),
            "APPROVED" => Ok(FinalApprovalStatus::Approved),
            "REJECTED" => Ok(FinalApprovalStatus::Rejected),
            _ => Err(format!("Invalid final approval status: {s}")),
        }
    }
}

/// 审阅意见，只追加不修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct FeedbackEntry {
    pub author_id: i64,
    pub author_role: UserRole,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 章节记录，以 (paper_id, index) 为键，带独立版本号
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct Chapter {
    pub index: i32,
    pub title: String,
    // 富文本内容
    pub content: String,
    pub status: ChapterStatus,
    pub feedback_history: Vec<FeedbackEntry>,
    pub version: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 终稿文件元数据，文件本身由外部文件存储保存
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct FinalFile {
    pub name: String,
    pub url: String,
    pub size: i64,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct Paper {
    pub id: i64,
    pub student_id: i64,
    pub assignment_id: i64,
    pub title: String,
    pub subject: String,
    // 旧版扁平文本，由章节内容拼接
    pub content: String,
    pub structure: Vec<Chapter>,
    // 考官路径设置的覆盖分数
    pub grade: Option<f64>,
    pub content_approval_status: ContentApprovalStatus,
    pub final_approval_status: FinalApprovalStatus,
    pub final_file: Option<FinalFile>,
    // 论文级字段的乐观锁版本
    pub version: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Paper {
    pub fn chapter(&self, index: i32) -> Option<&Chapter> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.structure.get(i))
    }
}
