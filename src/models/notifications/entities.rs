use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 通知类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum NotificationKind {
    PaperCreated,
    ChapterSubmitted,
    ChapterApproved,
    ChapterRevision,
    ChapterReopened,
    FinalDocumentUploaded,
    FinalDocumentReviewed,
    AdvisorGraded,
    ExaminerGraded,
    GradeOverridden,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationKind::PaperCreated => "paper_created",
            NotificationKind::ChapterSubmitted => "chapter_submitted",
            NotificationKind::ChapterApproved => "chapter_approved",
            NotificationKind::ChapterRevision => "chapter_revision",
            NotificationKind::ChapterReopened => "chapter_reopened",
            NotificationKind::FinalDocumentUploaded => "final_document_uploaded",
            NotificationKind::FinalDocumentReviewed => "final_document_reviewed",
            NotificationKind::AdvisorGraded => "advisor_graded",
            NotificationKind::ExaminerGraded => "examiner_graded",
            NotificationKind::GradeOverridden => "grade_overridden",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paper_created" => Ok(NotificationKind::PaperCreated),
            "chapter_submitted" => Ok(NotificationKind::ChapterSubmitted),
            "chapter_approved" => Ok(NotificationKind::ChapterApproved),
            "chapter_revision" => Ok(NotificationKind::ChapterRevision),
            "chapter_reopened" => Ok(NotificationKind::ChapterReopened),
            "final_document_uploaded" => Ok(NotificationKind::FinalDocumentUploaded),
            "final_document_reviewed" => Ok(NotificationKind::FinalDocumentReviewed),
            "advisor_graded" => Ok(NotificationKind::AdvisorGraded),
            "examiner_graded" => Ok(NotificationKind::ExaminerGraded),
            "grade_overridden" => Ok(NotificationKind::GradeOverridden),
            _ => Err(format!("Invalid notification kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub paper_id: Option<i64>,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 工作流事件，由通知分发器转换为用户通知
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowEvent {
    pub kind: NotificationKind,
    pub paper_id: i64,
    pub actor_id: i64,
    pub recipients: Vec<i64>,
    pub message: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl WorkflowEvent {
    pub fn new(
        kind: NotificationKind,
        paper_id: i64,
        actor_id: i64,
        recipients: Vec<i64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            paper_id,
            actor_id,
            recipients,
            message: message.into(),
            occurred_at: chrono::Utc::now(),
        }
    }
}

// 存储层创建通知
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub paper_id: Option<i64>,
    pub kind: NotificationKind,
    pub message: String,
}
