use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentStatus {
    Draft,     // 草稿，学员不可见
    Published, // 已发布
    Closed,    // 已关闭
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Draft => write!(f, "DRAFT"),
            AssignmentStatus::Published => write!(f, "PUBLISHED"),
            AssignmentStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(AssignmentStatus::Draft),
            "PUBLISHED" => Ok(AssignmentStatus::Published),
            "CLOSED" => Ok(AssignmentStatus::Closed),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub subject: String,
    // 开放时间，为空表示立即开放
    pub activation_date: Option<chrono::DateTime<chrono::Utc>>,
    // 截止时间，为空表示无截止
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub status: AssignmentStatus,
    // 为空表示适用于所有批次
    pub batch_id: Option<i64>,
    pub template_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 模板中的章节定义
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct TemplateChapter {
    pub title: String,
    pub guidance: Option<String>,
}

/// 论文模板：默认章节结构与文档版式
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct PaperTemplate {
    pub id: i64,
    pub name: String,
    pub chapters: Vec<TemplateChapter>,
    // 版式由前端解释
    pub layout: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
