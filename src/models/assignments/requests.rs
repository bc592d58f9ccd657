use super::entities::{AssignmentStatus, TemplateChapter};
use serde::Deserialize;
use ts_rs::TS;

// 任务创建请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub subject: String,
    pub activation_date: Option<chrono::DateTime<chrono::Utc>>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub status: AssignmentStatus,
    pub batch_id: Option<i64>,
    pub template_id: Option<i64>,
}

// 模板创建请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateTemplateRequest {
    pub name: String,
    pub chapters: Vec<TemplateChapter>,
    pub layout: Option<serde_json::Value>,
}
