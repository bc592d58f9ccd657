use super::entities::Chapter;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 论文创建请求（存储层使用）
#[derive(Debug, Clone)]
pub struct CreatePaperRequest {
    pub student_id: i64,
    pub assignment_id: i64,
    pub title: String,
    pub subject: String,
    pub structure: Vec<Chapter>,
}

// 终稿上传结果（文件已由外部存储保存）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct AttachFinalFileRequest {
    pub name: String,
    pub url: String,
    pub size: i64,
}

// 审阅结论
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub enum ReviewDecision {
    Approve,
    Revise,
}

// 章节审阅请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct ReviewChapterRequest {
    pub decision: ReviewDecision,
    pub comment: Option<String>,
    // 读取章节时拿到的版本号
    pub version: i64,
}
