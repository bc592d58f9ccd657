use super::entities::RubricScores;
use serde::Deserialize;
use ts_rs::TS;

// 指导老师评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct RubricGradeRequest {
    pub scores: RubricScores,
    pub advisor_feedback: Option<String>,
}

// 考官评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct ExaminerGradeRequest {
    pub score: f64,
    pub feedback: Option<String>,
}

// 存储层写入指导老师评分
#[derive(Debug, Clone)]
pub struct UpsertGradeRequest {
    pub paper_id: i64,
    pub advisor_id: i64,
    pub scores: RubricScores,
    pub final_score: f64,
    pub advisor_feedback: Option<String>,
}

// 存储层写入考官评分
#[derive(Debug, Clone)]
pub struct UpsertExaminerGradeRequest {
    pub paper_id: i64,
    pub examiner_id: i64,
    pub score: f64,
    pub feedback: Option<String>,
}
