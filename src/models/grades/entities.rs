use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 评分细则四个维度的得分
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct RubricScores {
    pub content: f64,
    pub structure: f64,
    pub language: f64,
    pub format: f64,
}

impl RubricScores {
    pub fn total(&self) -> f64 {
        self.content + self.structure + self.language + self.format
    }
}

// 指导老师评分（每篇论文一条）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub paper_id: i64,
    pub advisor_id: i64,
    pub scores: RubricScores,
    // 始终等于四项之和
    pub final_score: f64,
    pub advisor_feedback: Option<String>,
    pub graded_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 考官评分（每位考官每篇论文一条）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct ExaminerGrade {
    pub id: i64,
    pub paper_id: i64,
    pub examiner_id: i64,
    pub score: f64,
    pub feedback: Option<String>,
    pub graded_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 最终分数来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum ScoreSource {
    Override,
    Advisor,
    Examiner,
    None,
}

/// 展示给学员和报表的最终分数，每次读取时重新计算
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct FinalScore {
    pub score: Option<f64>,
    pub source: ScoreSource,
    // 考官平均分（四舍五入到整数），没有考官评分时为空
    pub examiner_score: Option<f64>,
    pub examiner_count: usize,
}
