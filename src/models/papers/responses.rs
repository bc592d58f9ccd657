use serde::Serialize;
use ts_rs::TS;

use super::entities::Paper;
use crate::models::grades::entities::FinalScore;

/// 论文详情（含实时计算的最终分数）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/paper.ts")]
pub struct PaperDetail {
    pub paper: Paper,
    pub final_score: FinalScore,
}
