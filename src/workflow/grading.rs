//! 成绩汇总
//!
//! 优先级：论文覆盖分数 > 指导老师评分 > 考官平均分 > 无。
//! 结果不缓存，每次读取时根据当前评分记录重新计算。

use crate::config::RubricConfig;
use crate::errors::{Result, SetukpaError};
use crate::models::grades::entities::{ExaminerGrade, FinalScore, Grade, RubricScores, ScoreSource};

/// 考官评分与覆盖分数的上限
pub const MAX_SCORE: f64 = 100.0;

/// 四舍五入到整数，0.5 向上取整
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn check_bounded(label: &str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(SetukpaError::score_range(format!(
            "{label} 分数 {value} 超出范围 [0, {max}]"
        )));
    }
    Ok(())
}

/// 校验评分细则各维度 0 <= 分数 <= 满分
pub fn validate_rubric(scores: &RubricScores, rubric: &RubricConfig) -> Result<()> {
    check_bounded("content", scores.content, rubric.content_max)?;
    check_bounded("structure", scores.structure, rubric.structure_max)?;
    check_bounded("language", scores.language, rubric.language_max)?;
    check_bounded("format", scores.format, rubric.format_max)?;
    Ok(())
}

/// 指导老师最终分 = 四项之和
pub fn advisor_final_score(scores: &RubricScores, rubric: &RubricConfig) -> Result<f64> {
    validate_rubric(scores, rubric)?;
    Ok(scores.total())
}

/// 校验考官分数或覆盖分数
pub fn validate_score(label: &str, score: f64) -> Result<()> {
    check_bounded(label, score, MAX_SCORE)
}

/// 考官分数取算术平均并四舍五入；没有考官评分时返回 None（不是 0）
pub fn combine_examiner_scores(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(round_half_up(mean))
}

/// 计算展示用最终分数
pub fn compute_final_score(
    paper_grade: Option<f64>,
    advisor_grade: Option<&Grade>,
    examiner_grades: &[ExaminerGrade],
) -> FinalScore {
    let examiner_scores: Vec<f64> = examiner_grades.iter().map(|g| g.score).collect();
    let examiner_score = combine_examiner_scores(&examiner_scores);

    let (score, source) = match (paper_grade, advisor_grade, examiner_score) {
        (Some(grade), _, _) => (Some(grade), ScoreSource::Override),
        (None, Some(advisor), _) => (Some(advisor.final_score), ScoreSource::Advisor),
        (None, None, Some(mean)) => (Some(mean), ScoreSource::Examiner),
        (None, None, None) => (None, ScoreSource::None),
    };

    FinalScore {
        score,
        source,
        examiner_score,
        examiner_count: examiner_scores.len(),
    }
}
