//! 评分存储操作

use super::{SeaOrmStorage, map_write_err};
use crate::entity::prelude::*;
use crate::entity::{examiner_grades, grades};
use crate::errors::{Result, SetukpaError};
use crate::models::grades::{
    entities::{ExaminerGrade, Grade},
    requests::{UpsertExaminerGradeRequest, UpsertGradeRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 写入指导老师评分，每篇论文一条
    pub async fn upsert_grade_impl(&self, req: UpsertGradeRequest) -> Result<Grade> {
        match self.save_grade(&req).await {
            // 并发的首次写入撞上唯一索引，对方已插入，改走更新
            Err(SetukpaError::Conflict(_)) => self.save_grade(&req).await,
            other => other,
        }
    }

    async fn save_grade(&self, req: &UpsertGradeRequest) -> Result<Grade> {
        let now = chrono::Utc::now().timestamp();
        let existing = Grades::find()
            .filter(grades::Column::PaperId.eq(req.paper_id))
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询评分失败: {e}")))?;

        let result = match existing {
            Some(found) => {
                let mut model: GradeActiveModel = found.into();
                model.advisor_id = Set(req.advisor_id);
                model.content_score = Set(req.scores.content);
                model.structure_score = Set(req.scores.structure);
                model.language_score = Set(req.scores.language);
                model.format_score = Set(req.scores.format);
                model.final_score = Set(req.final_score);
                model.advisor_feedback = Set(req.advisor_feedback.clone());
                model.updated_at = Set(now);
                model.update(&self.db).await
            }
            None => {
                GradeActiveModel {
                    paper_id: Set(req.paper_id),
                    advisor_id: Set(req.advisor_id),
                    content_score: Set(req.scores.content),
                    structure_score: Set(req.scores.structure),
                    language_score: Set(req.scores.language),
                    format_score: Set(req.scores.format),
                    final_score: Set(req.final_score),
                    advisor_feedback: Set(req.advisor_feedback.clone()),
                    graded_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| map_write_err(e, "保存评分失败"))?;

        Ok(result.into_grade())
    }

    /// 通过论文 ID 获取评分
    pub async fn get_grade_by_paper_id_impl(&self, paper_id: i64) -> Result<Option<Grade>> {
        let result = Grades::find()
            .filter(grades::Column::PaperId.eq(paper_id))
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询评分失败: {e}")))?;

        Ok(result.map(|m| m.into_grade()))
    }

    /// 写入考官评分，每位考官每篇论文一条
    pub async fn upsert_examiner_grade_impl(
        &self,
        req: UpsertExaminerGradeRequest,
    ) -> Result<ExaminerGrade> {
        match self.save_examiner_grade(&req).await {
            Err(SetukpaError::Conflict(_)) => self.save_examiner_grade(&req).await,
            other => other,
        }
    }

    async fn save_examiner_grade(
        &self,
        req: &UpsertExaminerGradeRequest,
    ) -> Result<ExaminerGrade> {
        let now = chrono::Utc::now().timestamp();
        let existing = ExaminerGrades::find()
            .filter(examiner_grades::Column::PaperId.eq(req.paper_id))
            .filter(examiner_grades::Column::ExaminerId.eq(req.examiner_id))
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询考官评分失败: {e}")))?;

        let result = match existing {
            Some(found) => {
                let mut model: ExaminerGradeActiveModel = found.into();
                model.score = Set(req.score);
                model.feedback = Set(req.feedback.clone());
                model.updated_at = Set(now);
                model.update(&self.db).await
            }
            None => {
                ExaminerGradeActiveModel {
                    paper_id: Set(req.paper_id),
                    examiner_id: Set(req.examiner_id),
                    score: Set(req.score),
                    feedback: Set(req.feedback.clone()),
                    graded_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| map_write_err(e, "保存考官评分失败"))?;

        Ok(result.into_examiner_grade())
    }

    /// 列出论文的考官评分
    pub async fn list_examiner_grades_by_paper_impl(
        &self,
        paper_id: i64,
    ) -> Result<Vec<ExaminerGrade>> {
        let rows = ExaminerGrades::find()
            .filter(examiner_grades::Column::PaperId.eq(paper_id))
            .order_by_asc(examiner_grades::Column::ExaminerId)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询考官评分失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_examiner_grade()).collect())
    }
}
