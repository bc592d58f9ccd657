//! 论文与章节存储操作
//!
//! 论文行与章节行分别带版本号，写入时以 `version = expected` 作为更新条件。

use std::collections::HashMap;

use super::{SeaOrmStorage, map_write_err};
use crate::entity::prelude::*;
use crate::entity::{paper_chapters, papers};
use crate::errors::{Result, SetukpaError};
use crate::models::papers::{
    entities::{Chapter, Paper},
    requests::CreatePaperRequest,
};
use crate::storage::{stale_write, with_derived_fields};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建论文及其章节
    pub async fn create_paper_impl(&self, req: CreatePaperRequest) -> Result<Paper> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SetukpaError::database_operation(format!("开启事务失败: {e}")))?;

        let paper = PaperActiveModel {
            student_id: Set(req.student_id),
            assignment_id: Set(req.assignment_id),
            title: Set(req.title),
            subject: Set(req.subject),
            grade: Set(None),
            final_approval_status: Set(
                crate::models::papers::entities::FinalApprovalStatus::NotSubmitted.to_string(),
            ),
            final_file_name: Set(None),
            final_file_url: Set(None),
            final_file_size: Set(None),
            final_file_uploaded_at: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| map_write_err(e, "创建论文失败"))?;

        let mut chapter_models = Vec::with_capacity(req.structure.len());
        for (index, chapter) in req.structure.iter().enumerate() {
            chapter_models.push(PaperChapterActiveModel {
                paper_id: Set(paper.id),
                chapter_index: Set(index as i32),
                title: Set(chapter.title.clone()),
                content: Set(chapter.content.clone()),
                status: Set(chapter.status.to_string()),
                feedback_history: Set(serde_json::to_string(&chapter.feedback_history)?),
                version: Set(0),
                updated_at: Set(now),
                ..Default::default()
            });
        }
        if !chapter_models.is_empty() {
            PaperChapters::insert_many(chapter_models)
                .exec(&txn)
                .await
                .map_err(|e| map_write_err(e, "创建章节失败"))?;
        }

        txn.commit()
            .await
            .map_err(|e| SetukpaError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_paper_by_id_impl(paper.id)
            .await?
            .ok_or_else(|| SetukpaError::database_operation("论文创建后无法读取"))
    }

    /// 通过 ID 获取论文
    pub async fn get_paper_by_id_impl(&self, paper_id: i64) -> Result<Option<Paper>> {
        let result = Papers::find_by_id(paper_id)
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询论文失败: {e}")))?;

        match result {
            Some(model) => Ok(self.assemble(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 通过 (任务, 学员) 获取论文
    pub async fn get_paper_by_assignment_and_student_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Paper>> {
        let result = Papers::find()
            .filter(papers::Column::AssignmentId.eq(assignment_id))
            .filter(papers::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询论文失败: {e}")))?;

        match result {
            Some(model) => Ok(self.assemble(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 列出学员的论文
    pub async fn list_papers_by_student_impl(&self, student_id: i64) -> Result<Vec<Paper>> {
        let models = Papers::find()
            .filter(papers::Column::StudentId.eq(student_id))
            .order_by_asc(papers::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询论文列表失败: {e}")))?;

        self.assemble(models).await
    }

    /// 列出全部论文（审计用）
    pub async fn list_all_papers_impl(&self) -> Result<Vec<Paper>> {
        let models = Papers::find()
            .order_by_asc(papers::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询论文列表失败: {e}")))?;

        self.assemble(models).await
    }

    /// 写入论文级字段
    pub async fn update_paper_impl(&self, paper: &Paper, expected_version: i64) -> Result<Paper> {
        let now = chrono::Utc::now().timestamp();
        let file = paper.final_file.as_ref();

        let result = Papers::update_many()
            .col_expr(papers::Column::Title, Expr::value(paper.title.clone()))
            .col_expr(papers::Column::Subject, Expr::value(paper.subject.clone()))
            .col_expr(papers::Column::Grade, Expr::value(paper.grade))
            .col_expr(
                papers::Column::FinalApprovalStatus,
                Expr::value(paper.final_approval_status.to_string()),
            )
            .col_expr(
                papers::Column::FinalFileName,
                Expr::value(file.map(|f| f.name.clone())),
            )
            .col_expr(
                papers::Column::FinalFileUrl,
                Expr::value(file.map(|f| f.url.clone())),
            )
            .col_expr(papers::Column::FinalFileSize, Expr::value(file.map(|f| f.size)))
            .col_expr(
                papers::Column::FinalFileUploadedAt,
                Expr::value(file.map(|f| f.uploaded_at.timestamp())),
            )
            .col_expr(papers::Column::Version, Expr::value(expected_version + 1))
            .col_expr(papers::Column::UpdatedAt, Expr::value(now))
            .filter(papers::Column::Id.eq(paper.id))
            .filter(papers::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("更新论文失败: {e}")))?;

        if result.rows_affected == 0 {
            // 区分论文不存在与版本冲突
            return match self.get_paper_by_id_impl(paper.id).await? {
                Some(_) => Err(stale_write("论文", paper.id, expected_version)),
                None => Err(SetukpaError::not_found(format!("论文 {} 不存在", paper.id))),
            };
        }

        self.get_paper_by_id_impl(paper.id)
            .await?
            .ok_or_else(|| SetukpaError::not_found(format!("论文 {} 不存在", paper.id)))
    }

    /// 写入单个章节
    pub async fn update_chapter_impl(
        &self,
        paper_id: i64,
        chapter: &Chapter,
        expected_version: i64,
    ) -> Result<Chapter> {
        let now = chrono::Utc::now().timestamp();
        let feedback = serde_json::to_string(&chapter.feedback_history)?;

        let result = PaperChapters::update_many()
            .col_expr(paper_chapters::Column::Title, Expr::value(chapter.title.clone()))
            .col_expr(
                paper_chapters::Column::Content,
                Expr::value(chapter.content.clone()),
            )
            .col_expr(
                paper_chapters::Column::Status,
                Expr::value(chapter.status.to_string()),
            )
            .col_expr(paper_chapters::Column::FeedbackHistory, Expr::value(feedback))
            .col_expr(
                paper_chapters::Column::Version,
                Expr::value(expected_version + 1),
            )
            .col_expr(paper_chapters::Column::UpdatedAt, Expr::value(now))
            .filter(paper_chapters::Column::PaperId.eq(paper_id))
            .filter(paper_chapters::Column::ChapterIndex.eq(chapter.index))
            .filter(paper_chapters::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("更新章节失败: {e}")))?;

        let stored = self.find_chapter(paper_id, chapter.index).await?;
        match (result.rows_affected, stored) {
            (0, Some(_)) => Err(stale_write(
                "章节",
                format!("{paper_id}#{}", chapter.index),
                expected_version,
            )),
            (_, Some(model)) => Ok(model.into_chapter()),
            (_, None) => Err(SetukpaError::not_found(format!(
                "论文 {paper_id} 的章节 {} 不存在",
                chapter.index
            ))),
        }
    }

    async fn find_chapter(
        &self,
        paper_id: i64,
        index: i32,
    ) -> Result<Option<paper_chapters::Model>> {
        PaperChapters::find()
            .filter(paper_chapters::Column::PaperId.eq(paper_id))
            .filter(paper_chapters::Column::ChapterIndex.eq(index))
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询章节失败: {e}")))
    }

    /// 批量加载章节并组装论文
    async fn assemble(&self, models: Vec<papers::Model>) -> Result<Vec<Paper>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let chapters = PaperChapters::find()
            .filter(paper_chapters::Column::PaperId.is_in(ids))
            .order_by_asc(paper_chapters::Column::ChapterIndex)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询章节失败: {e}")))?;

        let mut by_paper: HashMap<i64, Vec<Chapter>> = HashMap::new();
        for chapter in chapters {
            by_paper
                .entry(chapter.paper_id)
                .or_default()
                .push(chapter.into_chapter());
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let structure = by_paper.remove(&m.id).unwrap_or_default();
                with_derived_fields(m.into_paper(structure))
            })
            .collect())
    }
}
