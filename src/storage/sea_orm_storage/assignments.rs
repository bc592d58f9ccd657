//! 模板与任务存储操作

use super::SeaOrmStorage;
use crate::entity::assignments;
use crate::entity::prelude::*;
use crate::errors::{Result, SetukpaError};
use crate::models::assignments::{
    entities::{Assignment, PaperTemplate},
    requests::{CreateAssignmentRequest, CreateTemplateRequest},
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建论文模板
    pub async fn create_template_impl(&self, req: CreateTemplateRequest) -> Result<PaperTemplate> {
        let chapters = serde_json::to_string(&req.chapters)?;
        let layout = req
            .layout
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let model = PaperTemplateActiveModel {
            name: Set(req.name),
            chapters: Set(chapters),
            layout: Set(layout),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("创建模板失败: {e}")))?;

        Ok(result.into_template())
    }

    /// 通过 ID 获取模板
    pub async fn get_template_by_id_impl(&self, template_id: i64) -> Result<Option<PaperTemplate>> {
        let result = PaperTemplates::find_by_id(template_id)
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询模板失败: {e}")))?;

        Ok(result.map(|m| m.into_template()))
    }

    /// 创建任务
    pub async fn create_assignment_impl(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = AssignmentActiveModel {
            title: Set(req.title),
            subject: Set(req.subject),
            activation_date: Set(req.activation_date.map(|d| d.timestamp())),
            deadline: Set(req.deadline.map(|d| d.timestamp())),
            status: Set(req.status.to_string()),
            batch_id: Set(req.batch_id),
            template_id: Set(req.template_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("创建任务失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取任务
    pub async fn get_assignment_by_id_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询任务失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 列出全部任务
    pub async fn list_assignments_impl(&self) -> Result<Vec<Assignment>> {
        let rows = Assignments::find()
            .order_by_asc(assignments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询任务列表失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 删除任务，已有论文保留
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(assignment_id)
            .exec(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("删除任务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
