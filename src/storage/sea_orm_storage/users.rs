//! 用户、批次与考官分配存储操作

use super::{SeaOrmStorage, map_write_err};
use crate::entity::prelude::*;
use crate::entity::{batches, examiner_assignments, users};
use crate::errors::{Result, SetukpaError};
use crate::models::users::{
    entities::{Batch, User, UserRole},
    requests::{CreateBatchRequest, CreateUserRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = UserActiveModel {
            username: Set(req.username),
            name: Set(req.name),
            role: Set(req.role.to_string()),
            batch_id: Set(req.batch_id),
            pembimbing_id: Set(req.pembimbing_id),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, "创建用户失败"))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 列出学员
    pub async fn list_students_impl(&self, batch_id: Option<i64>) -> Result<Vec<User>> {
        let mut select = Users::find().filter(users::Column::Role.eq(UserRole::SISWA));

        if let Some(batch_id) = batch_id {
            select = select.filter(users::Column::BatchId.eq(batch_id));
        }

        let students = select
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询学员列表失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_user()).collect())
    }

    /// 分配考官，重复分配视为成功
    pub async fn assign_examiner_impl(&self, student_id: i64, examiner_id: i64) -> Result<()> {
        let existing = ExaminerAssignments::find()
            .filter(examiner_assignments::Column::StudentId.eq(student_id))
            .filter(examiner_assignments::Column::ExaminerId.eq(examiner_id))
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询考官分配失败: {e}")))?;
        if existing.is_some() {
            return Ok(());
        }

        let model = ExaminerAssignmentActiveModel {
            student_id: Set(student_id),
            examiner_id: Set(examiner_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) => match map_write_err(e, "分配考官失败") {
                // 并发分配同一考官
                SetukpaError::Conflict(_) => Ok(()),
                other => Err(other),
            },
        }
    }

    /// 列出学员的考官
    pub async fn list_examiner_ids_impl(&self, student_id: i64) -> Result<Vec<i64>> {
        let rows = ExaminerAssignments::find()
            .filter(examiner_assignments::Column::StudentId.eq(student_id))
            .order_by_asc(examiner_assignments::Column::ExaminerId)
            .all(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询考官分配失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.examiner_id).collect())
    }

    /// 创建批次
    pub async fn create_batch_impl(&self, req: CreateBatchRequest) -> Result<Batch> {
        let model = BatchActiveModel {
            name: Set(req.name),
            start_date: Set(req.start_date.map(|d| d.timestamp())),
            end_date: Set(req.end_date.map(|d| d.timestamp())),
            is_active: Set(req.is_active),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("创建批次失败: {e}")))?;

        Ok(result.into_batch())
    }

    /// 通过 ID 获取批次
    pub async fn get_batch_by_id_impl(&self, batch_id: i64) -> Result<Option<Batch>> {
        let result = Batches::find_by_id(batch_id)
            .one(&self.db)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("查询批次失败: {e}")))?;

        Ok(result.map(batches::Model::into_batch))
    }
}
