//! 数据存储层
//!
//! `Storage` 是核心逻辑与持久化之间的契约。写论文和章节时必须携带版本号，
//! 版本不一致时返回 StaleWrite 且不修改已存储的数据。

use std::sync::Arc;

use crate::models::{
    assignments::{
        entities::{Assignment, PaperTemplate},
        requests::{CreateAssignmentRequest, CreateTemplateRequest},
    },
    grades::{
        entities::{ExaminerGrade, Grade},
        requests::{UpsertExaminerGradeRequest, UpsertGradeRequest},
    },
    notifications::entities::{CreateNotificationRequest, Notification},
    papers::{
        entities::{Chapter, Paper},
        requests::CreatePaperRequest,
    },
    users::{
        entities::{Batch, User},
        requests::{CreateBatchRequest, CreateUserRequest},
    },
};
use crate::workflow::{approval, chapter};

use crate::errors::{Result, SetukpaError};

pub mod memory_storage;
pub mod register;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 列出学员；指定批次时只返回该批次的学员
    async fn list_students(&self, batch_id: Option<i64>) -> Result<Vec<User>>;
    // 为学员分配考官
    async fn assign_examiner(&self, student_id: i64, examiner_id: i64) -> Result<()>;
    // 列出学员的考官
    async fn list_examiner_ids(&self, student_id: i64) -> Result<Vec<i64>>;

    /// 批次管理方法
    async fn create_batch(&self, batch: CreateBatchRequest) -> Result<Batch>;
    async fn get_batch_by_id(&self, batch_id: i64) -> Result<Option<Batch>>;

    /// 模板与任务管理方法
    async fn create_template(&self, template: CreateTemplateRequest) -> Result<PaperTemplate>;
    async fn get_template_by_id(&self, template_id: i64) -> Result<Option<PaperTemplate>>;
    async fn create_assignment(&self, assignment: CreateAssignmentRequest) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments(&self) -> Result<Vec<Assignment>>;
    // 仅维护脚本使用，论文不会随之删除
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;

    /// 论文管理方法
    // 创建论文及其章节；同一 (任务, 学员) 已有论文时返回 Conflict
    async fn create_paper(&self, paper: CreatePaperRequest) -> Result<Paper>;
    async fn get_paper_by_id(&self, paper_id: i64) -> Result<Option<Paper>>;
    async fn get_paper_by_assignment_and_student(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Paper>>;
    async fn list_papers_by_student(&self, student_id: i64) -> Result<Vec<Paper>>;
    async fn list_all_papers(&self) -> Result<Vec<Paper>>;
    // 写入论文级字段（标题、覆盖分数、终稿），版本不一致返回 StaleWrite
    async fn update_paper(&self, paper: &Paper, expected_version: i64) -> Result<Paper>;
    // 写入单个章节记录，版本不一致返回 StaleWrite
    async fn update_chapter(
        &self,
        paper_id: i64,
        chapter: &Chapter,
        expected_version: i64,
    ) -> Result<Chapter>;

    /// 评分管理方法
    async fn upsert_grade(&self, grade: UpsertGradeRequest) -> Result<Grade>;
    async fn get_grade_by_paper_id(&self, paper_id: i64) -> Result<Option<Grade>>;
    async fn upsert_examiner_grade(
        &self,
        grade: UpsertExaminerGradeRequest,
    ) -> Result<ExaminerGrade>;
    async fn list_examiner_grades_by_paper(&self, paper_id: i64) -> Result<Vec<ExaminerGrade>>;

    /// 通知管理方法
    async fn create_notification(
        &self,
        notification: CreateNotificationRequest,
    ) -> Result<Notification>;
    async fn list_notifications_by_user(&self, user_id: i64) -> Result<Vec<Notification>>;
    async fn mark_notification_as_read(&self, notification_id: i64, user_id: i64)
    -> Result<bool>;
}

/// 按配置的后端名称创建存储实例
pub async fn create_storage(backend: &str) -> Result<Arc<dyn Storage>> {
    let constructor = register::get_storage_plugin(backend).ok_or_else(|| {
        SetukpaError::storage_plugin_not_found(format!("未注册的存储后端: {backend}"))
    })?;
    let storage = constructor().await?;
    Ok(Arc::from(storage))
}

/// 补全论文的派生字段：内容审批状态与扁平文本
pub(crate) fn with_derived_fields(mut paper: Paper) -> Paper {
    paper.structure.sort_by_key(|c| c.index);
    paper.content_approval_status = approval::content_approval_status(&paper.structure);
    paper.content = chapter::flatten_content(&paper.structure);
    paper
}

pub(crate) fn stale_write(kind: &str, id: impl std::fmt::Display, expected: i64) -> SetukpaError {
    SetukpaError::stale_write(format!(
        "{kind} {id} 已被其他人修改（期望版本 {expected}），请刷新后重试"
    ))
}
