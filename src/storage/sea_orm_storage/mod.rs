//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod grades;
mod notifications;
mod papers;
mod users;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{Result, SetukpaError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(database: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, database).await?
        } else {
            Self::connect_generic(&db_url, database).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SetukpaError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, database: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SetukpaError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");
        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库只存在于单个连接中
        let mut pool = SqlitePoolOptions::new()
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(database.timeout));
        pool = if in_memory {
            pool.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            pool.max_connections(database.pool_size)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool
            .connect_with(opt)
            .await
            .map_err(|e| SetukpaError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, database: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(database.timeout))
            .acquire_timeout(Duration::from_secs(database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| SetukpaError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SetukpaError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 唯一约束冲突转换为 Conflict，其余为数据库操作错误
pub(crate) fn map_write_err(err: DbErr, context: &str) -> SetukpaError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            SetukpaError::conflict(format!("{context}: 记录已存在 ({detail})"))
        }
        _ => SetukpaError::database_operation(format!("{context}: {err}")),
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn list_students(&self, batch_id: Option<i64>) -> Result<Vec<User>> {
        self.list_students_impl(batch_id).await
    }

    async fn assign_examiner(&self, student_id: i64, examiner_id: i64) -> Result<()> {
        self.assign_examiner_impl(student_id, examiner_id).await
    }

    async fn list_examiner_ids(&self, student_id: i64) -> Result<Vec<i64>> {
        self.list_examiner_ids_impl(student_id).await
    }

    // 批次模块
    async fn create_batch(&self, batch: CreateBatchRequest) -> Result<Batch> {
        self.create_batch_impl(batch).await
    }

    async fn get_batch_by_id(&self, batch_id: i64) -> Result<Option<Batch>> {
        self.get_batch_by_id_impl(batch_id).await
    }

    // 模板与任务模块
    async fn create_template(&self, template: CreateTemplateRequest) -> Result<PaperTemplate> {
        self.create_template_impl(template).await
    }

    async fn get_template_by_id(&self, template_id: i64) -> Result<Option<PaperTemplate>> {
        self.get_template_by_id_impl(template_id).await
    }

    async fn create_assignment(&self, assignment: CreateAssignmentRequest) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(assignment_id).await
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.list_assignments_impl().await
    }

    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool> {
        self.delete_assignment_impl(assignment_id).await
    }

    // 论文模块
    async fn create_paper(&self, paper: CreatePaperRequest) -> Result<Paper> {
        self.create_paper_impl(paper).await
    }

    async fn get_paper_by_id(&self, paper_id: i64) -> Result<Option<Paper>> {
        self.get_paper_by_id_impl(paper_id).await
    }

    async fn get_paper_by_assignment_and_student(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Paper>> {
        self.get_paper_by_assignment_and_student_impl(assignment_id, student_id)
            .await
    }

    async fn list_papers_by_student(&self, student_id: i64) -> Result<Vec<Paper>> {
        self.list_papers_by_student_impl(student_id).await
    }

    async fn list_all_papers(&self) -> Result<Vec<Paper>> {
        self.list_all_papers_impl().await
    }

    async fn update_paper(&self, paper: &Paper, expected_version: i64) -> Result<Paper> {
        self.update_paper_impl(paper, expected_version).await
    }

    async fn update_chapter(
        &self,
        paper_id: i64,
        chapter: &Chapter,
        expected_version: i64,
    ) -> Result<Chapter> {
        self.update_chapter_impl(paper_id, chapter, expected_version)
            .await
    }

    // 评分模块
    async fn upsert_grade(&self, grade: UpsertGradeRequest) -> Result<Grade> {
        self.upsert_grade_impl(grade).await
    }

    async fn get_grade_by_paper_id(&self, paper_id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_paper_id_impl(paper_id).await
    }

    async fn upsert_examiner_grade(
        &self,
        grade: UpsertExaminerGradeRequest,
    ) -> Result<ExaminerGrade> {
        self.upsert_examiner_grade_impl(grade).await
    }

    async fn list_examiner_grades_by_paper(&self, paper_id: i64) -> Result<Vec<ExaminerGrade>> {
        self.list_examiner_grades_by_paper_impl(paper_id).await
    }

    // 通知模块
    async fn create_notification(
        &self,
        notification: CreateNotificationRequest,
    ) -> Result<Notification> {
        self.create_notification_impl(notification).await
    }

    async fn list_notifications_by_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.list_notifications_by_user_impl(user_id).await
    }

    async fn mark_notification_as_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool> {
        self.mark_notification_as_read_impl(notification_id, user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::{
        entities::AssignmentStatus, requests::CreateAssignmentRequest,
    };
    use crate::models::grades::{
        entities::RubricScores,
        requests::{UpsertExaminerGradeRequest, UpsertGradeRequest},
    };
    use crate::models::notifications::entities::{CreateNotificationRequest, NotificationKind};
    use crate::models::papers::requests::CreatePaperRequest;
    use crate::models::users::{
        entities::UserRole,
        requests::{CreateBatchRequest, CreateUserRequest},
    };
    use crate::storage::Storage;
    use crate::workflow::chapter::initialize_structure;

    async fn memory_storage() -> SeaOrmStorage {
        SeaOrmStorage::connect(&DatabaseConfig {
            url: ":memory:".into(),
            pool_size: 1,
            timeout: 5,
        })
        .await
        .unwrap()
    }

    /// 一个批次中的一名学员和一个任务
    async fn seed(storage: &SeaOrmStorage) -> (i64, i64) {
        let batch = storage
            .create_batch(CreateBatchRequest {
                name: "Angkatan 2025".into(),
                start_date: None,
                end_date: None,
                is_active: true,
            })
            .await
            .unwrap();
        let student = storage
            .create_user(CreateUserRequest {
                username: "siswa01".into(),
                name: "Siswa Satu".into(),
                role: UserRole::Siswa,
                batch_id: Some(batch.id),
                pembimbing_id: None,
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment(CreateAssignmentRequest {
                title: "Naskah".into(),
                subject: "Kepemimpinan".into(),
                activation_date: None,
                deadline: None,
                status: AssignmentStatus::Published,
                batch_id: Some(batch.id),
                template_id: None,
            })
            .await
            .unwrap();
        (student.id, assignment.id)
    }

    #[tokio::test]
    async fn test_sqlite_chapter_versioning() {
        let storage = memory_storage().await;
        let (student_id, assignment_id) = seed(&storage).await;

        let req = CreatePaperRequest {
            student_id,
            assignment_id,
            title: "Naskah".into(),
            subject: "Kepemimpinan".into(),
            structure: initialize_structure(None, &[]),
        };
        let paper = storage.create_paper(req.clone()).await.unwrap();
        assert_eq!(paper.structure.len(), 2);

        let err = storage.create_paper(req).await.unwrap_err();
        assert!(matches!(err, SetukpaError::Conflict(_)));

        let mut chapter = paper.structure[0].clone();
        chapter.content = "<p>Isi pendahuluan</p>".into();
        let saved = storage
            .update_chapter(paper.id, &chapter, chapter.version)
            .await
            .unwrap();
        assert_eq!(saved.version, chapter.version + 1);

        let err = storage
            .update_chapter(paper.id, &chapter, chapter.version)
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let mut missing = chapter.clone();
        missing.index = 7;
        let err = storage
            .update_chapter(paper.id, &missing, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, SetukpaError::NotFound(_)));

        let reloaded = storage.get_paper_by_id(paper.id).await.unwrap().unwrap();
        assert_eq!(reloaded.structure[0].content, "<p>Isi pendahuluan</p>");
        assert!(reloaded.content.contains("Isi pendahuluan"));

        let mut graded = reloaded.clone();
        graded.grade = Some(77.0);
        let updated = storage
            .update_paper(&graded, reloaded.version)
            .await
            .unwrap();
        assert_eq!(updated.grade, Some(77.0));
        assert_eq!(updated.version, reloaded.version + 1);
        let err = storage
            .update_paper(&graded, reloaded.version)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");

        // 删除任务不会删除论文
        assert!(storage.delete_assignment(assignment_id).await.unwrap());
        assert_eq!(storage.list_all_papers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_grades_and_notifications() {
        let storage = memory_storage().await;
        let (student_id, assignment_id) = seed(&storage).await;
        let paper = storage
            .create_paper(CreatePaperRequest {
                student_id,
                assignment_id,
                title: "Naskah".into(),
                subject: "Kepemimpinan".into(),
                structure: initialize_structure(None, &[]),
            })
            .await
            .unwrap();

        let scores = RubricScores {
            content: 30.0,
            structure: 25.0,
            language: 17.0,
            format: 10.0,
        };
        let first = storage
            .upsert_grade(UpsertGradeRequest {
                paper_id: paper.id,
                advisor_id: student_id,
                scores,
                final_score: scores.total(),
                advisor_feedback: None,
            })
            .await
            .unwrap();
        let second = storage
            .upsert_grade(UpsertGradeRequest {
                paper_id: paper.id,
                advisor_id: student_id,
                scores,
                final_score: scores.total(),
                advisor_feedback: Some("Baik".into()),
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.final_score, 82.0);
        assert_eq!(second.scores, scores);

        let notification = storage
            .create_notification(CreateNotificationRequest {
                user_id: student_id,
                paper_id: Some(paper.id),
                kind: NotificationKind::AdvisorGraded,
                message: "Naskah sudah dinilai".into(),
            })
            .await
            .unwrap();
        assert!(!notification.is_read);
        assert!(
            !storage
                .mark_notification_as_read(notification.id, student_id + 1)
                .await
                .unwrap()
        );
        assert!(
            storage
                .mark_notification_as_read(notification.id, student_id)
                .await
                .unwrap()
        );
        let inbox = storage.list_notifications_by_user(student_id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].is_read);
    }

    #[tokio::test]
    async fn test_sqlite_concurrent_first_grades_share_row() {
        let storage = memory_storage().await;
        let (student_id, assignment_id) = seed(&storage).await;
        let paper = storage
            .create_paper(CreatePaperRequest {
                student_id,
                assignment_id,
                title: "Naskah".into(),
                subject: "Kepemimpinan".into(),
                structure: initialize_structure(None, &[]),
            })
            .await
            .unwrap();

        let scores = RubricScores {
            content: 20.0,
            structure: 20.0,
            language: 15.0,
            format: 20.0,
        };
        let grade = |feedback: &str| UpsertGradeRequest {
            paper_id: paper.id,
            advisor_id: student_id,
            scores,
            final_score: scores.total(),
            advisor_feedback: Some(feedback.into()),
        };
        let (a, b) = tokio::join!(
            storage.upsert_grade(grade("Pertama")),
            storage.upsert_grade(grade("Kedua"))
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(
            storage
                .get_grade_by_paper_id(paper.id)
                .await
                .unwrap()
                .unwrap()
                .id,
            a.id
        );

        let examiner_grade = |score: f64| UpsertExaminerGradeRequest {
            paper_id: paper.id,
            examiner_id: student_id,
            score,
            feedback: None,
        };
        let (a, b) = tokio::join!(
            storage.upsert_examiner_grade(examiner_grade(70.0)),
            storage.upsert_examiner_grade(examiner_grade(80.0))
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        let rows = storage.list_examiner_grades_by_paper(paper.id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("data/setukpa.db").unwrap(),
            "sqlite://data/setukpa.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://localhost/setukpa").is_ok());
        let err = SeaOrmStorage::build_database_url("ftp://nowhere").unwrap_err();
        assert_eq!(err.code(), "E001");
    }
}
