//! 服务层测试共用的内存数据

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::{DistributionService, GradeService, PaperService, WorkflowSettings};
use crate::errors::{Result, SetukpaError};
use crate::models::assignments::entities::{Assignment, AssignmentStatus};
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::models::notifications::entities::WorkflowEvent;
use crate::models::papers::entities::Paper;
use crate::models::papers::requests::{ReviewChapterRequest, ReviewDecision};
use crate::models::users::entities::{Principal, UserRole};
use crate::models::users::requests::{CreateBatchRequest, CreateUserRequest};
use crate::notifications::NotificationSink;
use crate::storage::Storage;
use crate::storage::memory_storage::MemoryStorage;

/// 记录所有发布的事件
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: WorkflowEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// 投递总是失败，模拟已关闭的通知队列
pub(crate) struct ClosedSink;

impl NotificationSink for ClosedSink {
    fn publish(&self, event: WorkflowEvent) -> Result<()> {
        Err(SetukpaError::notification_delivery(format!(
            "通知队列已关闭: {}",
            event.kind
        )))
    }
}

pub(crate) struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub sink: Arc<RecordingSink>,
    pub settings: Arc<WorkflowSettings>,
    pub batch_id: i64,
    pub admin: Principal,
    pub advisor: Principal,
    pub examiner: Principal,
    pub second_examiner: Principal,
    pub student: Principal,
    pub classmate: Principal,
}

impl Fixture {
    /// 一个批次：学员（有指导老师和考官）与同批次的另一名学员
    pub(crate) async fn new() -> Self {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

        let batch = storage
            .create_batch(CreateBatchRequest {
                name: "Angkatan 2025".into(),
                start_date: None,
                end_date: None,
                is_active: true,
            })
            .await
            .unwrap();

        let user = |username: &str, role: UserRole, batch_id, pembimbing_id| CreateUserRequest {
            username: username.into(),
            name: username.to_uppercase(),
            role,
            batch_id,
            pembimbing_id,
        };

        let admin = storage
            .create_user(user("admin", UserRole::Admin, None, None))
            .await
            .unwrap();
        let advisor = storage
            .create_user(user("pembimbing", UserRole::Pembimbing, None, None))
            .await
            .unwrap();
        let examiner = storage
            .create_user(user("penguji1", UserRole::Penguji, None, None))
            .await
            .unwrap();
        let second_examiner = storage
            .create_user(user("penguji2", UserRole::Penguji, None, None))
            .await
            .unwrap();
        let student = storage
            .create_user(user(
                "siswa01",
                UserRole::Siswa,
                Some(batch.id),
                Some(advisor.id),
            ))
            .await
            .unwrap();
        let classmate = storage
            .create_user(user("siswa02", UserRole::Siswa, Some(batch.id), None))
            .await
            .unwrap();

        storage.assign_examiner(student.id, examiner.id).await.unwrap();
        storage
            .assign_examiner(student.id, second_examiner.id)
            .await
            .unwrap();

        Self {
            storage,
            sink: Arc::new(RecordingSink::default()),
            settings: Arc::new(WorkflowSettings::default()),
            batch_id: batch.id,
            admin: Principal::new(admin.id, admin.role),
            advisor: Principal::new(advisor.id, advisor.role),
            examiner: Principal::new(examiner.id, examiner.role),
            second_examiner: Principal::new(second_examiner.id, second_examiner.role),
            student: Principal::new(student.id, student.role),
            classmate: Principal::new(classmate.id, classmate.role),
        }
    }

    fn notifier(&self) -> Arc<dyn NotificationSink> {
        self.sink.clone()
    }

    pub(crate) fn papers(&self) -> PaperService {
        PaperService::new(self.storage.clone(), self.notifier(), self.settings.clone())
    }

    /// 使用指定通知通道的论文服务
    pub(crate) fn papers_with(&self, notifier: Arc<dyn NotificationSink>) -> PaperService {
        PaperService::new(self.storage.clone(), notifier, self.settings.clone())
    }

    pub(crate) fn grades(&self) -> GradeService {
        GradeService::new(self.storage.clone(), self.notifier(), self.settings.clone())
    }

    pub(crate) fn distribution(&self) -> DistributionService {
        DistributionService::new(self.storage.clone(), self.notifier(), self.settings.clone())
    }

    pub(crate) async fn assignment(
        &self,
        status: AssignmentStatus,
        batch_id: Option<i64>,
        activation_date: Option<DateTime<Utc>>,
        deadline: Option<DateTime<Utc>>,
    ) -> Assignment {
        self.storage
            .create_assignment(CreateAssignmentRequest {
                title: "Naskah Kertas Karya".into(),
                subject: "Kepemimpinan".into(),
                activation_date,
                deadline,
                status,
                batch_id,
                template_id: None,
            })
            .await
            .unwrap()
    }

    /// 已发布、无时间限制的任务
    pub(crate) async fn open_assignment(&self) -> Assignment {
        self.assignment(AssignmentStatus::Published, Some(self.batch_id), None, None)
            .await
    }

    /// 学员开题后写完、提交并由指导老师通过全部章节
    pub(crate) async fn approved_paper(&self) -> Paper {
        let papers = self.papers();
        let assignment = self.open_assignment().await;
        let paper = papers
            .open_paper(&self.student, assignment.id)
            .await
            .unwrap();

        for chapter in &paper.structure {
            let edited = papers
                .update_chapter_content(
                    &self.student,
                    paper.id,
                    chapter.index,
                    format!("<p>Isi {}</p>", chapter.title),
                    chapter.version,
                )
                .await
                .unwrap();
            let submitted = papers
                .submit_chapter(&self.student, paper.id, chapter.index, edited.version)
                .await
                .unwrap();
            papers
                .review_chapter(
                    &self.advisor,
                    paper.id,
                    chapter.index,
                    ReviewChapterRequest {
                        decision: ReviewDecision::Approve,
                        comment: Some("Lanjutkan".into()),
                        version: submitted.version,
                    },
                )
                .await
                .unwrap();
        }

        self.storage.get_paper_by_id(paper.id).await.unwrap().unwrap()
    }
}
