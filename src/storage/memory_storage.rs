//! 内存存储实现
//!
//! 基于 DashMap，用于测试和本地运行。版本比较在分片锁内完成，
//! (任务, 学员) 唯一性由索引表的 entry 保证。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::{Storage, stale_write, with_derived_fields};
use crate::errors::{Result, SetukpaError};
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
        entities::{Chapter, ContentApprovalStatus, FinalApprovalStatus, Paper},
        requests::CreatePaperRequest,
    },
    users::{
        entities::{Batch, User, UserRole},
        requests::{CreateBatchRequest, CreateUserRequest},
    },
};

/// 论文行，不含章节
#[derive(Debug, Clone)]
struct PaperRow {
    paper: Paper,
    chapter_count: i32,
}

#[derive(Default)]
pub struct MemoryStorage {
    next_id: AtomicI64,
    users: DashMap<i64, User>,
    examiners: DashMap<i64, Vec<i64>>,
    batches: DashMap<i64, Batch>,
    templates: DashMap<i64, PaperTemplate>,
    assignments: DashMap<i64, Assignment>,
    papers: DashMap<i64, PaperRow>,
    paper_index: DashMap<(i64, i64), i64>,
    chapters: DashMap<(i64, i32), Chapter>,
    grades: DashMap<i64, Grade>,
    examiner_grades: DashMap<(i64, i64), ExaminerGrade>,
    notifications: DashMap<i64, Notification>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        debug!("MemoryStorage initialized");
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn assemble(&self, row: PaperRow) -> Paper {
        let mut paper = row.paper;
        paper.structure = (0..row.chapter_count)
            .filter_map(|index| {
                self.chapters
                    .get(&(paper.id, index))
                    .map(|c| c.value().clone())
            })
            .collect();
        with_derived_fields(paper)
    }

    fn paper_row(&self, paper_id: i64) -> Option<PaperRow> {
        self.papers.get(&paper_id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    // 用户模块
    async fn create_user(&self, req: CreateUserRequest) -> Result<User> {
        if self.users.iter().any(|u| u.username == req.username) {
            return Err(SetukpaError::conflict(format!(
                "用户名 {} 已存在",
                req.username
            )));
        }
        let user = User {
            id: self.next_id(),
            username: req.username,
            name: req.name,
            role: req.role,
            batch_id: req.batch_id,
            pembimbing_id: req.pembimbing_id,
            created_at: chrono::Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn list_students(&self, batch_id: Option<i64>) -> Result<Vec<User>> {
        let mut students: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role == UserRole::Siswa)
            .filter(|u| batch_id.is_none() || u.batch_id == batch_id)
            .map(|u| u.value().clone())
            .collect();
        students.sort_by_key(|u| u.id);
        Ok(students)
    }

    async fn assign_examiner(&self, student_id: i64, examiner_id: i64) -> Result<()> {
        let mut entry = self.examiners.entry(student_id).or_default();
        if !entry.contains(&examiner_id) {
            entry.push(examiner_id);
        }
        Ok(())
    }

    async fn list_examiner_ids(&self, student_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .examiners
            .get(&student_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }

    // 批次模块
    async fn create_batch(&self, req: CreateBatchRequest) -> Result<Batch> {
        let batch = Batch {
            id: self.next_id(),
            name: req.name,
            start_date: req.start_date,
            end_date: req.end_date,
            is_active: req.is_active,
        };
        self.batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    async fn get_batch_by_id(&self, batch_id: i64) -> Result<Option<Batch>> {
        Ok(self.batches.get(&batch_id).map(|b| b.value().clone()))
    }

    // 模板与任务模块
    async fn create_template(&self, req: CreateTemplateRequest) -> Result<PaperTemplate> {
        let template = PaperTemplate {
            id: self.next_id(),
            name: req.name,
            chapters: req.chapters,
            layout: req.layout,
            created_at: chrono::Utc::now(),
        };
        self.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn get_template_by_id(&self, template_id: i64) -> Result<Option<PaperTemplate>> {
        Ok(self.templates.get(&template_id).map(|t| t.value().clone()))
    }

    async fn create_assignment(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        let now = chrono::Utc::now();
        let assignment = Assignment {
            id: self.next_id(),
            title: req.title,
            subject: req.subject,
            activation_date: req.activation_date,
            deadline: req.deadline,
            status: req.status,
            batch_id: req.batch_id,
            template_id: req.template_id,
            created_at: now,
            updated_at: now,
        };
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        Ok(self.assignments.get(&assignment_id).map(|a| a.value().clone()))
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let mut assignments: Vec<Assignment> =
            self.assignments.iter().map(|a| a.value().clone()).collect();
        assignments.sort_by_key(|a| a.id);
        Ok(assignments)
    }

    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool> {
        Ok(self.assignments.remove(&assignment_id).is_some())
    }

    // 论文模块
    async fn create_paper(&self, req: CreatePaperRequest) -> Result<Paper> {
        let now = chrono::Utc::now();
        let paper_id = match self.paper_index.entry((req.assignment_id, req.student_id)) {
            Entry::Occupied(existing) => {
                return Err(SetukpaError::conflict(format!(
                    "学员 {} 在任务 {} 下已有论文 {}",
                    req.student_id,
                    req.assignment_id,
                    existing.get()
                )));
            }
            Entry::Vacant(slot) => {
                let paper_id = self.next_id();
                for (index, chapter) in req.structure.iter().enumerate() {
                    let mut chapter = chapter.clone();
                    chapter.index = index as i32;
                    self.chapters.insert((paper_id, index as i32), chapter);
                }
                self.papers.insert(
                    paper_id,
                    PaperRow {
                        paper: Paper {
                            id: paper_id,
                            student_id: req.student_id,
                            assignment_id: req.assignment_id,
                            title: req.title,
                            subject: req.subject,
                            content: String::new(),
                            structure: Vec::new(),
                            grade: None,
                            content_approval_status: ContentApprovalStatus::Pending,
                            final_approval_status: FinalApprovalStatus::NotSubmitted,
                            final_file: None,
                            version: 0,
                            created_at: now,
                            updated_at: now,
                        },
                        chapter_count: req.structure.len() as i32,
                    },
                );
                slot.insert(paper_id);
                paper_id
            }
        };

        self.get_paper_by_id(paper_id)
            .await?
            .ok_or_else(|| SetukpaError::database_operation("论文创建后无法读取"))
    }

    async fn get_paper_by_id(&self, paper_id: i64) -> Result<Option<Paper>> {
        Ok(self.paper_row(paper_id).map(|row| self.assemble(row)))
    }

    async fn get_paper_by_assignment_and_student(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Paper>> {
        let paper_id = self
            .paper_index
            .get(&(assignment_id, student_id))
            .map(|id| *id.value());
        match paper_id {
            Some(id) => self.get_paper_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn list_papers_by_student(&self, student_id: i64) -> Result<Vec<Paper>> {
        let mut rows: Vec<PaperRow> = self
            .papers
            .iter()
            .filter(|r| r.paper.student_id == student_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.paper.id);
        Ok(rows.into_iter().map(|r| self.assemble(r)).collect())
    }

    async fn list_all_papers(&self) -> Result<Vec<Paper>> {
        let mut rows: Vec<PaperRow> = self.papers.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|r| r.paper.id);
        Ok(rows.into_iter().map(|r| self.assemble(r)).collect())
    }

    async fn update_paper(&self, paper: &Paper, expected_version: i64) -> Result<Paper> {
        let row = {
            let mut row = self
                .papers
                .get_mut(&paper.id)
                .ok_or_else(|| SetukpaError::not_found(format!("论文 {} 不存在", paper.id)))?;
            if row.paper.version != expected_version {
                return Err(stale_write("论文", paper.id, expected_version));
            }
            let stored = &mut row.paper;
            stored.title = paper.title.clone();
            stored.subject = paper.subject.clone();
            stored.grade = paper.grade;
            stored.final_approval_status = paper.final_approval_status;
            stored.final_file = paper.final_file.clone();
            stored.version = expected_version + 1;
            stored.updated_at = chrono::Utc::now();
            row.clone()
        };
        Ok(self.assemble(row))
    }

    async fn update_chapter(
        &self,
        paper_id: i64,
        chapter: &Chapter,
        expected_version: i64,
    ) -> Result<Chapter> {
        let mut stored = self
            .chapters
            .get_mut(&(paper_id, chapter.index))
            .ok_or_else(|| {
                SetukpaError::not_found(format!("论文 {paper_id} 的章节 {} 不存在", chapter.index))
            })?;
        if stored.version != expected_version {
            return Err(stale_write(
                "章节",
                format!("{paper_id}#{}", chapter.index),
                expected_version,
            ));
        }
        stored.title = chapter.title.clone();
        stored.content = chapter.content.clone();
        stored.status = chapter.status;
        stored.feedback_history = chapter.feedback_history.clone();
        stored.version = expected_version + 1;
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    // 评分模块
    async fn upsert_grade(&self, req: UpsertGradeRequest) -> Result<Grade> {
        let now = chrono::Utc::now();
        let mut entry = self.grades.entry(req.paper_id).or_insert_with(|| Grade {
            id: self.next_id(),
            paper_id: req.paper_id,
            advisor_id: req.advisor_id,
            scores: req.scores,
            final_score: req.final_score,
            advisor_feedback: None,
            graded_at: now,
            updated_at: now,
        });
        entry.advisor_id = req.advisor_id;
        entry.scores = req.scores;
        entry.final_score = req.final_score;
        entry.advisor_feedback = req.advisor_feedback;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn get_grade_by_paper_id(&self, paper_id: i64) -> Result<Option<Grade>> {
        Ok(self.grades.get(&paper_id).map(|g| g.value().clone()))
    }

    async fn upsert_examiner_grade(
        &self,
        req: UpsertExaminerGradeRequest,
    ) -> Result<ExaminerGrade> {
        let now = chrono::Utc::now();
        let mut entry = self
            .examiner_grades
            .entry((req.paper_id, req.examiner_id))
            .or_insert_with(|| ExaminerGrade {
                id: self.next_id(),
                paper_id: req.paper_id,
                examiner_id: req.examiner_id,
                score: req.score,
                feedback: None,
                graded_at: now,
                updated_at: now,
            });
        entry.score = req.score;
        entry.feedback = req.feedback;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn list_examiner_grades_by_paper(&self, paper_id: i64) -> Result<Vec<ExaminerGrade>> {
        let mut grades: Vec<ExaminerGrade> = self
            .examiner_grades
            .iter()
            .filter(|g| g.paper_id == paper_id)
            .map(|g| g.value().clone())
            .collect();
        grades.sort_by_key(|g| g.examiner_id);
        Ok(grades)
    }

    // 通知模块
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        let notification = Notification {
            id: self.next_id(),
            user_id: req.user_id,
            paper_id: req.paper_id,
            kind: req.kind,
            message: req.message,
            is_read: false,
            created_at: chrono::Utc::now(),
        };
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications_by_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let mut items: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.value().clone())
            .collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }

    async fn mark_notification_as_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool> {
        match self.notifications.get_mut(&notification_id) {
            Some(mut n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
