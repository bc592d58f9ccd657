//! 任务可见性与分发
//!
//! 判断某个任务是否适用于某个学员，以及在学员尚未创建论文时根据时间推导状态。

use std::collections::{HashMap, HashSet};

use crate::errors::{Result, SetukpaError};
use crate::models::assignments::entities::{Assignment, AssignmentStatus};
use crate::models::assignments::responses::{
    AssignmentEntry, AssignmentLifecycleStatus, DanglingPaper,
};
use crate::models::grades::entities::FinalScore;
use crate::models::papers::entities::{
    ChapterStatus, ContentApprovalStatus, FinalApprovalStatus, Paper,
};
use crate::models::users::entities::User;

/// 任务未指定批次时适用于所有批次
pub fn is_applicable(assignment: &Assignment, student: &User) -> bool {
    match assignment.batch_id {
        None => true,
        Some(batch_id) => student.batch_id == Some(batch_id),
    }
}

/// 草稿任务对学员不可见
pub fn is_visible(assignment: &Assignment, student: &User) -> bool {
    assignment.status != AssignmentStatus::Draft && is_applicable(assignment, student)
}

/// 没有论文时的时间状态：开放前 SCHEDULED，开放期间 AVAILABLE，截止后 MISSED
pub fn time_status(
    assignment: &Assignment,
    now: chrono::DateTime<chrono::Utc>,
) -> AssignmentLifecycleStatus {
    if assignment.activation_date.is_some_and(|start| now < start) {
        AssignmentLifecycleStatus::Scheduled
    } else if assignment.deadline.is_some_and(|deadline| now > deadline) {
        AssignmentLifecycleStatus::Missed
    } else {
        AssignmentLifecycleStatus::Available
    }
}

/// 论文已存在时以论文自身的审批/评分状态为准
pub fn paper_status(paper: &Paper, final_score: &FinalScore) -> AssignmentLifecycleStatus {
    if final_score.score.is_some() {
        return AssignmentLifecycleStatus::Graded;
    }
    match paper.final_approval_status {
        FinalApprovalStatus::Approved => return AssignmentLifecycleStatus::Completed,
        FinalApprovalStatus::Pending => return AssignmentLifecycleStatus::FinalReview,
        FinalApprovalStatus::NotSubmitted | FinalApprovalStatus::Rejected => {}
    }
    match paper.content_approval_status {
        ContentApprovalStatus::Approved => AssignmentLifecycleStatus::ContentApproved,
        ContentApprovalStatus::Rejected => AssignmentLifecycleStatus::Revision,
        ContentApprovalStatus::Pending => {
            if paper
                .structure
                .iter()
                .any(|c| c.status == ChapterStatus::Submitted)
            {
                AssignmentLifecycleStatus::UnderReview
            } else {
                AssignmentLifecycleStatus::InProgress
            }
        }
    }
}

/// 找出引用已删除任务的论文
pub fn find_dangling<'a>(
    papers: impl IntoIterator<Item = &'a Paper>,
    assignments: &[Assignment],
) -> Vec<DanglingPaper> {
    let known: HashSet<i64> = assignments.iter().map(|a| a.id).collect();
    papers
        .into_iter()
        .filter(|p| !known.contains(&p.assignment_id))
        .map(|p| DanglingPaper {
            paper_id: p.id,
            student_id: p.student_id,
            assignment_id: p.assignment_id,
        })
        .collect()
}

/// 生成学员的任务列表
///
/// `papers` 为该学员的论文及其最终分数，`assignments` 为全部任务。
/// 学员有论文但对应任务已被删除时返回 DanglingReference。
pub fn resolve_student_assignments(
    student: &User,
    assignments: &[Assignment],
    papers: Vec<(Paper, FinalScore)>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<AssignmentEntry>> {
    let dangling = find_dangling(papers.iter().map(|(paper, _)| paper), assignments);
    if let Some(orphan) = dangling.first() {
        return Err(SetukpaError::dangling_reference(format!(
            "论文 {} 引用的任务 {} 不存在",
            orphan.paper_id, orphan.assignment_id
        )));
    }

    let mut by_assignment: HashMap<i64, (Paper, FinalScore)> = papers
        .into_iter()
        .map(|(paper, score)| (paper.assignment_id, (paper, score)))
        .collect();

    let mut entries = Vec::new();
    for assignment in assignments {
        match by_assignment.remove(&assignment.id) {
            Some((paper, score)) => entries.push(AssignmentEntry {
                assignment: assignment.clone(),
                status: paper_status(&paper, &score),
                paper_id: Some(paper.id),
                final_score: Some(score),
            }),
            None if is_visible(assignment, student) => entries.push(AssignmentEntry {
                assignment: assignment.clone(),
                status: time_status(assignment, now),
                paper_id: None,
                final_score: None,
            }),
            None => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::ScoreSource;
    use crate::models::users::entities::UserRole;
    use crate::workflow::chapter::initialize_structure;
    use chrono::{Duration, Utc};

    fn student(batch_id: Option<i64>) -> User {
        User {
            id: 10,
            username: "siswa01".into(),
            name: "Siswa".into(),
            role: UserRole::Siswa,
            batch_id,
            pembimbing_id: Some(2),
            created_at: Utc::now(),
        }
    }

    fn assignment(id: i64, batch_id: Option<i64>) -> Assignment {
        let now = Utc::now();
        Assignment {
            id,
            title: format!("Tugas {id}"),
            subject: "Naskah".into(),
            activation_date: None,
            deadline: None,
            status: AssignmentStatus::Published,
            batch_id,
            template_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn paper(id: i64, assignment_id: i64) -> Paper {
        let now = Utc::now();
        Paper {
            id,
            student_id: 10,
            assignment_id,
            title: "Judul".into(),
            subject: "Naskah".into(),
            content: String::new(),
            structure: initialize_structure(None, &[]),
            grade: None,
            content_approval_status: ContentApprovalStatus::Pending,
            final_approval_status: FinalApprovalStatus::NotSubmitted,
            final_file: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn no_score() -> FinalScore {
        FinalScore {
            score: None,
            source: ScoreSource::None,
            examiner_score: None,
            examiner_count: 0,
        }
    }

    #[test]
    fn test_other_batch_not_applicable() {
        let a = assignment(1, Some(1));
        let s = student(Some(2));
        assert!(!is_applicable(&a, &s));

        let entries = resolve_student_assignments(&s, &[a], vec![], Utc::now()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_batchless_assignment_applies_to_everyone() {
        let a = assignment(1, None);
        assert!(is_applicable(&a, &student(None)));
        assert!(is_applicable(&a, &student(Some(5))));
    }

    #[test]
    fn test_time_status_boundaries() {
        let now = Utc::now();
        let mut a = assignment(1, None);
        assert_eq!(time_status(&a, now), AssignmentLifecycleStatus::Available);

        a.activation_date = Some(now + Duration::hours(1));
        assert_eq!(time_status(&a, now), AssignmentLifecycleStatus::Scheduled);

        a.activation_date = Some(now);
        a.deadline = Some(now);
        assert_eq!(time_status(&a, now), AssignmentLifecycleStatus::Available);

        a.deadline = Some(now - Duration::seconds(1));
        assert_eq!(time_status(&a, now), AssignmentLifecycleStatus::Missed);
    }

    #[test]
    fn test_past_deadline_without_paper_is_missed() {
        let mut a = assignment(1, None);
        a.deadline = Some(Utc::now() - Duration::days(1));
        let entries =
            resolve_student_assignments(&student(None), &[a], vec![], Utc::now()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AssignmentLifecycleStatus::Missed);
        assert_eq!(entries[0].paper_id, None);
    }

    #[test]
    fn test_existing_paper_overrides_time_status() {
        let mut a = assignment(1, None);
        a.deadline = Some(Utc::now() - Duration::days(1));
        let entries = resolve_student_assignments(
            &student(None),
            &[a],
            vec![(paper(100, 1), no_score())],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(entries[0].status, AssignmentLifecycleStatus::InProgress);
        assert_eq!(entries[0].paper_id, Some(100));
    }

    #[test]
    fn test_draft_assignment_hidden() {
        let mut a = assignment(1, None);
        a.status = AssignmentStatus::Draft;
        let entries =
            resolve_student_assignments(&student(None), &[a], vec![], Utc::now()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_deleted_assignment_reports_dangling_reference() {
        let err = resolve_student_assignments(
            &student(None),
            &[assignment(1, None)],
            vec![(paper(100, 99), no_score())],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, SetukpaError::DanglingReference(_)));
    }

    #[test]
    fn test_paper_status_precedence() {
        let mut p = paper(1, 1);
        assert_eq!(paper_status(&p, &no_score()), AssignmentLifecycleStatus::InProgress);

        p.structure[0].status = ChapterStatus::Submitted;
        assert_eq!(paper_status(&p, &no_score()), AssignmentLifecycleStatus::UnderReview);

        p.final_approval_status = FinalApprovalStatus::Pending;
        assert_eq!(paper_status(&p, &no_score()), AssignmentLifecycleStatus::FinalReview);

        let graded = FinalScore {
            score: Some(88.0),
            source: ScoreSource::Advisor,
            examiner_score: None,
            examiner_count: 0,
        };
        assert_eq!(paper_status(&p, &graded), AssignmentLifecycleStatus::Graded);
    }
}
