//! 角色权限表
//!
//! 以 (角色, 操作) 为键的显式权限表，取代散落在各处的角色判断。

use tracing::warn;

use crate::errors::{Result, SetukpaError};
use crate::models::users::entities::{Principal, UserRole};

/// 受权限控制的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ViewPaper,
    OpenPaper,
    EditChapter,
    SubmitChapter,
    ReviewChapter,
    ReopenChapter,
    UploadFinalDocument,
    ReviewFinalDocument,
    GradeRubric,
    GradeExaminer,
    OverrideGrade,
    ProvisionPapers,
    AuditData,
}

/// 访问范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Deny,
    /// 仅论文所属学员本人
    Owner,
    /// 仅被分配到该学员的指导老师 / 考官
    Assigned,
    Any,
}

/// 调用者与某篇论文（学员）之间的关系
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaperRelation {
    pub is_owner: bool,
    pub is_advisor: bool,
    pub is_examiner: bool,
}

/// 权限表
pub fn access(role: UserRole, operation: Operation) -> Access {
    use Operation::*;
    use UserRole::*;

    match (role, operation) {
        (Admin | SuperAdmin, ViewPaper | ReviewChapter | ReopenChapter) => Access::Any,
        (Admin | SuperAdmin, ReviewFinalDocument | OverrideGrade) => Access::Any,
        (Admin | SuperAdmin, ProvisionPapers | AuditData) => Access::Any,
        (Helper, ViewPaper | AuditData) => Access::Any,

        (Siswa, ViewPaper | OpenPaper | EditChapter | SubmitChapter) => Access::Owner,
        (Siswa, UploadFinalDocument) => Access::Owner,

        (Pembimbing, ViewPaper | ReviewChapter | ReviewFinalDocument | GradeRubric) => {
            Access::Assigned
        }
        (Penguji, ViewPaper | GradeExaminer | OverrideGrade) => Access::Assigned,

        _ => Access::Deny,
    }
}

/// 检查调用者能否对论文执行操作，不允许时返回 PermissionDenied
pub fn authorize(
    principal: &Principal,
    operation: Operation,
    relation: &PaperRelation,
) -> Result<()> {
    let allowed = match access(principal.role, operation) {
        Access::Any => true,
        Access::Owner => relation.is_owner,
        Access::Assigned => match principal.role {
            UserRole::Pembimbing => relation.is_advisor,
            UserRole::Penguji => relation.is_examiner,
            _ => false,
        },
        Access::Deny => false,
    };

    if allowed {
        Ok(())
    } else {
        warn!(
            "Permission denied: user {} ({}) attempted {:?}",
            principal.user_id, principal.role, operation
        );
        Err(SetukpaError::permission_denied(format!(
            "角色 {} 无权执行 {:?}",
            principal.role, operation
        )))
    }
}

/// 不针对具体论文的操作（分发、审计）
pub fn authorize_global(principal: &Principal, operation: Operation) -> Result<()> {
    authorize(principal, operation, &PaperRelation::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: PaperRelation = PaperRelation {
        is_owner: true,
        is_advisor: false,
        is_examiner: false,
    };
    const ADVISOR: PaperRelation = PaperRelation {
        is_owner: false,
        is_advisor: true,
        is_examiner: false,
    };
    const EXAMINER: PaperRelation = PaperRelation {
        is_owner: false,
        is_advisor: false,
        is_examiner: true,
    };
    const STRANGER: PaperRelation = PaperRelation {
        is_owner: false,
        is_advisor: false,
        is_examiner: false,
    };

    fn who(role: UserRole) -> Principal {
        Principal::new(1, role)
    }

    #[test]
    fn test_only_assigned_advisor_or_admin_reviews() {
        let op = Operation::ReviewChapter;
        assert!(authorize(&who(UserRole::Pembimbing), op, &ADVISOR).is_ok());
        assert!(authorize(&who(UserRole::Pembimbing), op, &STRANGER).is_err());
        assert!(authorize(&who(UserRole::Admin), op, &STRANGER).is_ok());
        assert!(authorize(&who(UserRole::Siswa), op, &OWNER).is_err());
        assert!(authorize(&who(UserRole::Penguji), op, &EXAMINER).is_err());
    }

    #[test]
    fn test_only_admins_reopen() {
        let op = Operation::ReopenChapter;
        assert!(authorize(&who(UserRole::SuperAdmin), op, &STRANGER).is_ok());
        assert!(authorize(&who(UserRole::Pembimbing), op, &ADVISOR).is_err());
        assert!(authorize(&who(UserRole::Helper), op, &STRANGER).is_err());
    }

    #[test]
    fn test_grading_is_exclusive_to_assigned_reviewer() {
        assert!(authorize(&who(UserRole::Pembimbing), Operation::GradeRubric, &ADVISOR).is_ok());
        assert!(authorize(&who(UserRole::Admin), Operation::GradeRubric, &STRANGER).is_err());
        assert!(authorize(&who(UserRole::Penguji), Operation::GradeExaminer, &EXAMINER).is_ok());
        assert!(
            authorize(&who(UserRole::Penguji), Operation::GradeExaminer, &STRANGER).is_err()
        );
        assert!(authorize(&who(UserRole::Pembimbing), Operation::GradeExaminer, &ADVISOR).is_err());
    }

    #[test]
    fn test_student_edits_only_own_paper() {
        assert!(authorize(&who(UserRole::Siswa), Operation::EditChapter, &OWNER).is_ok());
        let err = authorize(&who(UserRole::Siswa), Operation::EditChapter, &STRANGER).unwrap_err();
        assert!(matches!(err, SetukpaError::PermissionDenied(_)));
        assert!(authorize(&who(UserRole::Admin), Operation::EditChapter, &STRANGER).is_err());
    }

    #[test]
    fn test_global_operations() {
        assert!(authorize_global(&who(UserRole::Admin), Operation::ProvisionPapers).is_ok());
        assert!(authorize_global(&who(UserRole::Helper), Operation::AuditData).is_ok());
        assert!(authorize_global(&who(UserRole::Helper), Operation::ProvisionPapers).is_err());
        assert!(authorize_global(&who(UserRole::Siswa), Operation::AuditData).is_err());
    }
}
