pub mod audit;
pub mod list;
pub mod provision;

use std::sync::Arc;

use super::WorkflowSettings;
use crate::errors::Result;
use crate::models::assignments::responses::{AssignmentEntry, DanglingPaper, ProvisionSummary};
use crate::models::users::entities::Principal;
use crate::notifications::NotificationSink;
use crate::storage::Storage;

pub struct DistributionService {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn NotificationSink>,
    settings: Arc<WorkflowSettings>,
}

impl DistributionService {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn NotificationSink>,
        settings: Arc<WorkflowSettings>,
    ) -> Self {
        Self {
            storage,
            notifier,
            settings,
        }
    }

    pub(crate) fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    /// 学员的任务列表及状态
    pub async fn list_student_assignments(
        &self,
        principal: &Principal,
        student_id: i64,
    ) -> Result<Vec<AssignmentEntry>> {
        list::list_student_assignments(self, principal, student_id, chrono::Utc::now()).await
    }

    /// 为所有适用且尚无论文的学员预先创建论文
    pub async fn provision_assignment(
        &self,
        principal: &Principal,
        assignment_id: i64,
    ) -> Result<ProvisionSummary> {
        provision::provision_assignment(self, principal, assignment_id).await
    }

    /// 审计：引用已删除任务的论文
    pub async fn find_dangling_papers(&self, principal: &Principal) -> Result<Vec<DanglingPaper>> {
        audit::find_dangling_papers(self, principal).await
    }
}
