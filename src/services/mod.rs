//! 工作流服务
//!
//! 每个操作都接收调用者的 `Principal`，先查权限表，再调用 `workflow` 中的纯逻辑，
//! 最后带版本号写回存储并发布通知。

pub mod access;
pub mod distribution;
pub mod grades;
pub mod notifications;
pub mod papers;

#[cfg(test)]
pub(crate) mod fixtures;

pub use distribution::DistributionService;
pub use grades::GradeService;
pub use notifications::NotificationService;
pub use papers::PaperService;

use crate::config::{AppConfig, GradingConfig, WorkflowConfig};

/// 服务使用的业务配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowSettings {
    pub grading: GradingConfig,
    pub workflow: WorkflowConfig,
}

impl From<&AppConfig> for WorkflowSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            grading: config.grading.clone(),
            workflow: config.workflow.clone(),
        }
    }
}
