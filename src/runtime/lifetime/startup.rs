use crate::config::AppConfig;
use crate::errors::Result;
use crate::notifications::{NoopNotificationSink, NotificationDispatcher, NotificationSink};
use crate::services::{
    DistributionService, GradeService, NotificationService, PaperService, WorkflowSettings,
};
use crate::storage::Storage;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub notifier: Arc<dyn NotificationSink>,
    pub settings: Arc<WorkflowSettings>,
    pub(crate) dispatcher: Option<JoinHandle<()>>,
}

impl StartupContext {
    /// 组装运行上下文；开启通知时启动后台分发任务
    pub fn new(
        storage: Arc<dyn Storage>,
        settings: WorkflowSettings,
        notifications_enabled: bool,
    ) -> Self {
        let (notifier, dispatcher) = if notifications_enabled {
            let (sink, handle) = NotificationDispatcher::spawn(storage.clone());
            (sink as Arc<dyn NotificationSink>, Some(handle))
        } else {
            warn!("Notifications are disabled, workflow events will be dropped");
            (Arc::new(NoopNotificationSink) as Arc<dyn NotificationSink>, None)
        };

        Self {
            storage,
            notifier,
            settings: Arc::new(settings),
            dispatcher,
        }
    }

    pub fn paper_service(&self) -> PaperService {
        PaperService::new(
            self.storage.clone(),
            self.notifier.clone(),
            self.settings.clone(),
        )
    }

    pub fn grade_service(&self) -> GradeService {
        GradeService::new(
            self.storage.clone(),
            self.notifier.clone(),
            self.settings.clone(),
        )
    }

    pub fn distribution_service(&self) -> DistributionService {
        DistributionService::new(
            self.storage.clone(),
            self.notifier.clone(),
            self.settings.clone(),
        )
    }

    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(self.storage.clone())
    }
}

/// 按全局配置准备存储与通知
pub async fn prepare_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    if cfg!(debug_assertions) {
        crate::storage::register::debug_storage_registry();
        debug!("Debug mode: Storage registry is enabled");
    }

    let storage = crate::storage::create_storage(&config.storage.backend).await?;
    info!(
        "Storage backend '{}' initialized and migrations completed",
        config.storage.backend
    );

    Ok(StartupContext::new(
        storage,
        WorkflowSettings::from(config),
        config.notifications.enabled,
    ))
}
