use tracing::{debug, warn};

use super::startup::StartupContext;

/// 关闭通知通道并等待已发布的事件写完
///
/// 调用前必须先丢弃由该上下文创建的服务，否则发送端仍然存活。
pub async fn shutdown(context: StartupContext) {
    let StartupContext {
        notifier,
        dispatcher,
        ..
    } = context;
    drop(notifier);

    if let Some(handle) = dispatcher {
        match handle.await {
            Ok(()) => debug!("Pending notifications flushed"),
            Err(e) => warn!("Notification dispatcher terminated abnormally: {}", e),
        }
    }
}
