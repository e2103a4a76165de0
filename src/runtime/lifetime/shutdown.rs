use tokio::signal;
use tracing::warn;

/// 等待 Ctrl+C，监听失败时一直挂起，交由服务器自身结束
pub async fn listen_for_shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}
