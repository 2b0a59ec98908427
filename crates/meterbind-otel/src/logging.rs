use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

use crate::Error;

/// 安装进程级 `tracing` Subscriber：`fmt` 输出 + 来自 `RUST_LOG` 的过滤规则。
///
/// # 教案式说明
/// - **意图（Why）**：绑定器以 `debug` 级别报告每个叶子的创建、以 `warn` 报告后端拒绝，
///   宿主若尚未配置日志，可用本函数一步获得可读输出；
/// - **逻辑（How）**：`RUST_LOG` 缺失或无法解析时退回 `info`；
/// - **契约（What）**：外部已设置全局 Subscriber 时返回 [`Error::SubscriberAlreadySet`]，
///   因此第二次调用同样失败。
pub fn install_logging() -> Result<(), Error> {
    if dispatcher::has_been_set() {
        return Err(Error::SubscriberAlreadySet);
    }
    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
