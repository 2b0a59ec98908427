#![deny(unsafe_code)]
//! meterbind-otel：以 OpenTelemetry Meter 实现 [`meterbind::MeterBackend`]。
//!
//! # 教案式说明
//! - **意图（Why）**：核心 crate 只定义“按种类创建仪表”的契约，本 crate 负责把该契约落到
//!   `opentelemetry` 的同步仪表上，并提供一次性的 Provider 与日志安装入口；
//! - **逻辑（How）**：
//!   1. [`OtelBackend`] 包装一个 `Meter`，按数值域与调用形态创建八种仪表；
//!   2. [`OtelConfig`] 描述 instrumentation scope 与 Resource，可从 TOML 加载；
//!   3. [`build_meter_provider`] 组装 `SdkMeterProvider`，导出链路由调用方提供的 reader 决定；
//!   4. [`install_logging`] 注册 `fmt + EnvFilter` 的全局 Subscriber。
//! - **契约（What）**：绑定阶段的失败经 [`meterbind::BackendError`] 上报；
//!   安装阶段的失败统一为本 crate 的 [`Error`]。

mod backend;
mod config;
mod logging;
mod provider;

pub use backend::{OtelBackend, validate_instrument_name};
pub use config::OtelConfig;
pub use logging::install_logging;
pub use provider::{build_meter_provider, resource_from_config};

use thiserror::Error;

/// 安装与配置阶段可能出现的错误。
///
/// # 教案式说明
/// - **意图（Why）**：将“配置无法解析”“全局 Subscriber 已被占用”归纳为有限的失败路径，
///   调用方可在启动流程中统一处理；
/// - **契约（What）**：实现 [`std::error::Error`]，保留底层错误作为 `source`。
#[derive(Debug, Error)]
pub enum Error {
    /// 外部已设置全局 `tracing` Subscriber，无法覆盖。
    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet,
    /// 设置全局 Subscriber 时的底层失败。
    #[error("failed to install the global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::dispatcher::SetGlobalDefaultError),
    /// TOML 配置无法解析。
    #[error("invalid meterbind-otel configuration: {0}")]
    Config(#[from] toml::de::Error),
}
