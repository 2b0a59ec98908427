use opentelemetry::KeyValue;
use opentelemetry_sdk::{
    Resource,
    metrics::{SdkMeterProvider, reader::MetricReader},
};
use tracing::debug;

use crate::OtelConfig;

/// 根据配置中的 `resource` 映射构造 OpenTelemetry `Resource`。
///
/// # 教案式说明
/// - **逻辑（How）**：逐条映射为 [`KeyValue`]，交由 [`Resource::new`] 合并；
/// - **契约（What）**：返回的 `Resource` 不包含 schema URL，键顺序与映射一致。
pub fn resource_from_config(config: &OtelConfig) -> Resource {
    let owned = config
        .resource
        .iter()
        .map(|(key, value)| KeyValue::new(key.clone(), value.clone()));
    Resource::new(owned)
}

/// 组装带有配置 Resource 的 `SdkMeterProvider`。
///
/// # 教案式说明
/// - **意图（Why）**：导出方式（周期推送、手动拉取、Prometheus 等）由宿主选择，
///   本函数只负责把 reader 与 Resource 拼装到一起；
/// - **契约（What）**：返回的 Provider 未注册到 `opentelemetry::global`，
///   需要全局可见时由调用方自行 `set_meter_provider`。
pub fn build_meter_provider<R>(config: &OtelConfig, reader: R) -> SdkMeterProvider
where
    R: MetricReader,
{
    debug!(
        scope = %config.scope,
        resource_attributes = config.resource.len(),
        "building meter provider"
    );
    SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource_from_config(config))
        .build()
}
