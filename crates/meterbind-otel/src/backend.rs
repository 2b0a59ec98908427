use std::sync::Arc;

use meterbind::{
    AddCapable, AddKind, BackendError, KeyValue, MeasureContext, MeterBackend, RecordCapable,
    RecordKind,
};
use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter, MeterProvider, UpDownCounter},
};
use tracing::{debug, trace};

use crate::OtelConfig;

/// OpenTelemetry 对仪表名称的长度上限。
const MAX_NAME_LEN: usize = 255;

/// 校验仪表名称是否满足 OpenTelemetry 的命名规则。
///
/// # 契约说明（What）
/// - 首字符为 ASCII 字母，其余为 ASCII 字母数字或 `_ . - /`；
/// - 长度不超过 255 字节。
///
/// SDK 对非法名称只记录内部日志并返回空实现，这里提前拒绝，使错误在绑定阶段可见。
pub fn validate_instrument_name(name: &str) -> Result<(), BackendError> {
    if name.len() > MAX_NAME_LEN {
        return Err(BackendError::new(format!(
            "instrument name exceeds {MAX_NAME_LEN} bytes"
        )));
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => {
            return Err(BackendError::new(format!(
                "instrument name `{name}` must start with an ASCII letter"
            )));
        }
    }
    let allowed = |c: &char| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-' | '/');
    if let Some(bad) = chars.find(|c| !allowed(c)) {
        return Err(BackendError::new(format!(
            "instrument name `{name}` contains invalid character `{bad}`"
        )));
    }
    Ok(())
}

/// 基于 OpenTelemetry `Meter` 的指标后端。
///
/// # 教案式说明
/// - **意图（Why）**：将核心 crate 的八种叶子映射到 OpenTelemetry 同步仪表，
///   宿主只需提供 Meter（或 Provider）即可让整棵蓝图开始上报；
/// - **逻辑（How）**：
///   - I64 Counter 与 I64 Histogram 映射为 `u64` 仪表，负值在写入前丢弃并记录 `debug` 日志；
///   - 其余组合一一对应同名的 `i64_*` / `f64_*` 仪表；
///   - 非空桶边界通过 `with_boundaries` 传给直方图；
///   - 测量时上下文已取消或超时则丢弃该次测量。
/// - **契约（What）**：`Clone` 成本为一次引用计数；可跨线程共享。
#[derive(Clone, Debug)]
pub struct OtelBackend {
    meter: Meter,
}

impl OtelBackend {
    pub fn new(meter: Meter) -> Self {
        Self { meter }
    }

    /// 从给定 Provider 取得按配置命名的 Meter。
    pub fn from_provider<P>(provider: &P, config: &OtelConfig) -> Self
    where
        P: MeterProvider + ?Sized,
    {
        Self::new(provider.meter_with_scope(config.instrumentation_scope()))
    }

    /// 使用 `opentelemetry::global` 当前注册的 Provider。
    ///
    /// 未注册时全局 Provider 为空实现，测量值被静默丢弃。
    pub fn global(config: &OtelConfig) -> Self {
        Self::new(global::meter_provider().meter_with_scope(config.instrumentation_scope()))
    }
}

impl MeterBackend for OtelBackend {
    fn i64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<i64>>, BackendError> {
        validate_instrument_name(id)?;
        let name = id.to_owned();
        let instrument: Arc<dyn AddCapable<i64>> = match kind {
            AddKind::Counter => Arc::new(Bridged::new(id, self.meter.u64_counter(name).build())),
            AddKind::UpDownCounter => Arc::new(Bridged::new(
                id,
                self.meter.i64_up_down_counter(name).build(),
            )),
        };
        created(id, "I64", kind.into());
        Ok(instrument)
    }

    fn f64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<f64>>, BackendError> {
        validate_instrument_name(id)?;
        let name = id.to_owned();
        let instrument: Arc<dyn AddCapable<f64>> = match kind {
            AddKind::Counter => Arc::new(Bridged::new(id, self.meter.f64_counter(name).build())),
            AddKind::UpDownCounter => Arc::new(Bridged::new(
                id,
                self.meter.f64_up_down_counter(name).build(),
            )),
        };
        created(id, "F64", kind.into());
        Ok(instrument)
    }

    fn i64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<i64>>, BackendError> {
        validate_instrument_name(id)?;
        let name = id.to_owned();
        let instrument: Arc<dyn RecordCapable<i64>> = match kind {
            RecordKind::Gauge => Arc::new(Bridged::new(id, self.meter.i64_gauge(name).build())),
            RecordKind::Histogram => {
                let mut builder = self.meter.u64_histogram(name);
                if !boundaries.is_empty() {
                    builder = builder.with_boundaries(boundaries.to_vec());
                }
                Arc::new(Bridged::new(id, builder.build()))
            }
        };
        created(id, "I64", kind.into());
        Ok(instrument)
    }

    fn f64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<f64>>, BackendError> {
        validate_instrument_name(id)?;
        let name = id.to_owned();
        let instrument: Arc<dyn RecordCapable<f64>> = match kind {
            RecordKind::Gauge => Arc::new(Bridged::new(id, self.meter.f64_gauge(name).build())),
            RecordKind::Histogram => {
                let mut builder = self.meter.f64_histogram(name);
                if !boundaries.is_empty() {
                    builder = builder.with_boundaries(boundaries.to_vec());
                }
                Arc::new(Bridged::new(id, builder.build()))
            }
        };
        created(id, "F64", kind.into());
        Ok(instrument)
    }
}

fn created(id: &str, domain: &str, kind: meterbind::InstrumentKind) {
    debug!(id, domain, kind = %kind, "otel instrument created");
}

/// 持有 OpenTelemetry 仪表与其名称的本地包装，承载核心 crate 的调用能力。
struct Bridged<I> {
    id: Arc<str>,
    instrument: I,
}

impl<I> Bridged<I> {
    fn new(id: &str, instrument: I) -> Self {
        Self {
            id: Arc::from(id),
            instrument,
        }
    }

    /// 上下文已结束时返回 `false`。
    fn admits(&self, cx: &MeasureContext) -> bool {
        if cx.is_done() {
            trace!(id = %self.id, "measurement dropped: context is done");
            return false;
        }
        true
    }
}

fn to_otel(attributes: &[KeyValue]) -> Vec<opentelemetry::KeyValue> {
    attributes
        .iter()
        .map(|kv| opentelemetry::KeyValue::new(kv.key().to_owned(), kv.value().to_owned()))
        .collect()
}

/// 单调仪表以 `u64` 表示，负值无法写入。
fn non_negative(id: &str, value: i64) -> Option<u64> {
    match u64::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(id, value, "negative value dropped for unsigned instrument");
            None
        }
    }
}

impl AddCapable<i64> for Bridged<Counter<u64>> {
    fn add_in(&self, cx: &MeasureContext, value: i64, attributes: &[KeyValue]) {
        if !self.admits(cx) {
            return;
        }
        if let Some(value) = non_negative(&self.id, value) {
            self.instrument.add(value, &to_otel(attributes));
        }
    }
}

impl AddCapable<i64> for Bridged<UpDownCounter<i64>> {
    fn add_in(&self, cx: &MeasureContext, value: i64, attributes: &[KeyValue]) {
        if self.admits(cx) {
            self.instrument.add(value, &to_otel(attributes));
        }
    }
}

impl AddCapable<f64> for Bridged<Counter<f64>> {
    fn add_in(&self, cx: &MeasureContext, value: f64, attributes: &[KeyValue]) {
        if self.admits(cx) {
            self.instrument.add(value, &to_otel(attributes));
        }
    }
}

impl AddCapable<f64> for Bridged<UpDownCounter<f64>> {
    fn add_in(&self, cx: &MeasureContext, value: f64, attributes: &[KeyValue]) {
        if self.admits(cx) {
            self.instrument.add(value, &to_otel(attributes));
        }
    }
}

impl RecordCapable<i64> for Bridged<Gauge<i64>> {
    fn record_in(&self, cx: &MeasureContext, value: i64, attributes: &[KeyValue]) {
        if self.admits(cx) {
            self.instrument.record(value, &to_otel(attributes));
        }
    }
}

impl RecordCapable<i64> for Bridged<Histogram<u64>> {
    fn record_in(&self, cx: &MeasureContext, value: i64, attributes: &[KeyValue]) {
        if !self.admits(cx) {
            return;
        }
        if let Some(value) = non_negative(&self.id, value) {
            self.instrument.record(value, &to_otel(attributes));
        }
    }
}

impl RecordCapable<f64> for Bridged<Gauge<f64>> {
    fn record_in(&self, cx: &MeasureContext, value: f64, attributes: &[KeyValue]) {
        if self.admits(cx) {
            self.instrument.record(value, &to_otel(attributes));
        }
    }
}

impl RecordCapable<f64> for Bridged<Histogram<f64>> {
    fn record_in(&self, cx: &MeasureContext, value: f64, attributes: &[KeyValue]) {
        if self.admits(cx) {
            self.instrument.record(value, &to_otel(attributes));
        }
    }
}
