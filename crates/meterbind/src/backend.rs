use std::sync::Arc;

use thiserror::Error;

use crate::{
    attributes::KeyValue,
    context::MeasureContext,
    instrument::{AddKind, RecordKind},
};

/// 累加型仪表的调用能力。
///
/// # 设计背景（Why）
/// - Counter 与 UpDownCounter 共享同一调用形态：提交一个增量与若干属性。
/// - 与 [`RecordCapable`] 互斥：同一仪表不会同时暴露 `add` 与 `record`。
///
/// # 契约说明（What）
/// - **前置条件**：Counter 的增量应为非负值，本层不做校验；UpDownCounter 可为负。
/// - **后置条件**：调用同步返回且不报告错误，后端内部失败须自行吞掉或记录日志。
/// - 实现必须线程安全，可被多个线程并发调用。
pub trait AddCapable<N>: Send + Sync {
    /// 在显式上下文下提交增量。
    fn add_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]);

    /// 使用 [`MeasureContext::background`] 提交增量。
    fn add(&self, value: N, attributes: &[KeyValue]) {
        self.add_in(MeasureContext::background(), value, attributes);
    }
}

/// 记录型仪表的调用能力。
///
/// # 契约说明（What）
/// - Gauge 记录当前值，Histogram 记录一次样本；二者对调用方呈现同一形态。
/// - 与 [`AddCapable`] 的后置条件一致：不返回错误、不阻塞调用方。
pub trait RecordCapable<N>: Send + Sync {
    /// 在显式上下文下记录数值。
    fn record_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]);

    /// 使用 [`MeasureContext::background`] 记录数值。
    fn record(&self, value: N, attributes: &[KeyValue]) {
        self.record_in(MeasureContext::background(), value, attributes);
    }
}

impl<N, T> AddCapable<N> for Arc<T>
where
    T: AddCapable<N> + ?Sized,
{
    fn add_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]) {
        (**self).add_in(cx, value, attributes);
    }
}

impl<N, T> RecordCapable<N> for Arc<T>
where
    T: RecordCapable<N> + ?Sized,
{
    fn record_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]) {
        (**self).record_in(cx, value, attributes);
    }
}

/// 后端拒绝创建仪表时返回的错误。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 可插拔的指标后端。
///
/// # 设计背景（Why）
/// - 绑定器只依赖“按种类、标识与桶边界创建仪表”这一最小能力，
///   具体聚合、导出与暴露格式全部留给后端。
/// - 四个创建调用按数值域 × 调用形态划分，配合 [`AddKind`] / [`RecordKind`]
///   覆盖全部八种叶子组合，且无法请求“记录型的 Counter”之类的非法组合。
///
/// # 契约说明（What）
/// - **前置条件**：`id` 非空，已由标签解析阶段保证。
/// - `boundaries` 仅在 [`RecordKind::Histogram`] 时可能非空；为空表示采用后端默认桶。
/// - **后置条件**：成功返回的仪表在进程生命周期内可用；同一 `id` 可能被请求多次，
///   去重与冲突处理属于后端自身职责。
/// - 实现必须可在多线程中并发调用。
///
/// # 风险提示（Trade-offs）
/// - 未注入后端时绑定器直接构造空操作句柄，不会调用任何创建方法；
///   因此“是否启用遥测”不需要一个永远返回空实现的后端。
pub trait MeterBackend: Send + Sync {
    fn i64_adder(&self, kind: AddKind, id: &str)
    -> Result<Arc<dyn AddCapable<i64>>, BackendError>;

    fn f64_adder(&self, kind: AddKind, id: &str)
    -> Result<Arc<dyn AddCapable<f64>>, BackendError>;

    fn i64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<i64>>, BackendError>;

    fn f64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<f64>>, BackendError>;
}

impl<T> MeterBackend for Arc<T>
where
    T: MeterBackend + ?Sized,
{
    fn i64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<i64>>, BackendError> {
        (**self).i64_adder(kind, id)
    }

    fn f64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<f64>>, BackendError> {
        (**self).f64_adder(kind, id)
    }

    fn i64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<i64>>, BackendError> {
        (**self).i64_recorder(kind, id, boundaries)
    }

    fn f64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<f64>>, BackendError> {
        (**self).f64_recorder(kind, id, boundaries)
    }
}
