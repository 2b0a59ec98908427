//! 句柄包装层：把累积属性集合固化到后端仪表之上。

use std::{fmt, sync::Arc};

use crate::{
    attributes::{AttributeSet, KeyValue},
    backend::{AddCapable, RecordCapable},
    context::MeasureContext,
    instrument::Number,
};

/// 空操作仪表，同时实现两种调用能力。
///
/// # 契约说明（What）
/// - 所有调用都是纯丢弃：不 panic、不报错、不产生可观测副作用；
/// - 零尺寸类型，可被任意数量的句柄共享。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopInstrument;

impl<N> AddCapable<N> for NoopInstrument {
    fn add_in(&self, _cx: &MeasureContext, _value: N, _attributes: &[KeyValue]) {}
}

impl<N> RecordCapable<N> for NoopInstrument {
    fn record_in(&self, _cx: &MeasureContext, _value: N, _attributes: &[KeyValue]) {}
}

enum Target<T: ?Sized> {
    Live(Arc<T>),
    Noop,
}

impl<T: ?Sized> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Target::Live(raw) => Target::Live(Arc::clone(raw)),
            Target::Noop => Target::Noop,
        }
    }
}

/// 累加型句柄：Counter 与 UpDownCounter 的公共实现。
///
/// # 教案式说明
/// - **意图（Why）**：调用点只关心“增量 + 本次调用的额外属性”，
///   树上继承而来的属性应在绑定时一次性固化，不再由调用方重复传入。
/// - **逻辑（How）**：持有后端仪表与 [`AttributeSet`] 快照；每次调用先合并
///   “内置属性在前、调用点属性在后”，再同步转发给后端。
/// - **契约（What）**：
///   - 不缓冲、不批处理、不重试；
///   - 上下文原样转交后端，本层不据此丢弃测量值；
///   - 空操作句柄直接返回，不做属性合并。
pub struct AddHandle<N: Number> {
    target: Target<dyn AddCapable<N>>,
    attributes: AttributeSet,
}

impl<N: Number> AddHandle<N> {
    pub fn new(raw: Arc<dyn AddCapable<N>>, attributes: AttributeSet) -> Self {
        Self {
            target: Target::Live(raw),
            attributes,
        }
    }

    /// 构造空操作句柄，仍保留属性快照以便检查。
    pub fn noop(attributes: AttributeSet) -> Self {
        Self {
            target: Target::Noop,
            attributes,
        }
    }

    pub fn add(&self, value: N, attributes: &[KeyValue]) {
        self.add_in(MeasureContext::background(), value, attributes);
    }

    pub fn add_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]) {
        if let Target::Live(raw) = &self.target {
            raw.add_in(cx, value, &self.attributes.merged(attributes));
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.target, Target::Noop)
    }

    /// 绑定时固化的属性集合。
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }
}

impl<N: Number> Clone for AddHandle<N> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl<N: Number> Default for AddHandle<N> {
    fn default() -> Self {
        Self::noop(AttributeSet::empty())
    }
}

impl<N: Number> fmt::Debug for AddHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddHandle")
            .field("domain", &N::DOMAIN)
            .field("noop", &self.is_noop())
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// 记录型句柄：Gauge 与 Histogram 的公共实现。
///
/// 合并与转发规则与 [`AddHandle`] 相同。
pub struct RecordHandle<N: Number> {
    target: Target<dyn RecordCapable<N>>,
    attributes: AttributeSet,
}

impl<N: Number> RecordHandle<N> {
    pub fn new(raw: Arc<dyn RecordCapable<N>>, attributes: AttributeSet) -> Self {
        Self {
            target: Target::Live(raw),
            attributes,
        }
    }

    pub fn noop(attributes: AttributeSet) -> Self {
        Self {
            target: Target::Noop,
            attributes,
        }
    }

    pub fn record(&self, value: N, attributes: &[KeyValue]) {
        self.record_in(MeasureContext::background(), value, attributes);
    }

    pub fn record_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]) {
        if let Target::Live(raw) = &self.target {
            raw.record_in(cx, value, &self.attributes.merged(attributes));
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.target, Target::Noop)
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }
}

impl<N: Number> Clone for RecordHandle<N> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl<N: Number> Default for RecordHandle<N> {
    fn default() -> Self {
        Self::noop(AttributeSet::empty())
    }
}

impl<N: Number> fmt::Debug for RecordHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordHandle")
            .field("domain", &N::DOMAIN)
            .field("noop", &self.is_noop())
            .field("attributes", &self.attributes)
            .finish()
    }
}
