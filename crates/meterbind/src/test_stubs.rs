//! 记录型与失败型后端桩。
//!
//! # 设计定位（Why）
//! - 绑定器的大部分契约（属性累积、桶边界透传、调用形态）只能通过观察后端收到的请求来验证；
//! - 空操作路径无需桩：未注入后端时绑定器根本不会触达后端。
//!
//! # 使用方式（How）
//! - `RecordingBackend` 可克隆，克隆体共享同一份记录，适合一份交给 [`Binder`](crate::Binder)、
//!   一份留在测试中断言；
//! - `FailingBackend` 拒绝全部或指定标识的创建请求，用于验证错误传播与中止语义。
//!
//! # 契约说明（What）
//! - 所有记录以 `parking_lot::Mutex` 保护，可在多线程并发写入；
//! - 数值统一转为 `f64` 保存，整型值在 ±2^53 内无损。

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    attributes::KeyValue,
    backend::{AddCapable, BackendError, MeterBackend, RecordCapable},
    context::MeasureContext,
    instrument::{AddKind, Capability, Domain, LeafDecl, Number, RecordKind},
};

/// 一次仪表创建请求。
#[derive(Clone, Debug, PartialEq)]
pub struct CreatedInstrument {
    pub decl: LeafDecl,
    pub id: String,
    pub boundaries: Vec<f64>,
}

/// 一次 `add` / `record` 调用。
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub id: String,
    pub decl: LeafDecl,
    pub capability: Capability,
    pub value: f64,
    /// 合并后的属性：内置属性在前，调用点属性在后。
    pub attributes: Vec<KeyValue>,
    /// 调用时上下文是否已取消或超时。
    pub context_done: bool,
}

#[derive(Debug, Default)]
struct Journal {
    created: Mutex<Vec<CreatedInstrument>>,
    measurements: Mutex<Vec<Measurement>>,
}

/// 记录全部创建请求与测量调用的后端。
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    journal: Arc<Journal>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按创建顺序返回全部创建请求的快照。
    pub fn created(&self) -> Vec<CreatedInstrument> {
        self.journal.created.lock().clone()
    }

    pub fn created_ids(&self) -> Vec<String> {
        self.journal
            .created
            .lock()
            .iter()
            .map(|record| record.id.clone())
            .collect()
    }

    pub fn measurements(&self) -> Vec<Measurement> {
        self.journal.measurements.lock().clone()
    }

    pub fn measurements_for(&self, id: &str) -> Vec<Measurement> {
        self.journal
            .measurements
            .lock()
            .iter()
            .filter(|m| m.id == id)
            .cloned()
            .collect()
    }

    /// 清空记录，便于在同一后端上分阶段断言。
    pub fn clear(&self) {
        self.journal.created.lock().clear();
        self.journal.measurements.lock().clear();
    }

    fn register<N: Number>(
        &self,
        decl: LeafDecl,
        id: &str,
        boundaries: &[f64],
    ) -> Arc<RecordingInstrument> {
        debug_assert_eq!(decl.domain, N::DOMAIN);
        self.journal.created.lock().push(CreatedInstrument {
            decl,
            id: id.to_owned(),
            boundaries: boundaries.to_vec(),
        });
        Arc::new(RecordingInstrument {
            id: id.to_owned(),
            decl,
            journal: Arc::clone(&self.journal),
        })
    }
}

impl MeterBackend for RecordingBackend {
    fn i64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<i64>>, BackendError> {
        Ok(self.register::<i64>(LeafDecl::new(Domain::Integer, kind.into()), id, &[]))
    }

    fn f64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<f64>>, BackendError> {
        Ok(self.register::<f64>(LeafDecl::new(Domain::Real, kind.into()), id, &[]))
    }

    fn i64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<i64>>, BackendError> {
        Ok(self.register::<i64>(
            LeafDecl::new(Domain::Integer, kind.into()),
            id,
            boundaries,
        ))
    }

    fn f64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<f64>>, BackendError> {
        Ok(self.register::<f64>(LeafDecl::new(Domain::Real, kind.into()), id, boundaries))
    }
}

#[derive(Debug)]
struct RecordingInstrument {
    id: String,
    decl: LeafDecl,
    journal: Arc<Journal>,
}

impl RecordingInstrument {
    fn push(
        &self,
        capability: Capability,
        cx: &MeasureContext,
        value: f64,
        attributes: &[KeyValue],
    ) {
        debug_assert_eq!(self.decl.kind.capability(), capability, "{}", self.decl);
        self.journal.measurements.lock().push(Measurement {
            id: self.id.clone(),
            decl: self.decl,
            capability,
            value,
            attributes: attributes.to_vec(),
            context_done: cx.is_done(),
        });
    }
}

impl<N: Number> AddCapable<N> for RecordingInstrument {
    fn add_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]) {
        self.push(Capability::Add, cx, value.as_f64(), attributes);
    }
}

impl<N: Number> RecordCapable<N> for RecordingInstrument {
    fn record_in(&self, cx: &MeasureContext, value: N, attributes: &[KeyValue]) {
        self.push(Capability::Record, cx, value.as_f64(), attributes);
    }
}

/// 拒绝创建请求的后端。
///
/// `new` 拒绝全部请求；`refusing` 只拒绝指定标识，其余请求交给内部的 [`RecordingBackend`]。
#[derive(Clone, Debug)]
pub struct FailingBackend {
    message: String,
    only: Option<String>,
    fallback: RecordingBackend,
}

impl FailingBackend {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            only: None,
            fallback: RecordingBackend::new(),
        }
    }

    pub fn refusing(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            only: Some(id.into()),
            fallback: RecordingBackend::new(),
        }
    }

    /// 未被拒绝的请求记录。
    pub fn accepted(&self) -> &RecordingBackend {
        &self.fallback
    }

    fn check(&self, id: &str) -> Result<(), BackendError> {
        match &self.only {
            Some(only) if only != id => Ok(()),
            _ => Err(BackendError::new(self.message.clone())),
        }
    }
}

impl MeterBackend for FailingBackend {
    fn i64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<i64>>, BackendError> {
        self.check(id)?;
        self.fallback.i64_adder(kind, id)
    }

    fn f64_adder(
        &self,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<f64>>, BackendError> {
        self.check(id)?;
        self.fallback.f64_adder(kind, id)
    }

    fn i64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<i64>>, BackendError> {
        self.check(id)?;
        self.fallback.i64_recorder(kind, id, boundaries)
    }

    fn f64_recorder(
        &self,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<f64>>, BackendError> {
        self.check(id)?;
        self.fallback.f64_recorder(kind, id, boundaries)
    }
}
