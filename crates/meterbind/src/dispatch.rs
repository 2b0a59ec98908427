//! 种类分发：把八种叶子声明映射到后端的四个创建调用。

use crate::{
    attributes::AttributeSet,
    backend::{BackendError, MeterBackend},
    handle::{AddHandle, RecordHandle},
    instrument::{AddKind, Domain, InstrumentKind, LeafDecl, Number, RecordKind},
    leaves::{
        F64Counter, F64Gauge, F64Histogram, F64UpDownCounter, I64Counter, I64Gauge, I64Histogram,
        I64UpDownCounter, Instrument,
    },
};

/// 创建叶子句柄。
///
/// # 教案式说明
/// - **意图（Why）**：绑定器只描述“要什么”，由本函数决定调用后端的哪一个创建方法，
///   并包装成调用形态正确的叶子类型。
/// - **逻辑（How）**：
///   1. `backend` 为 `None` 时直接返回匹配声明的空操作叶子，不会失败；
///   2. Counter / UpDownCounter 走 `*_adder`，忽略 `boundaries`；
///   3. Gauge / Histogram 走 `*_recorder`，仅 Histogram 透传 `boundaries`。
/// - **契约（What）**：返回的 [`Instrument`] 变体与 `decl` 一一对应；
///   后端错误原样返回，由调用方补充字段上下文。
pub fn create_leaf(
    backend: Option<&dyn MeterBackend>,
    decl: LeafDecl,
    id: &str,
    boundaries: &[f64],
    attributes: AttributeSet,
) -> Result<Instrument, BackendError> {
    let Some(backend) = backend else {
        return Ok(Instrument::noop(decl, attributes));
    };

    let boundaries: &[f64] = if decl.kind == InstrumentKind::Histogram {
        boundaries
    } else {
        &[]
    };

    use Domain::{Integer, Real};
    use InstrumentKind::{Counter, Gauge, Histogram, UpDownCounter};

    let instrument: Instrument = match (decl.domain, decl.kind) {
        (Integer, Counter) => {
            I64Counter::from_handle(adder(backend, AddKind::Counter, id, attributes)?).into()
        }
        (Integer, UpDownCounter) => I64UpDownCounter::from_handle(adder(
            backend,
            AddKind::UpDownCounter,
            id,
            attributes,
        )?)
        .into(),
        (Integer, Gauge) => I64Gauge::from_handle(recorder(
            backend,
            RecordKind::Gauge,
            id,
            boundaries,
            attributes,
        )?)
        .into(),
        (Integer, Histogram) => I64Histogram::from_handle(recorder(
            backend,
            RecordKind::Histogram,
            id,
            boundaries,
            attributes,
        )?)
        .into(),
        (Real, Counter) => {
            F64Counter::from_handle(adder(backend, AddKind::Counter, id, attributes)?).into()
        }
        (Real, UpDownCounter) => F64UpDownCounter::from_handle(adder(
            backend,
            AddKind::UpDownCounter,
            id,
            attributes,
        )?)
        .into(),
        (Real, Gauge) => F64Gauge::from_handle(recorder(
            backend,
            RecordKind::Gauge,
            id,
            boundaries,
            attributes,
        )?)
        .into(),
        (Real, Histogram) => F64Histogram::from_handle(recorder(
            backend,
            RecordKind::Histogram,
            id,
            boundaries,
            attributes,
        )?)
        .into(),
    };
    Ok(instrument)
}

fn adder<N: Number>(
    backend: &dyn MeterBackend,
    kind: AddKind,
    id: &str,
    attributes: AttributeSet,
) -> Result<AddHandle<N>, BackendError> {
    N::adder(backend, kind, id).map(|raw| AddHandle::new(raw, attributes))
}

fn recorder<N: Number>(
    backend: &dyn MeterBackend,
    kind: RecordKind,
    id: &str,
    boundaries: &[f64],
    attributes: AttributeSet,
) -> Result<RecordHandle<N>, BackendError> {
    N::recorder(backend, kind, id, boundaries).map(|raw| RecordHandle::new(raw, attributes))
}
