//! 叶子声明的类型学：数值域 × 仪表种类 的八种封闭组合。

use std::{fmt, sync::Arc};

use crate::{
    backend::{AddCapable, BackendError, MeterBackend, RecordCapable},
    sealed::Sealed,
};

/// 叶子的数值域。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    /// `i64`。
    Integer,
    /// `f64`。
    Real,
}

impl Domain {
    /// 类型名前缀，`I64` 或 `F64`。
    pub const fn prefix(self) -> &'static str {
        match self {
            Domain::Integer => "I64",
            Domain::Real => "F64",
        }
    }
}

/// 仪表种类。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Counter,
    UpDownCounter,
    Gauge,
    Histogram,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 4] = [
        InstrumentKind::Counter,
        InstrumentKind::UpDownCounter,
        InstrumentKind::Gauge,
        InstrumentKind::Histogram,
    ];

    /// Counter / UpDownCounter 为累加型，Gauge / Histogram 为记录型。
    pub const fn capability(self) -> Capability {
        match self {
            InstrumentKind::Counter | InstrumentKind::UpDownCounter => Capability::Add,
            InstrumentKind::Gauge | InstrumentKind::Histogram => Capability::Record,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Counter => "Counter",
            InstrumentKind::UpDownCounter => "UpDownCounter",
            InstrumentKind::Gauge => "Gauge",
            InstrumentKind::Histogram => "Histogram",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 叶子对外暴露的操作形态，二者互斥。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 增量累加（`add`）。
    Add,
    /// 时点记录（`record`）。
    Record,
}

/// 累加型仪表的子种类，供后端创建调用使用。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddKind {
    Counter,
    UpDownCounter,
}

impl From<AddKind> for InstrumentKind {
    fn from(kind: AddKind) -> Self {
        match kind {
            AddKind::Counter => InstrumentKind::Counter,
            AddKind::UpDownCounter => InstrumentKind::UpDownCounter,
        }
    }
}

/// 记录型仪表的子种类，供后端创建调用使用。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Gauge,
    Histogram,
}

impl From<RecordKind> for InstrumentKind {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Gauge => InstrumentKind::Gauge,
            RecordKind::Histogram => InstrumentKind::Histogram,
        }
    }
}

/// 叶子声明：八种封闭变体之一。
///
/// # 契约说明（What）
/// - 规范类型名为 `{I64|F64}{Counter|UpDownCounter|Gauge|Histogram}`；
/// - [`LeafDecl::from_type_name`] 与 [`LeafDecl::type_name`] 互为逆运算；
/// - 未知类型名无法构造 `LeafDecl`，从而在绑定期转化为 `UnsupportedInstrumentKind`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LeafDecl {
    pub domain: Domain,
    pub kind: InstrumentKind,
}

impl LeafDecl {
    pub const fn new(domain: Domain, kind: InstrumentKind) -> Self {
        Self { domain, kind }
    }

    /// 全部八种组合，按 Integer 在前的顺序排列。
    pub fn all() -> impl Iterator<Item = LeafDecl> {
        [Domain::Integer, Domain::Real].into_iter().flat_map(|domain| {
            InstrumentKind::ALL
                .into_iter()
                .map(move |kind| LeafDecl::new(domain, kind))
        })
    }

    /// 解析规范类型名，例如 `F64Histogram`。
    pub fn from_type_name(name: &str) -> Option<Self> {
        let domain = if name.starts_with(Domain::Integer.prefix()) {
            Domain::Integer
        } else if name.starts_with(Domain::Real.prefix()) {
            Domain::Real
        } else {
            return None;
        };
        let rest = &name[domain.prefix().len()..];
        InstrumentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == rest)
            .map(|kind| LeafDecl::new(domain, kind))
    }

    pub fn type_name(self) -> String {
        format!("{}{}", self.domain.prefix(), self.kind.as_str())
    }

    /// 仅直方图消费桶边界。
    pub fn uses_boundaries(self) -> bool {
        self.kind == InstrumentKind::Histogram
    }
}

impl fmt::Display for LeafDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.domain.prefix(), self.kind.as_str())
    }
}

/// 句柄的数值域，仅 `i64` 与 `f64` 实现。
///
/// # 契约说明（What）
/// - `DOMAIN` 对应 [`Domain`]；
/// - `adder` / `recorder` 把“按数值域选择后端创建调用”收敛到类型层面，
///   使 [`AddHandle`](crate::AddHandle) 等包装可以对 `N` 泛型化。
pub trait Number: Copy + Send + Sync + fmt::Debug + PartialOrd + 'static + Sealed {
    const DOMAIN: Domain;

    fn adder(
        backend: &dyn MeterBackend,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<Self>>, BackendError>;

    fn recorder(
        backend: &dyn MeterBackend,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<Self>>, BackendError>;

    /// 无损或近似地转为 `f64`，便于测试桩与日志统一展示。
    fn as_f64(self) -> f64;
}

impl Number for i64 {
    const DOMAIN: Domain = Domain::Integer;

    fn adder(
        backend: &dyn MeterBackend,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<Self>>, BackendError> {
        backend.i64_adder(kind, id)
    }

    fn recorder(
        backend: &dyn MeterBackend,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<Self>>, BackendError> {
        backend.i64_recorder(kind, id, boundaries)
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Number for f64 {
    const DOMAIN: Domain = Domain::Real;

    fn adder(
        backend: &dyn MeterBackend,
        kind: AddKind,
        id: &str,
    ) -> Result<Arc<dyn AddCapable<Self>>, BackendError> {
        backend.f64_adder(kind, id)
    }

    fn recorder(
        backend: &dyn MeterBackend,
        kind: RecordKind,
        id: &str,
        boundaries: &[f64],
    ) -> Result<Arc<dyn RecordCapable<Self>>, BackendError> {
        backend.f64_recorder(kind, id, boundaries)
    }

    fn as_f64(self) -> f64 {
        self
    }
}
