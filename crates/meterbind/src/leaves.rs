//! 八种叶子类型。
//!
//! 每种叶子都是对 [`AddHandle`] 或 [`RecordHandle`] 的新类型包装：
//! 累加型只暴露 `add` / `add_in`，记录型只暴露 `record` / `record_in`，
//! 从类型层面保证两种调用形态互斥。`Default` 产出空操作句柄，
//! 因此蓝图中被跳过的字段与未绑定的叶子都能安全调用。

use crate::{
    attributes::{AttributeSet, KeyValue},
    backend::{AddCapable, RecordCapable},
    binder::Leaf,
    context::MeasureContext,
    handle::{AddHandle, RecordHandle},
    instrument::{Domain, InstrumentKind, LeafDecl},
};

macro_rules! add_leaf {
    ($(#[$meta:meta])* $name:ident, $num:ty, $domain:expr, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name(AddHandle<$num>);

        impl $name {
            pub fn from_handle(handle: AddHandle<$num>) -> Self {
                Self(handle)
            }

            /// 使用无界上下文提交增量。
            pub fn add(&self, value: $num, attributes: &[KeyValue]) {
                self.0.add(value, attributes);
            }

            pub fn add_in(&self, cx: &MeasureContext, value: $num, attributes: &[KeyValue]) {
                self.0.add_in(cx, value, attributes);
            }

            pub fn is_noop(&self) -> bool {
                self.0.is_noop()
            }

            pub fn attributes(&self) -> &AttributeSet {
                self.0.attributes()
            }
        }

        impl AddCapable<$num> for $name {
            fn add_in(&self, cx: &MeasureContext, value: $num, attributes: &[KeyValue]) {
                self.0.add_in(cx, value, attributes);
            }
        }

        impl Leaf for $name {
            const DECL: LeafDecl = LeafDecl::new($domain, $kind);

            fn from_instrument(instrument: Instrument) -> Option<Self> {
                match instrument {
                    Instrument::$name(leaf) => Some(leaf),
                    _ => None,
                }
            }
        }

        impl From<$name> for Instrument {
            fn from(leaf: $name) -> Self {
                Instrument::$name(leaf)
            }
        }
    };
}

macro_rules! record_leaf {
    ($(#[$meta:meta])* $name:ident, $num:ty, $domain:expr, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name(RecordHandle<$num>);

        impl $name {
            pub fn from_handle(handle: RecordHandle<$num>) -> Self {
                Self(handle)
            }

            /// 使用无界上下文记录数值。
            pub fn record(&self, value: $num, attributes: &[KeyValue]) {
                self.0.record(value, attributes);
            }

            pub fn record_in(&self, cx: &MeasureContext, value: $num, attributes: &[KeyValue]) {
                self.0.record_in(cx, value, attributes);
            }

            pub fn is_noop(&self) -> bool {
                self.0.is_noop()
            }

            pub fn attributes(&self) -> &AttributeSet {
                self.0.attributes()
            }
        }

        impl RecordCapable<$num> for $name {
            fn record_in(&self, cx: &MeasureContext, value: $num, attributes: &[KeyValue]) {
                self.0.record_in(cx, value, attributes);
            }
        }

        impl Leaf for $name {
            const DECL: LeafDecl = LeafDecl::new($domain, $kind);

            fn from_instrument(instrument: Instrument) -> Option<Self> {
                match instrument {
                    Instrument::$name(leaf) => Some(leaf),
                    _ => None,
                }
            }
        }

        impl From<$name> for Instrument {
            fn from(leaf: $name) -> Self {
                Instrument::$name(leaf)
            }
        }
    };
}

add_leaf!(
    /// 整型单调计数器。
    I64Counter, i64, Domain::Integer, InstrumentKind::Counter
);
add_leaf!(
    /// 整型可增减计数器，增量可为负。
    I64UpDownCounter, i64, Domain::Integer, InstrumentKind::UpDownCounter
);
record_leaf!(
    /// 整型瞬时值。
    I64Gauge, i64, Domain::Integer, InstrumentKind::Gauge
);
record_leaf!(
    /// 整型直方图，桶边界来自 `buckets` 标签。
    I64Histogram, i64, Domain::Integer, InstrumentKind::Histogram
);
add_leaf!(
    /// 浮点单调计数器。
    F64Counter, f64, Domain::Real, InstrumentKind::Counter
);
add_leaf!(F64UpDownCounter, f64, Domain::Real, InstrumentKind::UpDownCounter);
record_leaf!(F64Gauge, f64, Domain::Real, InstrumentKind::Gauge);
record_leaf!(
    /// 浮点直方图，桶边界来自 `buckets` 标签。
    F64Histogram, f64, Domain::Real, InstrumentKind::Histogram
);

/// 已绑定叶子的封闭枚举，供分发器产出、两种绑定入口消费。
#[derive(Clone, Debug)]
pub enum Instrument {
    I64Counter(I64Counter),
    I64UpDownCounter(I64UpDownCounter),
    I64Gauge(I64Gauge),
    I64Histogram(I64Histogram),
    F64Counter(F64Counter),
    F64UpDownCounter(F64UpDownCounter),
    F64Gauge(F64Gauge),
    F64Histogram(F64Histogram),
}

macro_rules! each_instrument {
    ($self:expr, $leaf:ident => $body:expr) => {
        match $self {
            Instrument::I64Counter($leaf) => $body,
            Instrument::I64UpDownCounter($leaf) => $body,
            Instrument::I64Gauge($leaf) => $body,
            Instrument::I64Histogram($leaf) => $body,
            Instrument::F64Counter($leaf) => $body,
            Instrument::F64UpDownCounter($leaf) => $body,
            Instrument::F64Gauge($leaf) => $body,
            Instrument::F64Histogram($leaf) => $body,
        }
    };
}

impl Instrument {
    /// 构造与声明匹配的空操作叶子。
    pub fn noop(decl: LeafDecl, attributes: AttributeSet) -> Self {
        use Domain::{Integer, Real};
        use InstrumentKind::{Counter, Gauge, Histogram, UpDownCounter};

        match (decl.domain, decl.kind) {
            (Integer, Counter) => I64Counter(AddHandle::noop(attributes)).into(),
            (Integer, UpDownCounter) => I64UpDownCounter(AddHandle::noop(attributes)).into(),
            (Integer, Gauge) => I64Gauge(RecordHandle::noop(attributes)).into(),
            (Integer, Histogram) => I64Histogram(RecordHandle::noop(attributes)).into(),
            (Real, Counter) => F64Counter(AddHandle::noop(attributes)).into(),
            (Real, UpDownCounter) => F64UpDownCounter(AddHandle::noop(attributes)).into(),
            (Real, Gauge) => F64Gauge(RecordHandle::noop(attributes)).into(),
            (Real, Histogram) => F64Histogram(RecordHandle::noop(attributes)).into(),
        }
    }

    pub fn decl(&self) -> LeafDecl {
        fn decl_of<L: Leaf>(_: &L) -> LeafDecl {
            L::DECL
        }
        each_instrument!(self, leaf => decl_of(leaf))
    }

    pub fn is_noop(&self) -> bool {
        each_instrument!(self, leaf => leaf.is_noop())
    }

    pub fn attributes(&self) -> &AttributeSet {
        each_instrument!(self, leaf => leaf.attributes())
    }

    /// 取出指定类型的叶子；类型不符时返回 `None`。
    pub fn get<L: Leaf>(&self) -> Option<L> {
        L::from_instrument(self.clone())
    }
}
