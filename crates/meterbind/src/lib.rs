#![deny(unsafe_code)]
#![doc = "meterbind: 将带标签的结构体树声明式绑定为可直接调用的指标仪表句柄。"]
#![doc = ""]
#![doc = "== 使用方式 =="]
#![doc = "1. 以 `#[derive(Blueprint)]` 声明蓝图结构体，叶子字段使用八种仪表类型之一并通过 `#[meter(id = \"..\")]` 命名；"]
#![doc = "2. 子树字段使用 `#[meter(nested)]` 或 `#[meter(attrs = \"k,v\")]`，其属性沿树向下累积；"]
#![doc = "3. 调用 [`Binder::bind`]（或无后端时的 [`bind`]）得到全部字段已就绪的实例。"]
#![doc = ""]
#![doc = "未注入后端时，所有句柄退化为空操作实现，调用方代码无需分支判断遥测是否启用。"]

// 派生宏生成的代码统一引用 `::meterbind`，crate 内部测试同样需要该路径可解析。
extern crate self as meterbind;

pub use meterbind_macros::Blueprint;

mod field;
mod sealed;

pub mod attributes;
pub mod backend;
pub mod binder;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod instrument;
pub mod leaves;
pub mod schema;
pub mod tags;
/// 测试桩命名空间，集中提供记录型与失败型后端，供集成测试与下游 crate 复用。
pub mod test_stubs;

pub use attributes::{AttributeSet, KeyValue};
pub use backend::{AddCapable, BackendError, MeterBackend, RecordCapable};
pub use binder::{BindContext, Binder, Blueprint, Leaf, bind, must_bind};
pub use context::{Cancellation, Deadline, MeasureContext};
pub use error::BindError;
pub use handle::{AddHandle, NoopInstrument, RecordHandle};
pub use instrument::{AddKind, Capability, Domain, InstrumentKind, LeafDecl, Number, RecordKind};
pub use leaves::{
    F64Counter, F64Gauge, F64Histogram, F64UpDownCounter, I64Counter, I64Gauge, I64Histogram,
    I64UpDownCounter, Instrument,
};
pub use schema::{BoundNode, BoundRecord, LeafSchema, NodeSchema, RecordSchema};
pub use tags::{FieldMeta, FieldMetadata};

/// 派生宏生成代码的内部依赖，不属于公开 API。
#[doc(hidden)]
pub mod __private {
    pub use crate::field::{BindAsDefault, BindAsSubtree, FieldSlot};
}

/// 便于业务代码一次性引入常用类型。
pub mod prelude {
    pub use crate::{
        AddCapable, Binder, Blueprint, F64Counter, F64Gauge, F64Histogram, F64UpDownCounter,
        I64Counter, I64Gauge, I64Histogram, I64UpDownCounter, KeyValue, MeasureContext,
        RecordCapable,
    };
}
