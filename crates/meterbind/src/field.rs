//! 派生宏对未标注字段的分派。
//!
//! 未标注且不是叶子类型的字段：类型实现 [`Blueprint`] 时作为子树绑定，否则取 `Default::default()`。
//! 选择在生成代码的方法解析阶段完成：对 `&&FieldSlot<T>` 调用 `bind_slot`，
//! 接收者为 `&FieldSlot<T>` 的子树实现先于接收者为 `FieldSlot<T>` 的默认值实现被匹配，
//! 后者仅在 `T: Blueprint` 不成立时生效。

use std::marker::PhantomData;

use crate::{
    binder::{BindContext, Blueprint},
    error::BindError,
    tags::FieldMeta,
};

/// 字段类型的零尺寸占位。
pub struct FieldSlot<T>(PhantomData<fn() -> T>);

impl<T> FieldSlot<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FieldSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait BindAsSubtree {
    type Field;

    fn bind_slot(&self, cx: &BindContext<'_>, meta: &FieldMeta) -> Result<Self::Field, BindError>;
}

impl<T: Blueprint> BindAsSubtree for &FieldSlot<T> {
    type Field = T;

    fn bind_slot(&self, cx: &BindContext<'_>, meta: &FieldMeta) -> Result<T, BindError> {
        cx.subtree(meta)
    }
}

pub trait BindAsDefault {
    type Field;

    fn bind_slot(&self, cx: &BindContext<'_>, meta: &FieldMeta) -> Result<Self::Field, BindError>;
}

impl<T: Default> BindAsDefault for FieldSlot<T> {
    type Field = T;

    fn bind_slot(&self, _cx: &BindContext<'_>, _meta: &FieldMeta) -> Result<T, BindError> {
        Ok(T::default())
    }
}
