//! 内部 sealed 模块，限制 [`Number`](crate::Number) 等 Trait 的实现者集合。
//!
//! # 契约说明（What）
//! - 仅对 `i64` 与 `f64` 实现 `Sealed`，对应两种数值域；
//! - 下游 crate 无法为其他类型实现 `Number`，从而保证八种叶子变体保持封闭。
pub trait Sealed {}

impl Sealed for i64 {}
impl Sealed for f64 {}
