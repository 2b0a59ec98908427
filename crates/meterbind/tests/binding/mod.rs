//! 派生宏驱动的端到端绑定测试。
//!
//! 蓝图定义集中在 `fixtures`，各子模块分别覆盖属性累积、错误传播与空操作模式。

mod attributes;
mod errors;
mod fixtures;
mod noop;
mod shapes;
