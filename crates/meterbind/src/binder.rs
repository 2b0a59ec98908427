//! 树遍历与绑定。
//!
//! # 教案式说明
//! - **意图（Why）**：把“蓝图结构体里每个叶子各自去后端注册”的样板代码收敛为一次调用，
//!   同时保证属性沿树路径累积、兄弟子树互不可见、任一错误立即中止。
//! - **逻辑（How）**：
//!   1. [`Binder::bind`] 以基础属性构造根 [`BindContext`]；
//!   2. 蓝图类型的 [`Blueprint::bind_fields`]（通常由派生宏生成）逐字段调用
//!      [`BindContext::leaf`] 或 [`BindContext::subtree`]；
//!   3. 子树帧由 [`BindContext::child`] 派生，属性为父帧集合追加本地 `attrs`；
//!   4. 叶子帧直接使用当前帧的累积属性，叶子自身不再追加。
//! - **契约（What）**：
//!   - 遍历单线程、同步、不挂起；多个绑定可在不同线程上并发进行；
//!   - 未注入后端时所有叶子均为空操作句柄，绑定永不因后端缺失失败；
//!   - 返回 `Err` 时不产生任何部分结果。

use std::{any::type_name, cell::Cell, fmt, sync::Arc, time::Instant};

use tracing::{debug, trace, warn};

use crate::{
    attributes::{AttributeSet, KeyValue},
    backend::MeterBackend,
    dispatch,
    error::BindError,
    instrument::LeafDecl,
    leaves::Instrument,
    tags::{self, FieldMetadata},
};

/// 可被绑定的蓝图节点。
///
/// 通常通过 `#[derive(Blueprint)]` 实现；也可以手写，逐字段调用 [`BindContext`] 的方法。
pub trait Blueprint: Sized {
    fn bind_fields(cx: &BindContext<'_>) -> Result<Self, BindError>;
}

/// 拥有所有权的指针子树：先分配被指向的实例，再绑定。
impl<T: Blueprint> Blueprint for Box<T> {
    fn bind_fields(cx: &BindContext<'_>) -> Result<Self, BindError> {
        T::bind_fields(cx).map(Box::new)
    }
}

/// 可选子树：绑定成功后总为 `Some`。
impl<T: Blueprint> Blueprint for Option<T> {
    fn bind_fields(cx: &BindContext<'_>) -> Result<Self, BindError> {
        T::bind_fields(cx).map(Some)
    }
}

/// 八种叶子类型的公共契约。
pub trait Leaf: Sized {
    const DECL: LeafDecl;

    /// 从分发结果中取出本类型；变体不符时返回 `None`。
    fn from_instrument(instrument: Instrument) -> Option<Self>;
}

#[derive(Debug, Default)]
struct WalkStats {
    leaves: Cell<usize>,
    subtrees: Cell<usize>,
}

impl WalkStats {
    fn bump(cell: &Cell<usize>) {
        cell.set(cell.get() + 1);
    }
}

/// 遍历中的一帧。
///
/// # 契约说明（What）
/// - `attributes()` 为根到当前节点的累积属性，由本帧创建的叶子原样继承；
/// - `path()` 为点分字段路径，根帧为空串；
/// - 帧借用绑定器与统计信息，只在一次绑定调用内有效。
pub struct BindContext<'a> {
    backend: Option<&'a dyn MeterBackend>,
    attributes: AttributeSet,
    path: String,
    stats: &'a WalkStats,
}

impl<'a> BindContext<'a> {
    fn root(
        backend: Option<&'a dyn MeterBackend>,
        attributes: AttributeSet,
        stats: &'a WalkStats,
    ) -> Self {
        Self {
            backend,
            attributes,
            path: String::new(),
            stats,
        }
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 当前绑定是否处于空操作模式。
    pub fn is_noop(&self) -> bool {
        self.backend.is_none()
    }

    pub(crate) fn field_path(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_owned()
        } else {
            format!("{}.{}", self.path, field)
        }
    }

    /// 绑定类型为 `L` 的叶子字段。
    pub fn leaf<L: Leaf>(&self, meta: &(impl FieldMetadata + ?Sized)) -> Result<L, BindError> {
        let instrument = self.instrument(meta, L::DECL)?;
        L::from_instrument(instrument).ok_or_else(|| BindError::UnsupportedInstrumentKind {
            field: self.field_path(meta.field_name()),
            kind: L::DECL.type_name(),
        })
    }

    /// 按声明绑定叶子，返回未定型的 [`Instrument`]。
    ///
    /// 解析顺序：`id`（必填）→ `buckets`（仅直方图）→ 后端创建。
    pub fn instrument(
        &self,
        meta: &(impl FieldMetadata + ?Sized),
        decl: LeafDecl,
    ) -> Result<Instrument, BindError> {
        let path = self.field_path(meta.field_name());
        let id = tags::resolve_id(meta).map_err(|err| err.at(&path))?;
        let boundaries = if decl.uses_boundaries() {
            tags::resolve_boundaries(meta).map_err(|err| err.at(&path))?
        } else {
            Vec::new()
        };

        let attributes = self.attributes.clone();
        let instrument = dispatch::create_leaf(self.backend, decl, &id, &boundaries, attributes)
            .map_err(|source| {
                warn!(
                    field = %path,
                    id = %id,
                    kind = %decl,
                    error = %source,
                    "backend refused to create instrument"
                );
                BindError::BackendCreationFailed {
                    field: path.clone(),
                    id: id.clone(),
                    source,
                }
            })?;

        WalkStats::bump(&self.stats.leaves);
        debug!(
            field = %path,
            id = %id,
            kind = %decl,
            attributes = self.attributes.len(),
            boundaries = boundaries.len(),
            noop = instrument.is_noop(),
            "instrument bound"
        );
        Ok(instrument)
    }

    /// 派生子树帧：累积属性追加该字段的本地 `attrs`。
    pub fn child(
        &self,
        meta: &(impl FieldMetadata + ?Sized),
    ) -> Result<BindContext<'a>, BindError> {
        let path = self.field_path(meta.field_name());
        let local = tags::resolve_attributes(meta).map_err(|err| err.at(&path))?;
        trace!(field = %path, local = local.len(), "entering subtree");
        WalkStats::bump(&self.stats.subtrees);
        Ok(BindContext {
            backend: self.backend,
            attributes: self.attributes.extended(&local),
            path,
            stats: self.stats,
        })
    }

    /// 绑定子树字段。
    pub fn subtree<B: Blueprint>(
        &self,
        meta: &(impl FieldMetadata + ?Sized),
    ) -> Result<B, BindError> {
        let cx = self.child(meta)?;
        B::bind_fields(&cx)
    }
}

impl fmt::Debug for BindContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindContext")
            .field("path", &self.path)
            .field("attributes", &self.attributes)
            .field("noop", &self.is_noop())
            .finish()
    }
}

/// 绑定入口，持有可选的后端。
///
/// # 教案式说明
/// - **意图（Why）**：后端以显式依赖注入，而非进程级全局变量；
///   同一进程内可以同时存在空操作绑定器与真实绑定器。
/// - **契约（What）**：
///   - `Binder` 可廉价克隆并在线程间共享；
///   - 每次 [`Binder::bind`] 都产出一棵全新的、与其他调用互不共享属性的树；
///   - 同一标识可以被多次绑定，冲突处理交由后端。
#[derive(Clone, Default)]
pub struct Binder {
    backend: Option<Arc<dyn MeterBackend>>,
}

impl Binder {
    /// 不带后端的绑定器，所有叶子为空操作句柄。
    pub fn noop() -> Self {
        Self { backend: None }
    }

    pub fn new(backend: impl MeterBackend + 'static) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
        }
    }

    pub fn with_backend(backend: Option<Arc<dyn MeterBackend>>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Option<&Arc<dyn MeterBackend>> {
        self.backend.as_ref()
    }

    pub fn is_noop(&self) -> bool {
        self.backend.is_none()
    }

    /// 绑定蓝图类型 `T`。
    ///
    /// `base` 为根属性，位于每个叶子属性集合的最前端。
    pub fn bind<T: Blueprint>(
        &self,
        base: impl IntoIterator<Item = KeyValue>,
    ) -> Result<T, BindError> {
        self.walk(type_name::<T>(), base, T::bind_fields)
    }

    /// 与 [`Binder::bind`] 相同，但在失败时 panic，适用于启动期快速失败。
    pub fn must_bind<T: Blueprint>(&self, base: impl IntoIterator<Item = KeyValue>) -> T {
        match self.bind(base) {
            Ok(bound) => bound,
            Err(err) => panic!("failed to bind blueprint `{}`: {err}", type_name::<T>()),
        }
    }

    pub(crate) fn walk<R>(
        &self,
        blueprint: &str,
        base: impl IntoIterator<Item = KeyValue>,
        bind: impl FnOnce(&BindContext<'_>) -> Result<R, BindError>,
    ) -> Result<R, BindError> {
        let started = Instant::now();
        let stats = WalkStats::default();
        let cx = BindContext::root(
            self.backend.as_deref(),
            base.into_iter().collect(),
            &stats,
        );
        let result = bind(&cx);
        match &result {
            Ok(_) => debug!(
                blueprint,
                leaves = stats.leaves.get(),
                subtrees = stats.subtrees.get(),
                noop = self.is_noop(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "blueprint bound"
            ),
            Err(err) => debug!(blueprint, error = %err, "blueprint binding aborted"),
        }
        result
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("noop", &self.is_noop())
            .finish()
    }
}

/// 以空操作绑定器绑定 `T`。
pub fn bind<T: Blueprint>(base: impl IntoIterator<Item = KeyValue>) -> Result<T, BindError> {
    Binder::noop().bind(base)
}

/// 以空操作绑定器绑定 `T`，失败时 panic。
pub fn must_bind<T: Blueprint>(base: impl IntoIterator<Item = KeyValue>) -> T {
    Binder::noop().must_bind(base)
}
