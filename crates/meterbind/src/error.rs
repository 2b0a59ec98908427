//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义绑定阶段可能出现的全部失败；运行期 `add` / `record` 不产生错误。
//! - 每个变体都携带字段路径，调用方无需再回溯是哪一个叶子或子树出错。
//!
//! ## 设计要求（What）
//! - 首个错误即中止整次绑定，不存在部分成功；
//! - 错误可克隆、可比较，便于测试断言与跨线程传递。

use thiserror::Error;

use crate::backend::BackendError;

/// 绑定错误。
///
/// # 教案式说明
/// - **意图（Why）**：把标签缺失、标签格式错误、声明类型未知、后端拒绝以及根节点形态错误
///   统一为一个可 `?` 传播的枚举。
/// - **契约（What）**：
///   - `field` 为从根开始的点分路径，例如 `http.server.requests`，首段为根记录的字段名；
///   - `raw` 为标签原文，便于直接在源码中定位；
///   - 变体集合封闭，调用方可穷尽匹配。
/// - **执行逻辑（How）**：标签解析函数只知道字段名，由 [`BindContext`](crate::BindContext)
///   在向上传播前通过 [`BindError::at`] 改写为完整路径。
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BindError {
    /// 叶子缺少 `id` 标签，或值为空白。
    #[error("instrument field `{field}` has no `id` tag")]
    MissingIdentifier { field: String },

    /// `buckets` 标签中存在无法解析为浮点数的片段。
    #[error("instrument field `{field}` has an invalid boundary `{token}` in `{raw}`")]
    InvalidBoundaryToken {
        field: String,
        raw: String,
        token: String,
    },

    /// `attrs` 标签的片段数为奇数，无法配成键值对。
    #[error("field `{field}` has an odd number of attribute tokens ({count}) in `{raw}`")]
    OddAttributeCount {
        field: String,
        raw: String,
        count: usize,
    },

    /// 声明的叶子类型不属于八种受支持组合。
    #[error("field `{field}` declares unsupported instrument kind `{kind}`")]
    UnsupportedInstrumentKind { field: String, kind: String },

    /// 后端拒绝创建仪表。
    #[error("backend failed to create instrument `{id}` for field `{field}`: {source}")]
    BackendCreationFailed {
        field: String,
        id: String,
        #[source]
        source: BackendError,
    },

    /// 绑定入口收到的根节点不是可遍历的记录。
    #[error("blueprint root must be a record, found {found}")]
    InvalidBlueprintShape { found: String },
}

impl BindError {
    /// 出错字段的路径；`InvalidBlueprintShape` 没有字段。
    pub fn field(&self) -> Option<&str> {
        match self {
            BindError::MissingIdentifier { field }
            | BindError::InvalidBoundaryToken { field, .. }
            | BindError::OddAttributeCount { field, .. }
            | BindError::UnsupportedInstrumentKind { field, .. }
            | BindError::BackendCreationFailed { field, .. } => Some(field),
            BindError::InvalidBlueprintShape { .. } => None,
        }
    }

    /// 将字段名改写为完整路径。
    pub fn at(mut self, path: &str) -> Self {
        match &mut self {
            BindError::MissingIdentifier { field }
            | BindError::InvalidBoundaryToken { field, .. }
            | BindError::OddAttributeCount { field, .. }
            | BindError::UnsupportedInstrumentKind { field, .. }
            | BindError::BackendCreationFailed { field, .. } => {
                path.clone_into(field);
            }
            BindError::InvalidBlueprintShape { .. } => {}
        }
        self
    }
}
