//! 运行期蓝图。
//!
//! # 教案式说明
//! - **意图（Why）**：派生宏要求结构在编译期已知；插件、配置驱动的指标集合只能在运行期描述。
//!   本模块以构建器声明“字段名 → 叶子或子树”，复用与派生宏完全相同的 [`BindContext`] 遍历逻辑。
//! - **逻辑（How）**：叶子以规范类型名（如 `F64Histogram`）声明，在绑定时解析为 [`LeafDecl`]；
//!   子树携带自身标签并递归；`opaque` 字段保留在声明中但不参与绑定。
//! - **契约（What）**：
//!   - 根节点必须是记录，否则返回 [`BindError::InvalidBlueprintShape`]；
//!   - 未知类型名返回 [`BindError::UnsupportedInstrumentKind`]；
//!   - 字段按声明顺序绑定，错误语义与派生宏一致。

use crate::{
    attributes::KeyValue,
    binder::{BindContext, Binder, Leaf},
    error::BindError,
    instrument::LeafDecl,
    leaves::Instrument,
    tags::FieldMetadata,
};

type Tags = Vec<(String, String)>;

fn owned_tags(tags: &[(&str, &str)]) -> Tags {
    tags.iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

/// 运行期叶子声明。
#[derive(Clone, Debug, PartialEq)]
pub struct LeafSchema {
    type_name: String,
    tags: Tags,
}

impl LeafSchema {
    pub fn new(type_name: impl Into<String>, tags: &[(&str, &str)]) -> Self {
        Self {
            type_name: type_name.into(),
            tags: owned_tags(tags),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

#[derive(Clone, Debug, PartialEq)]
enum FieldKind {
    Leaf(LeafSchema),
    Subtree(RecordSchema),
    Opaque,
}

#[derive(Clone, Debug, PartialEq)]
struct FieldSchema {
    name: String,
    tags: Tags,
    kind: FieldKind,
}

impl FieldMetadata for FieldSchema {
    fn field_name(&self) -> &str {
        &self.name
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// 运行期记录声明。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordSchema {
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加叶子字段；`type_name` 为八种规范类型名之一。
    pub fn leaf(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        tags: &[(&str, &str)],
    ) -> Self {
        let leaf = LeafSchema::new(type_name, tags);
        self.fields.push(FieldSchema {
            name: name.into(),
            tags: leaf.tags.clone(),
            kind: FieldKind::Leaf(leaf),
        });
        self
    }

    /// 追加子树字段；`tags` 中的 `attrs` 会追加到子树的累积属性。
    pub fn subtree(
        mut self,
        name: impl Into<String>,
        tags: &[(&str, &str)],
        record: RecordSchema,
    ) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            tags: owned_tags(tags),
            kind: FieldKind::Subtree(record),
        });
        self
    }

    /// 追加不参与绑定的字段。
    pub fn opaque(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            tags: Tags::new(),
            kind: FieldKind::Opaque,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn bind_in(&self, cx: &BindContext<'_>) -> Result<BoundRecord, BindError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let node = match &field.kind {
                FieldKind::Leaf(leaf) => {
                    let decl = LeafDecl::from_type_name(leaf.type_name()).ok_or_else(|| {
                        BindError::UnsupportedInstrumentKind {
                            field: cx.field_path(&field.name),
                            kind: leaf.type_name.clone(),
                        }
                    })?;
                    BoundNode::Leaf(cx.instrument(field, decl)?)
                }
                FieldKind::Subtree(record) => {
                    let child = cx.child(field)?;
                    BoundNode::Record(record.bind_in(&child)?)
                }
                FieldKind::Opaque => continue,
            };
            fields.push((field.name.clone(), node));
        }
        Ok(BoundRecord { fields })
    }
}

/// 运行期蓝图节点。
#[derive(Clone, Debug, PartialEq)]
pub enum NodeSchema {
    Record(RecordSchema),
    Leaf(LeafSchema),
}

impl From<RecordSchema> for NodeSchema {
    fn from(record: RecordSchema) -> Self {
        NodeSchema::Record(record)
    }
}

impl From<LeafSchema> for NodeSchema {
    fn from(leaf: LeafSchema) -> Self {
        NodeSchema::Leaf(leaf)
    }
}

/// 已绑定的运行期节点。
#[derive(Clone, Debug)]
pub enum BoundNode {
    Record(BoundRecord),
    Leaf(Instrument),
}

impl BoundNode {
    pub fn as_record(&self) -> Option<&BoundRecord> {
        match self {
            BoundNode::Record(record) => Some(record),
            BoundNode::Leaf(_) => None,
        }
    }

    pub fn as_instrument(&self) -> Option<&Instrument> {
        match self {
            BoundNode::Leaf(instrument) => Some(instrument),
            BoundNode::Record(_) => None,
        }
    }
}

/// 已绑定的运行期记录，字段保持声明顺序，`opaque` 字段不出现。
#[derive(Clone, Debug, Default)]
pub struct BoundRecord {
    fields: Vec<(String, BoundNode)>,
}

impl BoundRecord {
    pub fn get(&self, name: &str) -> Option<&BoundNode> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    /// 按点分路径查找，例如 `http.server.requests`。
    pub fn get_path(&self, path: &str) -> Option<&BoundNode> {
        let mut segments = path.split('.');
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = node.as_record()?.get(segment)?;
        }
        Some(node)
    }

    /// 按路径取出指定类型的叶子。
    pub fn leaf<L: Leaf>(&self, path: &str) -> Option<L> {
        self.get_path(path)?.as_instrument()?.get::<L>()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundNode)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Binder {
    /// 绑定运行期蓝图；根节点必须是记录。
    pub fn bind_schema(
        &self,
        schema: &NodeSchema,
        base: impl IntoIterator<Item = KeyValue>,
    ) -> Result<BoundRecord, BindError> {
        let record = match schema {
            NodeSchema::Record(record) => record,
            NodeSchema::Leaf(leaf) => {
                return Err(BindError::InvalidBlueprintShape {
                    found: format!("leaf `{}`", leaf.type_name()),
                });
            }
        };
        self.walk("runtime schema", base, |cx| record.bind_in(cx))
    }
}
