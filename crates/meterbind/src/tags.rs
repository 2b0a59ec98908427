//! 字段标签解析。
//!
//! 纯函数集合：只读取字段元数据并解析，不关心字段在树中的位置。
//! 返回的错误以字段名标注，由绑定器改写为完整路径。

use crate::{attributes::KeyValue, error::BindError};

/// 叶子标识标签，必填。
pub const ID_TAG: &str = "id";
/// 直方图桶边界标签，逗号分隔的浮点数列表。
pub const BUCKETS_TAG: &str = "buckets";
/// 本地属性标签，逗号分隔、键值交替。
pub const ATTRS_TAG: &str = "attrs";

/// 字段元数据的只读视图。
pub trait FieldMetadata {
    fn field_name(&self) -> &str;

    /// 读取指定键的原始标签值；缺失返回 `None`。
    fn tag(&self, key: &str) -> Option<&str>;
}

/// 派生宏为每个字段生成的静态元数据。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldMeta {
    name: &'static str,
    tags: &'static [(&'static str, &'static str)],
}

impl FieldMeta {
    pub const fn new(name: &'static str, tags: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, tags }
    }
}

impl FieldMetadata for FieldMeta {
    fn field_name(&self) -> &str {
        self.name
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|(k, v)| (*k == key).then_some(*v))
    }
}

impl<M: FieldMetadata + ?Sized> FieldMetadata for &M {
    fn field_name(&self) -> &str {
        (**self).field_name()
    }

    fn tag(&self, key: &str) -> Option<&str> {
        (**self).tag(key)
    }
}

fn present<'a>(meta: &'a (impl FieldMetadata + ?Sized), key: &str) -> Option<&'a str> {
    meta.tag(key).filter(|raw| !raw.trim().is_empty())
}

/// 解析必填的 `id` 标签，去除首尾空白。
pub fn resolve_id(meta: &(impl FieldMetadata + ?Sized)) -> Result<String, BindError> {
    present(meta, ID_TAG)
        .map(|raw| raw.trim().to_owned())
        .ok_or_else(|| BindError::MissingIdentifier {
            field: meta.field_name().to_owned(),
        })
}

/// 解析可选的 `buckets` 标签。
///
/// 缺失或为空时返回空列表，表示由后端选择默认桶；每个片段去除空白后按 `f64` 解析，
/// 任一片段失败即返回 [`BindError::InvalidBoundaryToken`]。
pub fn resolve_boundaries(meta: &(impl FieldMetadata + ?Sized)) -> Result<Vec<f64>, BindError> {
    let Some(raw) = present(meta, BUCKETS_TAG) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<f64>()
                .map_err(|_| BindError::InvalidBoundaryToken {
                    field: meta.field_name().to_owned(),
                    raw: raw.to_owned(),
                    token: token.to_owned(),
                })
        })
        .collect()
}

/// 解析可选的 `attrs` 标签。
///
/// 片段数必须为偶数；顺序保留、重复键保留。
pub fn resolve_attributes(
    meta: &(impl FieldMetadata + ?Sized),
) -> Result<Vec<KeyValue>, BindError> {
    let Some(raw) = present(meta, ATTRS_TAG) else {
        return Ok(Vec::new());
    };
    let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
    if tokens.len() % 2 != 0 {
        return Err(BindError::OddAttributeCount {
            field: meta.field_name().to_owned(),
            raw: raw.to_owned(),
            count: tokens.len(),
        });
    }
    Ok(tokens
        .chunks_exact(2)
        .map(|pair| KeyValue::new(pair[0].to_owned(), pair[1].to_owned()))
        .collect())
}
