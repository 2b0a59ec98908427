use std::{borrow::Cow, fmt, sync::Arc};

/// 描述单个属性键值对的结构化条目。
///
/// # 契约说明（What）
/// - 键与值均为 UTF-8 字符串，使用 `Cow<'static, str>` 同时容纳字面量与运行时拼接的文本；
/// - 属性集合是有序序列而非映射：重复键被原样保留并按顺序交给后端；
/// - **后置条件**：`KeyValue` 可在线程间自由克隆，但本身不提供同步原语。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyValue {
    key: Cow<'static, str>,
    value: Cow<'static, str>,
}

impl KeyValue {
    /// 构建新的属性键值对。
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// 返回属性键的只读视图。
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 返回属性值的只读视图。
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for KeyValue
where
    K: Into<Cow<'static, str>>,
    V: Into<Cow<'static, str>>,
{
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// 沿树路径累积的属性集合。
///
/// # 教案式说明
/// - **逻辑（How）**：内部以 `Arc<[KeyValue]>` 保存，克隆只增加引用计数；
///   [`AttributeSet::extended`] 总是分配新的切片，父集合保持不变。
/// - **契约（What）**：
///   - 集合一经构造不可变，句柄在整个生命周期内持有同一份快照；
///   - 兄弟子树分别从父集合扩展出各自的副本，彼此不可见；
///   - 顺序即根到叶的声明顺序，不做去重。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Arc<[KeyValue]>,
}

impl AttributeSet {
    /// 创建空集合。
    pub fn empty() -> Self {
        Self::default()
    }

    /// 以当前集合为前缀、`local` 为后缀构造新集合。
    pub fn extended(&self, local: &[KeyValue]) -> Self {
        if local.is_empty() {
            return self.clone();
        }
        let mut entries = Vec::with_capacity(self.entries.len() + local.len());
        entries.extend_from_slice(&self.entries);
        entries.extend_from_slice(local);
        Self {
            entries: entries.into(),
        }
    }

    /// 按“内置属性在前、调用点属性在后”的顺序合并。
    ///
    /// 调用点未提供属性时直接借用内置切片，不发生分配。
    pub fn merged<'a>(&'a self, call_site: &[KeyValue]) -> Cow<'a, [KeyValue]> {
        if call_site.is_empty() {
            return Cow::Borrowed(self.as_slice());
        }
        let mut merged = Vec::with_capacity(self.entries.len() + call_site.len());
        merged.extend_from_slice(&self.entries);
        merged.extend_from_slice(call_site);
        Cow::Owned(merged)
    }

    /// 提供只读切片视图。
    pub fn as_slice(&self) -> &[KeyValue] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.entries.iter()
    }
}

impl fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl FromIterator<KeyValue> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = KeyValue>>(iter: I) -> Self {
        let entries: Vec<KeyValue> = iter.into_iter().collect();
        Self {
            entries: entries.into(),
        }
    }
}

impl From<Vec<KeyValue>> for AttributeSet {
    fn from(entries: Vec<KeyValue>) -> Self {
        Self {
            entries: entries.into(),
        }
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
