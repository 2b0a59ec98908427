use std::collections::BTreeMap;

use opentelemetry::InstrumentationScope;
use serde::Deserialize;

use crate::Error;

/// 默认的 instrumentation scope 名称。
pub(crate) const DEFAULT_SCOPE: &str = "meterbind";

/// OpenTelemetry 桥接层的配置。
///
/// # 教案式说明
/// - **意图（Why）**：Meter 的 scope 与 Provider 的 Resource 是宿主一次性决定的元数据，
///   与蓝图声明无关，因此集中在一个可序列化的结构中；
/// - **逻辑（How）**：全部字段带默认值，空 TOML 文档即得到可用配置；
/// - **契约（What）**：
///   - `scope` 缺省为 `"meterbind"`；
///   - `version` 与 `schema_url` 缺省不设置；
///   - `resource` 以键排序，写入 Provider 的 Resource。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OtelConfig {
    pub scope: String,
    pub version: Option<String>,
    pub schema_url: Option<String>,
    pub resource: BTreeMap<String, String>,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            scope: DEFAULT_SCOPE.to_owned(),
            version: None,
            schema_url: None,
            resource: BTreeMap::new(),
        }
    }
}

impl OtelConfig {
    /// 以给定 scope 名称构造配置，其余字段取默认值。
    pub fn with_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// 从 TOML 文本解析配置。
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// 追加一条 Resource 属性；同名键以最后一次为准。
    pub fn with_resource(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.resource.insert(key.into(), value.into());
        self
    }

    pub(crate) fn instrumentation_scope(&self) -> InstrumentationScope {
        let mut builder = InstrumentationScope::builder(self.scope.clone());
        if let Some(version) = &self.version {
            builder = builder.with_version(version.clone());
        }
        if let Some(schema_url) = &self.schema_url {
            builder = builder.with_schema_url(schema_url.clone());
        }
        builder.build()
    }
}
