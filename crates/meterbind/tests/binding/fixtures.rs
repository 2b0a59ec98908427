//! 测试用蓝图。

use meterbind::prelude::*;

pub fn kv(key: &'static str, value: &'static str) -> KeyValue {
    KeyValue::new(key, value)
}

/// 计数器 `A` 位于根，仪表 `B` 位于带 `sub=x` 的子树。
#[derive(Blueprint, Debug)]
pub struct Scenario {
    #[meter(id = "A")]
    pub a: I64Counter,
    #[meter(attrs = "sub,x")]
    pub sub: ScenarioSub,
}

#[derive(Blueprint, Debug)]
pub struct ScenarioSub {
    #[meter(id = "B")]
    pub b: I64Gauge,
}

/// 覆盖全部八种叶子、三种子树形态以及跳过字段的蓝图。
#[derive(Blueprint, Debug)]
pub struct Service {
    #[meter(id = "requests_total")]
    pub requests: I64Counter,
    #[meter(id = "inflight")]
    pub inflight: I64UpDownCounter,
    #[meter(id = "latency_seconds", buckets = "0.005, 0.05, 0.5, 5")]
    pub latency: F64Histogram,
    #[meter(attrs = "tier,frontend")]
    pub frontend: Tier,
    #[meter(attrs = "tier,backend,region,eu")]
    pub backend: Box<Tier>,
    #[meter(nested)]
    pub storage: Option<Storage>,
    #[meter(skip)]
    pub label: String,
    pub note: Option<String>,
}

#[derive(Blueprint, Debug)]
pub struct Tier {
    #[meter(id = "queue_depth")]
    pub queue: I64Gauge,
    #[meter(attrs = "pool,db")]
    pub pool: Pool,
}

#[derive(Blueprint, Debug)]
pub struct Pool {
    #[meter(id = "pool_bytes")]
    pub bytes: F64Counter,
    #[meter(id = "pool_size", buckets = "1,2,4,8")]
    pub size: I64Histogram,
}

#[derive(Blueprint, Debug)]
pub struct Storage {
    #[meter(id = "disk_usage")]
    pub usage: F64Gauge,
    #[meter(id = "io_delta")]
    pub delta: F64UpDownCounter,
}

/// 第二个叶子未标注 `id`。
#[derive(Blueprint, Debug)]
pub struct MissingId {
    #[meter(id = "present")]
    pub present: I64Counter,
    pub missing: F64Counter,
}

#[derive(Blueprint, Debug)]
pub struct BlankId {
    #[meter(id = "   ")]
    pub blank: I64Counter,
}

#[derive(Blueprint, Debug)]
pub struct BadBuckets {
    #[meter(id = "ok")]
    pub ok: F64Counter,
    #[meter(nested)]
    pub inner: BadBucketsInner,
}

#[derive(Blueprint, Debug)]
pub struct BadBucketsInner {
    #[meter(id = "latency", buckets = "1.0,bad")]
    pub latency: F64Histogram,
}

/// 非直方图叶子不解析 `buckets`。
#[derive(Blueprint, Debug)]
pub struct IgnoredBuckets {
    #[meter(id = "temperature", buckets = "not,numbers")]
    pub temperature: F64Gauge,
}

#[derive(Blueprint, Debug)]
pub struct OddAttrs {
    #[meter(attrs = "k1,v1,k2")]
    pub sub: ScenarioSub,
}

#[derive(Blueprint, Debug)]
pub struct Empty;

#[derive(Blueprint, Debug)]
pub struct Labeled<T: Blueprint> {
    #[meter(attrs = "wrapper,yes")]
    pub inner: T,
}

#[derive(Blueprint, Debug)]
pub struct RawNames {
    #[meter(id = "type_total")]
    pub r#type: I64Counter,
}
