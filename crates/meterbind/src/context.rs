//! 测量调用的执行上下文。
//!
//! `add` / `record` 在未显式传入上下文时使用 [`MeasureContext::background`]：
//! 永不取消、没有截止时间。核心层只负责把上下文原样交给后端，
//! 是否依据取消或超时丢弃测量值由后端自行决定。

use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// 取消原语，多个持有者共享同一原子位。
///
/// # 契约说明（What）
/// - 构造后处于“未取消”状态；
/// - `cancel` 首次成功置位时返回 `true`，重复调用返回 `false`；
#[derive(Clone, Debug)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// 创建处于“未取消”状态的取消令牌。
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 查询当前是否已被标记取消。
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// 将当前令牌标记为取消。
    pub fn cancel(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// 截止原语，描述测量最迟应被后端接收的时间点。
///
/// 截止时间不会自动驱动取消；[`MeasureContext::is_done`] 在查询时比较当前单调时钟。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline {
    instant: Option<Instant>,
}

impl Deadline {
    /// 创建未设置截止时间的实例。
    pub const fn none() -> Self {
        Self { instant: None }
    }

    /// 根据绝对时间点构造截止时间。
    pub fn at(instant: Instant) -> Self {
        Self {
            instant: Some(instant),
        }
    }

    /// 基于当前时间点加持续时间生成截止时间。
    pub fn with_timeout(timeout: Duration) -> Self {
        let now = Instant::now();
        Self::at(now.checked_add(timeout).unwrap_or(now))
    }

    pub fn instant(&self) -> Option<Instant> {
        self.instant
    }

    /// 判断在 `now` 时刻是否已经超时。
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.instant {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// 单次测量调用携带的上下文。
///
/// # 教案式说明
/// - **逻辑（How）**：组合可选的 [`Cancellation`] 与 [`Deadline`]；
///   二者均缺省时即“无界”上下文。
/// - **契约（What）**：
///   - 句柄包装层不检查上下文，也不因上下文失败而报错；
///   - 后端可通过 [`MeasureContext::is_done`] 决定是否丢弃测量值。
#[derive(Clone, Debug, Default)]
pub struct MeasureContext {
    cancellation: Option<Cancellation>,
    deadline: Deadline,
}

impl MeasureContext {
    /// 返回进程级共享的无界上下文。
    pub fn background() -> &'static MeasureContext {
        static BACKGROUND: OnceLock<MeasureContext> = OnceLock::new();
        BACKGROUND.get_or_init(MeasureContext::default)
    }

    /// 创建新的无界上下文，供调用方继续叠加取消或截止约束。
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
    }

    /// 已取消或已超过截止时间时返回 `true`。
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_expired(Instant::now())
    }

    /// 无取消令牌且无截止时间。
    pub fn is_unbounded(&self) -> bool {
        self.cancellation.is_none() && self.deadline.instant().is_none()
    }
}
