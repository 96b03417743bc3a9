//! 拥塞窗口控制（AIMD）
//!
//! 窗口以“报文个数”计：
//! - 每收到一个合法 ack（无论是否重复）：低于上界时翻倍（慢启动），否则 +1（拥塞避免），
//!   结果始终截断到上界；
//! - 快速重传：减半，最小为 1；
//! - 超时：回到初始值（比单个丢包更强的拥塞信号）。
//!
//! `Fixed` 模式下窗口恒定，以上事件均不生效。

use serde::{Deserialize, Serialize};

use super::api::WindowReason;
use super::error::RdtConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CongestionMode {
    /// 固定窗口
    Fixed { window: usize },
    /// 慢启动 + AIMD
    Aimd { base: usize, upper_bound: usize },
}

impl Default for CongestionMode {
    fn default() -> Self {
        CongestionMode::Aimd {
            base: 2,
            upper_bound: 32,
        }
    }
}

impl CongestionMode {
    pub(crate) fn check(&self) -> Result<(), RdtConfigError> {
        match *self {
            CongestionMode::Fixed { window: 0 } => Err(RdtConfigError::ZeroWindow),
            CongestionMode::Aimd { base, upper_bound } if base == 0 || base > upper_bound => {
                Err(RdtConfigError::AimdBounds { base, upper_bound })
            }
            _ => Ok(()),
        }
    }

    fn initial_window(&self) -> usize {
        match *self {
            CongestionMode::Fixed { window } => window,
            CongestionMode::Aimd { base, .. } => base,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Congestion {
    mode: CongestionMode,
    window: usize,
}

impl Congestion {
    pub fn new(mode: CongestionMode) -> Self {
        Self {
            mode,
            window: mode.initial_window().max(1),
        }
    }

    pub fn mode(&self) -> CongestionMode {
        self.mode
    }

    /// 当前窗口容量（报文个数）
    pub fn window(&self) -> usize {
        self.window
    }

    /// 收到合法 ack。返回窗口是否变化及原因。
    pub fn on_ack(&mut self) -> Option<WindowReason> {
        let CongestionMode::Aimd { upper_bound, .. } = self.mode else {
            return None;
        };
        let (next, reason) = if self.window < upper_bound {
            (self.window.saturating_mul(2), WindowReason::SlowStart)
        } else {
            (self.window.saturating_add(1), WindowReason::CongestionAvoidance)
        };
        self.set(next.min(upper_bound), reason)
    }

    /// 快速重传：乘性减半
    pub fn on_fast_retransmit(&mut self) -> Option<WindowReason> {
        if !matches!(self.mode, CongestionMode::Aimd { .. }) {
            return None;
        }
        self.set((self.window / 2).max(1), WindowReason::FastRetransmit)
    }

    /// 超时：回到初始窗口
    pub fn on_timeout(&mut self) -> Option<WindowReason> {
        let CongestionMode::Aimd { base, .. } = self.mode else {
            return None;
        };
        self.set(base.max(1), WindowReason::Timeout)
    }

    fn set(&mut self, next: usize, reason: WindowReason) -> Option<WindowReason> {
        if next == self.window {
            return None;
        }
        self.window = next;
        Some(reason)
    }
}
