//! 协议引擎配置
//!
//! 拥塞策略（AIMD / 固定窗口）在构造引擎时选定。

use serde::{Deserialize, Serialize};

use super::congestion::CongestionMode;
use super::error::RdtConfigError;
use super::packet::{DEFAULT_PACKET_SIZE, HEADER_SIZE};
use crate::sim::SimTime;

/// 默认重传超时：300ms
pub const DEFAULT_TIMEOUT_MS: u64 = 300;
/// 连续相同 ack 达到该次数时触发快速重传
pub const DEFAULT_DUP_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdtConfig {
    /// 报文总长度（字节），含 11 字节报头
    pub packet_size: usize,
    /// 重传超时（微秒）
    pub timeout_us: u64,
    /// 快速重传阈值
    pub dup_threshold: u32,
    /// 拥塞窗口策略
    pub congestion: CongestionMode,
}

impl Default for RdtConfig {
    fn default() -> Self {
        Self {
            packet_size: DEFAULT_PACKET_SIZE,
            timeout_us: DEFAULT_TIMEOUT_MS * 1_000,
            dup_threshold: DEFAULT_DUP_THRESHOLD,
            congestion: CongestionMode::default(),
        }
    }
}

impl RdtConfig {
    pub fn timeout(&self) -> SimTime {
        SimTime::from_micros(self.timeout_us)
    }

    /// 检查配置合法性，返回第一处问题。
    pub fn check(&self) -> Result<(), RdtConfigError> {
        if self.packet_size <= HEADER_SIZE {
            return Err(RdtConfigError::PacketTooSmall {
                size: self.packet_size,
                header: HEADER_SIZE,
            });
        }
        if self.timeout_us == 0 {
            return Err(RdtConfigError::ZeroTimeout);
        }
        if self.dup_threshold == 0 {
            return Err(RdtConfigError::ZeroDupThreshold);
        }
        self.congestion.check()
    }
}
