//! 仿真配置
//!
//! 可以从 JSON 文件加载（缺省字段取默认值），再由命令行参数覆盖。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rdt::{RdtConfig, RdtConfigError, RdtError};
use crate::sim::SimTime;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("loss_rate of 1 makes delivery impossible")]
    CertainLoss,
    #[error("mean_msg_size must be positive")]
    ZeroMessageSize,
    #[error("invalid config: {0}")]
    Rdt(#[from] RdtConfigError),
    #[error(transparent)]
    Engine(#[from] RdtError),
}

/// 一次 sender -> receiver 会话的仿真参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 上层持续产生消息的时长（毫秒）
    pub sim_time_ms: u64,
    /// 停止产生消息后，留给重传收尾的时长（毫秒）
    pub drain_ms: u64,
    /// 平均消息长度（字节），实际长度均匀分布在 [1, 2*mean]
    pub mean_msg_size: usize,
    /// 平均消息间隔（微秒），实际间隔均匀分布在 [0, 2*mean]
    pub mean_msg_interval_us: u64,
    /// 丢包率
    pub loss_rate: f64,
    /// 损坏率（每个损坏报文翻转一个比特）
    pub corrupt_rate: f64,
    /// 乱序率（被选中的报文额外延迟 (0, jitter]）
    pub reorder_rate: f64,
    /// 单向传播时延（微秒）
    pub latency_us: u64,
    /// 乱序附加延迟上限（微秒）
    pub jitter_us: u64,
    /// 单向带宽（bps），0 表示不计串行化时延
    pub bandwidth_bps: u64,
    /// 随机种子
    pub seed: u64,
    /// 协议引擎参数
    pub rdt: RdtConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sim_time_ms: 1_000_000,
            drain_ms: 600_000,
            mean_msg_size: 100,
            mean_msg_interval_us: 100_000,
            loss_rate: 0.15,
            corrupt_rate: 0.15,
            reorder_rate: 0.15,
            latency_us: 10_000,
            jitter_us: 50_000,
            bandwidth_bps: 10_000_000,
            seed: 1,
            rdt: RdtConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("loss_rate", self.loss_rate),
            ("corrupt_rate", self.corrupt_rate),
            ("reorder_rate", self.reorder_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        if self.loss_rate >= 1.0 {
            return Err(ConfigError::CertainLoss);
        }
        if self.mean_msg_size == 0 {
            return Err(ConfigError::ZeroMessageSize);
        }
        self.rdt.check()?;
        Ok(())
    }

    pub fn sim_time(&self) -> SimTime {
        SimTime::from_millis(self.sim_time_ms)
    }

    /// 仿真运行的截止时间
    pub fn end_time(&self) -> SimTime {
        self.sim_time()
            .saturating_add(SimTime::from_millis(self.drain_ms))
    }

    pub fn latency(&self) -> SimTime {
        SimTime::from_micros(self.latency_us)
    }

    pub fn jitter(&self) -> SimTime {
        SimTime::from_micros(self.jitter_us)
    }
}
