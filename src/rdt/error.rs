//! RDT 错误类型

use thiserror::Error;

/// 编解码/校验错误。接收路径上的这些错误都按“损坏”处理：静默丢弃。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("packet size {size} leaves no room for payload (header is {header} bytes)")]
    PacketTooSmall { size: usize, header: usize },
    #[error("payload of {len} bytes exceeds max payload {max}")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("declared payload length {declared} exceeds max payload {max}")]
    LengthOutOfRange { declared: usize, max: usize },
    #[error("checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { stored: u16, computed: u16 },
}

/// 引擎配置错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RdtConfigError {
    #[error("packet_size must exceed the {header}-byte header, got {size}")]
    PacketTooSmall { size: usize, header: usize },
    #[error("timeout_us must be positive")]
    ZeroTimeout,
    #[error("dup_threshold must be at least 1")]
    ZeroDupThreshold,
    #[error("fixed window must be at least 1")]
    ZeroWindow,
    #[error("aimd requires 1 <= base <= upper_bound, got base={base} upper_bound={upper_bound}")]
    AimdBounds { base: usize, upper_bound: usize },
}

/// 协议引擎错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RdtError {
    /// 定时器触发时 timer chain 为空：调度逻辑有 bug，不可恢复
    #[error("retransmission timer fired with no pending deadline")]
    TimerNotScheduled,
    #[error("invalid engine config: {0}")]
    Config(#[from] RdtConfigError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
