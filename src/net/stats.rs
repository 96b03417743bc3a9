//! 统计信息
//!
//! 一次会话结束后的汇总报告，可直接序列化为 JSON。

use serde::Serialize;

use super::link::LinkStats;
use crate::rdt::{ReceiverStats, SenderStats};

/// 会话汇总
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    /// 仿真结束时刻（纳秒）
    pub sim_time_ns: u64,
    /// 执行过的事件数
    pub events: u64,
    pub app_messages_sent: u64,
    pub app_bytes_sent: u64,
    pub app_messages_delivered: u64,
    pub app_bytes_delivered: u64,
    /// 交付的字节流是发送字节流的前缀
    pub stream_ok: bool,
    /// 发送的字节全部按序交付
    pub complete: bool,
    /// 结束时 sender 的窗口容量
    pub final_window: usize,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub data_link: LinkStats,
    pub ack_link: LinkStats,
}
