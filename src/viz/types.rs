use serde::{Deserialize, Serialize};

use crate::net::Side;
use crate::rdt::api::{DropReason, RdtEvent, SendCause, WindowReason};

/// 可视化事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VizEventKind {
    /// 仿真元信息（作为 t=0 的第一条事件）
    Meta {
        packet_size: usize,
        timeout_ns: u64,
        loss_rate: f64,
        corrupt_rate: f64,
        reorder_rate: f64,
    },
    /// 上层交给 sender 一条消息
    AppMessage { len: usize },
    /// 数据报文上信道
    SendData { seq: u32, len: usize, cause: SendCause },
    /// 窗口已满，报文进入积压队列
    Backlog { seq: u32 },
    /// sender 收到合法 ack
    RecvAck { ack: u32, dup_count: u32 },
    /// receiver 发出累计 ack
    SendAck { ack: u32 },
    /// 协议层丢弃（损坏 / 非法 ack / 过期 / 重复）
    Discard { seq: u32, reason: DropReason },
    /// 拥塞窗口变化
    Cwnd { capacity: usize, reason: WindowReason },
    /// 重传定时器到期并触发重传
    Rto { seq: u32 },
    /// 报文进入乱序缓冲
    Reorder { seq: u32 },
    /// 按序交付给上层
    Deliver { seq: u32, len: usize },
    /// 信道丢包
    LinkLoss { bytes: usize },
    /// 信道翻转了一个比特
    LinkCorrupt { bit: usize },
    /// 信道额外延迟（造成乱序）
    LinkDelay { extra_ns: u64 },
}

impl From<RdtEvent> for VizEventKind {
    fn from(ev: RdtEvent) -> Self {
        match ev {
            RdtEvent::DataSent { seq, len, cause } => VizEventKind::SendData { seq, len, cause },
            RdtEvent::Backlogged { seq } => VizEventKind::Backlog { seq },
            RdtEvent::AckReceived { ack, dup_count } => VizEventKind::RecvAck { ack, dup_count },
            RdtEvent::AckSent { ack } => VizEventKind::SendAck { ack },
            RdtEvent::Dropped { seq, reason } => VizEventKind::Discard { seq, reason },
            RdtEvent::Window { capacity, reason } => VizEventKind::Cwnd { capacity, reason },
            RdtEvent::Timeout { seq } => VizEventKind::Rto { seq },
            RdtEvent::Reordered { seq } => VizEventKind::Reorder { seq },
            RdtEvent::Delivered { seq, len } => VizEventKind::Deliver { seq, len },
        }
    }
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    /// 事件发生在哪一端（信道事件记在发出方）
    pub side: Side,
    #[serde(flatten)]
    pub kind: VizEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct VizLogger {
    pub events: Vec<VizEvent>,
}

impl VizLogger {
    pub fn push(&mut self, t_ns: u64, side: Side, kind: VizEventKind) {
        self.events.push(VizEvent { t_ns, side, kind });
    }

    pub fn count(&self, pred: impl Fn(&VizEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }
}
