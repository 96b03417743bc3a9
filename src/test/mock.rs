//! 记录型 mock：替代仿真器驱动单个引擎，记下引擎对外做的每一件事。

use crate::rdt::api::SendCause;
use crate::rdt::{HarnessApi, Message, Packet, RdtEvent, ReceiverApi, SenderApi};
use crate::sim::SimTime;

#[derive(Debug, Default)]
pub struct MockApi {
    pub now: SimTime,
    /// 交给下层的报文（按顺序）
    pub lower: Vec<Packet>,
    /// 交给上层的消息（按顺序）
    pub upper: Vec<Message>,
    pub events: Vec<RdtEvent>,
    /// 定时器的绝对到期时间
    pub timer: Option<SimTime>,
    pub timer_starts: usize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进时钟到定时器到期并消费它（模拟定时器触发）。
    pub fn fire_timer(&mut self) -> SimTime {
        let at = self.timer.take().expect("timer armed");
        self.now = self.now.max(at);
        at
    }

    pub fn sent_seqs(&self) -> Vec<u32> {
        self.lower.iter().map(Packet::seq).collect()
    }

    pub fn ack_numbers(&self) -> Vec<u32> {
        self.lower.iter().map(Packet::ack_number).collect()
    }

    /// 以指定原因发出的数据报文序号
    pub fn data_sent(&self, cause: SendCause) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RdtEvent::DataSent { seq, cause: c, .. } if *c == cause => Some(*seq),
                _ => None,
            })
            .collect()
    }

    pub fn delivered_bytes(&self) -> Vec<u8> {
        self.upper.iter().flat_map(|m| m.data.iter().copied()).collect()
    }

    pub fn clear(&mut self) {
        self.lower.clear();
        self.upper.clear();
        self.events.clear();
    }
}

impl HarnessApi for MockApi {
    fn now(&self) -> SimTime {
        self.now
    }

    fn to_lower(&mut self, pkt: Packet) {
        self.lower.push(pkt);
    }

    fn record(&mut self, ev: RdtEvent) {
        self.events.push(ev);
    }
}

impl SenderApi for MockApi {
    fn start_timer(&mut self, after: SimTime) {
        self.timer = Some(self.now.saturating_add(after));
        self.timer_starts += 1;
    }

    fn stop_timer(&mut self) {
        self.timer = None;
    }

    fn is_timer_set(&self) -> bool {
        self.timer.is_some()
    }
}

impl ReceiverApi for MockApi {
    fn to_upper(&mut self, msg: Message) {
        self.upper.push(msg);
    }
}
