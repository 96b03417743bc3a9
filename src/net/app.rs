//! 应用层：消息源与接收汇
//!
//! 消息源按随机间隔产生随机长度、随机内容的消息，并记下发出的全部字节；
//! 接收汇把交付上来的载荷按顺序拼接。两者比对即可验证字节流是否正确。

use rand::rngs::StdRng;
use rand::Rng;

use crate::rdt::Message;
use crate::sim::SimTime;

#[derive(Debug)]
pub struct AppSource {
    mean_size: usize,
    mean_interval: SimTime,
    rng: StdRng,
    sent: Vec<u8>,
    messages: u64,
}

impl AppSource {
    pub fn new(mean_size: usize, mean_interval: SimTime, rng: StdRng) -> Self {
        Self {
            mean_size: mean_size.max(1),
            mean_interval,
            rng,
            sent: Vec::new(),
            messages: 0,
        }
    }

    /// 产生下一条消息，长度均匀分布在 [1, 2*mean]
    pub fn next_message(&mut self) -> Message {
        let len = self.rng.random_range(1..=self.mean_size * 2);
        let mut data = vec![0u8; len];
        self.rng.fill(&mut data[..]);
        self.sent.extend_from_slice(&data);
        self.messages += 1;
        Message::new(data)
    }

    /// 距下一条消息的间隔，均匀分布在 [0, 2*mean]
    pub fn next_gap(&mut self) -> SimTime {
        SimTime(self.rng.random_range(0..=self.mean_interval.0.saturating_mul(2)))
    }

    /// 记下绕过消息源、直接交给 sender 的字节，使接收端的校验仍然成立
    pub fn record_external(&mut self, data: &[u8]) {
        self.sent.extend_from_slice(data);
        self.messages += 1;
    }

    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    pub fn messages(&self) -> u64 {
        self.messages
    }
}

#[derive(Debug, Default)]
pub struct AppSink {
    received: Vec<u8>,
    messages: u64,
}

impl AppSink {
    pub fn push(&mut self, msg: Message) {
        self.messages += 1;
        self.received.extend_from_slice(&msg.data);
    }

    pub fn received(&self) -> &[u8] {
        &self.received
    }

    pub fn messages(&self) -> u64 {
        self.messages
    }
}
