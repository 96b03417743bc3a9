//! 发送窗口与积压队列
//!
//! - 窗口：已发出、尚未被累计确认的报文，按序号升序，个数不超过拥塞窗口；
//! - 积压队列：已切分但还没进入窗口的报文（FIFO，不限长度）。
//!
//! 窗口腾出空间时，积压报文原样（同一序号）发出；它们之前从未上过信道。

use std::collections::VecDeque;

use super::api::{RdtEvent, SendCause, SenderApi};
use super::packet::Packet;
use super::timer_chain::TimerChain;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct SendWindow {
    inflight: VecDeque<Packet>,
    backlog: VecDeque<Packet>,
    /// 最近一次累计确认号：比它小的序号都已送达
    current_ack: u32,
}

impl SendWindow {
    pub fn new(initial_ack: u32) -> Self {
        Self {
            inflight: VecDeque::new(),
            backlog: VecDeque::new(),
            current_ack: initial_ack,
        }
    }

    pub fn current_ack(&self) -> u32 {
        self.current_ack
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// 窗口与积压队列都为空
    pub fn is_idle(&self) -> bool {
        self.inflight.is_empty() && self.backlog.is_empty()
    }

    pub fn inflight_seqs(&self) -> impl Iterator<Item = u32> + '_ {
        self.inflight.iter().map(Packet::seq)
    }

    pub fn backlog_seqs(&self) -> impl Iterator<Item = u32> + '_ {
        self.backlog.iter().map(Packet::seq)
    }

    /// 按序号查找在途报文（用于重传）
    pub fn get(&self, seq: u32) -> Option<&Packet> {
        self.inflight.iter().find(|p| p.seq() == seq)
    }

    /// 新报文进入发送路径：窗口有空位且积压队列为空时立即发出，否则排到积压队列尾部。
    /// 返回是否立即发出。
    pub fn admit(
        &mut self,
        pkt: Packet,
        capacity: usize,
        chain: &mut TimerChain,
        api: &mut dyn SenderApi,
    ) -> bool {
        if self.backlog.is_empty() && self.inflight.len() < capacity {
            self.transmit(pkt, SendCause::New, chain, api);
            true
        } else {
            trace!(seq = pkt.seq(), backlog = self.backlog.len() + 1, "窗口已满，放入积压队列");
            api.record(RdtEvent::Backlogged { seq: pkt.seq() });
            self.backlog.push_back(pkt);
            false
        }
    }

    /// 累计确认推进窗口：移除所有 `seq < new_ack` 的报文。返回移除个数；
    /// `new_ack` 不大于当前确认号时什么都不做。
    pub fn advance(&mut self, new_ack: u32) -> usize {
        if new_ack <= self.current_ack {
            return 0;
        }
        let mut evicted = 0;
        while self.inflight.front().is_some_and(|p| p.seq() < new_ack) {
            self.inflight.pop_front();
            evicted += 1;
        }
        self.current_ack = new_ack;
        evicted
    }

    /// 一次性把积压报文按 FIFO 顺序补进窗口，直到窗口满或积压清空。返回补入个数。
    pub fn refill(&mut self, capacity: usize, chain: &mut TimerChain, api: &mut dyn SenderApi) -> usize {
        let mut moved = 0;
        while self.inflight.len() < capacity {
            let Some(pkt) = self.backlog.pop_front() else {
                break;
            };
            self.transmit(pkt, SendCause::Backlog, chain, api);
            moved += 1;
        }
        moved
    }

    fn transmit(&mut self, pkt: Packet, cause: SendCause, chain: &mut TimerChain, api: &mut dyn SenderApi) {
        let seq = pkt.seq();
        api.record(RdtEvent::DataSent {
            seq,
            len: pkt.payload_len(),
            cause,
        });
        chain.schedule(seq, api);
        api.to_lower(pkt.clone());
        self.inflight.push_back(pkt);
    }
}
