//! 重传定时器链
//!
//! 用一个单次硬件定时器模拟“每个在途报文一个逻辑定时器”：
//! 链上按到期时间升序保存 `(seq, expiry)`，底层定时器始终只为链头而设。
//! 由于超时时长固定、调度按 FIFO 追加，链天然有序。
//!
//! 不变量：底层定时器处于 armed 状态当且仅当链非空。

use std::collections::VecDeque;

use super::api::SenderApi;
use crate::sim::SimTime;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub seq: u32,
    pub expiry: SimTime,
}

#[derive(Debug, Clone)]
pub struct TimerChain {
    timeout: SimTime,
    entries: VecDeque<Deadline>,
}

impl TimerChain {
    pub fn new(timeout: SimTime) -> Self {
        Self {
            timeout,
            entries: VecDeque::new(),
        }
    }

    pub fn timeout(&self) -> SimTime {
        self.timeout
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn head(&self) -> Option<Deadline> {
        self.entries.front().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Deadline> {
        self.entries.iter()
    }

    /// 为刚发出的报文登记一个 deadline；链为空时启动底层定时器。
    pub fn schedule(&mut self, seq: u32, api: &mut dyn SenderApi) {
        let now = api.now();
        if self.entries.is_empty() {
            debug_assert!(!api.is_timer_set(), "timer armed while chain is empty");
            api.start_timer(self.timeout);
        }
        self.push(seq, now);
    }

    /// 追加一个 deadline，不触碰底层定时器（超时处理过程中使用，之后调用 [`rearm`](Self::rearm)）。
    pub fn push(&mut self, seq: u32, now: SimTime) {
        let expiry = now.saturating_add(self.timeout);
        trace!(seq, ?expiry, chain_len = self.entries.len() + 1, "登记重传 deadline");
        self.entries.push_back(Deadline { seq, expiry });
    }

    /// 撤销 `seq` 的 deadline（快速重传时避免多余的超时）。返回是否找到。
    pub fn cancel(&mut self, seq: u32, api: &mut dyn SenderApi) -> bool {
        let Some(pos) = self.entries.iter().position(|d| d.seq == seq) else {
            return false;
        };
        self.entries.remove(pos);
        self.after_removal(pos == 0, api);
        true
    }

    /// 删除所有已被累计确认（`seq < ack`）的 deadline。返回删除个数。
    pub fn forget_acked(&mut self, ack: u32, api: &mut dyn SenderApi) -> usize {
        let old_head = self.head();
        let before = self.entries.len();
        self.entries.retain(|d| d.seq >= ack);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.after_removal(self.head() != old_head, api);
        }
        removed
    }

    /// 定时器触发：弹出链头。链为空说明调度出错，返回 `None`。
    pub fn pop_expired(&mut self) -> Option<Deadline> {
        self.entries.pop_front()
    }

    /// 如果链非空，为新的链头启动底层定时器。
    pub fn rearm(&self, api: &mut dyn SenderApi) {
        if let Some(head) = self.entries.front() {
            let after = head.expiry.saturating_sub(api.now());
            trace!(seq = head.seq, ?after, "定时器重新对准链头");
            api.start_timer(after);
        }
    }

    fn after_removal(&self, head_changed: bool, api: &mut dyn SenderApi) {
        if self.entries.is_empty() {
            api.stop_timer();
        } else if head_changed {
            api.stop_timer();
            self.rearm(api);
        }
    }
}
