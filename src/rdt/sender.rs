//! RDT 发送端
//!
//! 目标：在会丢包 / 损坏 / 乱序的信道上可靠、按序地传输字节流：
//! - 上层消息切分成报文，窗口有空位就发，否则进积压队列；
//! - 累计 ack 推进窗口，腾出的空位立即由积压报文补上；
//! - 连续 `dup_threshold` 个相同 ack 触发快速重传；
//! - 每个在途报文一个逻辑超时，复用同一个底层定时器（见 [`TimerChain`]）；
//! - 窗口大小由 [`Congestion`] 按 AIMD 调整（或固定）。

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::api::{DropReason, Message, RdtEvent, SendCause, SenderApi, WindowReason};
use super::config::RdtConfig;
use super::congestion::Congestion;
use super::error::RdtError;
use super::packet::Packet;
use super::segmenter::Segmenter;
use super::timer_chain::TimerChain;
use super::window::SendWindow;

/// 发送端统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SenderStats {
    pub messages: u64,
    pub bytes_from_app: u64,
    pub pkts_created: u64,
    pub pkts_sent: u64,
    pub timeout_retransmits: u64,
    pub fast_retransmits: u64,
    pub acks_received: u64,
    pub corrupt_acks: u64,
    pub invalid_acks: u64,
}

#[derive(Debug, Clone)]
pub struct RdtSender {
    cfg: RdtConfig,
    segmenter: Segmenter,
    window: SendWindow,
    chain: TimerChain,
    congestion: Congestion,
    /// ack 值 -> 自上次清零以来收到的次数
    dup_acks: HashMap<u32, u32>,
    stats: SenderStats,
}

impl RdtSender {
    pub fn new(cfg: RdtConfig) -> Result<Self, RdtError> {
        cfg.check()?;
        let segmenter = Segmenter::new(cfg.packet_size)?;
        Ok(Self {
            segmenter,
            window: SendWindow::new(1),
            chain: TimerChain::new(cfg.timeout()),
            congestion: Congestion::new(cfg.congestion),
            dup_acks: HashMap::new(),
            stats: SenderStats::default(),
            cfg,
        })
    }

    pub fn config(&self) -> &RdtConfig {
        &self.cfg
    }

    pub fn window(&self) -> &SendWindow {
        &self.window
    }

    pub fn chain(&self) -> &TimerChain {
        &self.chain
    }

    /// 当前拥塞窗口容量
    pub fn window_capacity(&self) -> usize {
        self.congestion.window()
    }

    pub fn last_seq(&self) -> u32 {
        self.segmenter.last_seq()
    }

    pub fn dup_count(&self, ack: u32) -> u32 {
        self.dup_acks.get(&ack).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> SenderStats {
        self.stats
    }

    /// 所有已切分的数据都已被累计确认
    pub fn is_idle(&self) -> bool {
        self.window.is_idle()
    }

    pub fn init(&mut self, api: &mut dyn SenderApi) {
        info!(
            now = %api.now(),
            packet_size = self.cfg.packet_size,
            window = self.congestion.window(),
            mode = ?self.congestion.mode(),
            "sender initializing"
        );
    }

    pub fn finalize(&mut self, api: &mut dyn SenderApi) {
        if !self.window.is_idle() {
            warn!(
                in_flight = self.window.in_flight(),
                backlog = self.window.backlog_len(),
                "sender finalizing with unacknowledged data"
            );
        }
        info!(now = %api.now(), current_ack = self.window.current_ack(), "sender finalizing");
    }

    /// 上层交来一条消息：切分后逐个送入窗口。
    pub fn on_message(&mut self, msg: Message, api: &mut dyn SenderApi) {
        self.stats.messages += 1;
        self.stats.bytes_from_app += msg.len() as u64;
        let capacity = self.congestion.window();
        let before = self.stats.pkts_created;

        for pkt in self.segmenter.split(&msg.data) {
            self.stats.pkts_created += 1;
            if self.window.admit(pkt, capacity, &mut self.chain, api) {
                self.stats.pkts_sent += 1;
            }
        }
        debug!(
            len = msg.len(),
            pkts = self.stats.pkts_created - before,
            in_flight = self.window.in_flight(),
            backlog = self.window.backlog_len(),
            "消息已切分"
        );
    }

    /// 处理从信道上来的 ack 报文。
    pub fn on_packet(&mut self, pkt: Packet, api: &mut dyn SenderApi) {
        if let Err(e) = pkt.validate() {
            debug!(error = %e, "ack 报文损坏，丢弃");
            self.stats.corrupt_acks += 1;
            api.record(RdtEvent::Dropped {
                seq: pkt.seq(),
                reason: DropReason::Corrupt,
            });
            return;
        }
        let ack = pkt.ack_number();
        // 只会确认发过的报文，超出说明 ack 被篡改
        if u64::from(ack) > u64::from(self.segmenter.last_seq()) + 1 {
            debug!(ack, last_seq = self.segmenter.last_seq(), "ack 超出已发送范围，丢弃");
            self.stats.invalid_acks += 1;
            api.record(RdtEvent::Dropped {
                seq: ack,
                reason: DropReason::AckBeyondSent,
            });
            return;
        }
        self.stats.acks_received += 1;

        let count = self.dup_acks.entry(ack).or_insert(0);
        *count += 1;
        let dup_count = *count;
        trace!(ack, dup_count, current_ack = self.window.current_ack(), "收到 ack");
        api.record(RdtEvent::AckReceived { ack, dup_count });

        let mut decreased = false;
        if dup_count >= self.cfg.dup_threshold {
            self.dup_acks.insert(ack, 0);
            self.fast_retransmit(ack, api);
            decreased = true;
        }

        let evicted = self.window.advance(ack);
        if evicted > 0 {
            trace!(ack, evicted, "窗口前移");
        }
        // 过期 ack（小于当前确认号）不做清理
        if ack == self.window.current_ack() {
            self.dup_acks.retain(|&a, _| a >= ack);
            self.chain.forget_acked(ack, api);
        }

        // 触发快速重传的 ack 不做增长，减半后的窗口保持到下一个 ack（DESIGN.md 决策 5）
        if !decreased {
            if let Some(reason) = self.congestion.on_ack() {
                self.record_window(reason, api);
            }
        }

        self.refill(api);
    }

    /// 定时器触发：重传链头对应的报文（若仍未确认），并把定时器对准新的链头。
    pub fn on_timeout(&mut self, api: &mut dyn SenderApi) -> Result<(), RdtError> {
        let expired = self.chain.pop_expired().ok_or(RdtError::TimerNotScheduled)?;
        let now = api.now();
        trace!(seq = expired.seq, expiry = ?expired.expiry, %now, "重传定时器触发");

        if expired.seq >= self.window.current_ack() {
            if let Some(pkt) = self.window.get(expired.seq).cloned() {
                debug!(seq = expired.seq, "超时重传");
                self.stats.timeout_retransmits += 1;
                self.stats.pkts_sent += 1;
                api.record(RdtEvent::Timeout { seq: expired.seq });
                api.record(RdtEvent::DataSent {
                    seq: expired.seq,
                    len: pkt.payload_len(),
                    cause: SendCause::Timeout,
                });
                api.to_lower(pkt);
                self.chain.push(expired.seq, now);
                if let Some(reason) = self.congestion.on_timeout() {
                    self.record_window(reason, api);
                }
            }
        }

        self.chain.rearm(api);
        // 窗口可能从快速重传后的较小值回到 base，空出的位置由积压报文补上
        self.refill(api);
        Ok(())
    }

    fn refill(&mut self, api: &mut dyn SenderApi) {
        let moved = self.window.refill(self.congestion.window(), &mut self.chain, api);
        self.stats.pkts_sent += moved as u64;
        if moved > 0 {
            trace!(moved, backlog = self.window.backlog_len(), "积压报文补入窗口");
        }
    }

    fn fast_retransmit(&mut self, ack: u32, api: &mut dyn SenderApi) {
        if let Some(pkt) = self.window.get(ack).cloned() {
            debug!(seq = ack, "快速重传");
            self.stats.fast_retransmits += 1;
            self.stats.pkts_sent += 1;
            self.chain.cancel(ack, api);
            api.record(RdtEvent::DataSent {
                seq: ack,
                len: pkt.payload_len(),
                cause: SendCause::FastRetransmit,
            });
            self.chain.schedule(ack, api);
            api.to_lower(pkt);
        }
        if let Some(reason) = self.congestion.on_fast_retransmit() {
            self.record_window(reason, api);
        }
    }

    fn record_window(&self, reason: WindowReason, api: &mut dyn SenderApi) {
        trace!(capacity = self.congestion.window(), ?reason, "拥塞窗口变化");
        api.record(RdtEvent::Window {
            capacity: self.congestion.window(),
            reason,
        });
    }
}
