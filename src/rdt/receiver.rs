//! RDT 接收端
//!
//! 校验 → 按序交付 / 放入乱序缓冲 / 丢弃 → 排空缓冲 → 回一个累计 ack。
//! 即使报文乱序或重复也照样回 ack，发送端靠重复 ack 发现丢包。

use serde::Serialize;
use tracing::{debug, info, trace};

use super::api::{DropReason, Message, RdtEvent, ReceiverApi};
use super::config::RdtConfig;
use super::error::{CodecError, RdtError};
use super::packet::Packet;
use super::reorder::ReorderBuffer;

/// 接收端统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverStats {
    pub pkts_received: u64,
    pub corrupt_dropped: u64,
    pub stale_dropped: u64,
    pub duplicate_dropped: u64,
    pub reordered: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    pub acks_sent: u64,
}

#[derive(Debug, Clone)]
pub struct RdtReceiver {
    packet_size: usize,
    /// 下一个按序可交付的序号（也是 ack 号）
    expected: u32,
    buffer: ReorderBuffer,
    stats: ReceiverStats,
}

impl RdtReceiver {
    pub fn new(cfg: &RdtConfig) -> Result<Self, RdtError> {
        cfg.check()?;
        Ok(Self {
            packet_size: cfg.packet_size,
            expected: 1,
            buffer: ReorderBuffer::new(),
            stats: ReceiverStats::default(),
        })
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    pub fn buffer(&self) -> &ReorderBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    pub fn init(&mut self, api: &mut dyn ReceiverApi) {
        info!(now = %api.now(), "receiver initializing");
    }

    pub fn finalize(&mut self, api: &mut dyn ReceiverApi) {
        info!(
            now = %api.now(),
            expected = self.expected,
            buffered = self.buffer.len(),
            delivered_bytes = self.stats.delivered_bytes,
            "receiver finalizing"
        );
    }

    /// 处理从信道上来的数据报文。
    pub fn on_packet(&mut self, pkt: Packet, api: &mut dyn ReceiverApi) -> Result<(), CodecError> {
        self.stats.pkts_received += 1;
        if let Err(e) = pkt.validate() {
            debug!(error = %e, "数据报文损坏，丢弃");
            self.stats.corrupt_dropped += 1;
            api.record(RdtEvent::Dropped {
                seq: pkt.seq(),
                reason: DropReason::Corrupt,
            });
            return Ok(());
        }

        let seq = pkt.seq();
        trace!(seq, expected = self.expected, len = pkt.payload_len(), "收到数据报文");
        if seq == self.expected {
            self.deliver(&pkt, api);
        } else if seq > self.expected {
            if self.buffer.insert(pkt) {
                self.stats.reordered += 1;
                api.record(RdtEvent::Reordered { seq });
            } else {
                self.stats.duplicate_dropped += 1;
                api.record(RdtEvent::Dropped {
                    seq,
                    reason: DropReason::Duplicate,
                });
            }
        } else {
            self.stats.stale_dropped += 1;
            api.record(RdtEvent::Dropped {
                seq,
                reason: DropReason::Stale,
            });
        }

        while let Some(next) = self.buffer.pop_if_next(self.expected) {
            self.deliver(&next, api);
        }

        let ack = Packet::ack(self.packet_size, self.expected)?;
        self.stats.acks_sent += 1;
        api.record(RdtEvent::AckSent { ack: self.expected });
        api.to_lower(ack);
        Ok(())
    }

    fn deliver(&mut self, pkt: &Packet, api: &mut dyn ReceiverApi) {
        let payload = pkt.payload();
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += payload.len() as u64;
        api.record(RdtEvent::Delivered {
            seq: pkt.seq(),
            len: payload.len(),
        });
        api.to_upper(Message::new(payload.to_vec()));
        self.expected += 1;
    }
}
