//! 报文切分
//!
//! 把上层消息切成若干个不超过最大载荷的数据报文，序号单调递增、永不复用。

use super::error::CodecError;
use super::packet::{max_payload, Packet, HEADER_SIZE, PLACEHOLDER};

/// 发送端的序号游标 + 切分器。
#[derive(Debug, Clone)]
pub struct Segmenter {
    packet_size: usize,
    /// 最近一次分配出去的序号（0 表示还没发过任何报文）
    last_seq: u32,
}

impl Segmenter {
    /// `packet_size` 必须能容纳至少 1 字节载荷。
    pub fn new(packet_size: usize) -> Result<Self, CodecError> {
        if packet_size <= HEADER_SIZE {
            return Err(CodecError::PacketTooSmall {
                size: packet_size,
                header: HEADER_SIZE,
            });
        }
        Ok(Self {
            packet_size,
            last_seq: 0,
        })
    }

    /// 目前分配过的最大序号
    pub fn last_seq(&self) -> u32 {
        self.last_seq
    }

    pub fn max_payload(&self) -> usize {
        max_payload(self.packet_size)
    }

    /// 惰性切分：每产出一个报文就推进一次全局序号。
    pub fn split<'a>(&'a mut self, msg: &'a [u8]) -> Segments<'a> {
        let chunk = self.max_payload();
        Segments {
            seg: self,
            chunks: msg.chunks(chunk),
        }
    }
}

/// [`Segmenter::split`] 返回的迭代器；不可重启。
pub struct Segments<'a> {
    seg: &'a mut Segmenter,
    chunks: std::slice::Chunks<'a, u8>,
}

impl Iterator for Segments<'_> {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        let chunk = self.chunks.next()?;
        self.seg.last_seq += 1;
        let seq = self.seg.last_seq;
        // new() 已检查 packet_size，chunk 长度不超过 max_payload，编码不会失败
        let pkt = Packet::encode(self.seg.packet_size, chunk, seq, PLACEHOLDER)
            .expect("segment fits in packet");
        Some(pkt)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}
