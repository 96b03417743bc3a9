//! RDT 报文编解码
//!
//! 报文是固定长度的字节缓冲（长度由配置决定），布局如下（多字节整数为小端）：
//!
//! ```text
//! | offset | bytes | field                                        |
//! |--------|-------|----------------------------------------------|
//! | 0      | 1     | payload length                               |
//! | 1      | 4     | sequence number                              |
//! | 5      | 4     | ack number（接收端期望的下一个序号）         |
//! | 9      | 2     | checksum（计算时该字段置零）                 |
//! | 11     | ...   | payload，最多 packet_size - 11 字节          |
//! ```
//!
//! 所有字段都通过命名偏移量读写，不对缓冲做原地类型重解释。

use super::error::CodecError;

/// 报头长度（字节）
pub const HEADER_SIZE: usize = 11;
/// 默认报文总长度（字节）
pub const DEFAULT_PACKET_SIZE: usize = 128;

const OFF_LEN: usize = 0;
const OFF_SEQ: usize = 1;
const OFF_ACK: usize = 5;
const OFF_CHECKSUM: usize = 9;

/// 数据报文中 ack 字段的占位值；ack 报文中 seq 字段的占位值。
pub const PLACEHOLDER: u32 = 1;

/// 给定报文长度下单个报文能携带的最大载荷。
///
/// 长度字段只有 1 字节，因此上限是 255。
pub fn max_payload(packet_size: usize) -> usize {
    packet_size.saturating_sub(HEADER_SIZE).min(u8::MAX as usize)
}

/// 标准 Internet checksum（RFC 1071）：按小端 16-bit 字求和，奇数尾字节补零，
/// 折叠进位后取反。
pub fn internet_checksum(bytes: &[u8]) -> u16 {
    let mut sum: u64 = 0;
    let mut words = bytes.chunks_exact(2);
    for w in &mut words {
        sum += u16::from_le_bytes([w[0], w[1]]) as u64;
    }
    if let [tail] = words.remainder() {
        sum += u16::from_le_bytes([*tail, 0]) as u64;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

/// 一个线上报文（拥有自己的字节缓冲）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    data: Vec<u8>,
}

impl Packet {
    /// 构造一个数据报文并写入 checksum。
    pub fn encode(packet_size: usize, payload: &[u8], seq: u32, ack: u32) -> Result<Self, CodecError> {
        if packet_size <= HEADER_SIZE {
            return Err(CodecError::PacketTooSmall {
                size: packet_size,
                header: HEADER_SIZE,
            });
        }
        let max = max_payload(packet_size);
        if payload.len() > max {
            return Err(CodecError::PayloadTooLarge {
                len: payload.len(),
                max,
            });
        }

        let mut data = vec![0u8; packet_size];
        data[OFF_LEN] = payload.len() as u8;
        data[OFF_SEQ..OFF_SEQ + 4].copy_from_slice(&seq.to_le_bytes());
        data[OFF_ACK..OFF_ACK + 4].copy_from_slice(&ack.to_le_bytes());
        data[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);

        let mut pkt = Packet { data };
        let csum = pkt.compute_checksum(payload.len());
        pkt.set_checksum(csum);
        Ok(pkt)
    }

    /// 接收端回给发送端的累计确认报文（无载荷）。
    pub fn ack(packet_size: usize, ack: u32) -> Result<Self, CodecError> {
        Self::encode(packet_size, &[], PLACEHOLDER, ack)
    }

    /// 包装一段从信道上收到的原始字节。
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CodecError> {
        if data.len() <= HEADER_SIZE {
            return Err(CodecError::PacketTooSmall {
                size: data.len(),
                header: HEADER_SIZE,
            });
        }
        Ok(Packet { data })
    }

    /// 校验报文：长度字段越界或 checksum 不一致都视为损坏。
    pub fn validate(&self) -> Result<(), CodecError> {
        let declared = self.payload_len();
        let max = self.max_payload();
        if declared > max {
            return Err(CodecError::LengthOutOfRange { declared, max });
        }
        let stored = self.checksum();
        let computed = self.compute_checksum(declared);
        if stored != computed {
            return Err(CodecError::ChecksumMismatch { stored, computed });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// 报文总长度（即配置的 packet size）
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn max_payload(&self) -> usize {
        max_payload(self.data.len())
    }

    /// 报头中声明的载荷长度（未校验）
    pub fn payload_len(&self) -> usize {
        self.data[OFF_LEN] as usize
    }

    pub fn seq(&self) -> u32 {
        self.read_u32(OFF_SEQ)
    }

    pub fn ack_number(&self) -> u32 {
        self.read_u32(OFF_ACK)
    }

    pub fn checksum(&self) -> u16 {
        u16::from_le_bytes([self.data[OFF_CHECKSUM], self.data[OFF_CHECKSUM + 1]])
    }

    /// 载荷切片；声明长度越界时截断到容量（只在校验失败的报文上发生）。
    pub fn payload(&self) -> &[u8] {
        let len = self.payload_len().min(self.max_payload());
        &self.data[HEADER_SIZE..HEADER_SIZE + len]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 原始字节的可变视图：信道用它注入比特翻转。
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn read_u32(&self, off: usize) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.data[off..off + 4]);
        u32::from_le_bytes(b)
    }

    fn set_checksum(&mut self, csum: u16) {
        self.data[OFF_CHECKSUM..OFF_CHECKSUM + 2].copy_from_slice(&csum.to_le_bytes());
    }

    /// 以 checksum 字段为零计算报头 + 载荷的 checksum；`payload_len` 必须已做过越界检查。
    fn compute_checksum(&self, payload_len: usize) -> u16 {
        let end = HEADER_SIZE + payload_len;
        let mut scratch = self.data[..end].to_vec();
        scratch[OFF_CHECKSUM..OFF_CHECKSUM + 2].fill(0);
        internet_checksum(&scratch)
    }
}
