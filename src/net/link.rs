//! 单向不可靠链路
//!
//! 在传播时延 + 串行化时延之上叠加故障模型：丢包、比特翻转、额外延迟（造成乱序）。
//! 每条链路持有自己的带种子 RNG，相同配置的运行结果可复现。

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use super::id::Side;
use crate::rdt::Packet;
use crate::sim::SimTime;

/// 故障模型参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultModel {
    pub loss_rate: f64,
    pub corrupt_rate: f64,
    pub reorder_rate: f64,
    /// 乱序报文的附加延迟上限
    pub jitter: SimTime,
}

impl FaultModel {
    /// 无故障
    pub const PERFECT: FaultModel = FaultModel {
        loss_rate: 0.0,
        corrupt_rate: 0.0,
        reorder_rate: 0.0,
        jitter: SimTime::ZERO,
    };
}

/// 链路统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub sent_pkts: u64,
    pub sent_bytes: u64,
    pub lost_pkts: u64,
    pub corrupted_pkts: u64,
    pub delayed_pkts: u64,
}

/// 链路对一个报文的处理结果
#[derive(Debug)]
pub enum Transit {
    Lost,
    Arrive {
        at: SimTime,
        pkt: Packet,
        /// 被翻转的比特位置（按整个报文计）
        corrupted_bit: Option<usize>,
        /// 额外延迟
        extra_delay: Option<SimTime>,
    },
}

#[derive(Debug)]
pub struct Link {
    /// 报文送往哪一端
    pub to: Side,
    pub latency: SimTime,
    pub bandwidth_bps: u64,
    pub busy_until: SimTime,
    pub faults: FaultModel,
    pub stats: LinkStats,
    rng: StdRng,
}

impl Link {
    /// 创建新链路；故障抽样使用调用方给的 RNG
    pub fn new(to: Side, latency: SimTime, bandwidth_bps: u64, faults: FaultModel, rng: StdRng) -> Self {
        Self {
            to,
            latency,
            bandwidth_bps,
            busy_until: SimTime::ZERO,
            faults,
            stats: LinkStats::default(),
            rng,
        }
    }

    /// 计算传输指定字节数所需的时间；带宽为 0 表示不计串行化时延
    pub(crate) fn tx_time(&self, bytes: usize) -> SimTime {
        if self.bandwidth_bps == 0 {
            return SimTime::ZERO;
        }
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (self.bandwidth_bps as u128 - 1))
            / self.bandwidth_bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// 把报文送上链路，决定它的命运。
    pub fn transmit(&mut self, now: SimTime, mut pkt: Packet) -> Transit {
        let bytes = pkt.capacity();
        self.stats.sent_pkts += 1;
        self.stats.sent_bytes += bytes as u64;

        let start = now.max(self.busy_until);
        let depart = start.saturating_add(self.tx_time(bytes));
        self.busy_until = depart;

        if self.roll(self.faults.loss_rate) {
            self.stats.lost_pkts += 1;
            return Transit::Lost;
        }

        let mut corrupted_bit = None;
        if self.roll(self.faults.corrupt_rate) {
            let bit = self.rng.random_range(0..bytes * 8);
            pkt.as_bytes_mut()[bit / 8] ^= 1 << (bit % 8);
            self.stats.corrupted_pkts += 1;
            corrupted_bit = Some(bit);
        }

        let mut at = depart.saturating_add(self.latency);
        let mut extra_delay = None;
        if self.faults.jitter > SimTime::ZERO && self.roll(self.faults.reorder_rate) {
            let extra = SimTime(self.rng.random_range(1..=self.faults.jitter.0));
            at = at.saturating_add(extra);
            self.stats.delayed_pkts += 1;
            extra_delay = Some(extra);
        }

        Transit::Arrive {
            at,
            pkt,
            corrupted_bit,
            extra_delay,
        }
    }

    fn roll(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.random_bool(p)
    }
}
