//! RDT 仿真世界
//!
//! 持有 sender / receiver 两个引擎、两个方向的链路、sender 的定时器、
//! 应用层消息源/接收汇以及可选的可视化记录。

use std::any::Any;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::api::{ReceiverPort, SenderPort, TimerSlot};
use super::app::{AppSink, AppSource};
use super::id::Side;
use super::link::{FaultModel, Link};
use crate::config::{ConfigError, SimConfig};
use crate::rdt::{RdtReceiver, RdtSender};
use crate::sim::{SimTime, Simulator, World};
use crate::viz::VizLogger;

pub struct RdtWorld {
    pub sender: RdtSender,
    pub receiver: RdtReceiver,
    /// sender -> receiver 方向（数据）
    pub to_receiver: Link,
    /// receiver -> sender 方向（ack）
    pub to_sender: Link,
    pub timer: TimerSlot,
    pub source: AppSource,
    pub sink: AppSink,
    pub viz: Option<VizLogger>,
    /// 上层在此时刻之后不再产生消息
    pub stop_at: SimTime,
}

impl RdtWorld {
    pub fn new(cfg: &SimConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let sender = RdtSender::new(cfg.rdt.clone())?;
        let receiver = RdtReceiver::new(&cfg.rdt)?;
        // 子 RNG 的派生顺序固定：数据链路、ack 链路、消息源
        let mut master = StdRng::seed_from_u64(cfg.seed);
        let faults = FaultModel {
            loss_rate: cfg.loss_rate,
            corrupt_rate: cfg.corrupt_rate,
            reorder_rate: cfg.reorder_rate,
            jitter: cfg.jitter(),
        };
        Ok(Self {
            sender,
            receiver,
            to_receiver: Link::new(
                Side::Receiver,
                cfg.latency(),
                cfg.bandwidth_bps,
                faults,
                StdRng::from_rng(&mut master),
            ),
            to_sender: Link::new(
                Side::Sender,
                cfg.latency(),
                cfg.bandwidth_bps,
                faults,
                StdRng::from_rng(&mut master),
            ),
            timer: TimerSlot::default(),
            source: AppSource::new(
                cfg.mean_msg_size,
                SimTime::from_micros(cfg.mean_msg_interval_us),
                StdRng::from_rng(&mut master),
            ),
            sink: AppSink::default(),
            viz: None,
            stop_at: cfg.sim_time(),
        })
    }

    /// 借出 sender 以及它能访问的那部分世界
    pub fn sender_port<'a>(&'a mut self, sim: &'a mut Simulator) -> (&'a mut RdtSender, SenderPort<'a>) {
        let RdtWorld {
            sender,
            to_receiver,
            timer,
            viz,
            ..
        } = self;
        (
            sender,
            SenderPort {
                sim,
                link: to_receiver,
                timer,
                viz: viz.as_mut(),
            },
        )
    }

    /// 借出 receiver 以及它能访问的那部分世界
    pub fn receiver_port<'a>(
        &'a mut self,
        sim: &'a mut Simulator,
    ) -> (&'a mut RdtReceiver, ReceiverPort<'a>) {
        let RdtWorld {
            receiver,
            to_sender,
            sink,
            viz,
            ..
        } = self;
        (
            receiver,
            ReceiverPort {
                sim,
                link: to_sender,
                sink,
                viz: viz.as_mut(),
            },
        )
    }

    /// 接收汇收到的字节是否是消息源发出字节的前缀
    pub fn stream_is_prefix(&self) -> bool {
        self.source.sent().starts_with(self.sink.received())
    }

    /// 发出的每个字节都已按序交付
    pub fn is_complete(&self) -> bool {
        self.sink.received() == self.source.sent()
    }
}

impl World for RdtWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        debug_assert_eq!(
            self.timer.is_armed(),
            !self.sender.chain().is_empty(),
            "sender timer must be armed iff the timer chain is non-empty"
        );
    }
}
