//! 一次完整的 sender -> receiver 会话
//!
//! 把仿真器和 [`RdtWorld`] 绑在一起：调度初始事件、运行到截止时间、收尾并生成报告。

use tracing::{info, warn};

use super::deliver_packet::{AppSend, InitEndpoints};
use super::id::Side;
use super::rdt_world::RdtWorld;
use super::stats::SimReport;
use crate::config::{ConfigError, SimConfig};
use crate::sim::{SimTime, Simulator};
use crate::viz::{VizEventKind, VizLogger};

pub struct Session {
    pub sim: Simulator,
    pub world: RdtWorld,
    end: SimTime,
}

impl Session {
    pub fn new(cfg: &SimConfig) -> Result<Self, ConfigError> {
        let world = RdtWorld::new(cfg)?;
        let mut sim = Simulator::default();
        sim.schedule(SimTime::ZERO, InitEndpoints);
        if cfg.sim_time() > SimTime::ZERO {
            sim.schedule(SimTime::ZERO, AppSend);
        }
        Ok(Self {
            sim,
            world,
            end: cfg.end_time(),
        })
    }

    /// 打开可视化记录，并写入 t=0 的元信息
    pub fn enable_viz(&mut self, cfg: &SimConfig) {
        let mut viz = VizLogger::default();
        viz.push(
            0,
            Side::Sender,
            VizEventKind::Meta {
                packet_size: cfg.rdt.packet_size,
                timeout_ns: cfg.rdt.timeout().0,
                loss_rate: cfg.loss_rate,
                corrupt_rate: cfg.corrupt_rate,
                reorder_rate: cfg.reorder_rate,
            },
        );
        self.world.viz = Some(viz);
    }

    pub fn end_time(&self) -> SimTime {
        self.end
    }

    /// 运行到截止时间
    pub fn run(&mut self) {
        self.sim.run_until(self.end, &mut self.world);
    }

    /// 调用两端的 finalize 并生成报告
    pub fn finish(&mut self) -> SimReport {
        {
            let (sender, mut port) = self.world.sender_port(&mut self.sim);
            sender.finalize(&mut port);
        }
        {
            let (receiver, mut port) = self.world.receiver_port(&mut self.sim);
            receiver.finalize(&mut port);
        }

        let w = &self.world;
        let report = SimReport {
            sim_time_ns: self.sim.now().0,
            events: self.sim.executed(),
            app_messages_sent: w.source.messages(),
            app_bytes_sent: w.source.sent().len() as u64,
            app_messages_delivered: w.sink.messages(),
            app_bytes_delivered: w.sink.received().len() as u64,
            stream_ok: w.stream_is_prefix(),
            complete: w.is_complete(),
            final_window: w.sender.window_capacity(),
            sender: w.sender.stats(),
            receiver: w.receiver.stats(),
            data_link: w.to_receiver.stats,
            ack_link: w.to_sender.stats,
        };
        if report.stream_ok {
            info!(
                bytes = report.app_bytes_delivered,
                complete = report.complete,
                "✅ 交付字节流校验通过"
            );
        } else {
            warn!("❌ 交付字节流与发送字节流不一致");
        }
        report
    }

    /// 取出可视化事件
    pub fn take_viz(&mut self) -> Option<VizLogger> {
        self.world.viz.take()
    }
}
