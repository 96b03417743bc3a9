//! 仿真事件
//!
//! 报文到达、sender 定时器触发、上层产生消息、会话初始化。
//! 引擎报告的不变量错误在这里被当作致命错误处理。

use super::id::Side;
use super::rdt_world::RdtWorld;
use crate::rdt::Packet;
use crate::sim::{Event, Simulator, World};
use tracing::{debug, error, trace};

fn rdt_world(world: &mut dyn World) -> &mut RdtWorld {
    world
        .as_any_mut()
        .downcast_mut::<RdtWorld>()
        .expect("world must be RdtWorld")
}

/// 事件：把一个 packet 交给某一端处理。
#[derive(Debug)]
pub struct DeliverPacket {
    pub to: Side,
    pub pkt: Packet,
}

impl Event for DeliverPacket {
    #[tracing::instrument(level = "trace", skip(self, sim, world), fields(to = ?self.to, seq = self.pkt.seq()))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverPacket { to, pkt } = *self;
        trace!(now = %sim.now(), len = pkt.payload_len(), "📨 报文到达");

        let w = rdt_world(world);
        match to {
            Side::Sender => {
                let (sender, mut port) = w.sender_port(sim);
                sender.on_packet(pkt, &mut port);
            }
            Side::Receiver => {
                let (receiver, mut port) = w.receiver_port(sim);
                if let Err(e) = receiver.on_packet(pkt, &mut port) {
                    error!(error = %e, "receiver failed to build ack");
                    panic!("fatal: {e}");
                }
            }
        }
    }
}

/// 事件：sender 的单次定时器到期。
#[derive(Debug)]
pub struct SenderTimeout {
    pub generation: u64,
}

impl Event for SenderTimeout {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = rdt_world(world);
        if !w.timer.take_fired(self.generation) {
            trace!(generation = self.generation, "过期的定时器事件，忽略");
            return;
        }
        let (sender, mut port) = w.sender_port(sim);
        if let Err(e) = sender.on_timeout(&mut port) {
            error!(error = %e, "sender invariant violated");
            panic!("fatal: {e}");
        }
    }
}

/// 事件：上层产生一条消息交给 sender，并安排下一条。
#[derive(Debug)]
pub struct AppSend;

impl Event for AppSend {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = rdt_world(world);
        let msg = w.source.next_message();
        debug!(now = %sim.now(), len = msg.len(), "上层消息");
        if let Some(v) = w.viz.as_mut() {
            v.push(
                sim.now().0,
                Side::Sender,
                crate::viz::VizEventKind::AppMessage { len: msg.len() },
            );
        }
        let (sender, mut port) = w.sender_port(sim);
        sender.on_message(msg, &mut port);

        let next = sim.now().saturating_add(w.source.next_gap());
        if next < w.stop_at {
            sim.schedule(next, AppSend);
        }
    }
}

/// 事件：两端初始化。
#[derive(Debug)]
pub struct InitEndpoints;

impl Event for InitEndpoints {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = rdt_world(world);
        {
            let (sender, mut port) = w.sender_port(sim);
            sender.init(&mut port);
        }
        let (receiver, mut port) = w.receiver_port(sim);
        receiver.init(&mut port);
    }
}
