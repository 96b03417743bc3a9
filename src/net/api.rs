//! Simulator-backed implementations of the RDT harness API.
//!
//! A port borrows exactly the parts of the world one endpoint may touch for the
//! duration of a single event, so sender and receiver never alias.

use tracing::trace;

use super::app::AppSink;
use super::deliver_packet::{DeliverPacket, SenderTimeout};
use super::id::Side;
use super::link::{Link, Transit};
use crate::rdt::{HarnessApi, Message, Packet, RdtEvent, ReceiverApi, SenderApi};
use crate::sim::{EventId, SimTime, Simulator};
use crate::viz::{VizEventKind, VizLogger};

/// The sender's single-shot retransmission timer.
#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<EventId>,
    /// Bumped on every arm; a firing event whose generation does not match is stale.
    generation: u64,
    fired: u64,
}

impl TimerSlot {
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 实际触发（未被取消、未过期）的次数
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Called by the timeout event; returns false for a stale firing.
    pub(crate) fn take_fired(&mut self, generation: u64) -> bool {
        if self.armed.is_none() || generation != self.generation {
            return false;
        }
        self.armed = None;
        self.fired += 1;
        true
    }
}

/// Puts a packet onto `link` and schedules its arrival.
fn send_over(sim: &mut Simulator, link: &mut Link, viz: &mut Option<&mut VizLogger>, pkt: Packet) {
    let now = sim.now();
    let from = link.to.peer();
    let bytes = pkt.capacity();
    match link.transmit(now, pkt) {
        Transit::Lost => {
            trace!(?from, "链路丢包");
            if let Some(v) = viz.as_deref_mut() {
                v.push(now.0, from, VizEventKind::LinkLoss { bytes });
            }
        }
        Transit::Arrive {
            at,
            pkt,
            corrupted_bit,
            extra_delay,
        } => {
            if let Some(v) = viz.as_deref_mut() {
                if let Some(bit) = corrupted_bit {
                    v.push(now.0, from, VizEventKind::LinkCorrupt { bit });
                }
                if let Some(extra) = extra_delay {
                    v.push(now.0, from, VizEventKind::LinkDelay { extra_ns: extra.0 });
                }
            }
            sim.schedule(at, DeliverPacket { to: link.to, pkt });
        }
    }
}

pub struct SenderPort<'a> {
    pub sim: &'a mut Simulator,
    pub link: &'a mut Link,
    pub timer: &'a mut TimerSlot,
    pub viz: Option<&'a mut VizLogger>,
}

impl HarnessApi for SenderPort<'_> {
    fn now(&self) -> SimTime {
        self.sim.now()
    }

    fn to_lower(&mut self, pkt: Packet) {
        send_over(self.sim, self.link, &mut self.viz, pkt);
    }

    fn record(&mut self, ev: RdtEvent) {
        if let Some(v) = self.viz.as_deref_mut() {
            v.push(self.sim.now().0, Side::Sender, ev.into());
        }
    }
}

impl SenderApi for SenderPort<'_> {
    fn start_timer(&mut self, after: SimTime) {
        if let Some(old) = self.timer.armed.take() {
            self.sim.cancel(old);
        }
        self.timer.generation += 1;
        let id = self.sim.schedule_in(
            after,
            SenderTimeout {
                generation: self.timer.generation,
            },
        );
        self.timer.armed = Some(id);
    }

    fn stop_timer(&mut self) {
        if let Some(id) = self.timer.armed.take() {
            self.sim.cancel(id);
        }
    }

    fn is_timer_set(&self) -> bool {
        self.timer.is_armed()
    }
}

pub struct ReceiverPort<'a> {
    pub sim: &'a mut Simulator,
    pub link: &'a mut Link,
    pub sink: &'a mut AppSink,
    pub viz: Option<&'a mut VizLogger>,
}

impl HarnessApi for ReceiverPort<'_> {
    fn now(&self) -> SimTime {
        self.sim.now()
    }

    fn to_lower(&mut self, pkt: Packet) {
        send_over(self.sim, self.link, &mut self.viz, pkt);
    }

    fn record(&mut self, ev: RdtEvent) {
        if let Some(v) = self.viz.as_deref_mut() {
            v.push(self.sim.now().0, Side::Receiver, ev.into());
        }
    }
}

impl ReceiverApi for ReceiverPort<'_> {
    fn to_upper(&mut self, msg: Message) {
        self.sink.push(msg);
    }
}
