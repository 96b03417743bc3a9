//! Harness-facing API used by the RDT engines.
//!
//! The engines never touch a clock, a timer or a channel directly; everything
//! goes through these traits so that the simulator and the unit tests can
//! drive the same code.

use serde::{Deserialize, Serialize};

use super::packet::Packet;
use crate::sim::SimTime;

/// A message exchanged with the application layer. Owned and moved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Message {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// Services shared by both endpoints.
pub trait HarnessApi {
    /// Current (monotonic) simulated time.
    fn now(&self) -> SimTime;
    /// Hand a packet to the unreliable channel.
    fn to_lower(&mut self, pkt: Packet);
    /// Structured protocol event sink. Default: discard.
    fn record(&mut self, _ev: RdtEvent) {}
}

/// Sender side: adds the single-shot retransmission timer.
pub trait SenderApi: HarnessApi {
    /// Arm (or re-arm) the timer to fire `after` from now.
    fn start_timer(&mut self, after: SimTime);
    fn stop_timer(&mut self);
    fn is_timer_set(&self) -> bool;
}

/// Receiver side: adds delivery to the application.
pub trait ReceiverApi: HarnessApi {
    fn to_upper(&mut self, msg: Message);
}

/// Why a data packet went onto the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendCause {
    /// Admitted straight into the window.
    New,
    /// Released from the backlog after the window advanced.
    Backlog,
    Timeout,
    FastRetransmit,
}

/// Why an inbound packet was discarded without state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    Corrupt,
    /// Ack number beyond anything ever sent.
    AckBeyondSent,
    /// Data sequence below the receiver's cursor.
    Stale,
    /// Data sequence already held in the reorder buffer.
    Duplicate,
}

/// What moved the congestion window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowReason {
    SlowStart,
    CongestionAvoidance,
    FastRetransmit,
    Timeout,
}

/// Protocol events reported through [`HarnessApi::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdtEvent {
    DataSent { seq: u32, len: usize, cause: SendCause },
    Backlogged { seq: u32 },
    AckReceived { ack: u32, dup_count: u32 },
    AckSent { ack: u32 },
    Dropped { seq: u32, reason: DropReason },
    Window { capacity: usize, reason: WindowReason },
    Timeout { seq: u32 },
    /// Packet held in the reorder buffer.
    Reordered { seq: u32 },
    Delivered { seq: u32, len: usize },
}
