//! RDT 协议引擎
//!
//! 在不可靠信道（丢包 / 损坏 / 乱序）上提供可靠、按序的字节流传输：
//! 报文编解码与校验、切分、滑动窗口 + 积压队列、复用单一定时器的重传链、
//! 重复 ack 快速重传、AIMD 拥塞窗口，以及接收端的乱序重组。
//!
//! 引擎只通过 [`api`] 中的 trait 与外部交互，状态按连接实例持有。

pub mod api;
pub mod config;
pub mod congestion;
pub mod error;
pub mod packet;
pub mod receiver;
pub mod reorder;
pub mod segmenter;
pub mod sender;
pub mod timer_chain;
pub mod window;

pub use api::{HarnessApi, Message, RdtEvent, ReceiverApi, SenderApi};
pub use config::RdtConfig;
pub use congestion::{Congestion, CongestionMode};
pub use error::{CodecError, RdtConfigError, RdtError};
pub use packet::{HEADER_SIZE, Packet, internet_checksum};
pub use receiver::{RdtReceiver, ReceiverStats};
pub use sender::{RdtSender, SenderStats};
