//! 网络模拟模块
//!
//! 两条单向不可靠链路、应用层消息源/接收汇，以及把 RDT 引擎接到仿真器上的事件和端口。

// 子模块声明
mod id;
mod api;
mod app;
mod link;
mod stats;
mod deliver_packet;
mod rdt_world;
mod session;

// 重新导出公共接口
pub use id::Side;
pub use api::{ReceiverPort, SenderPort, TimerSlot};
pub use app::{AppSink, AppSource};
pub use link::{FaultModel, Link, LinkStats, Transit};
pub use stats::SimReport;
pub use deliver_packet::{AppSend, DeliverPacket, InitEndpoints, SenderTimeout};
pub use rdt_world::RdtWorld;
pub use session::Session;
