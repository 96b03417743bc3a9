//! 端点标识
//!
//! 只有一条逻辑连接：一端发送数据，另一端回 ack。

use serde::{Deserialize, Serialize};

/// 连接的一端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Sender,
    Receiver,
}

impl Side {
    /// 对端
    pub fn peer(self) -> Side {
        match self {
            Side::Sender => Side::Receiver,
            Side::Receiver => Side::Sender,
        }
    }
}
