//! 可视化事件记录（用于离线回放 / 分析）
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **轻量**：只在内存里攒事件，仿真结束一次性写出

mod types;

pub use types::{VizEvent, VizEventKind, VizLogger};
