//! 世界 trait
//!
//! 定义仿真世界接口。

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由业务层实现（这里是 sender/receiver + 信道）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每执行完一个事件后回调，可用于不变量检查
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
