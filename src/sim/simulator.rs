//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。
//! 支持取消已调度的事件：sender 的单次定时器 stop 时需要撤销尚未触发的超时事件。

use super::event::{Event, EventId};
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::{BinaryHeap, HashSet};
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_id: u64,
    q: BinaryHeap<ScheduledEvent>,
    cancelled: HashSet<EventId>,
    executed: u64,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已执行的事件数（不含被取消的）
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 队列中尚未执行、也未被取消的事件数
    pub fn pending(&self) -> usize {
        self.q.len().saturating_sub(self.cancelled.len())
    }

    /// 调度事件在指定时间执行；`at` 早于当前时间时按当前时间处理。
    #[tracing::instrument(level = "trace", skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) -> EventId {
        let id = EventId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let at = at.max(self.now);
        self.q.push(ScheduledEvent {
            at,
            id,
            ev: Box::new(ev),
        });
        trace!(now = ?self.now, id = id.0, queue_size = self.q.len(), "调度事件");
        id
    }

    /// 相对当前时间调度
    pub fn schedule_in<E: Event>(&mut self, after: SimTime, ev: E) -> EventId {
        let at = self.now.saturating_add(after);
        self.schedule(at, ev)
    }

    /// 取消一个尚未执行的事件；对已执行/未知的 id 无副作用。
    pub fn cancel(&mut self, id: EventId) {
        if self.q.iter().any(|item| item.id == id) {
            self.cancelled.insert(id);
            trace!(id = id.0, "取消事件");
        }
    }

    /// 取出下一个未被取消的事件
    fn pop_live(&mut self) -> Option<ScheduledEvent> {
        while let Some(item) = self.q.pop() {
            if self.cancelled.remove(&item.id) {
                continue;
            }
            return Some(item);
        }
        None
    }

    fn next_live_at(&mut self) -> Option<SimTime> {
        while let Some(top) = self.q.peek() {
            if self.cancelled.contains(&top.id) {
                let id = top.id;
                self.q.pop();
                self.cancelled.remove(&id);
                continue;
            }
            return Some(top.at);
        }
        None
    }

    /// 运行直到事件队列为空或到达 `until`。
    #[tracing::instrument(skip(self, world), fields(until = ?until))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        while let Some(at) = self.next_live_at() {
            if at > until {
                break;
            }
            let Some(item) = self.pop_live() else {
                break;
            };
            self.dispatch(item, world);
        }
        self.now = self.now.max(until);
        debug!(now = ?self.now, pending = self.pending(), "run_until 结束");
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!(queue_size = self.q.len(), "▶️  开始运行仿真");

        while let Some(item) = self.pop_live() {
            self.dispatch(item, world);
        }

        info!(
            total_events = self.executed,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
    }

    fn dispatch(&mut self, item: ScheduledEvent, world: &mut dyn World) {
        self.now = item.at;
        self.executed += 1;
        trace!(
            event_num = self.executed,
            now = ?self.now,
            id = item.id.0,
            remaining_queue = self.q.len(),
            "执行事件"
        );
        item.ev.execute(self, world);
        world.on_tick(self);
    }
}
