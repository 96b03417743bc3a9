//! 单消息追踪模式
//!
//! 只让上层交付一条消息，打印 sender / receiver 的详细执行流程

use clap::Parser;
use rdt_rs::config::SimConfig;
use rdt_rs::net::{InitEndpoints, RdtWorld};
use rdt_rs::rdt::Message;
use rdt_rs::sim::{Event, SimTime, Simulator, World};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "trace-single-message", about = "单消息追踪模式：只发送一条消息，打印详细的执行流程")]
struct Args {
    /// 消息长度（字节）
    #[arg(long, default_value_t = 300)]
    msg_bytes: usize,
    /// 报文长度（含头部）
    #[arg(long, default_value_t = 100)]
    packet_size: usize,
    #[arg(long, default_value_t = 0.0)]
    loss: f64,
    #[arg(long, default_value_t = 0.0)]
    corrupt: f64,
    #[arg(long, default_value_t = 0.0)]
    reorder: f64,
    /// 单向链路传播时延（微秒）
    #[arg(long, default_value_t = 10_000)]
    latency_us: u64,
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

/// 单消息事件：把一条固定内容的消息交给 sender
#[derive(Debug)]
struct TraceSingleMessage {
    msg: Message,
}

impl Event for TraceSingleMessage {
    #[tracing::instrument(skip(self, sim, world), fields(len = self.msg.len()))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        info!("📦 上层交付单条消息");
        let w = world
            .as_any_mut()
            .downcast_mut::<RdtWorld>()
            .expect("world must be RdtWorld");
        let (sender, mut port) = w.sender_port(sim);
        sender.on_message(self.msg, &mut port);
        debug!(
            last_seq = sender.last_seq(),
            in_flight = sender.window().in_flight(),
            backlog = sender.window().backlog_len(),
            "消息已切分"
        );
    }
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut cfg = SimConfig {
        loss_rate: args.loss,
        corrupt_rate: args.corrupt,
        reorder_rate: args.reorder,
        latency_us: args.latency_us,
        seed: args.seed,
        ..SimConfig::default()
    };
    cfg.rdt.packet_size = args.packet_size;

    let mut world = match RdtWorld::new(&cfg) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    let mut sim = Simulator::default();

    let msg: Vec<u8> = (0..args.msg_bytes).map(|i| (i % 251) as u8).collect();
    world.source.record_external(&msg);

    info!("在 t=0 调度 InitEndpoints / TraceSingleMessage 事件");
    sim.schedule(SimTime::ZERO, InitEndpoints);
    sim.schedule(SimTime::ZERO, TraceSingleMessage { msg: Message::new(msg) });

    info!("开始运行仿真直到所有事件完成");
    sim.run(&mut world);

    println!(
        "done @ {}, delivered_bytes={}, complete={}, timeouts={}, fast_retransmits={}",
        sim.now(),
        world.sink.received().len(),
        world.is_complete(),
        world.sender.stats().timeout_retransmits,
        world.sender.stats().fast_retransmits,
    );
}
