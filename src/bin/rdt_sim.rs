//! 单连接 RDT 仿真
//!
//! sender 经过一条会丢包、损坏、乱序的信道向 receiver 发送随机字节流，
//! 结束后校验交付的字节流。

use clap::Parser;
use rdt_rs::config::SimConfig;
use rdt_rs::net::Session;
use rdt_rs::rdt::CongestionMode;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "rdt-sim",
    about = "Run one sender -> receiver RDT session over a faulty channel"
)]
struct Args {
    /// Path to a JSON config (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generate messages for this long (ms)
    #[arg(long)]
    sim_time_ms: Option<u64>,

    /// Extra time after the last message for retransmissions to finish (ms)
    #[arg(long)]
    drain_ms: Option<u64>,

    /// Mean message size in bytes
    #[arg(long)]
    msg_size: Option<usize>,

    /// Mean gap between messages (us)
    #[arg(long)]
    msg_interval_us: Option<u64>,

    /// Packet loss probability
    #[arg(long)]
    loss: Option<f64>,

    /// Packet corruption probability
    #[arg(long)]
    corrupt: Option<f64>,

    /// Packet reorder probability
    #[arg(long)]
    reorder: Option<f64>,

    /// One-way propagation latency (us)
    #[arg(long)]
    latency_us: Option<u64>,

    /// Upper bound of the extra delay given to reordered packets (us)
    #[arg(long)]
    jitter_us: Option<u64>,

    /// Packet size in bytes, header included
    #[arg(long)]
    packet_size: Option<usize>,

    /// Retransmission timeout (us)
    #[arg(long)]
    timeout_us: Option<u64>,

    /// Use a fixed window of this many packets instead of AIMD
    #[arg(long, conflicts_with_all = ["aimd_base", "aimd_upper"])]
    fixed_window: Option<usize>,

    /// AIMD base window
    #[arg(long)]
    aimd_base: Option<usize>,

    /// AIMD upper bound
    #[arg(long)]
    aimd_upper: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output viz JSON file
    #[arg(long)]
    viz_json: Option<PathBuf>,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(SimConfig, Option<PathBuf>, bool), String> {
        let mut cfg = match &self.config {
            Some(path) => SimConfig::from_json_file(path).map_err(|e| e.to_string())?,
            None => SimConfig::default(),
        };
        if let Some(v) = self.sim_time_ms {
            cfg.sim_time_ms = v;
        }
        if let Some(v) = self.drain_ms {
            cfg.drain_ms = v;
        }
        if let Some(v) = self.msg_size {
            cfg.mean_msg_size = v;
        }
        if let Some(v) = self.msg_interval_us {
            cfg.mean_msg_interval_us = v;
        }
        if let Some(v) = self.loss {
            cfg.loss_rate = v;
        }
        if let Some(v) = self.corrupt {
            cfg.corrupt_rate = v;
        }
        if let Some(v) = self.reorder {
            cfg.reorder_rate = v;
        }
        if let Some(v) = self.latency_us {
            cfg.latency_us = v;
        }
        if let Some(v) = self.jitter_us {
            cfg.jitter_us = v;
        }
        if let Some(v) = self.packet_size {
            cfg.rdt.packet_size = v;
        }
        if let Some(v) = self.timeout_us {
            cfg.rdt.timeout_us = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(window) = self.fixed_window {
            cfg.rdt.congestion = CongestionMode::Fixed { window };
        } else if self.aimd_base.is_some() || self.aimd_upper.is_some() {
            let (base, upper_bound) = match cfg.rdt.congestion {
                CongestionMode::Aimd { base, upper_bound } => (base, upper_bound),
                CongestionMode::Fixed { window } => (window, window),
            };
            cfg.rdt.congestion = CongestionMode::Aimd {
                base: self.aimd_base.unwrap_or(base),
                upper_bound: self.aimd_upper.unwrap_or(upper_bound),
            };
        }
        cfg.validate().map_err(|e| e.to_string())?;
        Ok((cfg, self.viz_json, self.json))
    }
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let (cfg, viz_json, json) = match Args::parse().into_config() {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "bad configuration");
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    info!(?cfg, "配置");

    let mut session = match Session::new(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    if viz_json.is_some() {
        session.enable_viz(&cfg);
    }

    session.run();
    let report = session.finish();

    if let Some(path) = viz_json {
        if let Some(v) = session.take_viz() {
            let written = serde_json::to_string_pretty(&v.events)
                .map_err(|e| e.to_string())
                .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
            match written {
                Ok(()) => eprintln!("wrote viz events to {}", path.display()),
                Err(e) => {
                    eprintln!("error: failed to write {}: {e}", path.display());
                    return ExitCode::from(2);
                }
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        println!(
            "done @ {}, msgs={}/{}, bytes={}/{}, retransmits={} (timeout) + {} (fast), window={}, stream_ok={}, complete={}",
            rdt_rs::sim::SimTime(report.sim_time_ns),
            report.app_messages_delivered,
            report.app_messages_sent,
            report.app_bytes_delivered,
            report.app_bytes_sent,
            report.sender.timeout_retransmits,
            report.sender.fast_retransmits,
            report.final_window,
            report.stream_ok,
            report.complete,
        );
    }

    if report.stream_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
