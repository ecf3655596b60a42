mod capture;

use capture::{CaptureReader, CaptureWriter};

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use qrewrite_datapath::{EgressHook, HookReport, IngressHook, PacketHook};
use qrewrite_domain::ProbeConfig;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Tag queries headed for a resolver
    Ingress,
    /// Restore responses and force don't-fragment
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }

    pub fn hook(&self, probe: ProbeConfig) -> Box<dyn PacketHook> {
        match self {
            Direction::Ingress => Box::new(IngressHook::new(probe)),
            Direction::Egress => Box::new(EgressHook::new(probe)),
        }
    }
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Which hook to run over every frame
    #[arg(short = 'd', long, value_enum)]
    pub direction: Direction,

    /// Legacy pcap capture with Ethernet frames
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the rewritten frames to this pcap file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub modified: u64,
    pub outcomes: BTreeMap<&'static str, u64>,
}

impl ReplaySummary {
    fn record(&mut self, report: &HookReport) {
        self.frames += 1;
        if report.modified() {
            self.modified += 1;
        }
        *self.outcomes.entry(report.outcome.as_str()).or_insert(0) += 1;
    }

    pub fn log(&self, direction: Direction) {
        info!(
            direction = direction.as_str(),
            frames = self.frames,
            modified = self.modified,
            "Replay finished"
        );
        for (outcome, count) in &self.outcomes {
            info!(outcome = *outcome, count = *count, "Outcome");
        }
    }
}

pub fn run(args: &ReplayArgs, probe: ProbeConfig) -> Result<ReplaySummary> {
    let hook = args.direction.hook(probe);
    let mut reader = CaptureReader::open(&args.input)?;
    let mut writer = match &args.output {
        Some(path) => Some(CaptureWriter::create(path, reader.header())?),
        None => None,
    };

    info!(
        input = %args.input.display(),
        direction = args.direction.as_str(),
        ipv4_probe_size = %probe.ipv4_probe_size,
        ipv6_probe_size = %probe.ipv6_probe_size,
        "Replaying capture"
    );

    let mut summary = ReplaySummary::default();
    while let Some(mut frame) = reader.next_frame()? {
        let report = hook.process(&mut frame.data);
        summary.record(&report);

        debug!(
            frame = summary.frames,
            family = report.family.map(|f| f.as_str()).unwrap_or("-"),
            dont_fragment = ?report.dont_fragment,
            outcome = ?report.outcome,
            modified = report.modified(),
            "Processed frame"
        );

        if let Some(writer) = writer.as_mut() {
            writer
                .write_frame(&frame)
                .with_context(|| format!("Failed to write frame {}", summary.frames))?;
        }
    }

    if let Some(writer) = writer {
        writer.finish().context("Failed to flush output capture")?;
    }

    Ok(summary)
}
