//! intersection: one RSU monitoring a four-way junction.
//!
//! Four approaches are monitored from the RSU at the origin.  Two vehicles
//! run the sink variant and drive straight through; two run the no-sink
//! variant, one of them turning right just before the junction.  A parked
//! car sits inside radio range but never matches a direction.
//!
//! Writes `telemetry_events.csv`, `transits.csv` and `summary.json` into the
//! directory given as the first argument (default `output/intersection`).
//! Set `RUST_LOG=debug` to follow the protocol.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use serde_json::json;

use vb_behavior::{EventLog, RsuConfig, TelemetryKind, TransitCollector, VehicleConfig, load_directions_reader};
use vb_core::{SimTime, Vector2D};
use vb_message::Message;
use vb_output::{CsvWriter, TelemetryOutput};
use vb_sim::{DropReason, Motion, SimBuilder, SimConfig, SimObserver, SimStats};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:     u64 = 7;
const SIM_SECS: u64 = 60;

// A zero budget falls back to the RSU minimum.
const DIRECTIONS_CSV: &str = "\
angle,approaching,leaving,approaching_time_ms,leaving_time_ms\n\
0,true,true,400,400\n\
90,true,true,400,0\n\
180,true,false,600,0\n\
-90,true,true,400,400\n\
";

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct DropCounter {
    out_of_range: u64,
    unknown:      u64,
}

impl SimObserver for DropCounter {
    fn on_drop(&mut self, _now: SimTime, _to: vb_core::NodeId, _message: &Message, reason: DropReason) {
        match reason {
            DropReason::OutOfRange         => self.out_of_range += 1,
            DropReason::UnknownDestination => self.unknown += 1,
        }
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

fn vehicles() -> Vec<(&'static str, bool, Motion)> {
    vec![
        (
            "eastbound",
            true,
            Motion::Linear {
                origin:   Vector2D::new(-300.0, 0.0),
                velocity: Vector2D::new(12.0, 0.0),
                depart:   SimTime::ZERO,
            },
        ),
        (
            "westbound",
            true,
            Motion::Linear {
                origin:   Vector2D::new(250.0, 2.0),
                velocity: Vector2D::new(-10.0, 0.0),
                depart:   SimTime::from_secs(3),
            },
        ),
        (
            "northbound, turns right",
            false,
            Motion::Route {
                waypoints: vec![Vector2D::new(0.0, -300.0), Vector2D::new(0.0, -10.0), Vector2D::new(300.0, -10.0)],
                speed:     11.0,
                depart:    SimTime::ZERO,
            },
        ),
        (
            "southbound",
            false,
            Motion::Route {
                waypoints: vec![Vector2D::new(-2.0, 300.0), Vector2D::new(-2.0, -300.0)],
                speed:     9.0,
                depart:    SimTime::from_secs(5),
            },
        ),
        ("parked", true, Motion::Fixed(Vector2D::new(40.0, 40.0))),
    ]
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out_dir = std::env::args().nth(1).map_or_else(|| PathBuf::from("output/intersection"), PathBuf::from);

    println!("=== intersection | rsu_beacon ===");
    println!("Seed: {SEED}  |  Duration: {SIM_SECS} s");
    println!();

    // 1. Monitored directions.
    let directions = load_directions_reader(Cursor::new(DIRECTIONS_CSV)).context("parsing direction table")?;
    println!("Monitoring {} directions", directions.len());

    // 2. Nodes.
    let config = SimConfig { seed: SEED, end_time: SimTime::from_secs(SIM_SECS), ..SimConfig::default() };
    let mut builder = SimBuilder::new(config).rsu(Vector2D::ZERO, RsuConfig::with_directions(directions))?;
    let mut names = vec![(builder.next_id(), "rsu")];
    for (name, sink, motion) in vehicles() {
        names.push((builder.next_id(), name));
        builder = if sink {
            builder.sink_vehicle(motion, VehicleConfig::default())?
        } else {
            builder.no_sink_vehicle(motion, VehicleConfig::default())?
        };
    }
    let mut sim = builder.build()?;
    for (id, name) in &names {
        info!("node {id}: {name}");
    }

    // 3. Output.
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let writer = CsvWriter::new(&out_dir)?;
    let mut telemetry = ((TelemetryOutput::new(writer), TransitCollector::new()), EventLog::new());
    let mut drops = DropCounter::default();

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut telemetry, &mut drops)?;
    let elapsed = t0.elapsed();
    let ((mut output, collector), log) = telemetry;
    output.finish().context("writing telemetry output")?;

    // 5. Summary.
    let SimStats { sent, delivered, dropped, bytes_sent, bytes_delivered } = sim.stats;
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  messages : {sent} sent, {delivered} delivered, {dropped} dropped");
    println!("  bytes    : {bytes_sent} sent, {bytes_delivered} delivered");
    println!("  transits : {} written", output.transits_written());
    println!();

    println!("{:<12} {:<12} {:<10} {:<10}", "Direction", "Movement", "Transits", "Speed");
    println!("{}", "-".repeat(46));
    let summary = collector.summary();
    for ((_, dir), s) in &summary {
        let speed = s.mean_speed.map_or_else(|| "-".to_owned(), |v| format!("{v:.1}"));
        println!("{:<12} {:<12} {:<10} {:<10}", dir.angle, dir.movement.as_str(), s.transits, speed);
    }

    let kinds = [
        TelemetryKind::BeaconResponse,
        TelemetryKind::LastMessage,
        TelemetryKind::NoLongerConformant,
        TelemetryKind::Timeout,
        TelemetryKind::ResponseSent,
    ];
    let report = json!({
        "seed": SEED,
        "duration_ms": sim.now().as_millis(),
        "channel": {
            "sent": sent,
            "delivered": delivered,
            "dropped_out_of_range": drops.out_of_range,
            "dropped_unknown_destination": drops.unknown,
            "bytes_sent": bytes_sent,
            "bytes_delivered": bytes_delivered,
        },
        "events": kinds.iter().map(|k| (k.as_str().to_owned(), json!(log.count(*k)))).collect::<serde_json::Map<_, _>>(),
        "directions": summary.iter().map(|((rsu, dir), s)| json!({
            "rsu": rsu.0,
            "angle": dir.angle,
            "movement": dir.movement.as_str(),
            "transits": s.transits,
            "mean_speed": s.mean_speed,
        })).collect::<Vec<_>>(),
        "transits": collector.completed().iter().map(|t| json!({
            "node": t.node.0,
            "direction": t.direction.id(),
            "total_time_ms": t.total_time_ms,
            "samples": t.samples,
            "mean_speed": t.mean_speed,
            "ended_by": t.ended_by.as_str(),
        })).collect::<Vec<_>>(),
    });
    let path = out_dir.join("summary.json");
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!();
    println!("Output written to {}", out_dir.display());

    Ok(())
}
