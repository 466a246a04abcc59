// Capture and export example
//
// Configures the sample interval and trigger edge, runs one capture, stores the
// raw payload and exports a time/value CSV that any plotting tool can draw.

use clap::{Parser, ValueEnum};
use pico_la_rs::capture::{TIME_AXIS_LABEL, VALUE_AXIS_LABEL};
use pico_la_rs::{
    CapturePlan, CaptureResult, PicoConnector, SampleInterval, SessionConfig, TimeSeries,
    TriggerEdge,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, ValueEnum)]
enum Edge {
    Rising,
    Falling,
}

impl From<Edge> for TriggerEdge {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Rising => TriggerEdge::RisingFromLow,
            Edge::Falling => TriggerEdge::FallingFromHigh,
        }
    }
}

#[derive(Parser)]
#[command(name = "capture_and_plot")]
#[command(about = "Capture from a Pico logic analyzer and export the samples")]
struct Args {
    /// Serial port of the analyzer, discovered automatically when omitted
    #[arg(short, long)]
    port: Option<String>,

    #[arg(short = 'u', long, default_value_t = 56, help = "Microseconds between samples (0-999999)")]
    interval_us: u64,

    #[arg(short, long, value_enum, default_value_t = Edge::Rising, help = "Input transition that arms the capture")]
    edge: Edge,

    #[arg(short, long, default_value_t = 10_000, help = "Give up after this many milliseconds of silence")]
    timeout_ms: u64,

    #[arg(short, long, default_value = "data1.txt", help = "Where the raw capture is stored")]
    output: PathBuf,

    #[arg(long, help = "Also write time/value rows to this CSV file")]
    csv: Option<PathBuf>,

    #[arg(long, help = "Skip the device and plot a previously stored capture")]
    replay: bool,

    #[arg(short, long, help = "Show debug information and detailed logs")]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    #[cfg(feature = "cpu-profiling")]
    let _client = tracy_client::Client::start();

    let interval = SampleInterval::from_micros(args.interval_us)?;
    let mut config = SessionConfig::new()
        .with_read_timeout(Duration::from_millis(args.timeout_ms))
        .with_capture_file(&args.output);
    if let Some(port) = &args.port {
        config = config.with_port(port.clone());
    }

    let capture = if args.replay {
        CaptureResult::load(&config.capture_file)?
    } else {
        let plan = CapturePlan::new(interval, args.edge.into());
        println!("Sample interval: {} (sent as {})", interval, interval.encode());
        println!("Trigger: {} edge", plan.edge);

        let mut analyzer = PicoConnector::connect(&config)?;
        let capture = analyzer.run_capture(plan)?;
        capture.save(&config.capture_file)?;
        println!(
            "Wrote {} samples to {}",
            capture.sample_count(),
            config.capture_file.display()
        );
        capture
    };

    let series = TimeSeries::from_capture(&capture, interval)?;
    print_summary(&series);

    if let Some(csv) = &args.csv {
        series.write_csv(csv)?;
        println!(
            "Exported '{}' vs '{}' to {}",
            TIME_AXIS_LABEL,
            VALUE_AXIS_LABEL,
            csv.display()
        );
    }

    Ok(())
}

fn print_summary(series: &TimeSeries) {
    if series.is_empty() {
        println!("Capture is empty");
        return;
    }

    let duration = series.seconds_per_sample() * series.len() as f64;
    let min = series.samples().iter().min().copied().unwrap_or_default();
    let max = series.samples().iter().max().copied().unwrap_or_default();
    let transitions = series
        .samples()
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .count();

    println!("{} samples over {:.6}s", series.len(), duration);
    println!("Value range: {} to {}, {} transitions", min, max, transitions);
}
