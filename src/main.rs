use clap::Parser;

use waveform_insight::waveform_insight::print::print_all;
use waveform_insight::{generate_batch, AnalyzerConfig, SignalParams, WaveformAnalyzer};

/// Generate a synthetic three-phase capture, analyze it and print the report.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Fundamental frequency of the generated signals in Hz
    #[arg(long, default_value_t = 50.0)]
    frequency: f64,

    /// Voltage RMS per phase in volts
    #[arg(long, default_value_t = 230.0)]
    voltage_rms: f64,

    /// Current RMS per phase in amperes
    #[arg(long, default_value_t = 10.0)]
    current_rms: f64,

    /// Degrees the current lags the voltage (inductive load)
    #[arg(long, default_value_t = 30.0)]
    current_lag: f64,

    /// Sampling rate in Hz
    #[arg(long, default_value_t = 7812.5)]
    sampling_rate: f64,

    /// Samples per channel
    #[arg(long, default_value_t = 1024)]
    samples: usize,

    /// Harmonic order to inject (0 disables injection)
    #[arg(long, default_value_t = 0)]
    harmonic_order: usize,

    /// Injected harmonic amplitude as percent of the fundamental
    #[arg(long, default_value_t = 0.0)]
    harmonic_percent: f64,

    /// Uniform noise amplitude as percent of the peak
    #[arg(long, default_value_t = 0.0)]
    noise_percent: f64,

    /// JSON file standing in for an external analysis payload
    #[arg(long)]
    external_json: Option<std::path::PathBuf>,

    /// Dump the merged result as pretty JSON instead of the log report
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let params = SignalParams {
        frequency_hz: args.frequency,
        voltage_rms: args.voltage_rms,
        current_rms: args.current_rms,
        current_lag_degrees: args.current_lag,
        sampling_rate_hz: args.sampling_rate,
        samples: args.samples,
        harmonic_order: args.harmonic_order,
        harmonic_percent: args.harmonic_percent,
        noise_percent: args.noise_percent,
    };

    let batch = match generate_batch(&params) {
        Ok(batch) => batch,
        Err(err) => {
            log::error!("failed to generate batch: {err}");
            std::process::exit(1);
        }
    };

    let external = args.external_json.as_ref().and_then(|path| {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("ignoring unreadable external analysis {path:?}: {err}");
                None
            }
        }
    });

    let analyzer = WaveformAnalyzer::new(AnalyzerConfig::for_grid_frequency(args.frequency));
    let result = analyzer.analyze_with_external(&batch, external.as_ref());

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                log::error!("failed to serialize result: {err}");
                std::process::exit(1);
            }
        }
    } else {
        print_all(&result);
    }
}
