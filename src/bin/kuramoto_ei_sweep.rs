//! Kuramoto EI Sweep: Early Warning of Synchronization
//!
//! Sweeps the coupling K of noisy phase oscillators through the
//! synchronization threshold and compares triplet-state Effective
//! Information at the oscillator and group level.
//!
//! ## Key Insight
//!
//! For Gaussian natural frequencies of std σ:
//! - K < K_c: Incoherent, r ~ 1/√N
//! - K > K_c: Partial synchronization, r grows continuously
//!
//! K_c = 2 / (π g(0)) = σ·√(8/π)
//!
//! Frequencies and triplets are fixed across the sweep, so only K changes.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use ews_info_dynamics::{
    linspace_inclusive, run_kuramoto_sweep, AnalysisConfig, EarlyWarningReport, KuramotoSweepConfig,
    SweepResults,
};

/// Coupling sweep of the Kuramoto model with an early-warning report.
#[derive(Parser, Debug)]
#[command(name = "kuramoto-ei-sweep", version, about, long_about = None)]
struct Args {
    /// First coupling of the sweep
    #[arg(long, default_value_t = 0.0)]
    k_start: f64,

    /// Last coupling of the sweep (inclusive)
    #[arg(long, default_value_t = 2.0)]
    k_stop: f64,

    /// Coupling step
    #[arg(long, default_value_t = 0.1)]
    k_step: f64,

    /// Number of oscillators N
    #[arg(long, default_value_t = 96)]
    n_oscillators: usize,

    /// Std of the natural frequencies
    #[arg(long, default_value_t = 0.5)]
    freq_spread: f64,

    /// Oscillator triplets per scale
    #[arg(long, default_value_t = 8)]
    n_triplets: usize,

    /// Phase bins k (k³ states)
    #[arg(long, default_value_t = 4)]
    n_bins: usize,

    /// Oscillator group sizes for the macro scales, comma separated
    #[arg(long, value_delimiter = ',', default_value = "2,4")]
    group_sizes: Vec<usize>,

    /// Samples per coupling
    #[arg(long, default_value_t = 500)]
    n_steps: usize,

    /// Equilibration steps per coupling
    #[arg(long, default_value_t = 2000)]
    n_equilib: usize,

    /// Integration timestep
    #[arg(long, default_value_t = 0.05)]
    dt: f64,

    /// Phase-noise amplitude
    #[arg(long, default_value_t = 0.1)]
    noise: f64,

    /// Base seed; point i uses seed + i
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Minimum real transitions for a row to count towards EI
    #[arg(long, default_value_t = 5.0)]
    min_observations: f64,

    /// Compare scales on their raw transition counts
    #[arg(long, default_value_t = false)]
    no_equalize: bool,

    /// Baseline coupling range, lower end
    #[arg(long, default_value_t = 0.0)]
    baseline_low: f64,

    /// Baseline coupling range, upper end
    #[arg(long, default_value_t = 0.3)]
    baseline_high: f64,

    /// Print results and report as JSON instead of tables
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log level: off, trace, debug, info, warn, error.
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

#[derive(Serialize)]
struct Output<'a> {
    results: &'a SweepResults,
    report: &'a EarlyWarningReport,
}

fn print_summary(results: &SweepResults, report: &EarlyWarningReport) {
    print!("{:>6} {:>7} {:>10} {:>7} {:>9}", "K", "r", "var", "AC1", "EI_micro");
    for scale in &results.scales {
        print!(" {:>9}", format!("EI_g{}", scale.block_size));
    }
    println!();

    for i in 0..results.len() {
        print!(
            "{:>6.2} {:>7.4} {:>10.3e} {:>7.4} {:>9.5}",
            results.parameters[i],
            results.mean_order[i],
            results.variance[i],
            results.autocorrelation[i],
            results.ei_micro[i]
        );
        for scale in &results.scales {
            let mark = if scale.ei_macro[i] > scale.ei_micro[i] { "*" } else { " " };
            print!(" {:>8.5}{}", scale.ei_macro[i], mark);
        }
        println!();
    }

    println!("\n═══════════════════════════════════════════════════════════════");
    println!("  EARLY-WARNING REPORT (K_c = {:.4})", report.critical_point);
    println!("═══════════════════════════════════════════════════════════════\n");

    for w in report.warnings() {
        let trigger = match (w.trigger, w.lead_time) {
            (Some(t), Some(lead)) => format!("K = {:.2} (lead {:+.3})", t.parameter, lead),
            _ => "none".to_string(),
        };
        let cusum = match (w.cusum_trigger, w.cusum_lead_time) {
            (Some(t), Some(lead)) => format!("K = {:.2} (lead {:+.3})", t.parameter, lead),
            _ => "none".to_string(),
        };
        println!("  {:<18} threshold: {:<24} CUSUM: {}", w.name, trigger, cusum);
    }

    for scale in &report.scales {
        if let Some(k) = scale.ratio_vs_variance {
            println!(
                "  Kendall τ(ratio_g{}, variance) = {:+.3} (p = {:.2e})",
                scale.block_size, k.tau, k.p_value
            );
        }
    }

    let ce = &report.causal_emergence;
    if ce.detected() {
        println!("\n✓ Causal emergence at {} of {} couplings ({} events)", ce.points().len(), results.len(), ce.count);
    } else {
        println!("\n✗ No causal emergence detected");
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = KuramotoSweepConfig {
        couplings: linspace_inclusive(args.k_start, args.k_stop, args.k_step)?,
        n_oscillators: args.n_oscillators,
        freq_spread: args.freq_spread,
        n_triplets: args.n_triplets,
        n_bins: args.n_bins,
        group_sizes: args.group_sizes,
        n_steps: args.n_steps,
        n_equilib: args.n_equilib,
        dt: args.dt,
        noise: args.noise,
        base_seed: args.seed,
        min_observations: args.min_observations,
        equalize: !args.no_equalize,
    };
    let analysis = AnalysisConfig::with_baseline(args.baseline_low, args.baseline_high)?;

    if !args.json {
        println!("═══════════════════════════════════════════════════════════════");
        println!("  EI Early Warning: Kuramoto Synchronization");
        println!("═══════════════════════════════════════════════════════════════\n");
        println!("System Parameters:");
        println!("  N = {}, σ_ω = {:.2}, D = {:.2}", config.n_oscillators, config.freq_spread, config.noise);
        println!("  K: {:.2} → {:.2} ({} points)", args.k_start, args.k_stop, config.couplings.len());
        println!("  {} triplets × {}³ states, groups: {:?}", config.n_triplets, config.n_bins, config.group_sizes);
        println!("  Theoretical K_c = {:.4}\n", config.critical_point());
    }

    let results = run_kuramoto_sweep(&config)?;
    let report = EarlyWarningReport::analyze(&results, &analysis)?;

    if args.json {
        let output = Output {
            results: &results,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&results, &report);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
