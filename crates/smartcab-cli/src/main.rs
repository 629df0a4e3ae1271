//! CLI for smartcab.
//!
//! Trains the Q-learning cab in the headless grid world and reports how it did,
//! and exposes the state encoder for inspecting individual situations.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use smartcab_core::event::{AgentEvent, NullObserver, Observer};
use smartcab_core::{parse_traffic, Heading, Light, SensorReading, TrialOutcome};
use smartcab_feedback::{TrainingReport, TrialAnalyzer, DEFAULT_WINDOW};
use smartcab_learning::{encode, AgentConfig, AgentSnapshot, LearningAgent};
use smartcab_world::{GridPlanner, Simulator, World, WorldConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent in the grid world
    Run(RunArgs),
    /// Print the state index of a sensor reading and navigation hint
    Encode {
        /// Light at the intersection (green, red)
        #[arg(long)]
        light: Light,

        /// Intent of the oncoming car (none, left, right, forward)
        #[arg(long, default_value = "none")]
        oncoming: String,

        /// Intent of the car coming from the left
        #[arg(long, default_value = "none")]
        left: String,

        /// Intent of the car coming from the right
        #[arg(long, default_value = "none")]
        right: String,

        /// Next waypoint from the route planner (left, right, forward)
        #[arg(long)]
        hint: Heading,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// JSON run configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials to train for
    #[arg(long)]
    trials: Option<u32>,

    /// Discount factor for the future-value term
    #[arg(long)]
    discount: Option<f64>,

    /// Seed for the agent's action selection
    #[arg(long)]
    seed: Option<u64>,

    /// Seed for the world (lights, traffic, routes)
    #[arg(long)]
    world_seed: Option<u64>,

    /// Number of scripted cars
    #[arg(long)]
    dummies: Option<usize>,

    /// End trials when the deadline runs out
    #[arg(long)]
    enforce_deadline: bool,

    /// Pause after every step, in milliseconds
    #[arg(long)]
    update_delay_ms: Option<u64>,

    /// Trials per learning-curve window
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// Write every agent event as JSON lines to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Write the training report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the learned table as JSON to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

/// Complete configuration of one training run.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
struct RunConfig {
    agent: AgentConfig,
    world: WorldConfig,
    update_delay_ms: u64,
}

impl RunConfig {
    fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    fn resolve(args: &RunArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    fn apply(&mut self, args: &RunArgs) {
        if let Some(trials) = args.trials {
            self.agent.num_trials = trials;
        }
        if let Some(discount) = args.discount {
            self.agent.discount = discount;
        }
        if let Some(seed) = args.seed {
            self.agent.seed = Some(seed);
        }
        if let Some(seed) = args.world_seed {
            self.world.seed = Some(seed);
        }
        if let Some(dummies) = args.dummies {
            self.world.dummy_agents = dummies;
        }
        if args.enforce_deadline {
            self.world.enforce_deadline = true;
        }
        if let Some(delay) = args.update_delay_ms {
            self.update_delay_ms = delay;
        }
    }
}

/// Writes each event as one JSON object per line.
struct JsonlObserver {
    writer: BufWriter<File>,
    path: PathBuf,
    failed: bool,
}

impl JsonlObserver {
    fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create trace file {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            failed: false,
        })
    }

    fn write_event(&mut self, event: &AgentEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        if matches!(event, AgentEvent::TrialFinished(_)) {
            self.writer.flush()?;
        }
        Ok(())
    }
}

impl Observer for JsonlObserver {
    fn observe(&mut self, event: &AgentEvent) {
        if self.failed {
            return;
        }
        if let Err(e) = self.write_event(event) {
            // One warning, then the trace is abandoned; training carries on.
            warn!("trace to {} stopped: {e:#}", self.path.display());
            self.failed = true;
        }
    }
}

impl Drop for JsonlObserver {
    fn drop(&mut self) {
        if !self.failed {
            if let Err(e) = self.writer.flush() {
                warn!("failed to flush trace {}: {e}", self.path.display());
            }
        }
    }
}

/// What a finished run hands back for reporting.
struct Training {
    outcomes: Vec<TrialOutcome>,
    snapshot: AgentSnapshot,
}

fn train(config: &RunConfig, observer: Box<dyn Observer>) -> Result<Training> {
    let mut agent = LearningAgent::new(config.agent.clone(), GridPlanner::new())
        .context("Invalid agent configuration")?
        .with_observer(observer);
    let mut world = World::new(config.world.clone()).context("Invalid world configuration")?;
    let simulator = Simulator::new(Duration::from_millis(config.update_delay_ms));

    info!(
        trials = config.agent.num_trials,
        discount = config.agent.discount,
        "training started"
    );
    let outcomes = simulator.run(&mut agent, &mut world, config.agent.num_trials);

    Ok(Training {
        outcomes,
        snapshot: agent.snapshot(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_summary(report: &TrainingReport, snapshot: &AgentSnapshot) {
    let overall = &report.overall;
    println!(
        "Trials: {} (reached {}, success rate {:.1}%)",
        overall.trials,
        overall.reached,
        report.success_rate * 100.0
    );
    println!(
        "Average net reward: {:.2}, penalty rate: {:.1}%",
        overall.average_reward(),
        report.penalty_rate * 100.0
    );
    for window in &report.windows {
        println!(
            "  trials {:>3}-{:<3} success {:>5.1}%  penalties {:>5.1}%  reward {:>6.2}",
            window.first_trial,
            window.last_trial,
            window.success_rate * 100.0,
            window.penalty_rate * 100.0,
            window.average_reward
        );
    }
    println!(
        "Learned policy covers {} states (epsilon {:.3}, alpha {:.3})",
        snapshot.visited_states, snapshot.epsilon, snapshot.alpha
    );
    for finding in &report.findings {
        println!("Finding: {finding}");
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let config = RunConfig::resolve(args)?;

    let observer: Box<dyn Observer> = match &args.trace {
        Some(path) => Box::new(JsonlObserver::create(path)?),
        None => Box::new(NullObserver),
    };
    let training = train(&config, observer)?;

    let analyzer = TrialAnalyzer::new(args.window);
    let metadata = serde_json::to_value(&config).context("Failed to serialize run config")?;
    let report = analyzer.report(&training.outcomes, Some(metadata));

    print_summary(&report, &training.snapshot);

    if let Some(path) = &args.report {
        write_json(path, &report).context("Failed to save report")?;
        println!("Report written to {}", path.display());
    }
    if let Some(path) = &args.snapshot {
        write_json(path, &training.snapshot).context("Failed to save snapshot")?;
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn encode_reading(
    light: Light,
    oncoming: &str,
    left: &str,
    right: &str,
    hint: Heading,
) -> Result<usize> {
    let reading = SensorReading {
        light,
        oncoming: parse_traffic(oncoming).context("Invalid --oncoming")?,
        left: parse_traffic(left).context("Invalid --left")?,
        right: parse_traffic(right).context("Invalid --right")?,
    };
    Ok(encode(&reading, hint))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    if let Err(e) =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .try_init()
    {
        eprintln!("Warning: logger already initialised, keeping it: {e}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(&args)?,
        Commands::Encode {
            light,
            oncoming,
            left,
            right,
            hint,
        } => {
            let state = encode_reading(light, &oncoming, &left, &right, hint)?;
            println!("{state}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcab_core::event::RecordingObserver;
    use std::io::{BufRead, BufReader};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    fn small_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.agent.num_trials = 4;
        config.agent.seed = Some(11);
        config.world.seed = Some(12);
        config
    }

    #[test]
    fn test_config_file_with_partial_fields_uses_defaults() {
        let dir = scratch_dir("smartcab_test_partial_config");
        let path = dir.join("run.json");
        std::fs::write(&path, r#"{"agent": {"num_trials": 30}, "world": {"dummy_agents": 1}}"#)
            .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.agent.num_trials, 30);
        assert_eq!(config.world.dummy_agents, 1);
        assert_eq!(config.world.width, 8);
        assert_eq!(config.update_delay_ms, 0);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = scratch_dir("smartcab_test_override");
        let path = dir.join("run.json");
        std::fs::write(
            &path,
            r#"{"agent": {"num_trials": 30, "seed": 1}, "update_delay_ms": 5}"#,
        )
        .unwrap();

        let args = RunArgs {
            config: Some(path),
            trials: Some(7),
            world_seed: Some(9),
            enforce_deadline: true,
            update_delay_ms: Some(0),
            ..RunArgs::default()
        };
        let config = RunConfig::resolve(&args).unwrap();
        assert_eq!(config.agent.num_trials, 7);
        assert_eq!(config.agent.seed, Some(1));
        assert_eq!(config.world.seed, Some(9));
        assert!(config.world.enforce_deadline);
        assert_eq!(config.update_delay_ms, 0);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let args = RunArgs {
            config: Some(PathBuf::from("/nonexistent/smartcab/run.json")),
            ..RunArgs::default()
        };
        let err = RunConfig::resolve(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to open config file"));
    }

    #[test]
    fn test_train_rejects_invalid_agent_config() {
        let mut config = small_config();
        config.agent.num_trials = 0;
        let err = train(&config, Box::new(NullObserver)).err().unwrap();
        assert!(format!("{err:#}").contains("num_trials"));
    }

    #[test]
    fn test_train_runs_configured_trials() {
        let recorder = RecordingObserver::new();
        let training = train(&small_config(), Box::new(recorder.clone())).unwrap();

        assert_eq!(training.outcomes.len(), 4);
        assert_eq!(training.snapshot.trial, 4);
        let started = recorder
            .events()
            .iter()
            .filter(|e| matches!(e, AgentEvent::TrialStarted { .. }))
            .count();
        assert_eq!(started, 4);
    }

    #[test]
    fn test_jsonl_trace_has_one_event_per_line() {
        let dir = scratch_dir("smartcab_test_trace");
        let path = dir.join("trace.jsonl");
        {
            let observer = JsonlObserver::create(&path).unwrap();
            train(&small_config(), Box::new(observer)).unwrap();
        }

        let lines: Vec<String> = BufReader::new(File::open(&path).unwrap())
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert!(!lines.is_empty());
        for line in &lines {
            let _: AgentEvent = serde_json::from_str(line).unwrap();
        }
        assert!(lines[0].contains("\"event\":\"trial_started\""));
        assert!(lines
            .last()
            .unwrap()
            .contains("\"event\":\"trial_finished\""));
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(false);
        init_logging(true);
    }

    #[test]
    fn test_encode_reading() {
        let state = encode_reading(Light::Red, "none", "none", "none", Heading::Forward).unwrap();
        assert_eq!(state, 194);

        let err = encode_reading(Light::Green, "sideways", "none", "none", Heading::Left)
            .unwrap_err();
        assert!(err.to_string().contains("--oncoming"));
    }
}
