//! # cgym application logic
//!
//! Parses the command line into a [`Cli`] and dispatches to the harnesses.
//! Every command builds a fresh [`Registry`] holding the built-in compiler
//! environments.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gym::EnvInstance;
use harness::{FuzzConfig, RandomWalkReport};
use registry::{MakeOptions, Registry};

/// Compiler-optimization environments.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered environment ids and their defaults.
    List,

    /// Play one episode with uniformly random actions.
    RandomWalk {
        #[arg(long, default_value = "llvm-v0")]
        env: String,

        /// Benchmark URI, e.g. `cbench-v1/qsort`.
        #[arg(long)]
        benchmark: Option<String>,

        /// Maximum number of steps.
        #[arg(long, default_value_t = 10)]
        steps: u64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Construction overrides as a JSON object.
        #[arg(long)]
        options: Option<String>,
    },

    /// Step random actions until a deadline, rebuilding after every episode.
    Fuzz {
        #[arg(long, default_value = "llvm-v0")]
        env: String,

        #[arg(long)]
        benchmark: Option<String>,

        #[arg(long)]
        reward_space: Option<String>,

        #[arg(long)]
        observation_space: Option<String>,

        /// Wall-clock budget in seconds.
        #[arg(long, default_value_t = 2.0)]
        seconds: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

/// Builds the registry of built-in environments.
///
/// # Errors
///
/// Fails if the built-in ids collide.
pub fn default_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    compiler::register_environments(&mut registry)?;
    Ok(registry)
}

/// Runs one command.
///
/// # Errors
///
/// Returns any construction, provider or contract error.
pub fn run(cli: Cli) -> Result<()> {
    let registry = default_registry()?;
    match cli.command {
        Command::List => {
            for spec in registry.specs() {
                let max_steps = spec
                    .episode_step_limit()
                    .map_or_else(|| "-".to_string(), |n| n.to_string());
                println!(
                    "{:<24} observation={:<12} reward={:<22} max_steps={:<6} benchmark={}",
                    spec.id(),
                    spec.default_observation_space().unwrap_or("-"),
                    spec.default_reward_space().unwrap_or("-"),
                    max_steps,
                    spec.default_kwargs().benchmark.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::RandomWalk { env, benchmark, steps, seed, options } => {
            let mut overrides = match options.as_deref() {
                Some(json) => MakeOptions::from_json(json)?,
                None => MakeOptions::default(),
            };
            if let Some(benchmark) = benchmark {
                overrides = overrides.benchmark(benchmark);
            }
            let mut instance = registry.make(&env, overrides)?;
            let mut rng = fastrand::Rng::with_seed(seed);
            let report = harness::random_walk(&mut instance, steps, &mut rng)
                .with_context(|| format!("random walk on {env}"))?;
            print_walk(&instance, &report);
        }
        Command::Fuzz {
            env,
            benchmark,
            reward_space,
            observation_space,
            seconds,
            seed,
        } => {
            let options = MakeOptions { benchmark, reward_space, observation_space };
            let duration = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid fuzz duration {seconds}"))?;
            let config = FuzzConfig { duration, seed };
            let report = harness::fuzz(&registry, &env, &options, &config)
                .with_context(|| format!("fuzzing {env}"))?;
            println!(
                "{} steps, {} episodes, {} instances in {:.2?}",
                report.steps, report.episodes, report.instances, report.elapsed
            );
        }
    }
    Ok(())
}

fn print_walk(instance: &EnvInstance, report: &RandomWalkReport) {
    println!("env:        {}", instance.id());
    println!("benchmark:  {}", instance.benchmark());
    println!("steps:      {}", report.steps);
    println!("done:       {}", report.done);
    println!("reward:     {:.4}", report.episode_reward);
    println!("actions:    {}", report.action_names(instance).join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fuzz_flags() {
        let cli = Cli::try_parse_from([
            "cgym",
            "fuzz",
            "--env",
            "llvm-ic-v0",
            "--observation-space",
            "Autophase",
            "--seconds",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Command::Fuzz { env, observation_space, seconds, .. } => {
                assert_eq!(env, "llvm-ic-v0");
                assert_eq!(observation_space.as_deref(), Some("Autophase"));
                assert!((seconds - 0.5).abs() < f64::EPSILON);
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn commands_run_end_to_end() {
        run(Cli::try_parse_from(["cgym", "list"]).unwrap()).unwrap();
        run(Cli::try_parse_from([
            "cgym",
            "random-walk",
            "--env",
            "llvm-autophase-ic-v0",
            "--options",
            r#"{"benchmark": "cbench-v1/sha"}"#,
        ])
        .unwrap())
        .unwrap();
        run(Cli::try_parse_from(["cgym", "fuzz", "--seconds", "0.2"]).unwrap()).unwrap();
    }

    #[test]
    fn bad_options_are_errors() {
        let cli = Cli::try_parse_from(["cgym", "random-walk", "--options", r#"{"seed": 1}"#]).unwrap();
        assert!(run(cli).is_err());
        let cli = Cli::try_parse_from(["cgym", "fuzz", "--env", "nope-v0"]).unwrap();
        assert!(run(cli).is_err());
    }
}
