//! cpusched Simulation Engine CLI
//!
//! Command-line interface for running CPU scheduling simulations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cpusched_core::{Policy, PriorityDirection, ProcessSet, ProcessSpec, Ticks};
use cpusched_simulation_engine::{
    IdleStrategy, Scenario, SimulationConfig, SimulationReport, WorkloadGenerator,
    compare_policies,
    report::{best_by_waiting, comparison_table},
};

#[derive(Parser, Debug)]
#[command(name = "cpusched-sim")]
#[command(about = "Simulate single-CPU scheduling policies", long_about = None)]
struct Args {
    /// Process definition AT,BT[,PRIO] (repeatable)
    #[arg(short, long = "process", value_name = "AT,BT,PRIO")]
    processes: Vec<ProcessSpec>,

    /// Load processes (and optional settings) from a JSON scenario file
    #[arg(long, conflicts_with = "processes")]
    scenario: Option<PathBuf>,

    /// Generate N synthetic processes
    #[arg(long, value_name = "N", conflicts_with_all = ["processes", "scenario"])]
    random: Option<usize>,

    /// Seed for --random
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Policies to run (comma-separated: FCFS,SJF,SJF_PRE,PRIORITY,RR or "all")
    #[arg(long)]
    policies: Option<String>,

    /// Round-robin time quantum
    #[arg(short, long, env = "CPUSCHED_QUANTUM")]
    quantum: Option<Ticks>,

    /// Priority direction: lower (smaller number wins) or higher
    #[arg(long, env = "CPUSCHED_PRIORITY_DIRECTION")]
    priority_direction: Option<PriorityDirection>,

    /// Jump idle periods straight to the next arrival
    #[arg(long)]
    jump_idle: bool,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

const DEFAULT_QUANTUM: Ticks = 2;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cpusched_sim=info,cpusched_simulation_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => Some(
            Scenario::load(path)
                .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        ),
        None => None,
    };

    let processes = build_process_set(&args, scenario.as_ref())?;
    let configs = build_configs(&args, scenario.as_ref())?;

    info!(
        processes = processes.len(),
        policies = configs.len(),
        "cpusched-sim starting"
    );

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  cpusched Simulation Engine                              ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    println!("Processes:");
    for process in processes.iter() {
        println!(
            "  {:<4} arrival {:>3}  burst {:>3}  priority {:>2}",
            process.id.to_string(),
            process.arrival,
            process.burst,
            process.priority
        );
    }
    println!();

    let results = compare_policies(&processes, &configs).context("Simulation failed")?;
    let reports = configs
        .iter()
        .zip(&results)
        .map(|(config, result)| SimulationReport::from_run(config, result))
        .collect::<cpusched_core::Result<Vec<_>>>()
        .context("Failed to summarize results")?;

    for report in &reports {
        let mode = if report.preemptive { "preemptive" } else { "non-preemptive" };
        println!("── {} ── {} [{mode}]", report.label(), report.description);
        println!("{}", report.metrics_table());
        println!("Schedule:");
        println!("{}", report.segment_list());
    }

    if reports.len() > 1 {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  Policy Comparison                                       ║");
        println!("╚══════════════════════════════════════════════════════════╝\n");
        println!("{}", comparison_table(&reports));
        if let Some(best) = best_by_waiting(&reports) {
            println!(
                "Lowest average waiting time: {} ({:.2})",
                best.label(),
                best.summary.avg_waiting
            );
        }
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&reports).context("Failed to serialize results")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write JSON output to {}", path.display()))?;
        info!(path = %path.display(), "Results saved");
    }

    Ok(())
}

fn build_process_set(args: &Args, scenario: Option<&Scenario>) -> Result<ProcessSet> {
    if let Some(scenario) = scenario {
        return scenario.process_set().context("Invalid scenario processes");
    }
    if let Some(count) = args.random {
        info!(count, seed = args.seed, "Generating synthetic workload");
        return WorkloadGenerator::new(args.seed)
            .generate_set(count)
            .context("Failed to generate workload");
    }
    if args.processes.is_empty() {
        info!("No processes given, using the default set");
        return Ok(ProcessSet::default_set());
    }
    ProcessSet::from_specs(&args.processes).context("Invalid process definitions")
}

fn build_configs(args: &Args, scenario: Option<&Scenario>) -> Result<Vec<SimulationConfig>> {
    let base = scenario.map(Scenario::config);

    let policies = match (&args.policies, base) {
        (Some(list), _) => parse_policies(list)?,
        (None, Some(config)) => vec![config.policy],
        (None, None) => vec![Policy::Fcfs],
    };

    let quantum = args
        .quantum
        .or(base.and_then(|c| c.quantum))
        .unwrap_or(DEFAULT_QUANTUM);
    let direction = args
        .priority_direction
        .or(scenario.and_then(|s| s.priority_direction))
        .unwrap_or_default();
    let idle_strategy = if args.jump_idle {
        IdleStrategy::JumpToArrival
    } else {
        IdleStrategy::UnitStep
    };

    if args.quantum.is_some() && !policies.contains(&Policy::RoundRobin) {
        warn!("--quantum only applies to RR and will be ignored");
    }

    let configs: Vec<SimulationConfig> = policies
        .into_iter()
        .map(|policy| {
            SimulationConfig::new(policy)
                .with_quantum(quantum)
                .with_priority_direction(direction)
                .with_idle_strategy(idle_strategy)
        })
        .collect();

    for config in &configs {
        config
            .validate()
            .with_context(|| format!("Invalid configuration for {}", config.policy))?;
    }
    Ok(configs)
}

fn parse_policies(list: &str) -> Result<Vec<Policy>> {
    if list.trim().eq_ignore_ascii_case("all") {
        return Ok(Policy::ALL.to_vec());
    }

    let mut policies = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let policy: Policy = name.parse()?;
        if !policies.contains(&policy) {
            policies.push(policy);
        }
    }
    if policies.is_empty() {
        bail!("No policies given");
    }
    Ok(policies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["cpusched-sim"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!(parse_policies("all").unwrap(), Policy::ALL.to_vec());
        assert_eq!(
            parse_policies("rr, fcfs,RR").unwrap(),
            vec![Policy::RoundRobin, Policy::Fcfs]
        );
        assert!(parse_policies("FCFS,MLFQ").is_err());
        assert!(parse_policies(" , ").is_err());
    }

    #[test]
    fn test_process_flags() {
        let args = args(&["-p", "0,5,1", "--process", "2,3"]);
        let set = build_process_set(&args, None).unwrap();
        assert_eq!(set.specs(), vec![ProcessSpec::new(0, 5, 1), ProcessSpec::new(2, 3, 1)]);
    }

    #[test]
    fn test_default_set_when_no_input() {
        let args = args(&[]);
        assert_eq!(build_process_set(&args, None).unwrap(), ProcessSet::default_set());

        let configs = build_configs(&args, None).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].policy, Policy::Fcfs);
    }

    #[test]
    fn test_flags_override_scenario() {
        let scenario = Scenario::from_json_str(
            r#"{"policy": "RR", "quantum": 4, "processes": [{"arrival": 0, "burst": 3, "priority": 1}]}"#,
        )
        .unwrap();

        let from_file = build_configs(&args(&[]), Some(&scenario)).unwrap();
        assert_eq!(from_file[0].policy, Policy::RoundRobin);
        assert_eq!(from_file[0].quantum, Some(4));

        let overridden = build_configs(&args(&["-q", "1", "--policies", "RR,SJF"]), Some(&scenario))
            .unwrap();
        assert_eq!(overridden.len(), 2);
        assert_eq!(overridden[0].quantum, Some(1));
        assert_eq!(overridden[1].policy, Policy::Sjf);
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let err = build_configs(&args(&["--policies", "RR", "-q", "0"]), None).unwrap_err();
        assert!(err.to_string().contains("RR"));
    }

    #[test]
    fn test_jump_idle_and_direction() {
        let argv = ["--policies", "PRIORITY", "--priority-direction", "higher", "--jump-idle"];
        let configs = build_configs(&args(&argv), None).unwrap();
        assert_eq!(configs[0].priority_direction, PriorityDirection::HigherIsHigher);
        assert_eq!(configs[0].idle_strategy, IdleStrategy::JumpToArrival);
    }

    #[test]
    fn test_random_workload_is_seeded() {
        let first = build_process_set(&args(&["--random", "6", "--seed", "9"]), None).unwrap();
        let second = build_process_set(&args(&["--random", "6", "--seed", "9"]), None).unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }
}
