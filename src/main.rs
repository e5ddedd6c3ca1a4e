//! epinet CLI - Run network epidemic trials from text or JSON inputs.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use env_logger::Env;
use log::info;

use epinet::{
    compute::{
        Network, generate,
        trials::{TrialHarness, rank_genotypes},
    },
    input::{load_calculator_conf, load_disease, load_edge_list, load_genotypes, write_edge_list},
    schema::{AgentBehavior, ExperimentConfig, Genotype, NetworkSource, StopRule, TrialConfig},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cap on worker threads (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Base random seed; trial k uses seed + k
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Keep the network topology fixed
    #[arg(long = "static", global = true)]
    static_network: bool,

    /// Rewiring behavior as `min,max,remove_prob,add_prob`
    #[arg(long, global = true, value_parser = parse_behavior)]
    behavior: Option<AgentBehavior>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one trial to quiescence and dump node states to stdout
    Vis { disease: PathBuf, network: PathBuf },
    /// Mean fraction of nodes left susceptible over a batch of trials
    Batch {
        disease: PathBuf,
        network: PathBuf,
        trials: usize,
        steps: usize,
    },
    /// Average R0 over a batch of trials
    R0 {
        disease: PathBuf,
        network: PathBuf,
        trials: usize,
        steps: usize,
        /// Write the full report (including the R0 series) as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score and rank the genotypes of a CSV file
    Sweep {
        genotypes: PathBuf,
        calculator: PathBuf,
        network: PathBuf,
    },
    /// Run an experiment described by a JSON configuration
    Run { config: PathBuf },
    /// Print an example experiment configuration
    ExampleConfig,
    /// Write a generated network as an edge list to stdout
    Generate {
        #[command(subcommand)]
        kind: GenerateKind,
    },
}

#[derive(Subcommand, Debug)]
enum GenerateKind {
    Complete {
        nodes: usize,
    },
    Ring {
        nodes: usize,
    },
    CliqueGate {
        components: usize,
        component_size: usize,
        gate_size: usize,
    },
}

fn parse_behavior(s: &str) -> std::result::Result<AgentBehavior, String> {
    let genes = s
        .split(',')
        .map(|f| f.trim().parse::<f32>().map_err(|e| format!("`{f}`: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Genotype::new(genes).to_behavior().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    color_eyre::install()?;
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match &cli.command {
        Command::Vis { disease, network } => run_vis(&cli, disease, network),
        Command::Batch {
            disease,
            network,
            trials,
            steps,
        } => run_batch(&cli, disease, network, *trials, *steps),
        Command::R0 {
            disease,
            network,
            trials,
            steps,
            output,
        } => run_r0(&cli, disease, network, *trials, *steps, output.as_deref()),
        Command::Sweep {
            genotypes,
            calculator,
            network,
        } => run_sweep(&cli, genotypes, calculator, network),
        Command::Run { config } => run_experiment(&cli, config),
        Command::ExampleConfig => {
            println!("{}", serde_json::to_string_pretty(&ExperimentConfig::default())?);
            Ok(())
        }
        Command::Generate { kind } => {
            let network = match *kind {
                GenerateKind::Complete { nodes } => generate::complete(nodes),
                GenerateKind::Ring { nodes } => generate::ring(nodes),
                GenerateKind::CliqueGate {
                    components,
                    component_size,
                    gate_size,
                } => generate::clique_gate(components, component_size, gate_size),
            };
            let mut out = BufWriter::new(io::stdout().lock());
            write_edge_list(&mut out, &network)?;
            out.flush()?;
            Ok(())
        }
    }
}

impl Cli {
    /// Apply global flags on top of `base`.
    fn trial_config(&self, base: TrialConfig) -> TrialConfig {
        TrialConfig {
            threads: self.threads.or(base.threads),
            seed: self.seed.or(base.seed),
            dynamic: base.dynamic && !self.static_network,
            ..base
        }
    }

    fn behavior_or(&self, base: AgentBehavior) -> AgentBehavior {
        self.behavior.unwrap_or(base)
    }
}

fn load_network(path: &Path) -> Result<Network> {
    let network =
        load_edge_list(path).wrap_err_with(|| format!("reading network {}", path.display()))?;
    info!(
        "Loaded network {}: {} nodes, {} edges, mean degree {:.2}",
        path.display(),
        network.num_nodes(),
        network.num_edges(),
        network.mean_degree()
    );
    Ok(network)
}

fn batch_harness(
    cli: &Cli,
    disease: &Path,
    network: &Path,
    trials: usize,
    steps: usize,
) -> Result<TrialHarness> {
    let spec =
        load_disease(disease).wrap_err_with(|| format!("reading disease {}", disease.display()))?;
    let network = load_network(network)?;
    let config = cli.trial_config(TrialConfig {
        trials,
        stop: StopRule::FixedSteps { steps },
        ..Default::default()
    });
    Ok(TrialHarness::from_specs(
        network,
        &[spec],
        cli.behavior_or(AgentBehavior::default()),
        config,
    )?)
}

fn run_vis(cli: &Cli, disease: &Path, network: &Path) -> Result<()> {
    let spec =
        load_disease(disease).wrap_err_with(|| format!("reading disease {}", disease.display()))?;
    let harness = TrialHarness::from_specs(
        load_network(network)?,
        &[spec],
        cli.behavior_or(AgentBehavior::default()),
        cli.trial_config(TrialConfig {
            trials: 1,
            stop: StopRule::Quiescence { max_steps: None },
            ..Default::default()
        }),
    )?;

    let start = Instant::now();
    let out = BufWriter::new(io::stdout().lock());
    let outcome = harness.run_traced(out)?;
    eprintln!(
        "Proportion of nodes still susceptible: {:.6} R0: {:.6} ({:.2?}).",
        outcome.fitness,
        outcome.r0,
        start.elapsed()
    );
    Ok(())
}

fn run_batch(cli: &Cli, disease: &Path, network: &Path, trials: usize, steps: usize) -> Result<()> {
    let harness = batch_harness(cli, disease, network, trials, steps)?;
    let start = Instant::now();
    let fitness = harness.mean_fitness()?;
    println!(
        "Proportion of nodes still susceptible: {:.6} ({:.2?}).",
        fitness,
        start.elapsed()
    );
    Ok(())
}

fn run_r0(
    cli: &Cli,
    disease: &Path,
    network: &Path,
    trials: usize,
    steps: usize,
    output: Option<&Path>,
) -> Result<()> {
    let harness = batch_harness(cli, disease, network, trials, steps)?;
    let start = Instant::now();
    let report = harness.run()?;
    println!(
        "Average R0: {:.6} ({:.2?}).",
        report.mean_nonzero_r0,
        start.elapsed()
    );

    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .wrap_err_with(|| format!("writing report {}", path.display()))?;
        info!("Wrote R0 series to {}", path.display());
    }
    Ok(())
}

fn run_sweep(cli: &Cli, genotypes: &Path, calculator: &Path, network: &Path) -> Result<()> {
    let genotypes = load_genotypes(genotypes)
        .wrap_err_with(|| format!("reading genotypes {}", genotypes.display()))?;
    let conf = load_calculator_conf(calculator)
        .wrap_err_with(|| format!("reading calculator {}", calculator.display()))?;
    let network = load_network(network)?;

    info!(
        "Evaluating {} genotypes ({} trials x {} steps)",
        genotypes.len(),
        conf.trials,
        conf.steps
    );
    let harness = TrialHarness::from_specs(
        network,
        &[conf.disease.clone()],
        cli.behavior_or(AgentBehavior::default()),
        cli.trial_config(conf.trial_config(TrialConfig::default())),
    )?;

    for (rank, ranked) in rank_genotypes(&harness, &genotypes)?.iter().enumerate() {
        let genes: Vec<String> = ranked
            .genotype
            .genes()
            .iter()
            .map(|g| g.to_string())
            .collect();
        println!("{:>3}. {:.6}  {}", rank + 1, ranked.fitness, genes.join(","));
    }
    Ok(())
}

fn run_experiment(cli: &Cli, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let config: ExperimentConfig =
        serde_json::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))?;
    config.validate()?;

    let network = match &config.network {
        NetworkSource::EdgeList { path: edges } => {
            // Relative to the configuration file
            let edges = path.parent().map_or_else(|| edges.clone(), |dir| dir.join(edges));
            load_network(&edges)?
        }
        source => generate::from_source(source)
            .ok_or_else(|| eyre!("network source {source:?} cannot be generated"))?,
    };

    let harness = TrialHarness::from_specs(
        network,
        &config.diseases,
        cli.behavior_or(config.behavior),
        cli.trial_config(config.trials.clone()),
    )?;
    let report = harness.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
