//! Command line interface - argument parsing and command dispatch

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;

use swarf_feeds::calc::optimizer::{
    optimize_for_deflection, optimize_tool_configuration, OptimizerRequest,
};
use swarf_feeds::{calculate, default_library, CutType, Inputs, Library, Policy, ReferenceData};

#[derive(Parser)]
#[command(
    name = "swarf-feeds",
    about = "Speeds, feeds, power and tool deflection for CNC milling",
    version
)]
pub struct Cli {
    /// Reference library JSON (default: built-in library)
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    /// Policy JSON overriding advisory thresholds
    #[arg(long, global = true)]
    pub policy: Option<PathBuf>,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate cutting parameters for one operation
    Calc(CalcArgs),

    /// Search diameter and stickout for a target deflection
    Optimize(OptimizeArgs),

    /// List library records
    List {
        #[arg(value_enum)]
        kind: ListKind,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    #[arg(long)]
    pub material: String,

    #[arg(long)]
    pub machine: String,

    #[arg(long)]
    pub spindle: String,

    #[arg(long)]
    pub tool: String,

    /// slot, profile, adaptive, facing, drilling or boring
    #[arg(long)]
    pub cut: CutType,

    #[arg(long, default_value_t = 1.0)]
    pub aggressiveness: f64,

    /// Depth of cut override, mm
    #[arg(long)]
    pub doc: Option<f64>,

    /// Width of cut override, mm
    #[arg(long)]
    pub woc: Option<f64>,

    #[arg(long)]
    pub flutes: Option<u32>,

    /// Stickout override, mm
    #[arg(long)]
    pub stickout: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct OptimizeArgs {
    /// Target deflection, mm
    #[arg(long)]
    pub target: f64,

    /// Cutting force, N
    #[arg(long)]
    pub force: f64,

    #[arg(long)]
    pub rpm: f64,

    /// Flute count (taken from the tool when --tool is given)
    #[arg(long, required_unless_present = "tool")]
    pub flutes: Option<u32>,

    /// Search around this library tool instead of the full range
    #[arg(long)]
    pub tool: Option<String>,

    /// Number of candidates to return
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ListKind {
    Materials,
    Machines,
    Spindles,
    Tools,
}

pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_library(path: Option<&PathBuf>) -> Result<Library> {
    match path {
        Some(path) => Library::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("loading library {}", path.display())),
        None => Ok(default_library()),
    }
}

fn load_policy(path: Option<&PathBuf>) -> Result<Policy> {
    match path {
        Some(path) => Policy::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("loading policy {}", path.display())),
        None => Ok(Policy::default()),
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let library = load_library(cli.library.as_ref())?;
    let policy = load_policy(cli.policy.as_ref())?;

    match cli.command {
        Commands::Calc(args) => run_calc(&library, &policy, args),
        Commands::Optimize(args) => run_optimize(&library, &policy, args),
        Commands::List { kind, json } => output::print_list(&library, kind, json),
    }
}

fn run_calc(library: &Library, policy: &Policy, args: CalcArgs) -> Result<()> {
    let inputs = Inputs {
        aggressiveness: args.aggressiveness,
        user_doc_mm: args.doc,
        user_woc_mm: args.woc,
        override_flutes: args.flutes,
        override_stickout_mm: args.stickout,
        ..Inputs::new(args.material, args.machine, args.spindle, args.tool, args.cut)
    };
    let result = calculate(library, &inputs, policy).into_diagnostic()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        output::print_calculation(&inputs, &result);
    }
    Ok(())
}

fn run_optimize(library: &Library, policy: &Policy, args: OptimizeArgs) -> Result<()> {
    let candidates = match &args.tool {
        Some(id) => {
            let tool = library
                .find_tool(id)
                .ok_or_else(|| miette::miette!("tool '{}' not found", id))?;
            optimize_tool_configuration(tool, args.target, args.force, args.rpm, args.top, policy)
        }
        None => {
            let flutes = args
                .flutes
                .ok_or_else(|| miette::miette!("--flutes is required without --tool"))?;
            let req = OptimizerRequest {
                top_k: args.top,
                ..OptimizerRequest::new(args.target, args.force, args.rpm, flutes)
            }
            .with_policy(policy);
            optimize_for_deflection(&req)
        }
    }
    .into_diagnostic()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidates).into_diagnostic()?);
    } else {
        output::print_candidates(args.target, &candidates);
    }
    Ok(())
}
