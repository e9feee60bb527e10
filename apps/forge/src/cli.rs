//! # CLI Module
//!
//! Command-line interface for Nexus Forge.
//!
//! Command handlers write to any [`Write`] sink so they can be driven from
//! tests without capturing stdout.

use crate::api::{self, AppState};
use clap::{Parser, Subcommand};
use forge_core::{
    EnhancedResult, ForgeConfig, ForgeError, ForgeResult, Orchestrator, ProcessResult,
};
use serde_json::Value;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Inputs run by `forge demo`.
pub const DEMO_INPUTS: [&str; 3] = [
    "Hello! Tell me about cognitive architecture.",
    "Show me the system status",
    "How does triadic processing work?",
];

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Nexus Forge - triadic consensus text scoring
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Requests kept in the request history
        #[arg(long, default_value_t = api::DEFAULT_HISTORY_CAPACITY)]
        history: usize,
    },

    /// Run one input through the pipeline
    Process {
        /// Text to process
        input: String,

        /// Print the full enhanced record
        #[arg(short, long)]
        enhanced: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Context object as JSON (baseline mode only)
        #[arg(long)]
        context: Option<String>,
    },

    /// Show system status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the demo inputs and print a status summary
    Demo,
}

// =============================================================================
// HELPERS
// =============================================================================

/// Build an orchestrator, from a config file when one is given.
pub fn load_orchestrator(config: Option<&Path>) -> ForgeResult<Orchestrator> {
    match config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            Orchestrator::with_config(ForgeConfig::load(path)?)
        }
        None => Orchestrator::new(),
    }
}

/// Parse a `--context` argument.
pub fn parse_context(raw: Option<&str>) -> ForgeResult<Option<Value>> {
    raw.map(|s| {
        serde_json::from_str(s)
            .map_err(|e| ForgeError::Validation(format!("Invalid --context JSON: {e}")))
    })
    .transpose()
}

fn write_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> ForgeResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_baseline<W: Write>(out: &mut W, result: &ProcessResult) -> ForgeResult<()> {
    writeln!(out, "Response: {}", result.response)?;
    writeln!(
        out,
        "Intent: {} (confidence {:.2})",
        result.intent.kind, result.intent.confidence
    )?;
    if result.concepts.is_empty() {
        writeln!(out, "Concepts: none")?;
    } else {
        writeln!(out, "Concepts: {}", result.concepts.join(", "))?;
    }
    writeln!(out, "System resonance: {:.3}", result.system_resonance)?;
    writeln!(out, "Processing time: {:.3} ms", result.processing_time_ms)?;
    Ok(())
}

fn write_enhanced<W: Write>(out: &mut W, result: &EnhancedResult) -> ForgeResult<()> {
    writeln!(out, "Enhanced response: {}", result.enhanced_response)?;
    writeln!(
        out,
        "Intent: {} (confidence {:.2})",
        result.intent.kind, result.intent.confidence
    )?;
    writeln!(out, "Phases:")?;
    for (stage, phase) in &result.phases {
        let mark = if phase.consensus_achieved { "+" } else { "-" };
        writeln!(
            out,
            "  [{mark}] {stage}: {:.3} (threshold {:.2})",
            phase.consensus_score, phase.consensus_threshold
        )?;
    }
    writeln!(
        out,
        "Bridges executed: {}",
        result.hyphenator_status.executions_this_call
    )?;
    writeln!(
        out,
        "Geometry harmony: {:.3} (entropy {:.3})",
        result.sacred_geometry_harmony, result.input_entropy
    )?;
    writeln!(out, "System resonance: {:.3}", result.system_resonance)?;
    writeln!(out, "Processing time: {:.3} ms", result.processing_time_ms)?;
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Process one input and print the result.
pub fn cmd_process<W: Write>(
    out: &mut W,
    forge: &mut Orchestrator,
    input: &str,
    context: Option<&Value>,
    enhanced: bool,
    json: bool,
) -> ForgeResult<()> {
    if enhanced {
        let result = forge.process_enhanced_input(input)?;
        if json {
            write_json(out, &result)
        } else {
            write_enhanced(out, &result)
        }
    } else {
        let result = forge.process_input(input, context)?;
        if json {
            write_json(out, &result)
        } else {
            write_baseline(out, &result)
        }
    }
}

/// Print the system status.
pub fn cmd_status<W: Write>(out: &mut W, forge: &Orchestrator, json: bool) -> ForgeResult<()> {
    let status = forge.get_system_status();
    if json {
        return write_json(out, &status);
    }

    writeln!(out, "Nexus Forge v{}", status.version)?;
    writeln!(out, "System resonance: {:.3}", status.system_resonance)?;
    writeln!(out, "Active bridges: {}", status.active_bridges)?;
    writeln!(out, "Triadic processors: {}", status.triadic_processors)?;
    writeln!(out, "Geometric primitives: {}", status.geometric_primitives)?;
    writeln!(out, "Bridge executions: {}", status.bridge_executions_total)?;
    writeln!(
        out,
        "Processors in consensus: {}/{}",
        status.consensus_metrics.processors_in_consensus, status.triadic_processors
    )?;
    writeln!(
        out,
        "Filing: green {} / yellow {} / red {}",
        status.filing.green_zone, status.filing.yellow_zone, status.filing.red_zone
    )?;
    Ok(())
}

/// Run the demo inputs, then print the status.
pub fn cmd_demo<W: Write>(out: &mut W, forge: &mut Orchestrator) -> ForgeResult<()> {
    for (i, input) in DEMO_INPUTS.iter().enumerate() {
        writeln!(out, "--- Demo {} ---", i + 1)?;
        writeln!(out, "Input: {input}")?;
        let result = forge.process_enhanced_input(input)?;
        write_enhanced(out, &result)?;
        writeln!(out)?;
    }
    writeln!(out, "--- Status ---")?;
    cmd_status(out, forge, false)
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> ForgeResult<()> {
    let mut forge = load_orchestrator(cli.config.as_deref())?;
    let stdout = std::io::stdout();

    match cli.command {
        Commands::Serve {
            host,
            port,
            history,
        } => {
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .map_err(|e| ForgeError::Config(format!("Invalid address {host}:{port}: {e}")))?;
            let state = AppState::new(forge).with_history_capacity(history);
            api::serve(state, addr).await
        }
        Commands::Process {
            input,
            enhanced,
            json,
            context,
        } => {
            let context = parse_context(context.as_deref())?;
            cmd_process(
                &mut stdout.lock(),
                &mut forge,
                &input,
                context.as_ref(),
                enhanced,
                json,
            )
        }
        Commands::Status { json } => cmd_status(&mut stdout.lock(), &forge, json),
        Commands::Demo => cmd_demo(&mut stdout.lock(), &mut forge),
    }
}

// =============================================================================
// TESTS
// =============================================================================
