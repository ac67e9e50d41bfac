//! bvm: command-line front-end for the BVM.
//!
//! ```text
//! bvm run 6002600301 --gas 100
//! bvm run --file counter.basm --storage 0=41 --trace
//! bvm run --file math_contract.java --timeout-ms 500
//! bvm asm counter.basm
//! bvm disasm 6002600301
//! bvm deploy --state world.json counter counter.basm
//! bvm call --state world.json counter --gas 1000
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr. The exit code
//! is non-zero when execution fails.

mod config;
mod input;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bvm_core::asm::{disassemble, listing};
use bvm_core::domain::{ExecutionResult, Word};
use bvm_core::vm::{CollectingTracer, GasProfile, Interpreter, JumpAnalysis, StepTrace, Storage};
use bvm_state::adapters::{InMemoryState, JsonFileState};
use bvm_state::domain::ContractAddress;
use bvm_state::errors::ServiceError;
use bvm_state::service::{ContractService, ServiceConfig};

use crate::config::{load_config, Overrides};
use crate::input::{code_from, load_code, parse_hex, parse_slot};

/// bvm: deterministic gas-metered bytecode VM
#[derive(Parser, Debug)]
#[command(name = "bvm", version)]
#[command(about = "Run, assemble, disassemble and deploy BVM bytecode")]
struct Args {
    /// Log everything, including every executed opcode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Gas schedule: standard or storage-heavy [env: BVM_SSTORE_GAS_PROFILE]
    #[arg(long, global = true)]
    gas_profile: Option<GasProfile>,

    /// Jump destination analysis: positional or code-flow [env: BVM_JUMP_ANALYSIS]
    #[arg(long, global = true)]
    jump_analysis: Option<JumpAnalysis>,

    /// Wall-clock budget per run or call in milliseconds [env: BVM_EXECUTION_TIMEOUT_MS]
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute bytecode once against fresh (or seeded) storage
    Run {
        /// Bytecode as hex
        code: Option<String>,

        /// Read bytecode from a file (.basm is assembled, .java compiled, .hex decoded, else raw)
        #[arg(short, long, conflicts_with = "code")]
        file: Option<PathBuf>,

        /// Gas limit [env: BVM_GAS_LIMIT]
        #[arg(short, long)]
        gas: Option<u64>,

        /// Seed a storage slot, as key=value (repeatable)
        #[arg(short, long = "storage", value_parser = parse_slot)]
        storage: Vec<(Word, Word)>,

        /// Include a per-step trace in the output
        #[arg(long)]
        trace: bool,
    },

    /// Assemble or compile a source file and print the bytecode as hex
    Asm {
        /// Assembly (.basm) or contract (.java) source file
        file: PathBuf,
    },

    /// Print an instruction listing
    Disasm {
        /// Bytecode as hex
        code: Option<String>,

        /// Read bytecode from a file
        #[arg(short, long, conflicts_with = "code")]
        file: Option<PathBuf>,

        /// Emit JSON instead of a text listing
        #[arg(long)]
        json: bool,
    },

    /// Deploy a contract into a file-backed world state
    Deploy {
        /// World state document
        #[arg(long)]
        state: PathBuf,

        /// Contract address
        address: ContractAddress,

        /// Bytecode file (.basm, .java, .hex or raw)
        code_file: PathBuf,
    },

    /// Call a deployed contract and commit its storage on success
    Call {
        /// World state document
        #[arg(long)]
        state: PathBuf,

        /// Contract address
        address: ContractAddress,

        /// Gas limit [env: BVM_GAS_LIMIT]
        #[arg(short, long)]
        gas: Option<u64>,
    },
}

/// JSON shape printed by `run` and `call`.
#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a ContractAddress>,
    #[serde(flatten)]
    result: &'a ExecutionResult,
    gas_used: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [StepTrace]>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{text}");
    Ok(())
}

fn exit_code(result: &ExecutionResult) -> ExitCode {
    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Execute `code` once under the configured timeout, without world state.
///
/// With `trace` set the run also collects every step; otherwise it goes
/// through [`ContractService::execute_code`] like a stateless call.
async fn run_code(
    config: ServiceConfig,
    code: Vec<u8>,
    storage: Storage,
    gas_limit: u64,
    trace: bool,
) -> Result<(ExecutionResult, Option<Vec<StepTrace>>)> {
    let timeout_ms = config.execution_timeout_ms;
    if !trace {
        let service = ContractService::new(InMemoryState::new(), config);
        let result = service
            .execute_code(code, storage, gas_limit)
            .await
            .context("Failed to execute")?;
        return Ok((result, None));
    }

    let interpreter = Interpreter::new(config.vm);
    let worker = tokio::task::spawn_blocking(move || {
        let mut tracer = CollectingTracer::new();
        let result = interpreter.execute_traced(&code, storage, gas_limit, &mut tracer);
        (result, tracer.take())
    });
    let (result, steps) = tokio::time::timeout(Duration::from_millis(timeout_ms), worker)
        .await
        .map_err(|_| ServiceError::Timeout { timeout_ms })?
        .context("Trace worker failed")?;
    Ok((result, Some(steps)))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(Overrides {
        gas_profile: args.gas_profile,
        jump_analysis: args.jump_analysis,
        execution_timeout_ms: args.timeout_ms,
    });
    debug!(?config, "Configuration loaded");

    match args.command {
        Command::Run {
            code,
            file,
            gas,
            storage,
            trace,
        } => {
            let code = code_from(code.as_deref(), file.as_deref())?;
            let storage: Storage = storage.into_iter().collect();
            let gas_limit = gas.unwrap_or(config.default_gas_limit);
            let (result, steps) = run_code(config, code, storage, gas_limit, trace).await?;

            print_json(&Report {
                address: None,
                result: &result,
                gas_used: result.gas_used(),
                trace: steps.as_deref(),
            })?;
            Ok(exit_code(&result))
        }

        Command::Asm { file } => {
            let code = load_code(&file)?;
            println!("{}", hex::encode(code));
            Ok(ExitCode::SUCCESS)
        }

        Command::Disasm { code, file, json } => {
            let code = match (code, file) {
                (Some(hex), _) => parse_hex(&hex)?,
                (None, Some(path)) => load_code(&path)?,
                (None, None) => code_from(None, None)?,
            };
            if json {
                print_json(&disassemble(&code))?;
            } else {
                print!("{}", listing(&code));
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Deploy {
            state,
            address,
            code_file,
        } => {
            let code = load_code(&code_file)?;
            let world = JsonFileState::open(&state)
                .await
                .with_context(|| format!("Failed to open state {}", state.display()))?;
            let service = ContractService::new(world, config);

            let size = code.len();
            service
                .deploy(&address, code)
                .await
                .with_context(|| format!("Failed to deploy {address}"))?;

            info!(%address, size, "Deployed");
            print_json(&serde_json::json!({ "address": address, "code_size": size }))?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Call {
            state,
            address,
            gas,
        } => {
            let world = JsonFileState::open(&state)
                .await
                .with_context(|| format!("Failed to open state {}", state.display()))?;
            let service = ContractService::new(world, config);

            let result = service
                .call(&address, gas)
                .await
                .with_context(|| format!("Failed to call {address}"))?;

            print_json(&Report {
                address: Some(&address),
                result: &result,
                gas_used: result.gas_used(),
                trace: None,
            })?;
            Ok(exit_code(&result))
        }
    }
}
