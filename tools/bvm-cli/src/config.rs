//! Service configuration from defaults, environment and flags.

use bvm_core::vm::{GasProfile, JumpAnalysis};
use bvm_state::service::ServiceConfig;
use tracing::{info, warn};

/// Gas limit for calls and runs without `--gas`.
pub const ENV_GAS_LIMIT: &str = "BVM_GAS_LIMIT";
/// Wall-clock budget per execution.
pub const ENV_EXECUTION_TIMEOUT_MS: &str = "BVM_EXECUTION_TIMEOUT_MS";
/// `standard` or `storage-heavy`.
pub const ENV_SSTORE_GAS_PROFILE: &str = "BVM_SSTORE_GAS_PROFILE";
/// `positional` or `code-flow`.
pub const ENV_JUMP_ANALYSIS: &str = "BVM_JUMP_ANALYSIS";

/// Values given on the command line. They win over the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub gas_profile: Option<GasProfile>,
    pub jump_analysis: Option<JumpAnalysis>,
    pub execution_timeout_ms: Option<u64>,
}

/// Load configuration from the process environment.
pub fn load_config(overrides: Overrides) -> ServiceConfig {
    load_config_from(|key| std::env::var(key).ok(), overrides)
}

/// Load configuration using `lookup` for environment variables.
pub fn load_config_from(
    lookup: impl Fn(&str) -> Option<String>,
    overrides: Overrides,
) -> ServiceConfig {
    let mut config = ServiceConfig::default();

    if let Some(value) = lookup(ENV_GAS_LIMIT) {
        match value.trim().parse() {
            Ok(gas) => config.default_gas_limit = gas,
            Err(_) => warn!(value = %value, "{ENV_GAS_LIMIT} must be a non-negative integer"),
        }
    }

    if let Some(value) = lookup(ENV_EXECUTION_TIMEOUT_MS) {
        match value.trim().parse() {
            Ok(ms) => config.execution_timeout_ms = ms,
            Err(_) => warn!(value = %value, "{ENV_EXECUTION_TIMEOUT_MS} must be milliseconds"),
        }
    }

    if let Some(value) = lookup(ENV_SSTORE_GAS_PROFILE) {
        match value.parse::<GasProfile>() {
            Ok(profile) => {
                config.vm.gas_profile = profile;
                info!(?profile, "Loaded gas profile from environment");
            }
            Err(e) => warn!(error = %e, "Ignoring {ENV_SSTORE_GAS_PROFILE}"),
        }
    }

    if let Some(value) = lookup(ENV_JUMP_ANALYSIS) {
        match value.parse::<JumpAnalysis>() {
            Ok(mode) => config.vm.jump_analysis = mode,
            Err(e) => warn!(error = %e, "Ignoring {ENV_JUMP_ANALYSIS}"),
        }
    }

    if let Some(profile) = overrides.gas_profile {
        config.vm.gas_profile = profile;
    }
    if let Some(mode) = overrides.jump_analysis {
        config.vm.jump_analysis = mode;
    }
    if let Some(ms) = overrides.execution_timeout_ms {
        config.execution_timeout_ms = ms;
    }

    config
}
