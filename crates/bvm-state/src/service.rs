//! # Contract Service
//!
//! Binds the interpreter to world state: deploys bytecode, runs calls against
//! stored contracts and commits their storage.
//!
//! ## Execution Model
//!
//! - The interpreter is synchronous, so every run happens on a blocking worker
//!   (`spawn_blocking`) bounded by `execution_timeout_ms`. Steps are logged at
//!   TRACE level.
//! - A timed-out worker keeps running until its gas is exhausted; its result
//!   is discarded and nothing is committed.
//! - Storage is committed only when execution succeeds. A failed run leaves
//!   the stored contract untouched.
//! - Calls to the same address are serialized from storage load through
//!   commit. Calls to different addresses run concurrently.

use crate::adapters::InMemoryState;
use crate::domain::ContractAddress;
use crate::errors::{ServiceError, StateError};
use crate::ports::outbound::StateAccess;
use bvm_core::domain::{check_all_invariants, ExecutionResult, InvariantCheckResult, VmConfig};
use bvm_core::vm::gas::static_cost;
use bvm_core::vm::{Interpreter, LogTracer, Storage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Contract service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// VM configuration.
    pub vm: VmConfig,
    /// Execution timeout in milliseconds.
    pub execution_timeout_ms: u64,
    /// Largest deployable code size in bytes.
    pub max_code_size: usize,
    /// Gas supplied to calls that don't name a limit.
    pub default_gas_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            vm: VmConfig::default(),
            execution_timeout_ms: 5000,
            max_code_size: 24 * 1024,
            default_gas_limit: 1_000_000,
        }
    }
}

/// Statistics for the contract service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    /// Contracts deployed.
    pub deployments: u64,
    /// Executions attempted (calls and stateless runs).
    pub executions: u64,
    /// Executions that halted successfully.
    pub successful_executions: u64,
    /// Executions that halted on a VM error.
    pub failed_executions: u64,
    /// Executions cut off by the timeout.
    pub timeouts: u64,
    /// Total gas consumed by finished executions.
    pub total_gas_used: u64,
    /// Average execution time in microseconds.
    pub avg_execution_time_us: u64,
}

/// The contract service.
pub struct ContractService<S: StateAccess> {
    config: ServiceConfig,
    interpreter: Arc<Interpreter>,
    state: Arc<S>,
    stats: Arc<RwLock<ServiceStats>>,
    /// One lock per called address, held from storage load to commit.
    call_locks: Mutex<HashMap<ContractAddress, Arc<Mutex<()>>>>,
}

impl<S: StateAccess> ContractService<S> {
    /// Create a service over `state`.
    pub fn new(state: S, config: ServiceConfig) -> Self {
        Self {
            interpreter: Arc::new(Interpreter::new(config.vm)),
            config,
            state: Arc::new(state),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
            call_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Underlying state adapter.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Deploy `code` at `address`.
    ///
    /// # Errors
    ///
    /// * `StateError::EmptyCode` - `code` is empty
    /// * `StateError::CodeTooLarge` - `code` exceeds `max_code_size`
    /// * `StateError::AlreadyExists` - `address` is taken
    #[instrument(skip(self, address, code), fields(address = %address, code_size = code.len()))]
    pub async fn deploy(&self, address: &ContractAddress, code: Vec<u8>) -> Result<(), ServiceError> {
        if code.is_empty() {
            warn!("Rejected deployment of empty code");
            return Err(StateError::EmptyCode.into());
        }
        if code.len() > self.config.max_code_size {
            warn!(max = self.config.max_code_size, "Rejected oversized deployment");
            return Err(StateError::CodeTooLarge {
                size: code.len(),
                max: self.config.max_code_size,
            }
            .into());
        }

        let static_gas = static_cost(self.interpreter.schedule(), &code);
        self.state.deploy(address, code).await?;
        self.stats.write().await.deployments += 1;

        info!(static_gas, "Contract deployed");
        Ok(())
    }

    /// Execute the contract at `address`.
    ///
    /// Uses `default_gas_limit` when `gas_limit` is `None`. Storage is
    /// committed back to state only if execution succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::State` when the contract is missing or state
    /// access fails, `ServiceError::Timeout` when the run exceeds the time
    /// budget. VM errors are reported inside the returned result.
    #[instrument(skip(self, address), fields(address = %address, correlation_id = %Uuid::new_v4()))]
    pub async fn call(
        &self,
        address: &ContractAddress,
        gas_limit: Option<u64>,
    ) -> Result<ExecutionResult, ServiceError> {
        let gas_limit = gas_limit.unwrap_or(self.config.default_gas_limit);

        let lock = self.call_lock(address).await;
        let _guard = lock.lock().await;

        let code = self.state.get_code(address).await?;
        let storage = self.state.load_storage(address).await?;

        info!(gas_limit, "Processing contract call");

        let result = self.run(code, storage, gas_limit).await?;

        if result.is_success() {
            self.state
                .commit_storage(address, result.storage.clone())
                .await?;
            debug!(
                gas_used = result.gas_used(),
                slots = result.storage.len(),
                "Contract call committed"
            );
        } else {
            warn!(
                error = ?result.error(),
                pc = ?result.failed_pc(),
                "Contract call failed, storage not committed"
            );
        }

        Ok(result)
    }

    /// Lock serializing calls to `address`.
    async fn call_lock(&self, address: &ContractAddress) -> Arc<Mutex<()>> {
        let mut locks = self.call_locks.lock().await;
        Arc::clone(locks.entry(address.clone()).or_default())
    }

    /// Execute `code` without touching world state.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Timeout` when the run exceeds the time budget.
    #[instrument(skip(self, code, storage), fields(code_size = code.len(), correlation_id = %Uuid::new_v4()))]
    pub async fn execute_code(
        &self,
        code: Vec<u8>,
        storage: Storage,
        gas_limit: u64,
    ) -> Result<ExecutionResult, ServiceError> {
        self.run(code, storage, gas_limit).await
    }

    /// Run the interpreter on a blocking worker under the timeout.
    async fn run(
        &self,
        code: Vec<u8>,
        storage: Storage,
        gas_limit: u64,
    ) -> Result<ExecutionResult, ServiceError> {
        let interpreter = Arc::clone(&self.interpreter);
        let worker = tokio::task::spawn_blocking(move || {
            let result = interpreter.execute_traced(&code, storage, gas_limit, &mut LogTracer);
            if let InvariantCheckResult::Invalid(violations) = check_all_invariants(&result, &code)
            {
                error!(?violations, "Execution result violates invariants");
            }
            result
        });

        let timeout_ms = self.config.execution_timeout_ms;
        let start = Instant::now();
        let outcome = tokio::time::timeout(Duration::from_millis(timeout_ms), worker).await;
        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

        let mut stats = self.stats.write().await;
        stats.executions += 1;
        let total = stats.executions;
        stats.avg_execution_time_us =
            stats
                .avg_execution_time_us
                .saturating_mul(total - 1)
                .saturating_add(elapsed_us)
                / total;

        match outcome {
            Err(_) => {
                stats.timeouts += 1;
                error!(timeout_ms, "Execution timed out");
                Err(ServiceError::Timeout { timeout_ms })
            }
            Ok(Err(join_error)) => {
                stats.failed_executions += 1;
                error!(error = %join_error, "Execution worker failed");
                Err(ServiceError::Worker(join_error.to_string()))
            }
            Ok(Ok(result)) => {
                if result.is_success() {
                    stats.successful_executions += 1;
                } else {
                    stats.failed_executions += 1;
                }
                stats.total_gas_used = stats.total_gas_used.saturating_add(result.gas_used());
                Ok(result)
            }
        }
    }
}

/// Create a service over fresh in-memory state with default configuration.
#[must_use]
pub fn create_test_service() -> ContractService<InMemoryState> {
    ContractService::new(InMemoryState::new(), ServiceConfig::default())
}

// =============================================================================
// TESTS
// =============================================================================
