//! # Service Flows
//!
//! End-to-end paths through the contract service:
//!
//! ```text
//! assemble/compile ──→ deploy ──→ call ──→ commit on success ──→ persisted state
//!                           └──→ failure ──→ state untouched
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        countdown_gas, countdown_source, COUNTER_ASM, COUNTER_GAS, COUNTER_JAVA,
        MATH_CONTRACT_JAVA, MATH_CONTRACT_VALUES, STORE_THEN_FAIL_ASM,
    };
    use bvm_core::asm::assemble;
    use bvm_core::lang::compile;
    use bvm_core::domain::VmConfig;
    use bvm_core::errors::VmError;
    use bvm_core::vm::{GasProfile, Storage};
    use bvm_state::prelude::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn addr(name: &str) -> ContractAddress {
        ContractAddress::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_counter_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world.json");
        let counter = addr("counter");

        {
            let state = JsonFileState::open(&path).await.unwrap();
            let service = ContractService::new(state, ServiceConfig::default());
            service
                .deploy(&counter, assemble(COUNTER_ASM).unwrap())
                .await
                .unwrap();
            for expected in 1..=3 {
                let result = service.call(&counter, Some(100)).await.unwrap();
                assert!(result.is_success());
                assert_eq!(result.gas_used(), COUNTER_GAS);
                assert_eq!(result.storage.get(0), expected);
            }
        }

        let reopened = JsonFileState::open(&path).await.unwrap();
        let storage = reopened.load_storage(&counter).await.unwrap();
        assert_eq!(storage.get(0), 3);

        let service = ContractService::new(reopened, ServiceConfig::default());
        let result = service.call(&counter, None).await.unwrap();
        assert_eq!(result.storage.get(0), 4);
    }

    #[tokio::test]
    async fn test_failed_call_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world.json");
        let contract = addr("fails");

        let state = JsonFileState::open(&path).await.unwrap();
        let service = ContractService::new(state, ServiceConfig::default());
        service
            .deploy(&contract, assemble(STORE_THEN_FAIL_ASM).unwrap())
            .await
            .unwrap();
        let before = tokio::fs::read(&path).await.unwrap();

        let result = service.call(&contract, Some(1_000)).await.unwrap();
        assert_eq!(result.error(), Some(VmError::InvalidJumpDestination(42)));
        assert_eq!(result.failed_pc(), Some(7));
        // The failed run still reports the write it made before failing.
        assert_eq!(result.storage.get(0), 99);

        let after = tokio::fs::read(&path).await.unwrap();
        assert_eq!(before, after);
        assert!(service
            .state()
            .load_storage(&contract)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_out_of_gas_call_is_not_committed() {
        let service = create_test_service();
        let counter = addr("counter");
        service
            .deploy(&counter, assemble(COUNTER_ASM).unwrap())
            .await
            .unwrap();

        let result = service.call(&counter, Some(COUNTER_GAS - 1)).await.unwrap();
        assert_eq!(result.error(), Some(VmError::OutOfGas));
        // Only the SSTORE at offset 8 was unaffordable.
        assert_eq!(result.failed_pc(), Some(8));
        assert_eq!(result.gas_remaining, 4);

        let stored = service.state().load_storage(&counter).await.unwrap();
        assert_eq!(stored.get(0), 0);

        let stats = service.stats().await;
        assert_eq!(stats.failed_executions, 1);
        assert_eq!(stats.total_gas_used, COUNTER_GAS - 1 - 4);
    }

    #[tokio::test]
    async fn test_countdown_loop_through_service() {
        let service = create_test_service();
        let loop_addr = addr("countdown");
        service
            .deploy(&loop_addr, assemble(&countdown_source(50)).unwrap())
            .await
            .unwrap();

        let result = service.call(&loop_addr, None).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.gas_used(), countdown_gas(50));
        assert_eq!(service.stats().await.total_gas_used, countdown_gas(50));
    }

    #[tokio::test]
    async fn test_storage_heavy_profile_end_to_end() {
        let config = ServiceConfig {
            vm: VmConfig::default().with_gas_profile(GasProfile::StorageHeavy),
            ..ServiceConfig::default()
        };
        let service = ContractService::new(InMemoryState::new(), config);
        let counter = addr("counter");
        service
            .deploy(&counter, assemble(COUNTER_ASM).unwrap())
            .await
            .unwrap();

        // Enough for the standard schedule, far short of the heavy one.
        let result = service.call(&counter, Some(100)).await.unwrap();
        assert_eq!(result.error(), Some(VmError::OutOfGas));

        let result = service.call(&counter, Some(1_000)).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.gas_used(), COUNTER_GAS - 5 + 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_on_distinct_contracts() {
        let service = Arc::new(create_test_service());
        let code = assemble(COUNTER_ASM).unwrap();
        let addresses: Vec<ContractAddress> =
            (0..8).map(|i| addr(&format!("counter-{i}"))).collect();
        for address in &addresses {
            service.deploy(address, code.clone()).await.unwrap();
        }

        let mut tasks = tokio::task::JoinSet::new();
        for (i, address) in addresses.iter().cloned().enumerate() {
            let service = Arc::clone(&service);
            tasks.spawn(async move {
                for _ in 0..=i {
                    let result = service.call(&address, None).await.unwrap();
                    assert!(result.is_success());
                }
                address
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        for (i, address) in addresses.iter().enumerate() {
            let storage = service.state().load_storage(address).await.unwrap();
            assert_eq!(storage.get(0), i64::try_from(i).unwrap() + 1);
        }
        assert_eq!(service.stats().await.successful_executions, 36);
    }

    #[tokio::test]
    async fn test_execute_code_is_stateless() {
        let service = create_test_service();
        let code = assemble(COUNTER_ASM).unwrap();
        let seeded: Storage = [(0, 41)].into_iter().collect();

        let result = service.execute_code(code, seeded, 100).await.unwrap();
        assert_eq!(result.storage.get(0), 42);
        assert!(service.state().addresses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redeploy_rejected() {
        let service = create_test_service();
        let counter = addr("counter");
        let code = assemble(COUNTER_ASM).unwrap();
        service.deploy(&counter, code.clone()).await.unwrap();

        let err = service.deploy(&counter, code).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::State(StateError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_compiled_math_contract_storage() {
        let service = create_test_service();
        let math = addr("math");
        let contract = compile(MATH_CONTRACT_JAVA).unwrap();
        service.deploy(&math, contract.code.clone()).await.unwrap();

        let result = service.call(&math, None).await.unwrap();
        assert!(result.is_success(), "{:?}", result.error());

        let stored = service.state().load_storage(&math).await.unwrap();
        assert_eq!(stored.len(), MATH_CONTRACT_VALUES.len());
        for (name, value) in MATH_CONTRACT_VALUES {
            let slot = contract.slot(name).unwrap();
            assert_eq!(stored.get(slot), value, "{name}");
        }
    }

    #[tokio::test]
    async fn test_compiled_counter_accumulates_across_calls() {
        let service = create_test_service();
        let counter = addr("java-counter");
        let contract = compile(COUNTER_JAVA).unwrap();
        service.deploy(&counter, contract.code).await.unwrap();

        for expected in 1..=3 {
            let result = service.call(&counter, None).await.unwrap();
            assert_eq!(result.storage.get(0), expected);
        }
    }
}
