//! # Interpreter Properties
//!
//! Properties checked over generated bytecode and operands:
//!
//! - Execution never panics, whatever the bytes.
//! - Same code, storage and gas limit always give the same result.
//! - Results survive a JSON encode and decode unchanged.
//! - Gas remaining never exceeds the limit; failures point into the code.
//! - Arithmetic matches wrapping 64-bit semantics with `b op a` ordering.
//! - Extra gas never turns a success into a failure.
//! - Exactly enough gas succeeds, one unit less fails at the last opcode.
//! - Code-flow jump analysis registers a subset of the positional offsets.

#[cfg(test)]
mod tests {
    use crate::fixtures::random_bytecode;
    use bvm_core::asm::{assemble, disassemble};
    use bvm_core::domain::{check_all_invariants, ExecutionResult, VmConfig, Word};
    use bvm_core::errors::VmError;
    use bvm_core::vm::{
        execute, GasProfile, Interpreter, JumpAnalysis, JumpTable, Opcode, Storage,
    };
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Runs `op` over slot 0 (`b`) and slot 1 (`a`), pushed in that order.
    fn binary(op: &str, b: Word, a: Word) -> Word {
        let source = format!("PUSH1 0 SLOAD PUSH1 1 SLOAD {op}");
        let code = assemble(&source).unwrap();
        let storage: Storage = [(0, b), (1, a)].into_iter().collect();
        let result = execute(&code, storage, 1_000);
        assert!(result.is_success(), "{op}: {:?}", result.error());
        assert_eq!(result.stack.len(), 1);
        result.stack[0]
    }

    fn any_code() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..96),
            (any::<u64>(), 0usize..96).prop_map(|(seed, len)| {
                random_bytecode(&mut StdRng::seed_from_u64(seed), len)
            }),
        ]
    }

    fn any_config() -> impl Strategy<Value = VmConfig> {
        (any::<bool>(), any::<bool>()).prop_map(|(heavy, code_flow)| {
            VmConfig::default()
                .with_gas_profile(if heavy {
                    GasProfile::StorageHeavy
                } else {
                    GasProfile::Standard
                })
                .with_jump_analysis(if code_flow {
                    JumpAnalysis::CodeFlow
                } else {
                    JumpAnalysis::Positional
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_arbitrary_code_respects_invariants(
            code in any_code(),
            gas in 0u64..20_000,
            config in any_config(),
        ) {
            let result = Interpreter::new(config).execute(&code, Storage::new(), gas);
            let check = check_all_invariants(&result, &code);
            prop_assert!(check.is_valid(), "{:?}", check);
            prop_assert!(result.gas_remaining <= gas);
            prop_assert_eq!(result.gas_limit, gas);
        }

        #[test]
        fn prop_execution_is_deterministic(
            code in any_code(),
            gas in 0u64..20_000,
            seed in prop::collection::btree_map(-4i64..4, any::<i64>(), 0..4),
        ) {
            let storage = Storage::from(seed);
            let first = execute(&code, storage.clone(), gas);
            let second = execute(&code, storage, gas);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_result_survives_json(
            code in any_code(),
            gas in 0u64..20_000,
            seed in prop::collection::btree_map(any::<i64>(), any::<i64>(), 0..4),
        ) {
            let result = execute(&code, Storage::from(seed), gas);
            let json = serde_json::to_string(&result).unwrap();
            let decoded: ExecutionResult = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(decoded, result);
        }

        #[test]
        fn prop_failure_points_at_offending_byte(
            code in any_code(),
            gas in 0u64..20_000,
        ) {
            let result = execute(&code, Storage::new(), gas);
            if let Some(pc) = result.failed_pc() {
                prop_assert!(pc < code.len());
                let info = result.failure_info().unwrap();
                prop_assert_eq!(info.opcode, code[pc]);
                if let Some(VmError::InvalidOpcode(byte)) = result.error() {
                    prop_assert_eq!(byte, code[pc]);
                    prop_assert!(Opcode::from_byte(byte).is_none());
                }
            }
        }

        #[test]
        fn prop_add_and_mul_wrap(b in any::<i64>(), a in any::<i64>()) {
            prop_assert_eq!(binary("ADD", b, a), b.wrapping_add(a));
            prop_assert_eq!(binary("MUL", b, a), b.wrapping_mul(a));
        }

        #[test]
        fn prop_sub_is_b_minus_a(b in any::<i64>(), a in any::<i64>()) {
            prop_assert_eq!(binary("SUB", b, a), b.wrapping_sub(a));
        }

        #[test]
        fn prop_div_and_mod_truncate_and_tolerate_zero(b in any::<i64>(), a in any::<i64>()) {
            let (quotient, remainder) = if a == 0 {
                (0, 0)
            } else {
                (b.wrapping_div(a), b.wrapping_rem(a))
            };
            prop_assert_eq!(binary("DIV", b, a), quotient);
            prop_assert_eq!(binary("MOD", b, a), remainder);
        }

        #[test]
        fn prop_comparisons_are_zero_or_one(b in -3i64..3, a in -3i64..3) {
            prop_assert_eq!(binary("LT", b, a), Word::from(b < a));
            prop_assert_eq!(binary("GT", b, a), Word::from(b > a));
            prop_assert_eq!(binary("LTE", b, a), Word::from(b <= a));
            prop_assert_eq!(binary("GTE", b, a), Word::from(b >= a));
            prop_assert_eq!(binary("EQ", b, a), Word::from(b == a));
        }

        #[test]
        fn prop_more_gas_never_hurts_a_success(
            code in any_code(),
            gas in 0u64..5_000,
            extra in 0u64..5_000,
        ) {
            let tight = execute(&code, Storage::new(), gas);
            prop_assume!(tight.is_success());
            let loose = execute(&code, Storage::new(), gas + extra);
            prop_assert!(loose.is_success());
            prop_assert_eq!(loose.gas_used(), tight.gas_used());
            prop_assert_eq!(loose.stack, tight.stack);
            prop_assert_eq!(loose.storage, tight.storage);
        }

        #[test]
        fn prop_exact_gas_boundary(values in prop::collection::vec(any::<u8>(), 1..64)) {
            let code: Vec<u8> = values
                .iter()
                .flat_map(|&v| [Opcode::Push1.byte(), v])
                .collect();
            let needed = 3 * values.len() as u64;

            let exact = execute(&code, Storage::new(), needed);
            prop_assert!(exact.is_success());
            prop_assert_eq!(exact.gas_remaining, 0);
            let expected: Vec<Word> = values.iter().map(|&v| Word::from(v)).collect();
            prop_assert_eq!(exact.stack, expected);

            let short = execute(&code, Storage::new(), needed - 1);
            prop_assert_eq!(short.error(), Some(VmError::OutOfGas));
            prop_assert_eq!(short.failed_pc(), Some(code.len() - 2));
            // The failing PUSH1 is never charged.
            prop_assert_eq!(short.gas_remaining, 2);
        }

        #[test]
        fn prop_code_flow_table_is_subset(code in any_code()) {
            let positional = JumpTable::analyze(&code, JumpAnalysis::Positional);
            let code_flow = JumpTable::analyze(&code, JumpAnalysis::CodeFlow);
            for offset in code_flow.offsets() {
                prop_assert!(positional.offsets().contains(&offset));
                prop_assert_eq!(code[offset], Opcode::JumpDest.byte());
            }
            prop_assert!(code_flow.len() <= positional.len());
        }

        #[test]
        fn prop_disassembly_covers_every_byte(code in any_code()) {
            let instructions = disassemble(&code);
            let covered: usize = instructions.iter().map(|i| i.size()).sum();
            prop_assert_eq!(covered, code.len());
            let mut expected_offset = 0;
            for ins in &instructions {
                prop_assert_eq!(ins.offset, expected_offset);
                expected_offset += ins.size();
            }
        }
    }
}
