//! # Fixtures
//!
//! Assembly programs and bytecode generators shared by the integration tests
//! and the benchmarks. Sources are returned as text; callers assemble them.

use bvm_core::vm::Opcode;
use rand::Rng;

/// Adds one to slot 0 and stops. Costs 19 gas under the standard schedule.
pub const COUNTER_ASM: &str = "\
; slot[0] += 1
        PUSH1 0
        SLOAD
        PUSH1 1
        ADD
        PUSH1 0
        SSTORE
        STOP
";

/// Gas one counter call burns under the standard schedule.
pub const COUNTER_GAS: u64 = 19;

/// Stores 99 in slot 0, then jumps out of the code (JUMP at offset 7).
pub const STORE_THEN_FAIL_ASM: &str = "\
        PUSH1 99
        PUSH1 0
        SSTORE
        PUSH1 42
        JUMP
        STOP
";

/// Contract source that bumps its `count` slot on every call.
pub const COUNTER_JAVA: &str = "\
public class Counter {
    public static void main() {
        int count;
        count++;
    }
}
";

/// Arithmetic, comparison and zero checks over `a = 10`, `b = 4`.
pub const MATH_CONTRACT_JAVA: &str = "\
public class MathContract {
    public static void main() {
        int a = 10;
        int b = 4;

        int add = a + b;
        int sub = a - b;
        int mul = a * b;
        int div = a / b;
        int mod = a % b;

        int lt = a < b;
        int gt = a > b;
        int eq = a == b;
        int neq = a != b;
        int lte = a <= b;
        int gte = a >= b;

        int zero = 0;
        int isZero = !zero;
        int notZero = !a;
    }
}
";

/// Variable values [`MATH_CONTRACT_JAVA`] leaves in storage.
pub const MATH_CONTRACT_VALUES: [(&str, i64); 16] = [
    ("a", 10),
    ("b", 4),
    ("add", 14),
    ("sub", 6),
    ("mul", 40),
    ("div", 2),
    ("mod", 2),
    ("lt", 0),
    ("gt", 1),
    ("eq", 0),
    ("neq", 1),
    ("lte", 0),
    ("gte", 1),
    ("zero", 0),
    ("isZero", 1),
    ("notZero", 0),
];

/// Counts slot 0 down from `n` to zero, one loop pass per unit.
///
/// Costs [`countdown_gas`] under the standard schedule and leaves an empty
/// stack.
#[must_use]
pub fn countdown_source(n: u8) -> String {
    format!(
        "\
        PUSH1 {n}
        PUSH1 0
        SSTORE          ; slot[0] = n
loop:   PUSH1 0
        SLOAD
        PUSH1 1
        SUB
        PUSH1 0
        SSTORE          ; slot[0] -= 1
        PUSH1 0
        SLOAD
        PUSH1 @loop
        JUMPI           ; while slot[0] != 0
        STOP
"
    )
}

/// Gas burned by [`countdown_source`]: 11 for the setup, 38 per pass.
#[must_use]
pub fn countdown_gas(n: u8) -> u64 {
    11 + 38 * u64::from(n)
}

/// `PUSH1 1` followed by `n` rounds of `PUSH1 3 MUL PUSH1 7 ADD`.
#[must_use]
pub fn arithmetic_chain_source(n: usize) -> String {
    let mut source = String::from("PUSH1 1\n");
    for _ in 0..n {
        source.push_str("PUSH1 3\nMUL\nPUSH1 7\nADD\n");
    }
    source.push_str("STOP\n");
    source
}

/// Random bytecode biased towards the instruction set.
///
/// Roughly one byte in ten is drawn uniformly, so invalid opcodes and
/// truncated immediates still show up.
pub fn random_bytecode<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(len);
    while code.len() < len {
        if rng.gen_bool(0.1) {
            code.push(rng.gen());
            continue;
        }
        let op = Opcode::ALL[rng.gen_range(0..Opcode::ALL.len())];
        code.push(op.byte());
        if op.immediate_size() > 0 && code.len() < len {
            // Small operands so jumps have a chance of landing in range.
            code.push(rng.gen_range(0..=u8::try_from(len).unwrap_or(u8::MAX)));
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use bvm_core::asm::assemble;
    use bvm_core::vm::{execute, Storage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_counter_costs_documented_gas() {
        let code = assemble(COUNTER_ASM).unwrap();
        let result = execute(&code, Storage::new(), 1_000);
        assert!(result.is_success());
        assert_eq!(result.gas_used(), COUNTER_GAS);
        assert_eq!(result.storage.get(0), 1);
    }

    #[test]
    fn test_countdown_costs_documented_gas() {
        for n in [1u8, 2, 10, 255] {
            let code = assemble(&countdown_source(n)).unwrap();
            let result = execute(&code, Storage::new(), 1_000_000);
            assert!(result.is_success(), "n = {n}: {:?}", result.error());
            assert_eq!(result.gas_used(), countdown_gas(n), "n = {n}");
            assert_eq!(result.storage.get(0), 0);
            assert!(result.stack.is_empty());
        }
    }

    #[test]
    fn test_store_then_fail_fails_on_jump() {
        let code = assemble(STORE_THEN_FAIL_ASM).unwrap();
        let result = execute(&code, Storage::new(), 1_000);
        assert!(!result.is_success());
        assert_eq!(result.failed_pc(), Some(7));
        assert_eq!(
            result.error(),
            Some(bvm_core::errors::VmError::InvalidJumpDestination(42))
        );
        assert_eq!(result.storage.get(0), 99);
    }

    #[test]
    fn test_arithmetic_chain_value() {
        let code = assemble(&arithmetic_chain_source(3)).unwrap();
        let result = execute(&code, Storage::new(), 1_000);
        // 1 -> 10 -> 37 -> 118
        assert_eq!(result.stack, vec![118]);
    }

    #[test]
    fn test_random_bytecode_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [0, 1, 2, 64] {
            assert_eq!(random_bytecode(&mut rng, len).len(), len);
        }
    }
}
