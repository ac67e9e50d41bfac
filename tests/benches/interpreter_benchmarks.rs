//! # BVM Interpreter Benchmarks
//!
//! | Group | What it measures |
//! |-------|------------------|
//! | bvm-dispatch | Straight-line arithmetic, per executed opcode |
//! | bvm-loops | Backward JUMPI loops with storage traffic |
//! | bvm-gas-profiles | Same program under both SSTORE schedules |
//! | bvm-jump-analysis | JUMPDEST scanning, positional vs code-flow |
//! | bvm-assembler | Source text to bytecode |
//! | bvm-service | Full call path through `spawn_blocking` and state commit |

use bvm_core::asm::{assemble, disassemble};
use bvm_core::domain::VmConfig;
use bvm_core::vm::{GasProfile, Interpreter, JumpAnalysis, JumpTable, Storage};
use bvm_state::prelude::*;
use bvm_tests::fixtures::{
    arithmetic_chain_source, countdown_gas, countdown_source, random_bytecode, COUNTER_ASM,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

// ============================================================================
// DISPATCH
// ============================================================================

fn bench_arithmetic_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvm-dispatch");
    group.measurement_time(Duration::from_secs(5));

    let interpreter = Interpreter::default();
    for rounds in [10usize, 100, 250] {
        let code = assemble(&arithmetic_chain_source(rounds)).expect("fixture assembles");
        // PUSH1 + 4 ops per round + STOP
        let executed = 2 + 4 * rounds as u64;

        group.throughput(Throughput::Elements(executed));
        group.bench_with_input(BenchmarkId::new("arithmetic_chain", rounds), &code, |b, code| {
            b.iter(|| black_box(interpreter.execute(code, Storage::new(), 1_000_000)))
        });
    }

    group.finish();
}

// ============================================================================
// LOOPS
// ============================================================================

fn bench_countdown_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvm-loops");
    group.measurement_time(Duration::from_secs(5));

    let interpreter = Interpreter::default();
    for n in [10u8, 100, 255] {
        let code = assemble(&countdown_source(n)).expect("fixture assembles");
        let gas = countdown_gas(n);

        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::new("countdown", n), &code, |b, code| {
            b.iter(|| black_box(interpreter.execute(code, Storage::new(), gas)))
        });
    }

    group.finish();
}

fn bench_gas_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvm-gas-profiles");

    let code = assemble(&countdown_source(100)).expect("fixture assembles");
    for profile in [GasProfile::Standard, GasProfile::StorageHeavy] {
        let interpreter = Interpreter::new(VmConfig::default().with_gas_profile(profile));
        group.bench_with_input(
            BenchmarkId::new("countdown_100", format!("{profile:?}")),
            &code,
            |b, code| b.iter(|| black_box(interpreter.execute(code, Storage::new(), u64::MAX))),
        );
    }

    group.finish();
}

// ============================================================================
// STATIC ANALYSIS
// ============================================================================

fn bench_jump_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvm-jump-analysis");

    let mut rng = StdRng::seed_from_u64(0xB0B);
    for len in [256usize, 4096, 24 * 1024] {
        let code = random_bytecode(&mut rng, len);

        group.throughput(Throughput::Bytes(len as u64));
        for mode in [JumpAnalysis::Positional, JumpAnalysis::CodeFlow] {
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), len),
                &code,
                |b, code| b.iter(|| black_box(JumpTable::analyze(code, mode))),
            );
        }
        group.bench_with_input(BenchmarkId::new("disassemble", len), &code, |b, code| {
            b.iter(|| black_box(disassemble(code)))
        });
    }

    group.finish();
}

fn bench_assembler(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvm-assembler");

    for rounds in [10usize, 100, 1000] {
        let source = arithmetic_chain_source(rounds);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("assemble", rounds), &source, |b, source| {
            b.iter(|| black_box(assemble(source)))
        });
    }

    group.finish();
}

// ============================================================================
// SERVICE
// ============================================================================

fn bench_service_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvm-service");

    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let service = create_test_service();
    let counter = ContractAddress::new("counter").expect("valid address");
    runtime
        .block_on(service.deploy(&counter, assemble(COUNTER_ASM).expect("fixture assembles")))
        .expect("deploy");

    group.bench_function("counter_call", |b| {
        b.iter(|| black_box(runtime.block_on(service.call(&counter, None))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_arithmetic_dispatch,
    bench_countdown_loops,
    bench_gas_profiles,
    bench_jump_analysis,
    bench_assembler,
    bench_service_call,
);
criterion_main!(benches);
