//! Benchmark datasets.
//!
//! Programs are synthesized deterministically from their URI, so the same
//! benchmark always yields the same module on every machine.

use gym::ConstructionError;
use thiserror::Error;

use crate::ir::{BasicBlock, Function, Instruction, Module, Opcode};

pub const SCHEME: &str = "benchmark://";

/// Named programs modeled on a small embedded-benchmark suite.
pub const CBENCH_DATASET: &str = "cbench-v1";

/// Programs keyed by a numeric seed, e.g. `benchmark://rand-v0/42`.
pub const RANDOM_DATASET: &str = "rand-v0";

pub const CBENCH_PROGRAMS: [&str; 16] = [
    "adpcm",
    "bitcount",
    "blowfish",
    "bzip2",
    "crc32",
    "dijkstra",
    "gsm",
    "jpeg-c",
    "jpeg-d",
    "lame",
    "patricia",
    "qsort",
    "sha",
    "stringsearch",
    "susan",
    "tiff2bw",
];

pub const DEFAULT_BENCHMARK: &str = "benchmark://cbench-v1/crc32";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkError {
    #[error("malformed benchmark uri {0:?}, expected <dataset>/<name>")]
    Malformed(String),
    #[error("unknown dataset {0}")]
    UnknownDataset(String),
    #[error("dataset {dataset} has no benchmark {name}")]
    UnknownProgram { dataset: String, name: String },
}

impl From<BenchmarkError> for ConstructionError {
    fn from(err: BenchmarkError) -> Self {
        ConstructionError::UnknownBenchmark(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Benchmark {
    uri: String,
    module: Module,
}

impl Benchmark {
    /// Resolves a benchmark URI. The `benchmark://` scheme is optional.
    ///
    /// # Errors
    ///
    /// Returns a [`BenchmarkError`] for malformed URIs, unknown datasets and
    /// unknown program names.
    pub fn from_uri(uri: &str) -> Result<Self, BenchmarkError> {
        let path = uri.strip_prefix(SCHEME).unwrap_or(uri);
        let (dataset, name) = path
            .split_once('/')
            .filter(|(d, n)| !d.is_empty() && !n.is_empty() && !n.contains('/'))
            .ok_or_else(|| BenchmarkError::Malformed(uri.to_string()))?;

        let unknown = || BenchmarkError::UnknownProgram {
            dataset: dataset.to_string(),
            name: name.to_string(),
        };
        let seed = match dataset {
            CBENCH_DATASET => {
                if !CBENCH_PROGRAMS.contains(&name) {
                    return Err(unknown());
                }
                stable_hash(name)
            }
            RANDOM_DATASET => name.parse::<u64>().map_err(|_| unknown())?,
            other => return Err(BenchmarkError::UnknownDataset(other.to_string())),
        };

        Ok(Self {
            uri: format!("{SCHEME}{dataset}/{name}"),
            module: generate(seed),
        })
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }
}

/// Every URI of the `cbench-v1` dataset.
pub fn cbench_uris() -> impl Iterator<Item = String> {
    CBENCH_PROGRAMS
        .iter()
        .map(|name| format!("{SCHEME}{CBENCH_DATASET}/{name}"))
}

/// FNV-1a, so seeds do not depend on the standard library's hasher.
fn stable_hash(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Synthesizes a module from `seed`.
#[must_use]
pub fn generate(seed: u64) -> Module {
    let mut rng = fastrand::Rng::with_seed(seed);
    let n_functions = rng.usize(2..=6);
    let functions = (0..n_functions)
        .map(|index| generate_function(&mut rng, index, n_functions))
        .collect();
    Module { functions }
}

fn generate_function(rng: &mut fastrand::Rng, index: usize, n_functions: usize) -> Function {
    let n_blocks = rng.usize(1..=8);
    let stack_slots = rng.usize(0..=4);
    let mut blocks = Vec::with_capacity(n_blocks);

    for b in 0..n_blocks {
        let mut instructions = Vec::new();
        if b == 0 {
            for _ in 0..stack_slots {
                let mut alloca = Instruction::new(Opcode::Alloca);
                alloca.promotable = rng.u8(..5) != 0;
                instructions.push(alloca);
            }
        }
        for _ in 0..rng.usize(2..=12) {
            instructions.push(random_instruction(rng, index, n_functions, stack_slots > 0));
        }

        let (successors, trip_count) = if b + 1 == n_blocks {
            (Vec::new(), None)
        } else if rng.u8(..4) == 0 {
            (vec![b, b + 1], Some(rng.u32(1..=16)))
        } else if b + 2 < n_blocks && rng.u8(..10) < 3 {
            (vec![b + 1, rng.usize(b + 2..n_blocks)], None)
        } else {
            (vec![b + 1], None)
        };
        if successors.len() == 2 {
            instructions.push(Instruction::new(Opcode::ICmp));
        }
        let terminator = if successors.is_empty() { Opcode::Ret } else { Opcode::Br };
        instructions.push(Instruction::new(terminator));
        blocks.push(BasicBlock { instructions, successors, trip_count });
    }

    Function {
        name: if index == 0 { "main".to_string() } else { format!("fn{index}") },
        args: rng.u32(0..=5),
        returns_int: rng.bool(),
        blocks,
    }
}

fn random_instruction(
    rng: &mut fastrand::Rng,
    index: usize,
    n_functions: usize,
    has_slots: bool,
) -> Instruction {
    let opcode = match Opcode::BODY[rng.usize(..Opcode::BODY.len())] {
        // stack slots live in the entry block
        Opcode::Alloca => Opcode::Load,
        op => op,
    };
    let mut inst = Instruction::new(opcode);
    match opcode {
        Opcode::Load | Opcode::Store => inst.promotable = has_slots && rng.u8(..4) != 0,
        Opcode::GetElementPtr => inst.promotable = rng.bool(),
        Opcode::Call => {
            if n_functions > 1 && rng.u8(..10) < 7 {
                let mut callee = rng.usize(..n_functions - 1);
                if callee >= index {
                    callee += 1;
                }
                inst.callee = Some(callee);
            }
        }
        op if op.is_binary() && rng.u8(..10) < 4 => {
            inst.constant = Some(random_constant(rng));
        }
        _ => {}
    }
    if !opcode.has_side_effects() {
        inst.dead = rng.u8(..5) == 0;
        inst.redundant = rng.u8(..6) == 0;
    }
    inst
}

fn random_constant(rng: &mut fastrand::Rng) -> i64 {
    match rng.u8(..10) {
        0..=2 => 0,
        3 | 4 => 1,
        5..=8 => rng.i64(2..=64),
        _ => rng.i64(1 << 33..1 << 40),
    }
}
