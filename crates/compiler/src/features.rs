//! Feature extraction for the observation spaces.

use crate::ir::{Module, Opcode};

/// Names of the Autophase features, in vector order.
pub const AUTOPHASE_FEATURES: [&str; 56] = [
    "BBNumArgsHi",
    "BBNumArgsLo",
    "onePred",
    "onePredOneSuc",
    "onePredTwoSuc",
    "oneSuccessor",
    "twoPred",
    "twoPredOneSuc",
    "twoEach",
    "twoSuccessor",
    "morePreds",
    "BB03Phi",
    "BBHiPhi",
    "BBNoPhi",
    "BeginPhi",
    "BranchCount",
    "returnInt",
    "CriticalCount",
    "NumEdges",
    "const32Bit",
    "const64Bit",
    "numConstZeroes",
    "numConstOnes",
    "UncondBranches",
    "binaryConstArg",
    "NumAShrInst",
    "NumAddInst",
    "NumAllocaInst",
    "NumAndInst",
    "BlockMid",
    "BlockLow",
    "NumBitCastInst",
    "NumBrInst",
    "NumCallInst",
    "NumGetElementPtrInst",
    "NumICmpInst",
    "NumLShrInst",
    "NumLoadInst",
    "NumMulInst",
    "NumOrInst",
    "NumPHIInst",
    "NumRetInst",
    "NumSExtInst",
    "NumSelectInst",
    "NumShlInst",
    "NumStoreInst",
    "NumSubInst",
    "NumTruncInst",
    "NumXorInst",
    "NumZExtInst",
    "TotalBlocks",
    "TotalInsts",
    "TotalMemInst",
    "TotalFuncs",
    "ArgsPhi",
    "testUnary",
];

/// Width of the `InstCount` vector: three totals then one count per opcode.
pub const INST_COUNT_WIDTH: usize = 3 + Opcode::ALL.len();

// Per-opcode Autophase slots. Opcodes without a slot are only counted in the
// totals.
const OPCODE_SLOTS: [(Opcode, usize); 24] = [
    (Opcode::AShr, 25),
    (Opcode::Add, 26),
    (Opcode::Alloca, 27),
    (Opcode::And, 28),
    (Opcode::BitCast, 31),
    (Opcode::Br, 32),
    (Opcode::Call, 33),
    (Opcode::GetElementPtr, 34),
    (Opcode::ICmp, 35),
    (Opcode::LShr, 36),
    (Opcode::Load, 37),
    (Opcode::Mul, 38),
    (Opcode::Or, 39),
    (Opcode::Phi, 40),
    (Opcode::Ret, 41),
    (Opcode::SExt, 42),
    (Opcode::Select, 43),
    (Opcode::Shl, 44),
    (Opcode::Store, 45),
    (Opcode::Sub, 46),
    (Opcode::Trunc, 47),
    (Opcode::Xor, 48),
    (Opcode::ZExt, 49),
    // branch count
    (Opcode::Br, 15),
];

/// Computes the 56 Autophase features of `module`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn autophase(module: &Module) -> Vec<f32> {
    let mut f = [0usize; 56];

    for function in &module.functions {
        let preds = function.predecessor_counts();
        for (block, &pred) in function.blocks.iter().zip(&preds) {
            let succ = block.successors.len();
            let phis = block.phi_count();
            let phi_args = phis * pred;

            match phi_args {
                0 => {}
                1..=5 => f[1] += 1,
                _ => f[0] += 1,
            }
            match (pred, succ) {
                (1, 1) => f[3] += 1,
                (1, 2) => f[4] += 1,
                (2, 1) => f[7] += 1,
                (2, 2) => f[8] += 1,
                _ => {}
            }
            match pred {
                1 => f[2] += 1,
                2 => f[6] += 1,
                p if p > 2 => f[10] += 1,
                _ => {}
            }
            match succ {
                1 => f[5] += 1,
                2 => f[9] += 1,
                _ => {}
            }
            match phis {
                0 => f[13] += 1,
                1..=3 => f[11] += 1,
                _ => f[12] += 1,
            }
            f[14] += block
                .instructions
                .iter()
                .take_while(|i| i.opcode == Opcode::Phi)
                .count();
            if succ == 1 {
                f[23] += 1;
            }
            if succ > 1 {
                f[17] += block.successors.iter().filter(|&&s| preds[s] > 1).count();
            }
            f[18] += succ;
            match block.instructions.len() {
                0..=14 => f[30] += 1,
                15..=500 => f[29] += 1,
                _ => {}
            }
            f[54] += phi_args;
        }
        if function.returns_int {
            f[16] += function
                .blocks
                .iter()
                .filter_map(|b| b.terminator())
                .filter(|t| t.opcode == Opcode::Ret)
                .count();
        }
    }

    for inst in module.instructions() {
        if let Some(c) = inst.constant {
            if i32::try_from(c).is_ok() {
                f[19] += 1;
            } else {
                f[20] += 1;
            }
            match c {
                0 => f[21] += 1,
                1 => f[22] += 1,
                _ => {}
            }
            if inst.opcode.is_binary() {
                f[24] += 1;
            }
        }
        if inst.opcode.is_memory() {
            f[52] += 1;
        }
        if inst.opcode.is_cast() {
            f[55] += 1;
        }
    }

    let counts = module.opcode_counts();
    for (opcode, slot) in OPCODE_SLOTS {
        f[slot] = counts[opcode.index()];
    }
    f[50] = module.block_count();
    f[51] = module.instruction_count();
    f[53] = module.functions.len();

    f.iter().map(|&v| v as f32).collect()
}

/// Block, instruction and function totals followed by per-opcode counts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn inst_count(module: &Module) -> Vec<f32> {
    let totals = [
        module.block_count(),
        module.instruction_count(),
        module.functions.len(),
    ];
    totals
        .into_iter()
        .chain(module.opcode_counts())
        .map(|v| v as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{cbench_uris, Benchmark};

    fn feature(name: &str) -> usize {
        AUTOPHASE_FEATURES.iter().position(|&n| n == name).unwrap()
    }

    #[test]
    fn vectors_have_declared_widths() {
        let module = Benchmark::from_uri("cbench-v1/qsort").unwrap().module().clone();
        assert_eq!(autophase(&module).len(), AUTOPHASE_FEATURES.len());
        assert_eq!(inst_count(&module).len(), INST_COUNT_WIDTH);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn totals_agree_with_module() {
        for uri in cbench_uris() {
            let module = Benchmark::from_uri(&uri).unwrap().module().clone();
            let features = autophase(&module);
            assert_eq!(features[feature("TotalInsts")], module.instruction_count() as f32);
            assert_eq!(features[feature("TotalBlocks")], module.block_count() as f32);
            assert_eq!(features[feature("TotalFuncs")], module.functions.len() as f32);
            assert_eq!(features[feature("BranchCount")], features[feature("NumBrInst")]);

            let counts = inst_count(&module);
            assert_eq!(counts[1], module.instruction_count() as f32);
            let per_opcode: f32 = counts[3..].iter().sum();
            assert_eq!(per_opcode, counts[1]);
        }
    }

    #[test]
    fn feature_names_are_unique() {
        let mut names = AUTOPHASE_FEATURES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 56);
    }
}
