//! Optimization passes: the action space of a compiler session.
//!
//! Every pass is deterministic and monotone: a pass either leaves the module
//! untouched or strictly shrinks the tuple (unrollable loops, internal
//! calls, promotable memory operations, instructions + blocks) in
//! lexicographic order. Applying passes in any order therefore reaches a
//! module that no pass changes, which is where an episode ends.

use gym::ActionSpace;

use crate::ir::{Function, Instruction, Module, Opcode};

/// Largest trip count `-loop-unroll` fully unrolls.
pub const MAX_UNROLL: u32 = 8;

/// Largest callee, in instructions, that `-inline` copies into its callers.
pub const INLINE_THRESHOLD: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Dce,
    Gvn,
    Inline,
    InstCombine,
    LoopUnroll,
    Mem2Reg,
    SimplifyCfg,
    Sroa,
}

/// Size-oriented pipeline used as the reward baseline.
pub const OZ_PIPELINE: [Pass; 10] = [
    Pass::Sroa,
    Pass::Mem2Reg,
    Pass::InstCombine,
    Pass::SimplifyCfg,
    Pass::Inline,
    Pass::Gvn,
    Pass::Dce,
    Pass::InstCombine,
    Pass::SimplifyCfg,
    Pass::Dce,
];

impl Pass {
    pub const ALL: [Pass; 8] = [
        Pass::Dce,
        Pass::Gvn,
        Pass::Inline,
        Pass::InstCombine,
        Pass::LoopUnroll,
        Pass::Mem2Reg,
        Pass::SimplifyCfg,
        Pass::Sroa,
    ];

    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Pass::Dce => "-dce",
            Pass::Gvn => "-gvn",
            Pass::Inline => "-inline",
            Pass::InstCombine => "-instcombine",
            Pass::LoopUnroll => "-loop-unroll",
            Pass::Mem2Reg => "-mem2reg",
            Pass::SimplifyCfg => "-simplifycfg",
            Pass::Sroa => "-sroa",
        }
    }

    #[must_use]
    pub fn from_flag(flag: &str) -> Option<Pass> {
        Pass::ALL.into_iter().find(|p| p.flag() == flag)
    }

    /// Runs the pass. Returns whether the module changed.
    pub fn run(self, module: &mut Module) -> bool {
        let before = module.clone();
        match self {
            Pass::Dce => module.functions.iter_mut().for_each(dce),
            Pass::Gvn => module.functions.iter_mut().for_each(gvn),
            Pass::Inline => inline(module),
            Pass::InstCombine => module.functions.iter_mut().for_each(instcombine),
            Pass::LoopUnroll => module.functions.iter_mut().for_each(loop_unroll),
            Pass::Mem2Reg => module.functions.iter_mut().for_each(mem2reg),
            Pass::SimplifyCfg => module.functions.iter_mut().for_each(simplify_cfg),
            Pass::Sroa => module.functions.iter_mut().for_each(sroa),
        }
        *module != before
    }
}

/// The action space exposing every pass, in [`Pass::ALL`] order.
#[must_use]
pub fn action_space() -> ActionSpace {
    ActionSpace::new(
        "PassesAll",
        Pass::ALL.iter().map(|p| p.flag().to_string()).collect(),
    )
}

/// True when no pass would change `module`.
#[must_use]
pub fn is_fixed_point(module: &Module) -> bool {
    Pass::ALL.iter().all(|pass| !pass.run(&mut module.clone()))
}

/// Applies [`OZ_PIPELINE`] twice to a copy of `module`.
#[must_use]
pub fn optimize_for_size(module: &Module) -> Module {
    let mut optimized = module.clone();
    for pass in OZ_PIPELINE.iter().chain(OZ_PIPELINE.iter()) {
        pass.run(&mut optimized);
    }
    optimized
}

fn dce(function: &mut Function) {
    for block in &mut function.blocks {
        block
            .instructions
            .retain(|i| !(i.dead && !i.opcode.has_side_effects()));
    }
}

fn gvn(function: &mut Function) {
    for block in &mut function.blocks {
        block
            .instructions
            .retain(|i| !(i.redundant && !i.opcode.has_side_effects()));
    }
}

fn is_identity(inst: &Instruction) -> bool {
    match (inst.opcode, inst.constant) {
        (
            Opcode::Add
            | Opcode::Sub
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Shl
            | Opcode::LShr
            | Opcode::AShr,
            Some(0),
        )
        | (Opcode::Mul, Some(0 | 1)) => true,
        _ => false,
    }
}

fn instcombine(function: &mut Function) {
    for block in &mut function.blocks {
        let mut combined: Vec<Instruction> = Vec::with_capacity(block.instructions.len());
        for inst in std::mem::take(&mut block.instructions) {
            if is_identity(&inst) {
                continue;
            }
            // ext followed by trunc back to the original width
            if inst.opcode == Opcode::Trunc
                && combined
                    .last()
                    .is_some_and(|prev| matches!(prev.opcode, Opcode::ZExt | Opcode::SExt))
            {
                combined.pop();
                continue;
            }
            combined.push(inst);
        }
        block.instructions = combined;
    }
}

fn loop_unroll(function: &mut Function) {
    for (index, block) in function.blocks.iter_mut().enumerate() {
        let Some(trip) = block.trip_count else { continue };
        if !(1..=MAX_UNROLL).contains(&trip) || !block.is_self_loop(index) {
            continue;
        }
        let Some(terminator) = block.instructions.pop() else { continue };
        if block
            .instructions
            .last()
            .is_some_and(|i| i.opcode == Opcode::ICmp)
        {
            block.instructions.pop();
        }
        let body: Vec<Instruction> = block
            .instructions
            .iter()
            .filter(|i| i.opcode != Opcode::Phi)
            .cloned()
            .collect();
        for _ in 1..trip {
            block.instructions.extend(body.iter().cloned());
        }
        block.instructions.push(terminator);
        block.successors.retain(|&s| s != index);
        block.trip_count = None;
    }
}

fn is_promotable_memory(inst: &Instruction) -> bool {
    inst.promotable && matches!(inst.opcode, Opcode::Alloca | Opcode::Load | Opcode::Store)
}

fn mem2reg(function: &mut Function) {
    let slots = function
        .blocks
        .iter()
        .flat_map(|b| &b.instructions)
        .filter(|i| i.opcode == Opcode::Alloca && i.promotable)
        .count();
    for block in &mut function.blocks {
        block.instructions.retain(|i| !is_promotable_memory(i));
    }
    if slots == 0 {
        return;
    }
    // values that flowed through memory now merge at join points
    let preds = function.predecessor_counts();
    for (block, &count) in function.blocks.iter_mut().zip(&preds) {
        if count >= 2 {
            let phis = vec![Instruction::new(Opcode::Phi); slots.min(3)];
            block.instructions.splice(0..0, phis);
        }
    }
}

fn sroa(function: &mut Function) {
    let single_block = function.blocks.len() == 1;
    for block in &mut function.blocks {
        block.instructions.retain(|i| {
            let scalarized = i.promotable && i.opcode == Opcode::GetElementPtr;
            !(scalarized || (single_block && is_promotable_memory(i)))
        });
    }
}

fn simplify_cfg(function: &mut Function) {
    loop {
        let preds = function.predecessor_counts();

        if let Some(unreachable) = (1..function.blocks.len()).find(|&i| preds[i] == 0) {
            function.remove_block(unreachable);
            continue;
        }

        // fold a block into its only predecessor when that predecessor
        // jumps unconditionally to it
        let merge = (1..function.blocks.len()).find_map(|b| {
            if preds[b] != 1 {
                return None;
            }
            let p = function.blocks.iter().position(|blk| blk.successors.contains(&b))?;
            (p != b && function.blocks[p].successors == [b]).then_some((p, b))
        });
        let Some((p, b)) = merge else { break };

        let absorbed = std::mem::take(&mut function.blocks[b].instructions);
        let successors = std::mem::take(&mut function.blocks[b].successors);
        let pred = &mut function.blocks[p];
        pred.instructions.pop();
        pred.instructions
            .extend(absorbed.into_iter().filter(|i| i.opcode != Opcode::Phi));
        pred.successors = successors;
        function.remove_block(b);
    }
}

fn inline(module: &mut Module) {
    let sizes: Vec<usize> = module
        .functions
        .iter()
        .map(Function::instruction_count)
        .collect();
    let bodies: Vec<Vec<Instruction>> = module
        .functions
        .iter()
        .map(|f| {
            f.blocks
                .iter()
                .flat_map(|b| &b.instructions)
                .filter(|i| {
                    !i.opcode.is_terminator() && !matches!(i.opcode, Opcode::Phi | Opcode::Call)
                })
                .cloned()
                .collect()
        })
        .collect();

    for (caller, function) in module.functions.iter_mut().enumerate() {
        let inlinable = |inst: &Instruction| {
            inst.opcode == Opcode::Call
                && inst
                    .callee
                    .is_some_and(|c| c != caller && sizes[c] <= INLINE_THRESHOLD)
        };
        for block in &mut function.blocks {
            if !block.instructions.iter().any(inlinable) {
                continue;
            }
            let mut expanded = Vec::with_capacity(block.instructions.len());
            for inst in std::mem::take(&mut block.instructions) {
                match inst.callee {
                    Some(callee) if inlinable(&inst) => expanded.extend(bodies[callee].iter().cloned()),
                    _ => expanded.push(inst),
                }
            }
            block.instructions = expanded;
        }
    }
}
