//! A deliberately small SSA-flavoured IR.
//!
//! Modules hold functions, functions hold basic blocks, blocks hold
//! instructions. Instructions do not carry operands; instead each one records
//! the facts the optimization passes care about (is it dead, is it a
//! duplicate, does it address a promotable stack slot). Every block ends with
//! exactly one terminator (`Br` or `Ret`) and `successors` lists its outgoing
//! edges.

/// Instruction opcodes, in the order used by count-based observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    AShr,
    Add,
    Alloca,
    And,
    BitCast,
    Br,
    Call,
    GetElementPtr,
    ICmp,
    LShr,
    Load,
    Mul,
    Or,
    Phi,
    Ret,
    SExt,
    Select,
    Shl,
    Store,
    Sub,
    Trunc,
    Xor,
    ZExt,
}

impl Opcode {
    pub const ALL: [Opcode; 23] = [
        Opcode::AShr,
        Opcode::Add,
        Opcode::Alloca,
        Opcode::And,
        Opcode::BitCast,
        Opcode::Br,
        Opcode::Call,
        Opcode::GetElementPtr,
        Opcode::ICmp,
        Opcode::LShr,
        Opcode::Load,
        Opcode::Mul,
        Opcode::Or,
        Opcode::Phi,
        Opcode::Ret,
        Opcode::SExt,
        Opcode::Select,
        Opcode::Shl,
        Opcode::Store,
        Opcode::Sub,
        Opcode::Trunc,
        Opcode::Xor,
        Opcode::ZExt,
    ];

    /// Opcodes that may appear in a block body (no terminators, no phis).
    pub const BODY: [Opcode; 20] = [
        Opcode::AShr,
        Opcode::Add,
        Opcode::Alloca,
        Opcode::And,
        Opcode::BitCast,
        Opcode::Call,
        Opcode::GetElementPtr,
        Opcode::ICmp,
        Opcode::LShr,
        Opcode::Load,
        Opcode::Mul,
        Opcode::Or,
        Opcode::SExt,
        Opcode::Select,
        Opcode::Shl,
        Opcode::Store,
        Opcode::Sub,
        Opcode::Trunc,
        Opcode::Xor,
        Opcode::ZExt,
    ];

    #[must_use]
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Ret)
    }

    /// Instructions that must survive even when their result is unused.
    #[must_use]
    pub fn has_side_effects(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Ret | Opcode::Call | Opcode::Store)
    }

    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Opcode::AShr
                | Opcode::Add
                | Opcode::And
                | Opcode::LShr
                | Opcode::Mul
                | Opcode::Or
                | Opcode::Shl
                | Opcode::Sub
                | Opcode::Xor
        )
    }

    #[must_use]
    pub fn is_cast(self) -> bool {
        matches!(self, Opcode::BitCast | Opcode::SExt | Opcode::Trunc | Opcode::ZExt)
    }

    #[must_use]
    pub fn is_memory(self) -> bool {
        matches!(
            self,
            Opcode::Alloca | Opcode::Load | Opcode::Store | Opcode::GetElementPtr
        )
    }

    /// Index of the opcode in [`Opcode::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Immediate operand, if the instruction has one.
    pub constant: Option<i64>,
    /// The result has no users.
    pub dead: bool,
    /// Recomputes a value already available in the block.
    pub redundant: bool,
    /// Memory traffic on a stack slot that can live in a register.
    pub promotable: bool,
    /// Index of the called function for internal calls.
    pub callee: Option<usize>,
}

impl Instruction {
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            constant: None,
            dead: false,
            redundant: false,
            promotable: false,
            callee: None,
        }
    }

    #[must_use]
    pub fn with_constant(mut self, value: i64) -> Self {
        self.constant = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub instructions: Vec<Instruction>,
    pub successors: Vec<usize>,
    /// Known trip count when this block is a single-block loop.
    pub trip_count: Option<u32>,
}

impl BasicBlock {
    #[must_use]
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.opcode.is_terminator())
    }

    #[must_use]
    pub fn phi_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.opcode == Opcode::Phi)
            .count()
    }

    /// True for a block that branches back to itself.
    #[must_use]
    pub fn is_self_loop(&self, index: usize) -> bool {
        self.successors.contains(&index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub args: u32,
    pub returns_int: bool,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    /// Number of incoming edges for every block.
    #[must_use]
    pub fn predecessor_counts(&self) -> Vec<usize> {
        let mut preds = vec![0; self.blocks.len()];
        for block in &self.blocks {
            for &succ in &block.successors {
                preds[succ] += 1;
            }
        }
        preds
    }

    /// Removes block `index`, renumbering successor edges.
    ///
    /// The caller guarantees that no remaining block branches to `index`.
    pub fn remove_block(&mut self, index: usize) {
        self.blocks.remove(index);
        for block in &mut self.blocks {
            for succ in &mut block.successors {
                debug_assert_ne!(*succ, index, "removed block still has predecessors");
                if *succ > index {
                    *succ -= 1;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.functions.iter().map(Function::instruction_count).sum()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.functions.iter().map(|f| f.blocks.len()).sum()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.functions
            .iter()
            .flat_map(|f| f.blocks.iter())
            .flat_map(|b| b.instructions.iter())
    }

    /// Per-opcode instruction counts, indexed like [`Opcode::ALL`].
    #[must_use]
    pub fn opcode_counts(&self) -> [usize; 23] {
        let mut counts = [0; 23];
        for inst in self.instructions() {
            counts[inst.opcode.index()] += 1;
        }
        counts
    }

    /// Checks the structural invariants every pass must preserve.
    ///
    /// # Errors
    ///
    /// Describes the first violated invariant.
    pub fn verify(&self) -> Result<(), String> {
        for function in &self.functions {
            if function.blocks.is_empty() {
                return Err(format!("function {} has no blocks", function.name));
            }
            for (index, block) in function.blocks.iter().enumerate() {
                let Some(term) = block.terminator() else {
                    return Err(format!("{}: block {index} has no terminator", function.name));
                };
                let terminators = block
                    .instructions
                    .iter()
                    .filter(|i| i.opcode.is_terminator())
                    .count();
                if terminators != 1 {
                    return Err(format!(
                        "{}: block {index} has {terminators} terminators",
                        function.name
                    ));
                }
                match term.opcode {
                    Opcode::Ret if !block.successors.is_empty() => {
                        return Err(format!("{}: ret block {index} has successors", function.name));
                    }
                    Opcode::Br if block.successors.is_empty() => {
                        return Err(format!("{}: br block {index} has no successors", function.name));
                    }
                    _ => {}
                }
                if let Some(&bad) = block.successors.iter().find(|&&s| s >= function.blocks.len()) {
                    return Err(format!(
                        "{}: block {index} branches to missing block {bad}",
                        function.name
                    ));
                }
            }
            for inst in function.blocks.iter().flat_map(|b| &b.instructions) {
                if let Some(callee) = inst.callee {
                    if callee >= self.functions.len() {
                        return Err(format!("{}: call to missing function {callee}", function.name));
                    }
                }
            }
        }
        Ok(())
    }
}
