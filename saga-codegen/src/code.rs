// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! A growing op sequence with its string pool.

use std::collections::HashMap;
use std::fmt;

use saga_ast::LabelId;

use crate::opcode::Op;

/// The code of one part (event body, function body, or the global
/// initializer), plus the string pool its `push_str` ops index into.
#[derive(Debug, Default)]
pub struct Code {
    pub ops: Vec<Op>,
    pub strings: Vec<String>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Mark a jump target at the current position.
    pub fn bind(&mut self, label: LabelId) {
        self.ops.push(Op::Label(label));
    }

    /// Pool index of `s`, interning it on first use. Duplicate literals
    /// share one slot.
    pub fn intern(&mut self, s: &str) -> u16 {
        if let Some(i) = self.strings.iter().position(|existing| existing == s) {
            return i as u16;
        }
        self.strings.push(s.to_string());
        (self.strings.len() - 1) as u16
    }

    /// Map every bound label to the index of the first real op at or
    /// after it, counting real (non-label) ops only. This is the index
    /// space the assembler encodes jump targets in.
    pub fn label_targets(&self) -> HashMap<LabelId, u32> {
        let mut targets = HashMap::new();
        let mut real = 0u32;
        for op in &self.ops {
            match op {
                Op::Label(l) => {
                    targets.insert(*l, real);
                }
                _ => real += 1,
            }
        }
        targets
    }

    /// Number of real (encodable) ops.
    pub fn real_len(&self) -> u32 {
        self.ops
            .iter()
            .filter(|op| !matches!(op, Op::Label(_)))
            .count() as u32
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            if matches!(op, Op::Label(_)) {
                writeln!(f, "{}", op)?;
            } else {
                writeln!(f, "    {}", op)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let mut code = Code::new();
        assert_eq!(code.intern("hello"), 0);
        assert_eq!(code.intern("world"), 1);
        assert_eq!(code.intern("hello"), 0);
        assert_eq!(code.strings.len(), 2);
    }

    #[test]
    fn label_targets_skip_the_pseudo_ops() {
        let mut code = Code::new();
        code.emit(Op::PushNum(1.0));
        code.bind(LabelId(0));
        code.bind(LabelId(1));
        code.emit(Op::Pop);
        code.emit(Op::Return);

        let targets = code.label_targets();
        assert_eq!(targets[&LabelId(0)], 1);
        assert_eq!(targets[&LabelId(1)], 1);
        assert_eq!(code.real_len(), 3);
    }
}
