// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Stack-machine instruction definitions.
//!
//! Instructions operate on an operand stack of tagged values and the
//! flat per-script storage frame. Loads and stores are typed by the
//! declared slot type. Jumps carry a [`LabelId`] until the assembler
//! rewrites them to absolute op indices; [`Op::Label`] is a pseudo-op
//! that marks a jump target and is never encoded.

use std::fmt;

use saga_ast::LabelId;
use saga_ast::types::Ty;

/// One stack-machine instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    // =========================================================================
    // Constants & storage
    // =========================================================================
    /// Push a number literal.
    PushNum(f64),

    /// Push a string from the part's string pool.
    PushStr(u16),

    /// Push the null entity.
    PushNull,

    /// Push the number in frame slot n.
    LoadNum(u16),

    /// Push the string in frame slot n.
    LoadStr(u16),

    /// Push the entity in frame slot n.
    LoadEnt(u16),

    /// Pop into number frame slot n.
    StoreNum(u16),

    /// Pop into string frame slot n.
    StoreStr(u16),

    /// Pop into entity frame slot n.
    StoreEnt(u16),

    /// Duplicate the top value.
    Dup,

    /// Discard the top value.
    Pop,

    // =========================================================================
    // Arithmetic & casts
    // =========================================================================
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    /// Negate the top number.
    Neg,

    /// Logical not: 0 becomes 1, anything else 0.
    Not,

    /// Pop two strings, push their concatenation.
    Concat,

    /// Pop a number, push its decimal string rendering.
    NumToStr,

    /// Pop a string, push the number it parses to.
    StrToNum,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Jump-target marker. Pseudo-op, stripped by the assembler.
    Label(LabelId),

    /// Unconditional jump.
    Jump(LabelId),

    /// Pop a number, jump if it is zero.
    JumpZero(LabelId),

    /// Pop a number, jump if it is not zero.
    JumpNonZero(LabelId),

    // Typed compare-and-jump-on-true: pop two operands, jump if the
    // comparison holds.
    JumpEqNum(LabelId),
    JumpNeNum(LabelId),
    JumpLtNum(LabelId),
    JumpLeNum(LabelId),
    JumpGtNum(LabelId),
    JumpGeNum(LabelId),
    JumpEqStr(LabelId),
    JumpNeStr(LabelId),
    JumpEqEnt(LabelId),
    JumpNeEnt(LabelId),

    // =========================================================================
    // Calls
    // =========================================================================
    /// Call the script part with the given function index. The actuals
    /// are popped into the callee frame; the callee pushes its return
    /// value (if any) followed by its `ref` parameters.
    Call(u16),

    /// Call a builtin API function by builtin-table index.
    CallApi(u16),

    /// Call a builtin entity method by builtin-table index. The
    /// receiver is the first actual on the stack.
    CallMethod(u16),

    /// Return to the caller.
    Return,
}

impl Op {
    /// Typed load for a storage slot.
    pub fn load(ty: Ty, offset: u16) -> Op {
        match ty {
            Ty::Number => Op::LoadNum(offset),
            Ty::String => Op::LoadStr(offset),
            Ty::Entity => Op::LoadEnt(offset),
            other => unreachable!("no storage slots of type {}", other),
        }
    }

    /// Typed store for a storage slot.
    pub fn store(ty: Ty, offset: u16) -> Op {
        match ty {
            Ty::Number => Op::StoreNum(offset),
            Ty::String => Op::StoreStr(offset),
            Ty::Entity => Op::StoreEnt(offset),
            other => unreachable!("no storage slots of type {}", other),
        }
    }

    /// Encoded opcode byte. Labels are pseudo-ops and have none.
    pub fn byte(&self) -> u8 {
        match self {
            Op::PushNum(_) => 0x01,
            Op::PushStr(_) => 0x02,
            Op::PushNull => 0x03,
            Op::LoadNum(_) => 0x04,
            Op::LoadStr(_) => 0x05,
            Op::LoadEnt(_) => 0x06,
            Op::StoreNum(_) => 0x07,
            Op::StoreStr(_) => 0x08,
            Op::StoreEnt(_) => 0x09,
            Op::Dup => 0x0a,
            Op::Pop => 0x0b,
            Op::Add => 0x10,
            Op::Sub => 0x11,
            Op::Mul => 0x12,
            Op::Div => 0x13,
            Op::Mod => 0x14,
            Op::Neg => 0x15,
            Op::Not => 0x16,
            Op::Concat => 0x17,
            Op::NumToStr => 0x18,
            Op::StrToNum => 0x19,
            Op::Label(_) => unreachable!("label pseudo-op is never encoded"),
            Op::Jump(_) => 0x20,
            Op::JumpZero(_) => 0x21,
            Op::JumpNonZero(_) => 0x22,
            Op::JumpEqNum(_) => 0x23,
            Op::JumpNeNum(_) => 0x24,
            Op::JumpLtNum(_) => 0x25,
            Op::JumpLeNum(_) => 0x26,
            Op::JumpGtNum(_) => 0x27,
            Op::JumpGeNum(_) => 0x28,
            Op::JumpEqStr(_) => 0x29,
            Op::JumpNeStr(_) => 0x2a,
            Op::JumpEqEnt(_) => 0x2b,
            Op::JumpNeEnt(_) => 0x2c,
            Op::Call(_) => 0x30,
            Op::CallApi(_) => 0x31,
            Op::CallMethod(_) => 0x32,
            Op::Return => 0x33,
        }
    }

    /// Net operand-stack change, or `None` for calls (the delta depends
    /// on the callee signature).
    pub fn stack_effect(&self) -> Option<i32> {
        Some(match self {
            Op::PushNum(_)
            | Op::PushStr(_)
            | Op::PushNull
            | Op::LoadNum(_)
            | Op::LoadStr(_)
            | Op::LoadEnt(_)
            | Op::Dup => 1,

            Op::StoreNum(_)
            | Op::StoreStr(_)
            | Op::StoreEnt(_)
            | Op::Pop
            | Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Mod
            | Op::Concat
            | Op::JumpZero(_)
            | Op::JumpNonZero(_) => -1,

            Op::Neg | Op::Not | Op::NumToStr | Op::StrToNum => 0,

            Op::Label(_) | Op::Jump(_) | Op::Return => 0,

            Op::JumpEqNum(_)
            | Op::JumpNeNum(_)
            | Op::JumpLtNum(_)
            | Op::JumpLeNum(_)
            | Op::JumpGtNum(_)
            | Op::JumpGeNum(_)
            | Op::JumpEqStr(_)
            | Op::JumpNeStr(_)
            | Op::JumpEqEnt(_)
            | Op::JumpNeEnt(_) => -2,

            Op::Call(_) | Op::CallApi(_) | Op::CallMethod(_) => return None,
        })
    }

    /// The label a jump may transfer to.
    pub fn jump_target(&self) -> Option<LabelId> {
        match self {
            Op::Jump(l)
            | Op::JumpZero(l)
            | Op::JumpNonZero(l)
            | Op::JumpEqNum(l)
            | Op::JumpNeNum(l)
            | Op::JumpLtNum(l)
            | Op::JumpLeNum(l)
            | Op::JumpGtNum(l)
            | Op::JumpGeNum(l)
            | Op::JumpEqStr(l)
            | Op::JumpNeStr(l)
            | Op::JumpEqEnt(l)
            | Op::JumpNeEnt(l) => Some(*l),
            _ => None,
        }
    }

    /// Whether control never falls through to the next op.
    pub fn ends_flow(&self) -> bool {
        matches!(self, Op::Jump(_) | Op::Return)
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            Op::PushNum(_) => "push_num",
            Op::PushStr(_) => "push_str",
            Op::PushNull => "push_null",
            Op::LoadNum(_) => "load_num",
            Op::LoadStr(_) => "load_str",
            Op::LoadEnt(_) => "load_ent",
            Op::StoreNum(_) => "store_num",
            Op::StoreStr(_) => "store_str",
            Op::StoreEnt(_) => "store_ent",
            Op::Dup => "dup",
            Op::Pop => "pop",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Mod => "mod",
            Op::Neg => "neg",
            Op::Not => "not",
            Op::Concat => "concat",
            Op::NumToStr => "num_to_str",
            Op::StrToNum => "str_to_num",
            Op::Label(_) => "label",
            Op::Jump(_) => "jump",
            Op::JumpZero(_) => "jump_zero",
            Op::JumpNonZero(_) => "jump_nonzero",
            Op::JumpEqNum(_) => "jeq_num",
            Op::JumpNeNum(_) => "jne_num",
            Op::JumpLtNum(_) => "jlt_num",
            Op::JumpLeNum(_) => "jle_num",
            Op::JumpGtNum(_) => "jgt_num",
            Op::JumpGeNum(_) => "jge_num",
            Op::JumpEqStr(_) => "jeq_str",
            Op::JumpNeStr(_) => "jne_str",
            Op::JumpEqEnt(_) => "jeq_ent",
            Op::JumpNeEnt(_) => "jne_ent",
            Op::Call(_) => "call",
            Op::CallApi(_) => "call_api",
            Op::CallMethod(_) => "call_method",
            Op::Return => "return",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::PushNum(v) => write!(f, "push_num {}", v),
            Op::PushStr(i) => write!(f, "push_str ${}", i),
            Op::LoadNum(n) | Op::LoadStr(n) | Op::LoadEnt(n) => {
                write!(f, "{} @{}", self.mnemonic(), n)
            }
            Op::StoreNum(n) | Op::StoreStr(n) | Op::StoreEnt(n) => {
                write!(f, "{} @{}", self.mnemonic(), n)
            }
            Op::Label(l) => write!(f, "L{}:", l.0),
            Op::Call(n) | Op::CallApi(n) | Op::CallMethod(n) => {
                write!(f, "{} #{}", self.mnemonic(), n)
            }
            other => match other.jump_target() {
                Some(l) => write!(f, "{} L{}", self.mnemonic(), l.0),
                None => write!(f, "{}", self.mnemonic()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_loads_follow_the_slot_type() {
        assert_eq!(Op::load(Ty::Number, 3), Op::LoadNum(3));
        assert_eq!(Op::load(Ty::String, 0), Op::LoadStr(0));
        assert_eq!(Op::store(Ty::Entity, 9), Op::StoreEnt(9));
    }

    #[test]
    fn pushes_and_loads_grow_the_stack_by_one() {
        for op in [Op::PushNum(1.0), Op::PushStr(0), Op::PushNull, Op::LoadNum(0)] {
            assert_eq!(op.stack_effect(), Some(1));
        }
    }

    #[test]
    fn compare_jumps_consume_both_operands() {
        assert_eq!(Op::JumpEqStr(LabelId(0)).stack_effect(), Some(-2));
        assert_eq!(Op::JumpGeNum(LabelId(0)).stack_effect(), Some(-2));
    }

    #[test]
    fn calls_have_no_static_delta() {
        assert_eq!(Op::Call(1).stack_effect(), None);
        assert_eq!(Op::CallApi(0).stack_effect(), None);
    }

    #[test]
    fn display_is_symbolic() {
        assert_eq!(Op::Jump(LabelId(4)).to_string(), "jump L4");
        assert_eq!(Op::Label(LabelId(4)).to_string(), "L4:");
        assert_eq!(Op::LoadNum(2).to_string(), "load_num @2");
        assert_eq!(Op::CallApi(7).to_string(), "call_api #7");
    }
}
