// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Back end of the Saga compiler: resource allocation, stack-machine
//! code generation, stack-depth analysis and binary assembly.
//!
//! All passes here assume a unit that survived weeding, resolution and
//! type checking without errors.

pub mod alloc;
pub mod asm;
pub mod code;
pub mod depth;
pub mod emit;
pub mod opcode;

pub use alloc::allocate;
pub use asm::{assemble_globals, assemble_scripts};
pub use code::Code;
pub use depth::analyze_depth;
pub use emit::{GeneratedPart, GeneratedScript, GeneratedUnit, PartKind, generate, invoked_functions};
pub use opcode::Op;
