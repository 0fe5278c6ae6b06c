// saga-sem - Static analysis passes for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Static analysis for Saga compilation units.
//!
//! The passes run in order, each collecting its own diagnostics:
//! 1. Weeding: structural checks and default-value insertion
//! 2. Name resolution: two passes building and validating symbol tables
//! 3. Type checking: bottom-up typing with implicit-cast insertion

pub mod builtins;
pub mod resolve;
pub mod typeck;
pub mod weed;

pub use builtins::{Builtins, BuiltinKind, BuiltinSig};
pub use resolve::resolve;
pub use typeck::typecheck;
pub use weed::weed;
