// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! The Saga type lattice.
//!
//! Four surface types plus the internal `undefined` marker the type
//! checker uses for error recovery. The only non-trivial ordering is
//! `string >= number`: a number may appear wherever a string is wanted
//! and is coerced with an explicit cast.

use std::fmt;

/// A Saga value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    /// No value (function return type only).
    Void,
    /// Floating-point number.
    Number,
    /// Immutable string.
    String,
    /// Opaque game-entity handle.
    Entity,
    /// Error-recovery marker, compatible with everything.
    Undefined,
}

impl Ty {
    /// Lattice ordering: `self >= other`.
    ///
    /// Reflexive for the concrete types; `string >= number`; `undefined`
    /// compares greater-or-equal in both directions to suppress error
    /// cascades.
    pub fn ge(self, other: Ty) -> bool {
        if self == Ty::Undefined || other == Ty::Undefined {
            return true;
        }
        self == other || (self == Ty::String && other == Ty::Number)
    }

    /// Whether a value of type `src` may be assigned to a slot of type
    /// `self`.
    pub fn assignable_from(self, src: Ty) -> bool {
        self.ge(src)
    }

    /// The common supertype of two operand types, if they are comparable
    /// in either direction.
    pub fn common(self, other: Ty) -> Option<Ty> {
        if self == Ty::Undefined || other == Ty::Undefined {
            return Some(Ty::Undefined);
        }
        if self.ge(other) {
            Some(self)
        } else if other.ge(self) {
            Some(other)
        } else {
            None
        }
    }

    /// True for the error-recovery marker.
    pub fn is_undefined(self) -> bool {
        self == Ty::Undefined
    }

    /// Storage-slot type tag used by the assembler.
    pub fn tag(self) -> u8 {
        match self {
            Ty::Void => 0,
            Ty::Number => 1,
            Ty::String => 2,
            Ty::Entity => 3,
            // Never reaches the assembler: any expression typed
            // `undefined` implies an earlier reported error, and the
            // pipeline stops before code generation.
            Ty::Undefined => unreachable!("undefined type has no storage tag"),
        }
    }

    /// One-character signature encoding; uppercase marks a by-reference
    /// parameter.
    pub fn sig_char(self, by_ref: bool) -> char {
        let c = match self {
            Ty::Void => 'v',
            Ty::Number => 'n',
            Ty::String => 's',
            Ty::Entity => 'e',
            Ty::Undefined => unreachable!("undefined type has no signature"),
        };
        if by_ref { c.to_ascii_uppercase() } else { c }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ty::Void => "void",
            Ty::Number => "number",
            Ty::String => "string",
            Ty::Entity => "entity",
            Ty::Undefined => "undefined",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_is_reflexive_on_concrete_types() {
        for t in [Ty::Void, Ty::Number, Ty::String, Ty::Entity] {
            assert!(t.ge(t));
        }
    }

    #[test]
    fn string_absorbs_number() {
        assert!(Ty::String.ge(Ty::Number));
        assert!(!Ty::Number.ge(Ty::String));
        assert!(Ty::String.assignable_from(Ty::Number));
        assert!(!Ty::Number.assignable_from(Ty::String));
    }

    #[test]
    fn entity_is_only_comparable_to_itself() {
        assert!(Ty::Entity.ge(Ty::Entity));
        assert!(!Ty::Entity.ge(Ty::Number));
        assert!(!Ty::Entity.ge(Ty::String));
        assert!(!Ty::Number.ge(Ty::Entity));
        assert!(!Ty::String.ge(Ty::Entity));
    }

    #[test]
    fn undefined_is_compatible_with_everything() {
        for t in [Ty::Void, Ty::Number, Ty::String, Ty::Entity] {
            assert!(Ty::Undefined.ge(t));
            assert!(t.ge(Ty::Undefined));
            assert_eq!(t.common(Ty::Undefined), Some(Ty::Undefined));
        }
    }

    #[test]
    fn common_picks_the_absorbing_type() {
        assert_eq!(Ty::Number.common(Ty::String), Some(Ty::String));
        assert_eq!(Ty::String.common(Ty::Number), Some(Ty::String));
        assert_eq!(Ty::Number.common(Ty::Number), Some(Ty::Number));
        assert_eq!(Ty::Entity.common(Ty::String), None);
    }
}
