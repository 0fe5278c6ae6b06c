// saga-sem - Static analysis passes for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Builtin API and entity-method signatures.
//!
//! One static table, kept in sync with the runtime's dispatch tables.
//! Entity methods carry the receiving entity as their first parameter;
//! the type checker prepends the receiver when checking a method call,
//! and the code generator loads it before the explicit parameters.

use saga_ast::side::BuiltinId;
use saga_ast::types::Ty;
use saga_ast::types::Ty::{Entity as E, Number as N, String as S, Void as V};

/// Whether a builtin is a free API function or an entity method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Api,
    Method,
}

/// One builtin signature.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSig {
    pub name: &'static str,
    pub kind: BuiltinKind,
    pub ret: Ty,
    /// Parameter types in call order. For methods this includes the
    /// receiving entity in position 0.
    pub params: &'static [Ty],
}

macro_rules! api {
    ($name:literal, ($($p:expr),*) -> $ret:expr) => {
        BuiltinSig { name: $name, kind: BuiltinKind::Api, ret: $ret, params: &[$($p),*] }
    };
}

macro_rules! method {
    ($name:literal, ($($p:expr),*) -> $ret:expr) => {
        // Receiver first, per the hidden-first-parameter convention.
        BuiltinSig { name: $name, kind: BuiltinKind::Method, ret: $ret, params: &[E $(, $p)*] }
    };
}

/// The signature table. Indexed by [`BuiltinId`].
pub static BUILTINS: &[BuiltinSig] = &[
    // =========================================================================
    // Math
    // =========================================================================
    api!("abs", (N) -> N),
    api!("floor", (N) -> N),
    api!("ceil", (N) -> N),
    api!("round", (N) -> N),
    api!("sqrt", (N) -> N),
    api!("pow", (N, N) -> N),
    api!("min", (N, N) -> N),
    api!("max", (N, N) -> N),
    api!("clamp", (N, N, N) -> N),
    api!("lerp", (N, N, N) -> N),
    api!("sign", (N) -> N),
    api!("sin", (N) -> N),
    api!("cos", (N) -> N),
    api!("tan", (N) -> N),
    api!("atan2", (N, N) -> N),
    api!("log", (N) -> N),
    api!("exp", (N) -> N),
    api!("random", () -> N),
    api!("random_range", (N, N) -> N),
    api!("roll_dice", (N, N) -> N),
    // =========================================================================
    // Strings
    // =========================================================================
    api!("str_len", (S) -> N),
    api!("str_sub", (S, N, N) -> S),
    api!("str_find", (S, S) -> N),
    api!("str_upper", (S) -> S),
    api!("str_lower", (S) -> S),
    api!("str_trim", (S) -> S),
    api!("str_replace", (S, S, S) -> S),
    api!("str_char_at", (S, N) -> S),
    api!("str_contains", (S, S) -> N),
    api!("str_repeat", (S, N) -> S),
    // =========================================================================
    // World and game state
    // =========================================================================
    api!("get_owner", () -> E),
    api!("get_player", () -> E),
    api!("find_entity", (S) -> E),
    api!("spawn_entity", (S, N, N) -> E),
    api!("destroy_entity", (E) -> V),
    api!("entity_exists", (E) -> N),
    api!("distance", (E, E) -> N),
    api!("play_sound", (S) -> V),
    api!("play_music", (S) -> V),
    api!("stop_music", () -> V),
    api!("show_text", (S) -> V),
    api!("set_timer", (N, N) -> V),
    api!("cancel_timer", (N) -> V),
    api!("get_time", () -> N),
    api!("get_day", () -> N),
    api!("set_weather", (S) -> V),
    api!("get_weather", () -> S),
    api!("fade_out", (N) -> V),
    api!("fade_in", (N) -> V),
    api!("shake_screen", (N) -> V),
    api!("quest_set_stage", (S, N) -> V),
    api!("quest_get_stage", (S) -> N),
    api!("journal_add", (S, S) -> V),
    api!("start_dialogue", (E, S) -> V),
    api!("end_dialogue", () -> V),
    api!("start_combat", (E, E) -> V),
    api!("end_combat", () -> V),
    api!("set_flag", (S, N) -> V),
    api!("get_flag", (S) -> N),
    api!("debug_print", (S) -> V),
    // =========================================================================
    // Entity methods (hidden receiver in position 0)
    // =========================================================================
    method!("get_name", () -> S),
    method!("set_name", (S) -> V),
    method!("get_tag", () -> S),
    method!("get_health", () -> N),
    method!("set_health", (N) -> V),
    method!("get_max_health", () -> N),
    method!("heal", (N) -> V),
    method!("damage", (N) -> V),
    method!("kill", () -> V),
    method!("is_alive", () -> N),
    method!("get_x", () -> N),
    method!("get_y", () -> N),
    method!("get_facing", () -> N),
    method!("set_facing", (N) -> V),
    method!("move_to", (N, N) -> V),
    method!("walk_to", (N, N, N) -> V),
    method!("teleport", (N, N) -> V),
    method!("stop_moving", () -> V),
    method!("say", (S) -> V),
    method!("give_item", (S) -> V),
    method!("take_item", (S) -> V),
    method!("has_item", (S) -> N),
    method!("count_item", (S) -> N),
    method!("equip", (S) -> V),
    method!("unequip", (S) -> V),
    method!("get_level", () -> N),
    method!("set_level", (N) -> V),
    method!("get_attribute", (S) -> N),
    method!("set_attribute", (S, N) -> V),
    method!("add_effect", (S, N) -> V),
    method!("remove_effect", (S) -> V),
    method!("has_effect", (S) -> N),
    method!("attack", (E) -> V),
    method!("flee_from", (E) -> V),
    method!("follow", (E) -> V),
    method!("unfollow", () -> V),
    method!("get_target", () -> E),
    method!("set_hostile", (E) -> V),
    method!("is_hostile", (E) -> N),
    method!("set_visible", (N) -> V),
    method!("is_visible", () -> N),
    method!("lock", () -> V),
    method!("unlock", () -> V),
    method!("is_locked", () -> N),
    method!("open", () -> V),
    method!("close", () -> V),
    method!("activate", () -> V),
    method!("deactivate", () -> V),
    method!("is_active", () -> N),
    method!("play_animation", (S) -> V),
    method!("face_entity", (E) -> V),
    method!("distance_to", (E) -> N),
    method!("get_gold", () -> N),
    method!("give_gold", (N) -> V),
    method!("take_gold", (N) -> V),
];

/// Lookup facade over the static table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtins;

impl Builtins {
    pub fn new() -> Self {
        Self
    }

    /// Case-insensitive lookup of an API function.
    pub fn lookup_api(&self, name: &str) -> Option<BuiltinId> {
        Self::lookup(name, BuiltinKind::Api)
    }

    /// Case-insensitive lookup of an entity method.
    pub fn lookup_method(&self, name: &str) -> Option<BuiltinId> {
        Self::lookup(name, BuiltinKind::Method)
    }

    fn lookup(name: &str, kind: BuiltinKind) -> Option<BuiltinId> {
        BUILTINS
            .iter()
            .position(|sig| sig.kind == kind && sig.name.eq_ignore_ascii_case(name))
            .map(|i| BuiltinId(i as u16))
    }

    pub fn sig(&self, id: BuiltinId) -> &'static BuiltinSig {
        &BUILTINS[id.0 as usize]
    }

    /// Operand-stack delta of calling this builtin: its parameters are
    /// popped (receiver included for methods) and its return value, if
    /// any, pushed.
    pub fn stack_delta(&self, id: BuiltinId) -> i32 {
        let sig = self.sig(id);
        let pushed = if sig.ret == Ty::Void { 0 } else { 1 };
        pushed - sig.params.len() as i32
    }
}
