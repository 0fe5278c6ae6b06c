// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Script event kinds and their implicit parameter signatures.
//!
//! Every script is attached to one event. The runtime passes each event
//! a fixed set of implicit parameters; the AST builder prepends them to
//! the script's parameter list so they resolve and allocate exactly like
//! explicit ones.

use crate::types::Ty;

/// The event a script is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    OnSpawn,
    OnHeartbeat,
    OnUse,
    OnEnter,
    OnExit,
    OnGetItem,
    OnLoseItem,
    OnDamage,
    OnDeath,
    OnSpeak,
    OnTimer,
}

impl EventKind {
    /// Source-level event name.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::OnSpawn => "on_spawn",
            EventKind::OnHeartbeat => "on_heartbeat",
            EventKind::OnUse => "on_use",
            EventKind::OnEnter => "on_enter",
            EventKind::OnExit => "on_exit",
            EventKind::OnGetItem => "on_get_item",
            EventKind::OnLoseItem => "on_lose_item",
            EventKind::OnDamage => "on_damage",
            EventKind::OnDeath => "on_death",
            EventKind::OnSpeak => "on_speak",
            EventKind::OnTimer => "on_timer",
        }
    }

    /// Implicit parameters the runtime passes to this event, in order.
    pub fn implicit_params(self) -> &'static [(&'static str, Ty)] {
        match self {
            EventKind::OnSpawn | EventKind::OnHeartbeat => &[],
            EventKind::OnUse => &[("user", Ty::Entity)],
            EventKind::OnEnter | EventKind::OnExit => &[("visitor", Ty::Entity)],
            EventKind::OnGetItem => &[("taker", Ty::Entity), ("item", Ty::Entity)],
            EventKind::OnLoseItem => &[("loser", Ty::Entity), ("item", Ty::Entity)],
            EventKind::OnDamage => &[("attacker", Ty::Entity), ("amount", Ty::Number)],
            EventKind::OnDeath => &[("killer", Ty::Entity)],
            EventKind::OnSpeak => &[("speaker", Ty::Entity), ("text", Ty::String)],
            EventKind::OnTimer => &[("timer_id", Ty::Number)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_item_receives_two_entities() {
        let params = EventKind::OnGetItem.implicit_params();
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|&(_, t)| t == Ty::Entity));
    }

    #[test]
    fn implicit_names_are_unique_per_event() {
        for ev in [
            EventKind::OnSpawn,
            EventKind::OnHeartbeat,
            EventKind::OnUse,
            EventKind::OnEnter,
            EventKind::OnExit,
            EventKind::OnGetItem,
            EventKind::OnLoseItem,
            EventKind::OnDamage,
            EventKind::OnDeath,
            EventKind::OnSpeak,
            EventKind::OnTimer,
        ] {
            let params = ev.implicit_params();
            for (i, &(name, _)) in params.iter().enumerate() {
                assert!(params[i + 1..].iter().all(|&(other, _)| other != name));
            }
        }
    }
}
