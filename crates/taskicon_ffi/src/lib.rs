//! Flutter-facing bindings for the Taskicon menu-bar UI.

pub mod api;
