//=========================================================================
// Core Systems
//
// Simulation components of the café, independent of any renderer.
//
// Components:
// - `navigator`: camera transitions bounded to the room
// - `interaction`: click routing, overlays and delayed navigation
// - `game_host`: embedded game lifecycle and teardown
// - `credits`: account / terminal balances and the credits service
// - `game_api`: game session service client
// - `page`, `globals`, `event_bridge`, `message_bus`: runtime plumbing
//
// Notes:
// Everything here runs on the café's single logical thread and advances
// on simulated time through `scheduler`. The only other thread is the
// credits worker, reached through channels.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod config;
pub mod credits;
pub mod event_bridge;
pub mod game_api;
pub mod game_host;
pub mod globals;
pub mod identity;
pub mod input;
pub mod interaction;
pub mod message_bus;
pub mod navigator;
pub mod notice;
pub mod page;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;
