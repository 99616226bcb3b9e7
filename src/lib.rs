//! Admin Live - realtime dashboard and profile broadcast for the admin back office.
//!
//! Keeps connected admin sessions current: entity profiles are cached and
//! invalidated on mutation, mutations fan out to the channels watching the
//! entity, and an adaptive schedule pushes aggregate dashboard snapshots.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
