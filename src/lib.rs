//! flowtrack - a caching command-line client for flow/task tracking servers.
//!
//! The crate's core is [`cache::ResourceCache`], a per-resource coordinator
//! that decides whether each read is served from a normalized in-memory
//! store or from the network, and relays writes back into the store.

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod resources;
