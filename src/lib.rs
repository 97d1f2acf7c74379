//! Storekeep - terminal front-end for a simple storage contract
//!
//! Layers, bottom-up:
//! - `domain`: calldata, network registry, history filtering and formatting
//! - `infrastructure`: wallet RPC, explorer API, and the Tokio runtime bridge
//! - `controller`: the state machine that ties them together
//! - `app` / `ui`: terminal state and rendering

pub mod app;
pub mod config;
pub mod controller;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod ui;
