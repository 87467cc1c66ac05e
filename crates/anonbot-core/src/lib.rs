//! Core domain + application logic for the anonymous report bot.
//!
//! This crate is intentionally platform-agnostic. The Slack Web API and the
//! Socket Mode transport live behind ports (traits) implemented in
//! `anonbot-slack`.

pub mod blocks;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod ports;
pub mod settings;
pub mod views;

pub use errors::{Error, Result};
