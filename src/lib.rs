//! rolecall - group-chat assistant for claiming project roles

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod telegram;
pub mod telemetry;
