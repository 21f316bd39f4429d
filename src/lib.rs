//! Typed command registry for editor debug panels.
//!
//! A target type registers its commands in a [`registry::CommandTable`]; a
//! [`registry::CommandRegistry`] discovers the ones whose parameters it can
//! represent, keeps an editable [`model::ParameterModel`] for each, and invokes
//! them with arguments rebuilt from that model.

pub mod demo;
pub mod error;
pub mod model;
pub mod panel;
pub mod registry;
pub mod settings;
pub mod state;
pub mod types;
