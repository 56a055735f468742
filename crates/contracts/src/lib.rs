//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Seams
//! - [`TemplateRenderer`]: template engine black box
//! - [`PublishClient`]: message-bus client black box
//! - [`EventOutput`]: the single `send(event)` entry point

mod config;
mod error;
mod event;
mod output;
mod publish;
mod render;

pub use config::*;
pub use error::*;
pub use event::{Event, EventData};
pub use output::EventOutput;
pub use publish::{LocalPublishClient, PublishClient};
pub use render::TemplateRenderer;
