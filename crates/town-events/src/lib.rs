//! Shared message and configuration types for the agent town.
//!
//! This crate contains pure data structures with no orchestration logic.
//! It is a dependency for every other crate in the workspace and for any
//! transport shell (console, websocket bridge, HTTP handler) that needs to
//! speak the town's wire format.

pub mod instruction;
pub mod notification;
pub mod profile;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export notification types
pub use notification::{Envelope, MessageType, Notification, Role};

// Re-export instruction types
pub use instruction::{Instruction, InstructionKind, ParseInstructionError};

// Re-export profile types
pub use profile::{AgentProfile, ProfileError};
