//! Sample profiles for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // town-events = { path = "../town-events", features = ["test-fixtures"] }
//!
//! use town_events::fixtures;
//!
//! let profiles = fixtures::sample_profiles(3);
//! ```

use crate::AgentProfile;

const NAMES: [&str; 6] = ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"];

/// Returns `count` distinct profiles, each with one seed memory.
///
/// Names cycle through a fixed list and get a numeric suffix after the
/// first six, so any count yields unique names.
pub fn sample_profiles(count: usize) -> Vec<AgentProfile> {
    (0..count)
        .map(|idx| {
            let base = NAMES[idx % NAMES.len()];
            let name = if idx < NAMES.len() {
                base.to_string()
            } else {
                format!("{}{}", base, idx / NAMES.len())
            };
            AgentProfile::new(
                name.clone(),
                20 + idx as u32,
                "friendly",
                format!("{} is walking around the town square", name),
            )
            .with_memory(format!("{} grew up in this town", name))
        })
        .collect()
}
