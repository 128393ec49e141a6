//! Integration test crate for ClipForge.
//!
//! Holds cross-crate tests that drive the editor controller end to end
//! with an in-memory inspector, a recording encoder and the simulated
//! playback engine.

#[cfg(test)]
mod support;

#[cfg(test)]
mod editing;

#[cfg(test)]
mod playback;

#[cfg(test)]
mod export;
