//! Controller layer: UI events, reducer-like view state, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
