//! Application core: state, input types and the event reducer.

pub mod input;
pub mod reducer;
pub mod state;
