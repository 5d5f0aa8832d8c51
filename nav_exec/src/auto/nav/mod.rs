//! # Navigation module
//!
//! Path planning (A* over the grid map) and path simplification
//! (Douglas-Peucker).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod path_planner;
pub mod simplify;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use path_planner::{plan, PlanError};
pub use simplify::simplify;
