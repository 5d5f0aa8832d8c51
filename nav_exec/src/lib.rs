//! # Navigation library.
//!
//! This library allows other crates in the workspace (and the test suite) to
//! access items defined inside the navigation executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - path planning, localisation and trajectory control
pub mod auto;

/// Driver module - executes actions on either the simulated or the physical robot
pub mod driver;

/// Executable-level parameters
pub mod params;

/// Scenario module - the externally supplied map, start and goal description
pub mod scenario;
