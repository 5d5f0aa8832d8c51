//! Utility library for the nav-bot software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod host;
pub mod logger;
pub mod maths;
pub mod params;
pub mod session;
