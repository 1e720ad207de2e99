//! Unified exit codes for the volley CLI.
//! These codes are part of the public contract for CI consumers.

pub const SUCCESS: i32 = 0;
pub const CHECKS_FAILED: i32 = 1; // One or more iterations failed the HTTP 200 check
pub const CONFIG_ERROR: i32 = 2; // Config file or argument error
pub const SETUP_ERROR: i32 = 3; // Token fetch or transport failure before the load phase
