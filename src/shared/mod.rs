// src/shared/mod.rs

// Response envelope used by error and health responses
pub mod shared_structs;
// Error type and its HTTP mapping
pub mod errors;
