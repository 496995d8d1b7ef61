// src/transactions/mod.rs

// Request/response and row structs
pub mod transaction_structs;
// SQL and the storage trait
pub mod transaction_repository;
// Checkout policy and report windows
pub mod transaction_service;
// HTTP routes
pub mod transaction_router;
