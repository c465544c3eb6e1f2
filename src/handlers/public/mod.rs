// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Session acquisition and liveness probes.
// Middleware: none
pub mod auth;
pub mod health;
