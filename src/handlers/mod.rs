// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token with a route permission)
pub mod protected;
pub mod public;
