// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer session)
pub mod protected;
pub mod public;
