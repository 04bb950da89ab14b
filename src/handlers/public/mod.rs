// handlers/public/mod.rs - Public handlers (no authentication)
//
// Only the drink menu lives here. It is served in the short projection, so
// ingredient names never reach anonymous callers.

pub mod drinks;

pub use drinks::list as drinks_list;
