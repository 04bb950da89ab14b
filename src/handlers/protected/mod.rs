// handlers/protected/mod.rs - Protected handlers (bearer token + permission)
//
// Every handler here takes an `Authorized<Scope>` extractor ahead of its body
// extractor, so a request without the route's permission is turned away
// before the drink store is touched.
//
//   GET    /drinks-detail  get:drinks-detail
//   POST   /drinks         post:drinks
//   PATCH  /drinks/:id     patch:drinks
//   DELETE /drinks/:id     delete:drinks

pub mod drinks;

pub use drinks::create as drinks_create;
pub use drinks::delete as drinks_delete;
pub use drinks::detail as drinks_detail;
pub use drinks::update as drinks_update;
