pub mod auth;
pub mod json;
pub mod response;

pub use auth::Authorized;
pub use json::ValidJson;
pub use response::{ApiResult, DrinksResponse};
