//! Bearer token verification and permission checks.
//!
//! The verifier turns an `Authorization` header into verified [`Claims`];
//! the scope gate then decides whether those claims grant a route's
//! permission. Both failures surface as [`AuthError`].

pub mod claims;
pub mod error;
pub mod keys;
pub mod scope;
pub mod verifier;

pub use claims::{Audience, Claims};
pub use error::AuthError;
pub use keys::{KeySource, RemoteJwks, StaticKeySet};
pub use scope::{require_scope, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks, RequiredScope};
pub use verifier::{bearer_token, TokenVerifier, VerifierSetupError};
