use super::claims::Claims;
use super::error::AuthError;

/// Permission a route requires, as a type so routes can name it in their
/// extractor signature.
pub trait RequiredScope: Send + Sync + 'static {
    const SCOPE: &'static str;
}

/// `GET /drinks-detail`
pub struct GetDrinksDetail;
/// `POST /drinks`
pub struct PostDrinks;
/// `PATCH /drinks/:id`
pub struct PatchDrinks;
/// `DELETE /drinks/:id`
pub struct DeleteDrinks;

impl RequiredScope for GetDrinksDetail {
    const SCOPE: &'static str = "get:drinks-detail";
}

impl RequiredScope for PostDrinks {
    const SCOPE: &'static str = "post:drinks";
}

impl RequiredScope for PatchDrinks {
    const SCOPE: &'static str = "patch:drinks";
}

impl RequiredScope for DeleteDrinks {
    const SCOPE: &'static str = "delete:drinks";
}

/// Allow the call only if `claims` grants `permission`
pub fn require_scope<'a>(claims: &'a Claims, permission: &str) -> Result<&'a Claims, AuthError> {
    let scopes = claims.scopes().ok_or(AuthError::PermissionsMissing)?;
    if scopes.iter().any(|s| *s == permission) {
        Ok(claims)
    } else {
        Err(AuthError::InsufficientScope(permission.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Audience;

    fn claims(permissions: Option<Vec<&str>>) -> Claims {
        Claims {
            iss: "https://issuer/".to_string(),
            sub: None,
            aud: Audience::One("drinks".to_string()),
            exp: 0,
            iat: None,
            permissions: permissions.map(|p| p.into_iter().map(String::from).collect()),
            scope: None,
        }
    }

    #[test]
    fn grants_listed_permission() {
        let c = claims(Some(vec!["post:drinks", "patch:drinks"]));
        assert!(require_scope(&c, PostDrinks::SCOPE).is_ok());
        assert!(require_scope(&c, PatchDrinks::SCOPE).is_ok());
    }

    #[test]
    fn denies_missing_permission() {
        let c = claims(Some(vec!["get:drinks-detail"]));
        assert_eq!(
            require_scope(&c, DeleteDrinks::SCOPE).unwrap_err(),
            AuthError::InsufficientScope("delete:drinks".to_string())
        );

        // prefix matches do not count
        let c = claims(Some(vec!["post:drink"]));
        assert!(require_scope(&c, PostDrinks::SCOPE).is_err());
    }

    #[test]
    fn token_without_permissions_is_malformed() {
        let c = claims(None);
        assert_eq!(require_scope(&c, GetDrinksDetail::SCOPE).unwrap_err(), AuthError::PermissionsMissing);
    }
}
