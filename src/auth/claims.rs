use serde::{Deserialize, Serialize};

/// `aud` may be a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Verified payload of a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject (user id at the identity provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub aud: Audience,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Role permissions granted to the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    /// OAuth2 space-delimited scope string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    /// The caller's permission strings, or `None` when the token carries
    /// neither a `permissions` list nor a `scope` string.
    pub fn scopes(&self) -> Option<Vec<&str>> {
        if let Some(permissions) = &self.permissions {
            return Some(permissions.iter().map(String::as_str).collect());
        }
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().collect())
    }

    pub fn has_scope(&self, permission: &str) -> bool {
        self.scopes()
            .map_or(false, |scopes| scopes.iter().any(|s| *s == permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(extra: serde_json::Value) -> Claims {
        let mut base = json!({"iss": "https://issuer/", "aud": "drinks", "exp": 4102444800i64});
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn permissions_list_is_preferred() {
        let c = claims(json!({"permissions": ["get:drinks-detail"], "scope": "post:drinks"}));
        assert_eq!(c.scopes(), Some(vec!["get:drinks-detail"]));
        assert!(!c.has_scope("post:drinks"));
    }

    #[test]
    fn scope_string_is_split() {
        let c = claims(json!({"scope": "openid post:drinks  patch:drinks"}));
        assert!(c.has_scope("post:drinks"));
        assert!(c.has_scope("patch:drinks"));
        assert!(!c.has_scope("post"));
    }

    #[test]
    fn missing_scope_collection_is_none() {
        let c = claims(json!({}));
        assert_eq!(c.scopes(), None);
        assert!(!c.has_scope("post:drinks"));

        // an empty list is a collection that grants nothing
        let c = claims(json!({"permissions": []}));
        assert_eq!(c.scopes(), Some(vec![]));
    }

    #[test]
    fn audience_forms() {
        assert_eq!(claims(json!({})).aud, Audience::One("drinks".to_string()));
        let c = claims(json!({"aud": ["https://userinfo", "drinks"]}));
        assert_eq!(
            c.aud,
            Audience::Many(vec!["https://userinfo".to_string(), "drinks".to_string()])
        );
    }
}
