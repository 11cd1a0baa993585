use serde::Serialize;

/// Scopes a host's OAuth provider must request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthScopes {
    pub provider: String,
    pub scopes: Vec<String>,
}
