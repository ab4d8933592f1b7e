use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthzError>;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("Organization slug '{0}' is already taken")]
    SlugTaken(String),

    #[error("Organization has reached its member limit of {max_users}")]
    OrgFull { max_users: u32 },

    #[error("Organization has reached its API key limit of {max_api_keys}")]
    OrgAtKeyLimit { max_api_keys: u32 },

    #[error("User is already a member of this organization")]
    AlreadyMember,

    #[error("User is not a member of this organization")]
    NotMember,

    #[error("Organization not found")]
    OrganizationNotFound,

    #[error("API key not found")]
    ApiKeyNotFound,

    /// The message never distinguishes an unknown credential from a
    /// malformed one.
    #[error("{0}")]
    Unauthenticated(String),

    #[error("API key has expired")]
    CredentialExpired,

    #[error("Organization subscription is not active")]
    SubscriptionInactive,

    #[error("{0}")]
    Forbidden(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] adminjet_store::StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthzError {
    /// HTTP-style status for surfacing this error at a request boundary.
    pub fn status(&self) -> u16 {
        match self {
            AuthzError::SlugTaken(_)
            | AuthzError::AlreadyMember
            | AuthzError::OrgFull { .. }
            | AuthzError::OrgAtKeyLimit { .. } => 409,
            AuthzError::NotMember
            | AuthzError::OrganizationNotFound
            | AuthzError::ApiKeyNotFound => 404,
            AuthzError::Unauthenticated(_) | AuthzError::CredentialExpired => 401,
            AuthzError::SubscriptionInactive | AuthzError::Forbidden(_) => 403,
            AuthzError::RateLimited => 429,
            AuthzError::Validation(_) => 400,
            AuthzError::Store(_) | AuthzError::Internal(_) => 500,
        }
    }
}

impl From<validator::ValidationErrors> for AuthzError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthzError::Validation(err.to_string())
    }
}
