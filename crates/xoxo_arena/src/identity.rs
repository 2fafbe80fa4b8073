//! Current-user identity.

use std::sync::OnceLock;

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::UserId;

/// The signed-in user. The match engine only ever reads `uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Identity {
    uid: UserId,
    is_anonymous: bool,
    email: Option<String>,
}

/// Source of the current user.
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// The current user, or `None` while sign-in is still in flight.
    fn current_user(&self) -> Option<Identity>;
}

/// Signs in anonymously on first use.
///
/// With a configured uid the identity is fixed; otherwise a random id is
/// minted the first time anyone asks and reused for the life of the
/// provider.
#[derive(Debug, Default)]
pub struct AnonymousSignIn {
    configured: Option<UserId>,
    minted: OnceLock<Identity>,
}

impl AnonymousSignIn {
    /// Creates a provider that mints a fresh anonymous id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that reuses `uid`.
    pub fn with_uid(uid: impl Into<UserId>) -> Self {
        Self {
            configured: Some(uid.into()),
            minted: OnceLock::new(),
        }
    }
}

impl IdentityProvider for AnonymousSignIn {
    #[instrument(skip(self))]
    fn current_user(&self) -> Option<Identity> {
        let identity = self.minted.get_or_init(|| {
            let uid = self
                .configured
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            info!(uid = %uid, "Signed in anonymously");
            Identity::new(uid, true, None)
        });
        Some(identity.clone())
    }
}

/// A fixed identity, or none at all to model a sign-in that never finishes.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<Identity>);

impl StaticIdentity {
    /// Always reports `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        Self(Some(identity))
    }

    /// Always reports that sign-in is still loading.
    pub fn loading() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<Identity> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_uid_is_stable() {
        let provider = AnonymousSignIn::new();
        let first = provider.current_user().expect("signed in");
        let second = provider.current_user().expect("signed in");
        assert_eq!(first.uid(), second.uid());
        assert!(*first.is_anonymous());
    }

    #[test]
    fn test_configured_uid_is_used() {
        let provider = AnonymousSignIn::with_uid("alice");
        assert_eq!(provider.current_user().expect("signed in").uid(), "alice");
    }

    #[test]
    fn test_loading_has_no_user() {
        assert!(StaticIdentity::loading().current_user().is_none());
    }
}
