//! Session and locale context.
//!
//! Identity and language are explicit values handed to the services on every
//! call. Nothing in the domain layer reads them from global state.

use shared::Language;
use std::fmt;

/// Opaque per-user key that scopes every collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Returns `None` for values that cannot be used as a single path segment
    pub fn new(uid: impl Into<String>) -> Option<Self> {
        let uid = uid.into();
        let trimmed = uid.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is signed in, as reported by the external session provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    identity: Option<Identity>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Build a session from a raw user id; invalid ids yield an anonymous session
    pub fn from_user_id(uid: Option<&str>) -> Self {
        Self {
            identity: uid.and_then(Identity::new),
        }
    }

    pub fn sign_in(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Display language. Starts in English on every launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    language: Language,
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self {
            language: Language::English,
        }
    }
}

impl LocaleContext {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_rtl(&self) -> bool {
        self.language == Language::Arabic
    }

    pub fn toggle(&mut self) -> Language {
        self.language = match self.language {
            Language::English => Language::Arabic,
            Language::Arabic => Language::English,
        };
        self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rejects_path_like_values() {
        assert!(Identity::new("").is_none());
        assert!(Identity::new("   ").is_none());
        assert!(Identity::new("..").is_none());
        assert!(Identity::new("a/b").is_none());
        assert_eq!(Identity::new(" uid-1 ").map(|i| i.to_string()), Some("uid-1".to_string()));
    }

    #[test]
    fn test_session_sign_in_and_out() {
        let mut session = SessionContext::anonymous();
        assert!(session.identity().is_none());

        session.sign_in(Identity::new("uid-1").unwrap());
        assert_eq!(session.identity().map(Identity::as_str), Some("uid-1"));

        session.sign_out();
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_session_from_invalid_user_id_is_anonymous() {
        assert_eq!(SessionContext::from_user_id(Some("../etc")), SessionContext::anonymous());
        assert_eq!(SessionContext::from_user_id(None), SessionContext::anonymous());
    }

    #[test]
    fn test_locale_toggle_switches_direction() {
        let mut locale = LocaleContext::default();
        assert_eq!(locale.language(), Language::English);
        assert!(!locale.is_rtl());

        assert_eq!(locale.toggle(), Language::Arabic);
        assert!(locale.is_rtl());

        assert_eq!(locale.toggle(), Language::English);
        assert!(!locale.is_rtl());
    }
}
