//! Offline/demo identity.
//!
//! A fixed credential pair that signs in locally when the provider rejects it or
//! cannot be reached. The password is embedded in the binary in plain text, so
//! production deployments should run with [`DemoMode::Disabled`].

use super::Session;

pub const DEMO_EMAIL: &str = "abc123@gmail.com";
pub const DEMO_PASSWORD: &str = "123456";

const DEMO_USER_ID: &str = "1";
const DEMO_USER_NAME: &str = "Lavanya Mohan";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DemoMode {
    #[default]
    Enabled,
    Disabled,
}

impl DemoMode {
    #[must_use]
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    /// True when demo mode is on and both values match exactly.
    #[must_use]
    pub fn accepts(self, email: &str, password: &str) -> bool {
        self == Self::Enabled && email == DEMO_EMAIL && password == DEMO_PASSWORD
    }
}

/// The session installed by a demo login.
#[must_use]
pub fn demo_session() -> Session {
    Session {
        id: DEMO_USER_ID.to_string(),
        name: DEMO_USER_NAME.to_string(),
        email: DEMO_EMAIL.to_string(),
        photo_url: None,
    }
}
