use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    /// Rates candidates and may see the partial teams once done for the day.
    Standard = 0,
    /// Manages candidates and sees the final teams at any time.
    Elevated = 1,
}

impl Rights {
    pub fn of(elevated: bool) -> Self {
        if elevated {
            Self::Elevated
        } else {
            Self::Standard
        }
    }
}

impl Display for Rights {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Standard => "standard",
                Self::Elevated => "elevated",
            }
        )
    }
}

/// A type-level privilege level, used to select which tokens a route accepts.
pub trait Privilege: Send + Sync + 'static {
    /// The rights a token must carry.
    const RIGHTS: Rights;
}

/// Marker for standard voters.
pub enum Standard {}

impl Privilege for Standard {
    const RIGHTS: Rights = Rights::Standard;
}

/// Marker for elevated voters.
pub enum Elevated {}

impl Privilege for Elevated {
    const RIGHTS: Rights = Rights::Elevated;
}
