//! Channel references: parsing free-form input and resolving it to a channel id
//!
//! Users identify channels in many ways: `@name`, `t.me/name`, invite links
//! (`t.me/+hash`), private links (`t.me/c/123/45`) or bare numeric ids. [`parse`]
//! turns any of these into a [`ChannelReference`] without touching the network,
//! and [`resolve`] asks the remote service for the canonical id.
//!
//! Resolving an invite link the session is not yet a member of **joins the
//! channel** on the user's behalf. That side effect cannot be undone here.

mod parse;
mod resolve;

pub use parse::parse;
pub use resolve::resolve;

/// Prefix of the supergroup encoding of a plain channel id
pub const SUPERGROUP_PREFIX: &str = "-100";

/// A parsed channel identifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelReference {
    /// Public username, without `@`
    Username(String),
    /// Invite link token
    InviteHash(String),
    /// Numeric channel id
    NumericId {
        /// The id as written
        id: i64,
        /// Try the supergroup-encoded form before the raw id
        prefer_supergroup: bool,
    },
}

impl std::fmt::Display for ChannelReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelReference::Username(name) => write!(f, "@{}", name),
            ChannelReference::InviteHash(hash) => write!(f, "invite +{}", hash),
            ChannelReference::NumericId { id, .. } => write!(f, "{}", id),
        }
    }
}

/// Supergroup encoding of a plain channel id: `-100` followed by its digits
///
/// Returns `None` when the encoded value does not fit an `i64`.
///
/// ```
/// use channel_dl::channel::supergroup_encode;
///
/// assert_eq!(supergroup_encode(1234567890), Some(-1001234567890));
/// ```
pub fn supergroup_encode(id: i64) -> Option<i64> {
    format!("{}{}", SUPERGROUP_PREFIX, id.unsigned_abs())
        .parse()
        .ok()
}
