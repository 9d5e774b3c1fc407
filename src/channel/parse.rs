use regex::Regex;
use std::sync::LazyLock;

use super::ChannelReference;

#[allow(clippy::expect_used)]
static INVITE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:t|telegram)\.me/(?:\+|joinchat/)([A-Za-z0-9_-]+)").expect("invite link regex")
});

#[allow(clippy::expect_used)]
static PRIVATE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:t|telegram)\.me/c/(\d+)").expect("private link regex"));

#[allow(clippy::expect_used)]
static USERNAME_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:t|telegram)\.me/([A-Za-z0-9_]+)").expect("username link regex")
});

/// Parse a free-form channel identifier
///
/// Never fails: input matching no known shape is taken as a username. The
/// first matching rule wins:
///
/// 1. invite link (`t.me/+<hash>`, `t.me/joinchat/<hash>`)
/// 2. bare integer, optionally negative; positive ids prefer the supergroup encoding
/// 3. private link with an embedded id (`t.me/c/<id>/...`); an id too large
///    for `i64` keeps the whole input as a username
/// 4. link with a username segment (`t.me/<name>`)
/// 5. `@name`
/// 6. anything else, verbatim
pub fn parse(input: &str) -> ChannelReference {
    let input = input.trim();

    if let Some(hash) = INVITE_LINK.captures(input).and_then(|c| c.get(1)) {
        return ChannelReference::InviteHash(hash.as_str().to_string());
    }

    let digits = input.strip_prefix('-').unwrap_or(input);
    if !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && let Ok(id) = input.parse::<i64>()
    {
        return ChannelReference::NumericId {
            id,
            prefer_supergroup: id > 0,
        };
    }

    if let Some(digits) = PRIVATE_LINK.captures(input).and_then(|c| c.get(1)) {
        return match digits.as_str().parse::<i64>() {
            Ok(id) => ChannelReference::NumericId {
                id,
                prefer_supergroup: true,
            },
            // the `c` segment is not a username
            Err(_) => ChannelReference::Username(input.to_string()),
        };
    }

    if let Some(name) = USERNAME_LINK.captures(input).and_then(|c| c.get(1)) {
        return ChannelReference::Username(name.as_str().to_string());
    }

    if let Some(name) = input.strip_prefix('@') {
        return ChannelReference::Username(name.to_string());
    }

    ChannelReference::Username(input.to_string())
}
