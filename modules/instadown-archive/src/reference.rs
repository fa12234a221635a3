// Reference classification: is this link a single post or a profile?
// Pure string work, no HTTP.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ArchiveError, Result};

/// Post shortcodes are short URL-safe base64 tokens.
static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{5,64}$").expect("valid regex"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").expect("valid regex"));

/// First path segments that are site sections, not accounts.
const RESERVED_PATHS: &[&str] = &[
    "p", "tv", "reel", "reels", "explore", "accounts", "stories", "direct", "about", "developer",
    "legal", "web", "api", "graphql",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Post { shortcode: String },
    Profile { username: String },
}

impl Reference {
    /// The cache key for this reference.
    pub fn identifier(&self) -> &str {
        match self {
            Reference::Post { shortcode } => shortcode,
            Reference::Profile { username } => username,
        }
    }
}

/// Classify a user-supplied link.
/// "https://www.instagram.com/p/abc123/" → Post("abc123")
/// "https://instagram.com/SomeUser/"     → Profile("someuser")
pub fn classify(reference: &str) -> Result<Reference> {
    let invalid = || ArchiveError::InvalidReference(reference.to_string());

    let trimmed = reference.trim();
    let parsed = url::Url::parse(trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }

    let host = parsed.host_str().ok_or_else(invalid)?.to_lowercase();
    if host != "instagram.com" && !host.ends_with(".instagram.com") {
        return Err(invalid());
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [kind, code, ..] if matches!(*kind, "p" | "tv" | "reel") && SHORTCODE_RE.is_match(code) => {
            Ok(Reference::Post {
                shortcode: code.to_string(),
            })
        }
        [name] => {
            let name = name.strip_prefix('@').unwrap_or(*name);
            let lower = name.to_lowercase();
            if USERNAME_RE.is_match(&lower) && !RESERVED_PATHS.contains(&lower.as_str()) {
                Ok(Reference::Profile { username: lower })
            } else {
                Err(invalid())
            }
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(code: &str) -> Reference {
        Reference::Post {
            shortcode: code.into(),
        }
    }

    fn profile(name: &str) -> Reference {
        Reference::Profile {
            username: name.into(),
        }
    }

    #[test]
    fn post_link() {
        assert_eq!(
            classify("https://www.instagram.com/p/abc123/").unwrap(),
            post("abc123")
        );
    }

    #[test]
    fn post_link_with_query_and_no_trailing_slash() {
        assert_eq!(
            classify("https://instagram.com/p/Cx-9_aB1?igshid=xyz").unwrap(),
            post("Cx-9_aB1")
        );
    }

    #[test]
    fn reel_link_is_a_post() {
        assert_eq!(
            classify("https://www.instagram.com/reel/C1xYz_9AbC/").unwrap(),
            post("C1xYz_9AbC")
        );
    }

    #[test]
    fn igtv_link_is_a_post() {
        assert_eq!(
            classify("https://www.instagram.com/tv/B8abcdEF/").unwrap(),
            post("B8abcdEF")
        );
    }

    #[test]
    fn profile_link() {
        assert_eq!(
            classify("https://www.instagram.com/someuser/").unwrap(),
            profile("someuser")
        );
    }

    #[test]
    fn profile_username_is_lowercased() {
        assert_eq!(
            classify("https://instagram.com/Some.User_1").unwrap(),
            profile("some.user_1")
        );
    }

    #[test]
    fn not_a_url() {
        assert!(matches!(
            classify("not a url"),
            Err(ArchiveError::InvalidReference(_))
        ));
    }

    #[test]
    fn other_host_is_rejected() {
        assert!(classify("https://example.com/p/abc123/").is_err());
        assert!(classify("https://notinstagram.com/someuser/").is_err());
    }

    #[test]
    fn reserved_sections_are_not_profiles() {
        for link in [
            "https://www.instagram.com/explore/",
            "https://www.instagram.com/accounts/",
            "https://www.instagram.com/p/",
        ] {
            assert!(classify(link).is_err(), "{link} should not classify");
        }
    }

    #[test]
    fn bare_domain_is_rejected() {
        assert!(classify("https://www.instagram.com/").is_err());
    }

    #[test]
    fn nested_profile_path_is_rejected() {
        assert!(classify("https://www.instagram.com/someuser/tagged/").is_err());
    }

    #[test]
    fn identifier_is_the_cache_key() {
        assert_eq!(post("abc123").identifier(), "abc123");
        assert_eq!(profile("someuser").identifier(), "someuser");
    }
}
