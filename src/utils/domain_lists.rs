// Fixed reference tables for the scoring engine.
// Process-wide immutable configuration; user-editable lists live in the
// storage-backed ListService, never here.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// TLDs disproportionately used by throwaway phishing infrastructure.
/// Matched as suffixes against the hostname.
pub const SUSPICIOUS_TLDS: &[&str] = &[
    ".tk", ".ml", ".ga", ".cf", ".gq", ".pw", ".cc", ".top", ".xyz", ".club", ".work", ".click",
    ".website", ".site", ".online", ".space", ".info",
];

/// Well-known brand domains used as the typosquatting reference set.
pub const BRAND_DOMAINS: &[&str] = &[
    "google.com",
    "facebook.com",
    "amazon.com",
    "microsoft.com",
    "apple.com",
    "netflix.com",
    "paypal.com",
    "linkedin.com",
    "twitter.com",
    "instagram.com",
    "youtube.com",
    "github.com",
    "reddit.com",
    "wikipedia.org",
    "stackoverflow.com",
];

/// Keywords common in credential-phishing URLs. Matched case-insensitively
/// as substrings of the full URL; each containment counts once.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login",
    "signin",
    "account",
    "verify",
    "security",
    "update",
    "confirm",
    "suspend",
    "restore",
    "unlock",
    "secure",
    "banking",
    "paypal",
    "amazon",
    "microsoft",
    "apple",
    "netflix",
    "validation",
    "authentication",
    "credential",
    "password-reset",
    "account-recovery",
];

/// Free hosting providers and giveaway ccTLDs frequently abused for phishing.
/// A hostname is flagged when it equals an entry or ends with ".{entry}".
pub const FREE_HOSTING_PROVIDERS: &[&str] = &[
    "weebly.com",
    "wixsite.com",
    "wordpress.com",
    "blogspot.com",
    "tumblr.com",
    "square.site",
    "webflow.io",
    "000webhostapp.com",
    "tk",
    "ml",
    "ga",
    "cf",
    "gq",
];

/// Exact-match trusted hostnames, including their www. variants.
/// Suffix matching is intentionally NOT used here: trusting every host that
/// ends in "google.com" would also trust "evil-google.com".
pub static TRUSTED_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "google.com",
        "www.google.com",
        "google.co.in",
        "www.google.co.in",
        "bing.com",
        "www.bing.com",
        "yahoo.com",
        "www.yahoo.com",
        "duckduckgo.com",
        "www.duckduckgo.com",
        "youtube.com",
        "www.youtube.com",
        "facebook.com",
        "www.facebook.com",
        "twitter.com",
        "www.twitter.com",
        "x.com",
        "www.x.com",
        "instagram.com",
        "www.instagram.com",
        "linkedin.com",
        "www.linkedin.com",
        "github.com",
        "www.github.com",
        "reddit.com",
        "www.reddit.com",
        "wikipedia.org",
        "en.wikipedia.org",
        "stackoverflow.com",
        "www.stackoverflow.com",
        "microsoft.com",
        "www.microsoft.com",
        "apple.com",
        "www.apple.com",
        "amazon.com",
        "www.amazon.com",
        "netflix.com",
        "www.netflix.com",
        "spotify.com",
        "open.spotify.com",
        "discord.com",
        "www.discord.com",
        "cloudflare.com",
        "www.cloudflare.com",
    ])
});

/// Exact trusted-domain check. Case handling is the caller's job; hostnames
/// coming out of the url crate are already lowercased.
pub fn is_trusted_domain(hostname: &str) -> bool {
    TRUSTED_DOMAINS.contains(hostname)
}

/// Free hosting check: exact match or subdomain of a provider.
pub fn is_free_hosting(hostname: &str) -> bool {
    FREE_HOSTING_PROVIDERS.iter().any(|service| {
        hostname == *service || hostname.ends_with(&format!(".{}", service))
    })
}

/// Suspicious TLD suffix check.
pub fn has_suspicious_tld(hostname: &str) -> bool {
    SUSPICIOUS_TLDS.iter().any(|tld| hostname.ends_with(tld))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_is_exact_match_only() {
        assert!(is_trusted_domain("google.com"));
        assert!(is_trusted_domain("www.google.com"));

        // Lookalikes and subdomains must not inherit trust
        assert!(!is_trusted_domain("evil-google.com"));
        assert!(!is_trusted_domain("accounts.google.com"));
        assert!(!is_trusted_domain("google.com.attacker.io"));
    }

    #[test]
    fn test_free_hosting_matches_provider_and_subdomains() {
        assert!(is_free_hosting("weebly.com"));
        assert!(is_free_hosting("my-shop.weebly.com"));
        assert!(is_free_hosting("login.example.tk"));
        assert!(!is_free_hosting("weebly.com.example.org"));
        assert!(!is_free_hosting("example.com"));
    }

    #[test]
    fn test_suspicious_tld_is_suffix_match() {
        assert!(has_suspicious_tld("promo.example.xyz"));
        assert!(has_suspicious_tld("example.tk"));
        assert!(!has_suspicious_tld("example.com"));
    }
}
