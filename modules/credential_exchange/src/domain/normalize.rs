/// Longest `AppInstanceUserId` the directory accepts.
pub const MAX_USER_ID_CHARS: usize = 64;

/// Map an identity-provider subject onto the character set accepted by
/// session tags and directory user ids: anything outside `[A-Za-z0-9._@-]`
/// (notably the `|` namespace separator) becomes `-`.
///
/// Length is preserved, so `idp|` maps to `idp-`; the directory only needs
/// one non-blank character. Callers enforce [`MAX_USER_ID_CHARS`].
pub fn normalize_subject(sub: &str) -> String {
    sub.chars()
        .map(|c| if is_allowed(c) { c } else { '-' })
        .collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '-')
}

/// Truncate to at most `max` characters, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_separator_is_replaced() {
        assert_eq!(normalize_subject("idp|abc123"), "idp-abc123");
        assert_eq!(
            normalize_subject("google-oauth2|116516830732891266543"),
            "google-oauth2-116516830732891266543"
        );
    }

    #[test]
    fn every_disallowed_char_is_replaced() {
        assert_eq!(normalize_subject("a|b|c"), "a-b-c");
        assert_eq!(normalize_subject("a b/c:d"), "a-b-c-d");
        assert_eq!(normalize_subject("ü"), "-");
        assert_eq!(normalize_subject("user.name_1@example.com"), "user.name_1@example.com");
    }

    #[test]
    fn output_is_total_and_deterministic() {
        let inputs = ["", "|", "auth0|5f7c8ec7c33c6c004bbafe82", "😀x", "a\tb\nc", "..--__@@"];
        for input in inputs {
            let once = normalize_subject(input);
            assert_eq!(once, normalize_subject(input));
            assert_eq!(once.chars().count(), input.chars().count());
            assert!(once.chars().all(is_allowed), "{once:?}");
            // normalizing twice changes nothing
            assert_eq!(normalize_subject(&once), once);
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 64), "abc");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
