use std::borrow::Cow;

/// Returns a lowercase representation, reusing the original string if already lowercase.
pub fn lowercase(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| !ch.is_uppercase()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_lowercase())
    }
}

/// Removes `prefix` once from the start of `input`.
pub fn strip_prefix<'a>(input: &'a str, prefix: &str) -> Cow<'a, str> {
    if prefix.is_empty() {
        return Cow::Borrowed(input);
    }
    match input.strip_prefix(prefix) {
        Some(rest) => Cow::Borrowed(rest),
        None => Cow::Borrowed(input),
    }
}

/// Deletes every occurrence of any character in `chars`.
pub fn remove_chars<'a>(input: &'a str, chars: &str) -> Cow<'a, str> {
    if chars.is_empty() || !input.contains(|ch| chars.contains(ch)) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.chars().filter(|ch| !chars.contains(*ch)).collect())
    }
}

pub fn strip_leading_zeros(input: &str) -> &str {
    input.trim_start_matches('0')
}

pub fn strip_trailing_zeros(input: &str) -> &str {
    input.trim_end_matches('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_borrows_when_unchanged() {
        assert!(matches!(lowercase("benzin"), Cow::Borrowed(_)));
        assert_eq!(lowercase("KS-BENZIN"), "ks-benzin");
    }

    #[test]
    fn strip_prefix_removes_only_the_leading_occurrence() {
        assert_eq!(strip_prefix("ks-ks-x", "ks-"), "ks-x");
        assert_eq!(strip_prefix("diesel", "ks-"), "diesel");
        assert_eq!(strip_prefix("diesel", ""), "diesel");
    }

    #[test]
    fn remove_chars_drops_separators() {
        assert_eq!(remove_chars("euro-6d-temp", "-"), "euro6dtemp");
        assert_eq!(remove_chars("euro_6", "-"), "euro_6");
    }

    #[test]
    fn zero_stripping_is_textual() {
        assert_eq!(strip_leading_zeros("08111"), "8111");
        assert_eq!(strip_leading_zeros("00000"), "");
        assert_eq!(strip_trailing_zeros("081170"), "08117");
        assert_eq!(strip_trailing_zeros("5000"), "5");
    }
}
