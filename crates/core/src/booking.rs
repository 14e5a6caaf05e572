//! Tour booking links for the results page.
//!
//! With a configured scheduling base URL the link carries a prefilled
//! `text` query parameter; without one it falls back to a `mailto:` link.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query parameter carrying the prefill text.
pub const PREFILL_PARAM: &str = "text";

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Build the "Book a tour" link for `address`.
///
/// `base_url` is the optional scheduling page; blank values count as unset.
pub fn booking_link(base_url: Option<&str>, address: &str) -> String {
    let prefill = encode_component(&format!("Tour for {address}"));

    match base_url.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => {
            let (head, fragment) = match base.split_once('#') {
                Some((head, fragment)) => (head, Some(fragment)),
                None => (base, None),
            };
            let separator = if !head.contains('?') {
                "?"
            } else if head.ends_with('?') || head.ends_with('&') {
                ""
            } else {
                "&"
            };
            let mut link = format!("{head}{separator}{PREFILL_PARAM}={prefill}");
            if let Some(fragment) = fragment {
                link.push('#');
                link.push_str(fragment);
            }
            link
        }
        None => {
            let body = encode_component(&format!("I'd like to book a tour for: {address}"));
            format!("mailto:?subject={prefill}&body={body}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCODED: &str = "Tour%20for%20123%20Main%20St";

    #[test]
    fn appends_prefill_to_base_url() {
        let link = booking_link(Some("https://calendly.com/demo"), "123 Main St");
        assert_eq!(link, format!("https://calendly.com/demo?text={ENCODED}"));
    }

    #[test]
    fn merges_into_existing_query() {
        let link = booking_link(Some("https://calendly.com/demo?month=2024-05"), "123 Main St");
        assert_eq!(
            link,
            format!("https://calendly.com/demo?month=2024-05&text={ENCODED}")
        );

        let link = booking_link(Some("https://calendly.com/demo?"), "123 Main St");
        assert_eq!(link, format!("https://calendly.com/demo?text={ENCODED}"));
    }

    #[test]
    fn keeps_fragment_last() {
        let link = booking_link(Some("https://book.example/tours#slots"), "123 Main St");
        assert_eq!(link, format!("https://book.example/tours?text={ENCODED}#slots"));
    }

    #[test]
    fn falls_back_to_mailto() {
        for base in [None, Some(""), Some("   ")] {
            let link = booking_link(base, "123 Main St");
            assert!(link.starts_with("mailto:"), "{link}");
            assert!(link.contains(ENCODED), "{link}");
            assert!(link.contains("body=I'd%20like%20to%20book%20a%20tour%20for%3A%20123%20Main%20St"));
        }
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("a&b=c/d?"), "a%26b%3Dc%2Fd%3F");
        assert_eq!(encode_component("it's (ok)!*~._-"), "it's%20(ok)!*~._-");
        assert_eq!(encode_component("Ünit"), "%C3%9Cnit");
    }
}
