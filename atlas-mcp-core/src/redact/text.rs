//! Ordered text redaction passes
//!
//! Categories run in a fixed order: EMAIL, CARD_NUMBER (brand patterns before
//! the generic digit-group fallback), PHONE (iterated to a fixed point),
//! ADDRESS, SSN. Phone matches are accepted conditionally: a match embedded
//! in a URL, or whose digit count falls outside [7, 15], passes through
//! unmasked.

use once_cell::sync::Lazy;
use regex::Regex;

const EMAIL_TOKEN: &str = "[EMAIL REDACTED]";
const CARD_TOKEN: &str = "[CARD_NUMBER REDACTED]";
const PHONE_TOKEN: &str = "[PHONE REDACTED]";
const ADDRESS_TOKEN: &str = "[ADDRESS REDACTED]";
const SSN_TOKEN: &str = "[SSN REDACTED]";

/// Phone digit-count acceptance window
const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

/// Upper bound on phone fixed-point iterations
const MAX_PHONE_PASSES: usize = 8;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});

// Brand-specific card patterns, most specific first. The generic fallback
// matches 13-16 digit groups with optional space/dash separators and is an
// accepted source of false positives on non-card numeric sequences.
static CARD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b4[0-9]{12}(?:[0-9]{3})?\b",        // Visa
        r"\b5[1-5][0-9]{14}\b",                // Mastercard
        r"\b3[47][0-9]{13}\b",                 // Amex
        r"\b6(?:011|5[0-9]{2})[0-9]{12}\b",    // Discover
        r"\b\d(?:[ -]?\d){12,15}\b",           // generic 13-16 digit group
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid card pattern"))
    .collect()
});

// Phone variants, applied in order within each fixed-point pass.
static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\+\d{1,3}[ .-]?\(?\d{1,4}\)?(?:[ .-]?\d{2,4}){2,4}", // +CC variants
        r"\(\d{3}\)[ .-]?\d{3}[ .-]?\d{4}",                    // (NNN) NNN-NNNN
        r"\b\d{3}[.-]\d{3}[.-]\d{4}\b",                        // NNN-NNN-NNNN
        r"\b\d{10,11}\b",                                      // bare digit run
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid phone pattern"))
    .collect()
});

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b\d{1,6}\s+(?:[A-Za-z0-9'.-]+\s+){0,3}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Court|Ct|Circle|Cir|Place|Pl|Way|Highway|Hwy|Parkway|Pkwy|Square|Sq|Terrace|Ter)\b\.?",
    )
    .expect("valid address pattern")
});

static SSN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid ssn pattern"));

/// Redact recognized sensitive substrings from free text.
///
/// Idempotent: replacement tokens contain no digits or `@`, so a second
/// application leaves the output unchanged.
pub fn redact_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = EMAIL.replace_all(text, EMAIL_TOKEN).into_owned();

    for pattern in CARD_PATTERNS.iter() {
        out = pattern.replace_all(&out, CARD_TOKEN).into_owned();
    }

    // Phone patterns can uncover new matches after a replacement, so the
    // whole variant set is re-applied until a pass makes no change.
    for _ in 0..MAX_PHONE_PASSES {
        let next = phone_pass(&out);
        if next == out {
            break;
        }
        out = next;
    }

    out = ADDRESS.replace_all(&out, ADDRESS_TOKEN).into_owned();
    SSN.replace_all(&out, SSN_TOKEN).into_owned()
}

fn phone_pass(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in PHONE_PATTERNS.iter() {
        let current = out.clone();
        out = pattern
            .replace_all(&current, |caps: &regex::Captures| {
                let Some(m) = caps.get(0) else {
                    return String::new();
                };
                if accept_phone(&current, m.start(), m.as_str()) {
                    PHONE_TOKEN.to_string()
                } else {
                    m.as_str().to_string()
                }
            })
            .into_owned();
    }
    out
}

fn accept_phone(text: &str, start: usize, matched: &str) -> bool {
    if in_url_prefix(text, start) {
        return false;
    }
    let digits = matched.chars().filter(char::is_ascii_digit).count();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

/// True when the text immediately before `start` (since the last whitespace)
/// contains an unterminated `http(s)://` run, i.e. the match sits inside a URL.
fn in_url_prefix(text: &str, start: usize) -> bool {
    let prefix = &text[..start];
    let tail = prefix
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default();
    tail.contains("http://") || tail.contains("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_redacted() {
        let out = redact_text("Contact me at a@b.com");
        assert_eq!(out, format!("Contact me at {}", EMAIL_TOKEN));
    }

    #[test]
    fn test_visa_card_redacted() {
        let out = redact_text("Card 4111111111111111");
        assert_eq!(out, format!("Card {}", CARD_TOKEN));
        assert!(!out.contains("4111"));
    }

    #[test]
    fn test_amex_card_redacted() {
        let out = redact_text("Amex 378282246310005 on file");
        assert_eq!(out, format!("Amex {} on file", CARD_TOKEN));
    }

    #[test]
    fn test_separated_card_redacted() {
        let out = redact_text("pay 4111 1111 1111 1111 now");
        assert_eq!(out, format!("pay {} now", CARD_TOKEN));
    }

    #[test]
    fn test_phone_redacted() {
        let out = redact_text("Call 833-376-1995");
        assert_eq!(out, format!("Call {}", PHONE_TOKEN));
    }

    #[test]
    fn test_paren_phone_redacted() {
        let out = redact_text("desk: (833) 376-1995");
        assert_eq!(out, format!("desk: {}", PHONE_TOKEN));
    }

    #[test]
    fn test_international_phone_redacted() {
        let out = redact_text("mobile +44 20 7946 0958 after hours");
        assert_eq!(out, format!("mobile {} after hours", PHONE_TOKEN));
    }

    #[test]
    fn test_address_redacted() {
        let out = redact_text("123 Main Street");
        assert_eq!(out, ADDRESS_TOKEN);
    }

    #[test]
    fn test_ssn_redacted() {
        let out = redact_text("SSN 123-45-6789");
        assert_eq!(out, format!("SSN {}", SSN_TOKEN));
    }

    #[test]
    fn test_url_digits_exempt_from_phone() {
        let input = "See https://example.com/v1/8008770427";
        assert_eq!(redact_text(input), input);
    }

    #[test]
    fn test_phone_after_url_still_redacted() {
        let out = redact_text("See https://example.com then call 8008770427");
        assert_eq!(
            out,
            format!("See https://example.com then call {}", PHONE_TOKEN)
        );
    }

    #[test]
    fn test_short_digit_runs_pass_through() {
        // Version-like and id-like digit groups below the acceptance window
        assert_eq!(redact_text("v1.2.3 build 42"), "v1.2.3 build 42");
    }

    #[test]
    fn test_generic_card_over_match_is_accepted_tradeoff() {
        // A 13-digit order number trips the generic fallback. Documented
        // over-redaction, not a defect.
        let out = redact_text("Order 1234567890123 shipped");
        assert_eq!(out, format!("Order {} shipped", CARD_TOKEN));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Contact me at a@b.com",
            "Card 4111111111111111",
            "Call 833-376-1995",
            "123 Main Street",
            "SSN 123-45-6789",
            "mixed: a@b.com, (833) 376-1995, 123 Elm Ave, 123-45-6789",
            "See https://example.com/v1/8008770427",
        ];
        for input in inputs {
            let once = redact_text(input);
            assert_eq!(redact_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_mixed_categories_each_redacted_once() {
        let out = redact_text("a@b.com called from 833-376-1995 about 123 Main Street");
        assert_eq!(out.matches(EMAIL_TOKEN).count(), 1);
        assert_eq!(out.matches(PHONE_TOKEN).count(), 1);
        assert_eq!(out.matches(ADDRESS_TOKEN).count(), 1);
        assert!(!out.contains("a@b.com"));
        assert!(!out.contains("833"));
        assert!(!out.contains("Main"));
    }

    #[test]
    fn test_empty_and_plain_text_unchanged() {
        assert_eq!(redact_text(""), "");
        assert_eq!(redact_text("no sensitive content here"), "no sensitive content here");
    }

    #[test]
    fn test_card_consumed_before_phone_fallback() {
        // Without the fixed category order the bare digit-run phone pattern
        // would re-match fragments of the card number.
        let out = redact_text("4111111111111111");
        assert_eq!(out, CARD_TOKEN);
        assert!(!out.contains(PHONE_TOKEN));
    }
}
