//! Dedup keys for outgoing messages
//!
//! A fingerprint is the literal text of a message's recipients, subject and
//! body with every `HH:MM:SS`-shaped substring removed. Two alerts that only
//! differ in an embedded clock time collapse to the same key.
//!
//! Fingerprints are not hashed. Collisions between genuinely different
//! messages are possible and accepted: the goal is approximate suppression of
//! near-duplicates, not exact identity.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator used between recipients when building the key
pub const RECIPIENT_SEPARATOR: &str = ",";

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{2}:\d{2}:\d{2}").expect("Invalid regex"))
}

/// Remove every `\d{2}:\d{2}:\d{2}` match from `input`
#[must_use]
pub fn mask_timestamps(input: &str) -> String {
    time_pattern().replace_all(input, "").into_owned()
}

/// Where timestamp masking is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Concatenate recipients, subject and body, then mask the whole string
    #[default]
    Concatenated,

    /// Mask recipients, subject and body independently, then concatenate
    ///
    /// Only differs from [`Normalization::Concatenated`] when a time pattern
    /// would straddle a part boundary.
    PerPart,
}

/// Normalized dedup key for a message
///
/// # Examples
///
/// ```rust
/// use ratemail::fingerprint::Fingerprint;
///
/// let a = Fingerprint::new(&["a@x.com"], "Report", "Generated at 10:15:32");
/// let b = Fingerprint::new(&["a@x.com"], "Report", "Generated at 23:59:01");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Build a fingerprint using [`Normalization::Concatenated`]
    #[must_use]
    pub fn new<S: AsRef<str>>(recipients: &[S], subject: &str, body: &str) -> Self {
        Self::build(Normalization::Concatenated, recipients, subject, body)
    }

    /// Build a fingerprint with an explicit normalization mode
    #[must_use]
    pub fn build<S: AsRef<str>>(
        mode: Normalization,
        recipients: &[S],
        subject: &str,
        body: &str,
    ) -> Self {
        let joined = join_recipients(recipients);

        let key = match mode {
            Normalization::Concatenated => {
                mask_timestamps(&format!("{joined}{subject}{body}"))
            }
            Normalization::PerPart => {
                let mut key = mask_timestamps(&joined);
                key.push_str(&mask_timestamps(subject));
                key.push_str(&mask_timestamps(body));
                key
            }
        };

        Self(key)
    }

    /// The normalized key text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the fingerprint, returning the key text
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn join_recipients<S: AsRef<str>>(recipients: &[S]) -> String {
    recipients
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(RECIPIENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timestamps_are_masked() {
        let a = Fingerprint::new(&["a@x.com"], "Report", "Generated at 10:15:32");
        let b = Fingerprint::new(&["a@x.com"], "Report", "Generated at 23:59:01");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "a@x.comReportGenerated at ");
    }

    #[test]
    fn test_subject_change_is_significant() {
        let a = Fingerprint::new(&["a@x.com"], "Report", "Generated at 10:15:32");
        let b = Fingerprint::new(&["a@x.com"], "Report X", "Generated at 10:15:32");
        assert_ne!(a, b);
    }

    #[test]
    fn test_recipient_order_is_significant() {
        let a = Fingerprint::new(&["a@x.com", "b@x.com"], "S", "B");
        let b = Fingerprint::new(&["b@x.com", "a@x.com"], "S", "B");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "a@x.com,b@x.comSB");
    }

    #[test]
    fn test_every_match_is_removed() {
        let fp = Fingerprint::new(&["a@x.com"], "at 01:02:03", "from 04:05:06 to 07:08:09");
        assert_eq!(fp.as_str(), "a@x.comat from  to ");
    }

    #[test]
    fn test_partial_times_are_kept() {
        assert_eq!(mask_timestamps("10:15 and 1:02:03"), "10:15 and 1:02:03");
        assert_eq!(mask_timestamps("123:45:678"), "18");
    }

    #[test]
    fn test_no_recipients() {
        let fp = Fingerprint::new::<&str>(&[], "Subject", "Body");
        assert_eq!(fp.as_str(), "SubjectBody");
    }

    #[test]
    fn test_per_part_matches_concatenated_for_ordinary_input() {
        let recipients = ["a@x.com", "b@x.com"];
        let concatenated = Fingerprint::build(
            Normalization::Concatenated,
            &recipients,
            "Nightly run 02:00:00",
            "Finished at 02:13:44",
        );
        let per_part = Fingerprint::build(
            Normalization::PerPart,
            &recipients,
            "Nightly run 02:00:00",
            "Finished at 02:13:44",
        );
        assert_eq!(concatenated, per_part);
    }

    #[test]
    fn test_per_part_differs_when_pattern_straddles_boundary() {
        // "12:3" + "4:56" only forms a time once concatenated
        let concatenated = Fingerprint::build(Normalization::Concatenated, &["a"], "12:3", "4:56");
        let per_part = Fingerprint::build(Normalization::PerPart, &["a"], "12:3", "4:56");
        assert_eq!(concatenated.as_str(), "a");
        assert_eq!(per_part.as_str(), "a12:34:56");
    }

    proptest! {
        #[test]
        fn prop_clock_times_never_change_the_key(
            prefix in "[a-zA-Z ]{0,20}",
            suffix in "[a-zA-Z ]{0,20}",
            h1 in 0u32..24, m1 in 0u32..60, s1 in 0u32..60,
            h2 in 0u32..24, m2 in 0u32..60, s2 in 0u32..60,
        ) {
            let body1 = format!("{prefix}{h1:02}:{m1:02}:{s1:02}{suffix}");
            let body2 = format!("{prefix}{h2:02}:{m2:02}:{s2:02}{suffix}");
            prop_assert_eq!(
                Fingerprint::new(&["ops@example.com"], "Alert", &body1),
                Fingerprint::new(&["ops@example.com"], "Alert", &body2)
            );
        }

        #[test]
        fn prop_fingerprint_is_deterministic(
            recipients in proptest::collection::vec("[a-z]{1,8}@[a-z]{1,8}\\.com", 0..4),
            subject in ".{0,30}",
            body in ".{0,60}",
        ) {
            prop_assert_eq!(
                Fingerprint::new(&recipients, &subject, &body),
                Fingerprint::new(&recipients, &subject, &body)
            );
        }
    }
}
