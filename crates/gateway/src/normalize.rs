//! Recipient address normalization.

/// Formats raw phone input into the transport's canonical recipient address.
///
/// Steps, in order: strip every non-digit character, replace a leading "0"
/// with the national prefix, append the domain suffix if not already
/// present. Idempotent.
///
/// Deliberately performs no length or country-code validation: malformed
/// input silently produces a malformed address. This mirrors the gateway's
/// historical behavior and is documented rather than fixed.
#[derive(Debug, Clone)]
pub struct PhoneFormatter {
    national_prefix: String,
    domain_suffix: String,
}

impl PhoneFormatter {
    pub fn new(national_prefix: impl Into<String>, domain_suffix: impl Into<String>) -> Self {
        Self {
            national_prefix: national_prefix.into(),
            domain_suffix: domain_suffix.into(),
        }
    }

    /// Normalize a raw phone string into a canonical recipient address.
    pub fn format(&self, raw: &str) -> String {
        let mut formatted: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        if let Some(rest) = formatted.strip_prefix('0') {
            formatted = format!("{}{}", self.national_prefix, rest);
        }

        let suffix = format!("@{}", self.domain_suffix);
        if formatted.ends_with(&suffix) {
            formatted
        } else {
            formatted + &suffix
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> PhoneFormatter {
        PhoneFormatter::new("62", "c.us")
    }

    #[test]
    fn test_leading_zero_replaced() {
        assert_eq!(formatter().format("081234567890"), "6281234567890@c.us");
    }

    #[test]
    fn test_non_digits_stripped_before_prefix_check() {
        assert_eq!(formatter().format("+628123"), "628123@c.us");
        assert_eq!(formatter().format("0812-3456 (7890)"), "6281234567890@c.us");
    }

    #[test]
    fn test_already_suffixed_unchanged() {
        assert_eq!(
            formatter().format("6281234567890@c.us"),
            "6281234567890@c.us"
        );
    }

    #[test]
    fn test_idempotent() {
        let f = formatter();
        for input in [
            "081234567890",
            "+62 812 3456 7890",
            "6281234567890@c.us",
            "garbage",
            "",
        ] {
            let once = f.format(input);
            assert_eq!(f.format(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_malformed_input_passes_through() {
        // No validation: garbage in, best-effort address out
        assert_eq!(formatter().format("abc"), "@c.us");
        assert_eq!(formatter().format("12"), "12@c.us");
    }

    #[test]
    fn test_configurable_prefix_and_suffix() {
        let f = PhoneFormatter::new("49", "s.net");
        assert_eq!(f.format("0171234"), "49171234@s.net");
    }
}
