//! Banking and ISO code formats.

use super::{unsupported, Checked, ConstraintValidator, Violation};
use crate::error::ApiErrorCode;
use crate::validation::ValidationContext;
use crate::value::FieldValue;

/// ISO 3166-1 alpha-2 country codes, sorted for binary search.
const COUNTRIES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// ISO 639-1 language codes, sorted for binary search.
const LANGUAGES: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg",
    "bh", "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv",
    "cy", "da", "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi",
    "fj", "fo", "fr", "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr",
    "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja",
    "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw",
    "ky", "la", "lb", "lg", "li", "ln", "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml",
    "mn", "mr", "ms", "mt", "my", "na", "nb", "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv",
    "ny", "oc", "oj", "om", "or", "os", "pa", "pi", "pl", "ps", "pt", "qu", "rm", "rn", "ro",
    "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr",
    "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr",
    "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa", "wo", "xh", "yi",
    "yo", "za", "zh", "zu",
];

fn is_country(code: &str) -> bool {
    code.len() == 2 && COUNTRIES.binary_search(&code.to_ascii_uppercase().as_str()).is_ok()
}

fn is_language(code: &str) -> bool {
    code.len() == 2 && LANGUAGES.binary_search(&code.to_ascii_lowercase().as_str()).is_ok()
}

/// Checks structure and the ISO 13616 modulo-97 checksum. Spaces are
/// ignored.
fn is_iban(raw: &str) -> bool {
    let compact: String = raw
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if !(15..=34).contains(&compact.len()) || !compact.is_ascii() {
        return false;
    }
    let (head, body) = compact.split_at(4);
    let bytes = head.as_bytes();
    if !bytes[..2].iter().all(u8::is_ascii_uppercase)
        || !bytes[2..].iter().all(u8::is_ascii_digit)
        || !body.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return false;
    }

    let mut remainder: u32 = 0;
    for c in body.chars().chain(head.chars()) {
        let Some(digit) = c.to_digit(36) else {
            return false;
        };
        remainder = if digit < 10 {
            (remainder * 10 + digit) % 97
        } else {
            (remainder * 100 + digit) % 97
        };
    }
    remainder == 1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Iban;

impl Iban {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintValidator for Iban {
    fn name(&self) -> &'static str {
        "Iban"
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        if is_iban(text) {
            return Ok(None);
        }
        Ok(Some(Violation::new(
            ApiErrorCode::IbanFormatViolation,
            "Must be a valid IBAN",
        )))
    }
}

/// ISO 3166-1 alpha-2 country code, case-insensitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoCountry;

impl IsoCountry {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintValidator for IsoCountry {
    fn name(&self) -> &'static str {
        "IsoCountry"
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        if is_country(text) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                ApiErrorCode::CountryCodeViolation,
                "Must be an ISO 3166 country code",
            )
            .param("value", text),
        ))
    }
}

/// ISO 639-1 language code, optionally followed by a region
/// (`en`, `en-US`, `pt_BR`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Language;

impl Language {
    pub fn new() -> Self {
        Self
    }
}

fn is_language_tag(text: &str) -> bool {
    match text.split_once(['-', '_']) {
        Some((language, region)) => is_language(language) && is_country(region),
        None => is_language(text),
    }
}

impl ConstraintValidator for Language {
    fn name(&self) -> &'static str {
        "Language"
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        if is_language_tag(text) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                ApiErrorCode::LanguageCodeViolation,
                "Must be an ISO 639 language code",
            )
            .param("value", text),
        ))
    }
}
