//! Country Reference Table
//! Embedded country-name to ISO alpha-3 lookup used by the location normalizer.

/// Country names and their alpha-3 codes.
///
/// Covers every state that hosts or has hosted an orbital launch site plus the
/// colloquial and long-form names the scraped location strings actually use
/// ("USA", "Republic of Kazakhstan", "Iran, Islamic Republic of").
const ALPHA3: &[(&str, &str)] = &[
    ("Algeria", "DZA"),
    ("Argentina", "ARG"),
    ("Australia", "AUS"),
    ("Brazil", "BRA"),
    ("Canada", "CAN"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Egypt", "EGY"),
    ("France", "FRA"),
    ("French Guiana", "GUF"),
    ("Germany", "DEU"),
    ("India", "IND"),
    ("Indonesia", "IDN"),
    ("Iran", "IRN"),
    ("Iran, Islamic Republic of", "IRN"),
    ("Iraq", "IRQ"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    ("Japan", "JPN"),
    ("Kazakhstan", "KAZ"),
    ("Kenya", "KEN"),
    ("Korea, Democratic People's Republic of", "PRK"),
    ("Korea, Republic of", "KOR"),
    ("Marshall Islands", "MHL"),
    ("Mexico", "MEX"),
    ("New Zealand", "NZL"),
    ("North Korea", "PRK"),
    ("Norway", "NOR"),
    ("Pakistan", "PAK"),
    ("Republic of Kazakhstan", "KAZ"),
    ("Russian Federation", "RUS"),
    ("Saudi Arabia", "SAU"),
    ("South Africa", "ZAF"),
    ("South Korea", "KOR"),
    ("Spain", "ESP"),
    ("Sweden", "SWE"),
    ("Ukraine", "UKR"),
    ("United Arab Emirates", "ARE"),
    ("United Kingdom", "GBR"),
    ("United States of America", "USA"),
    ("USA", "USA"),
];

/// Resolve a country name to its alpha-3 code.
///
/// Matching is case-insensitive. An alpha-3 code is accepted as input and
/// returned unchanged, so an already-normalized value round-trips.
pub fn alpha3(name: &str) -> Option<&'static str> {
    let query = name.trim();
    for (country, code) in ALPHA3 {
        if query.eq_ignore_ascii_case(country) || query.eq_ignore_ascii_case(code) {
            return Some(code);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(alpha3("Kazakhstan"), Some("KAZ"));
        assert_eq!(alpha3("Republic of Kazakhstan"), Some("KAZ"));
        assert_eq!(alpha3("Russian Federation"), Some("RUS"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(alpha3("new zealand"), Some("NZL"));
        assert_eq!(alpha3("FRANCE"), Some("FRA"));
    }

    #[test]
    fn test_alpha3_code_round_trips() {
        assert_eq!(alpha3("USA"), Some("USA"));
        assert_eq!(alpha3("kaz"), Some("KAZ"));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(alpha3("Pacific Ocean"), None);
        assert_eq!(alpha3(""), None);
    }
}
