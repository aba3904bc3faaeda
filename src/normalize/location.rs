//! Location Normalizer
//! Maps free-text launch-site locations to ISO alpha-3 country codes.

use polars::prelude::*;

use super::countries;

/// Known location fragments and the country they belong to.
///
/// Checked in order, first match wins. The order matters: some keys are
/// substrings of fuller names ("Russia" also occurs inside "Russian
/// Federation"), so entries must stay exactly as listed.
const ALIASES: [(&str, &str); 7] = [
    ("Yellow Sea", "China"),
    ("Barents Sea", "Russian Federation"),
    ("Shahrud Missile Test Site", "Iran, Islamic Republic of"),
    ("North Korea", "Korea, Democratic People's Republic of"),
    ("Pacific Missile Range Facility", "USA"),
    ("Gran Canaria", "USA"),
    ("Russia", "Russian Federation"),
];

/// Resolve a location string to an alpha-3 country code.
///
/// The alias table is consulted first; otherwise the segment after the last
/// comma is looked up as a country name. Returns `None` when neither path
/// resolves, so unknown locations become their own bucket downstream instead
/// of an error.
pub fn normalize_location(location: &str) -> Option<&'static str> {
    for (fragment, country) in ALIASES {
        if location.contains(fragment) {
            return countries::alpha3(country);
        }
    }

    let last_segment = location.rsplit(',').next()?.trim();
    countries::alpha3(last_segment)
}

/// Return a copy of the table with a nullable `country_code` column appended.
pub fn with_country_codes(df: &DataFrame) -> PolarsResult<DataFrame> {
    let locations = df.column("location")?.str()?;

    let mut codes: Vec<Option<&str>> = Vec::with_capacity(df.height());
    for location in locations.into_iter() {
        codes.push(location.and_then(normalize_location));
    }

    df.hstack(&[Column::new("country_code".into(), codes)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_last_segment_resolves_directly() {
        assert_eq!(
            normalize_location("Baikonur Cosmodrome, Republic of Kazakhstan"),
            Some("KAZ")
        );
        assert_eq!(
            normalize_location("Kennedy Space Center, Florida, USA"),
            Some("USA")
        );
    }

    #[test]
    fn test_alias_short_circuits_last_segment() {
        // The final segment would resolve on its own, but the alias wins.
        assert_eq!(
            normalize_location("Pacific Missile Range Facility, Barking Sands, USA"),
            Some("USA")
        );
        assert_eq!(
            normalize_location("Tai Rui Barge, Yellow Sea, China"),
            Some("CHN")
        );
    }

    #[test]
    fn test_alias_matches_anywhere_in_string() {
        assert_eq!(
            normalize_location("Site 1/5, Baikonur Cosmodrome, Russia"),
            Some("RUS")
        );
        assert_eq!(normalize_location("Shahrud Missile Test Site"), Some("IRN"));
        assert_eq!(
            normalize_location("LP Odyssey, Kiritimati Launch Area, Gran Canaria"),
            Some("USA")
        );
    }

    #[test]
    fn test_no_commas_uses_whole_string() {
        assert_eq!(normalize_location("Kazakhstan"), Some("KAZ"));
    }

    #[test]
    fn test_unknown_location_is_none() {
        assert_eq!(
            normalize_location("LP Odyssey, Kiritimati Launch Area, Pacific Ocean"),
            None
        );
    }

    #[test]
    fn test_idempotent_on_normalized_value() {
        let code = normalize_location("Vandenberg AFB, California, USA").unwrap();
        assert_eq!(normalize_location(code), Some(code));
    }

    #[test]
    fn test_with_country_codes_column() {
        let df = df! {
            "location" => &[
                "Baikonur Cosmodrome, Republic of Kazakhstan",
                "Sea Launch Platform, Pacific Ocean",
            ],
        }
        .unwrap();

        let enriched = with_country_codes(&df).unwrap();
        let codes = enriched.column("country_code").unwrap().str().unwrap();
        assert_eq!(codes.get(0), Some("KAZ"));
        assert_eq!(codes.get(1), None);
        // Input table is untouched.
        assert_eq!(df.width(), 1);
    }
}
