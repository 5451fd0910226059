//! Decides whether a single reading shows precipitation.

/// Closed keyword list, matched by plain substring containment.
///
/// The provider describes weather in Chinese by default and in English with `lang=en`,
/// so both vocabularies are listed. Matching is case-sensitive; the English terms are
/// listed in the casings the provider emits.
pub const PRECIPITATION_KEYWORDS: &[&str] = &[
    "雨", "雪", "阵雨", "雷阵雨", "毛毛雨", "小雪", "中雪", "大雪", "暴雪", "雨夹雪",
    "Rain", "rain", "Snow", "snow", "Shower", "shower", "Drizzle", "drizzle", "Sleet",
    "sleet", "Blizzard",
];

/// Parse a provider amount string. Blank, non-numeric and non-finite values yield `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True if `description` names precipitation, or `amount` is a nonzero number.
///
/// Total: unparseable amounts simply fall through to `false`.
pub fn is_precipitating(description: &str, amount: &str) -> bool {
    if PRECIPITATION_KEYWORDS
        .iter()
        .any(|keyword| description.contains(keyword))
    {
        return true;
    }

    parse_amount(amount).is_some_and(|mm| mm != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_wins_regardless_of_amount() {
        for keyword in PRECIPITATION_KEYWORDS {
            for amount in ["", "0", "0.0", "n/a", "3.2"] {
                assert!(
                    is_precipitating(keyword, amount),
                    "{keyword:?} with amount {amount:?}"
                );
            }
        }
    }

    #[test]
    fn test_keyword_matches_inside_longer_description() {
        assert!(is_precipitating("中到大雨", "0.0"));
        assert!(is_precipitating("Light Rain", ""));
        assert!(is_precipitating("Heavy Snow", "0"));
        assert!(is_precipitating("Freezing drizzle", "x"));
    }

    #[test]
    fn test_zero_amount_without_keyword_is_dry() {
        assert!(!is_precipitating("sunny", "0.0"));
        assert!(!is_precipitating("晴", "0"));
        assert!(!is_precipitating("Cloudy", "0.00"));
    }

    #[test]
    fn test_nonzero_amount_alone_is_precipitation() {
        assert!(is_precipitating("sunny", "0.4"));
        assert!(is_precipitating("多云", "0.1"));
        assert!(is_precipitating("Overcast", " 12 "));
    }

    #[test]
    fn test_unparseable_amount_without_keyword_is_dry() {
        assert!(!is_precipitating("sunny", ""));
        assert!(!is_precipitating("sunny", "trace"));
        assert!(!is_precipitating("sunny", "NaN"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5"), Some(1.5));
        assert_eq!(parse_amount(" 0 "), Some(0.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
