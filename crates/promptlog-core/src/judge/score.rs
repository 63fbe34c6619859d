use crate::model::Score;
use regex::Regex;
use std::sync::OnceLock;

fn score_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:score|rating)\s*[:=]\s*(\d+(?:\.\d+)?)|\b(\d+(?:\.\d+)?)\s*/\s*5\b|\b(\d+(?:\.\d+)?)\s+out\s+of\s+5\b",
        )
        .expect("score regex")
    })
}

/// Pulls a 1-5 score out of free-form judge output.
///
/// Understands `Score: N`, `Rating: N`, `N/5` and `N out of 5`. Only the
/// first match counts; a fractional or out-of-range value yields `None`
/// instead of falling through to later matches.
pub fn extract_score(text: &str) -> Option<Score> {
    let caps = score_re().captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    raw.as_str().parse::<Score>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str) -> Option<u8> {
        extract_score(text).map(|s| s.value())
    }

    #[test]
    fn recognised_formats() {
        assert_eq!(value("Score: 4"), Some(4));
        assert_eq!(value("Rating: 5"), Some(5));
        assert_eq!(value("3/5"), Some(3));
        assert_eq!(value("I give it 2 out of 5"), Some(2));
        assert_eq!(value("score=1"), Some(1));
        assert_eq!(value("SCORE: 4/5"), Some(4));
    }

    #[test]
    fn score_inside_longer_text() {
        assert_eq!(
            value("The prompt was good, but the response could be better.\nScore: 3\nHere's why..."),
            Some(3)
        );
    }

    #[test]
    fn unusable_input() {
        assert_eq!(value("No score here"), None);
        assert_eq!(value("Score: invalid"), None);
        assert_eq!(value("Score: 6"), None);
        assert_eq!(value("Score: 0"), None);
        assert_eq!(value("Score: 3.5"), None);
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(value("Score: 2. Earlier drafts were 4/5."), Some(2));
    }
}
