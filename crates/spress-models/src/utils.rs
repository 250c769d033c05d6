//! Small shared helpers.

/// Return the first candidate that is present and passes `valid`.
///
/// The pipeline's ordered fallback chains (duration resolution, media
/// variant selection) all reduce to this: a list of candidate producers,
/// first usable value wins.
pub fn first_match<T>(
    candidates: impl IntoIterator<Item = Option<T>>,
    valid: impl Fn(&T) -> bool,
) -> Option<T> {
    candidates.into_iter().flatten().find(|v| valid(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_skips_absent_and_invalid() {
        let got = first_match([None, Some(0.0), Some(-1.0), Some(2.5), Some(9.0)], |d| {
            *d > 0.0
        });
        assert_eq!(got, Some(2.5));
    }

    #[test]
    fn test_first_match_empty() {
        let got: Option<i32> = first_match([None, None], |_| true);
        assert_eq!(got, None);
    }
}
