//! Sentiment probability to rating conversion.

const NEGATIVE_WEIGHT: f64 = 0.0;
const NEUTRAL_WEIGHT: f64 = 5.0;
const POSITIVE_WEIGHT: f64 = 10.0;

/// Convert 3-class sentiment probabilities into a rating in [0, 10],
/// where 0 is negative, 5 neutral, and 10 positive.
///
/// The probabilities are normalized by their sum, so slightly uncalibrated
/// model output still maps into range. All-zero input rates as neutral.
#[must_use]
pub fn sentiment_rating(positive: f64, negative: f64, neutral: f64) -> f64 {
    let sum = positive + negative + neutral;
    if sum <= 0.0 {
        return NEUTRAL_WEIGHT;
    }

    (positive * POSITIVE_WEIGHT + negative * NEGATIVE_WEIGHT + neutral * NEUTRAL_WEIGHT) / sum
}
