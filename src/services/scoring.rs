//! Percentage scoring of one graded attempt.

pub(crate) const MAX_STEP_SCORE: i32 = 2;

/// One graded step: the raw 0..=2 score and whether the skill marks the step as
/// one where a mistake is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepOutcome {
    pub(crate) score: i32,
    pub(crate) mistake_possible: bool,
}

impl StepOutcome {
    pub(crate) fn new(score: i32, mistake_possible: bool) -> Self {
        Self { score: score.clamp(0, MAX_STEP_SCORE), mistake_possible }
    }

    fn penalty(self) -> i64 {
        i64::from(self.score == 0 && self.mistake_possible)
    }
}

/// `round(max(Σscore − penalties, 0) / (len · 2) · 100)`, `0` for no steps.
pub(crate) fn calculate_score(steps: &[StepOutcome]) -> u8 {
    if steps.is_empty() {
        return 0;
    }

    let total: i64 = steps.iter().map(|step| i64::from(step.score) - step.penalty()).sum();
    let max_possible = steps.len() as i64 * i64::from(MAX_STEP_SCORE);

    // Total never exceeds max_possible, so the quotient stays within 0..=100.
    round_half_up(total.max(0) * 100, max_possible) as u8
}

/// Unweighted mean rounded half up; `0` for an empty set.
pub(crate) fn average<I>(scores: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) =
        scores.into_iter().fold((0i64, 0i64), |(sum, count), score| (sum + i64::from(score), count + 1));

    if count == 0 {
        return 0;
    }
    round_half_up(sum, count) as u8
}

fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator) / (2 * denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(scores: &[i32]) -> Vec<StepOutcome> {
        scores.iter().map(|&score| StepOutcome::new(score, false)).collect()
    }

    #[test]
    fn empty_attempt_scores_zero() {
        assert_eq!(calculate_score(&[]), 0);
    }

    #[test]
    fn fixed_points() {
        assert_eq!(calculate_score(&plain(&[2, 2])), 100);
        assert_eq!(calculate_score(&plain(&[0, 0])), 0);
        assert_eq!(calculate_score(&plain(&[1, 1])), 50);
    }

    #[test]
    fn rounds_half_up() {
        // 1 / 4 * 100 = 25, 1 / 6 * 100 = 16.67, 5 / 8 * 100 = 62.5
        assert_eq!(calculate_score(&plain(&[1, 0])), 25);
        assert_eq!(calculate_score(&plain(&[1, 0, 0])), 17);
        assert_eq!(calculate_score(&plain(&[2, 2, 1, 0])), 63);
    }

    #[test]
    fn penalty_is_clamped_at_zero() {
        assert_eq!(calculate_score(&[StepOutcome::new(0, true)]), 0);
    }

    #[test]
    fn penalty_reduces_total() {
        let steps = [StepOutcome::new(0, true), StepOutcome::new(2, false)];
        assert_eq!(calculate_score(&steps), 25);
    }

    #[test]
    fn penalty_only_applies_to_failed_steps() {
        let steps = [StepOutcome::new(1, true), StepOutcome::new(2, true)];
        assert_eq!(calculate_score(&steps), 75);
    }

    #[test]
    fn out_of_range_step_scores_are_clamped() {
        assert_eq!(calculate_score(&plain(&[5, 2])), 100);
        assert_eq!(calculate_score(&plain(&[-3, 2])), 50);
    }

    #[test]
    fn score_stays_within_bounds() {
        for len in 1..=6usize {
            for seed in 0..(3usize.pow(len as u32)) {
                let mut rest = seed;
                let steps: Vec<StepOutcome> = (0..len)
                    .map(|index| {
                        let score = (rest % 3) as i32;
                        rest /= 3;
                        StepOutcome::new(score, index % 2 == 0)
                    })
                    .collect();
                let score = calculate_score(&steps);
                assert!(score <= 100, "score {score} for {steps:?}");
            }
        }
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(Vec::<u8>::new()), 0);
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(average([80, 60]), 70);
        assert_eq!(average([50, 51]), 51);
        assert_eq!(average([10, 10, 11]), 10);
    }
}
