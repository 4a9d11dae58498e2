//! Candidate score and resolution confidence.

use chrono::{DateTime, Utc};

use deployiq_core::config::ResolverConfig;
use deployiq_core::models::Solution;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// `max(0, (window − days since last use) / window)`. Never used scores 0.
pub fn recency(last_used: Option<DateTime<Utc>>, now: DateTime<Utc>, window_days: f64) -> f64 {
    let Some(last_used) = last_used else {
        return 0.0;
    };
    if window_days <= 0.0 {
        return 0.0;
    }
    let days = (now - last_used).num_seconds().max(0) as f64 / SECONDS_PER_DAY;
    ((window_days - days) / window_days).max(0.0)
}

pub fn score(solution: &Solution, config: &ResolverConfig, now: DateTime<Utc>) -> f64 {
    let safe_bonus = if solution.automation_safe {
        config.automation_safe_bonus
    } else {
        0.0
    };
    solution.effectiveness * config.effectiveness_weight
        + solution.success_rate * config.success_rate_weight
        + recency(solution.last_used, now, config.recency_window_days) * config.recency_weight
        + safe_bonus
}

/// Success rate plus a bonus for how often the error was seen before, capped.
pub fn confidence(success_rate: f64, similar_cases: usize, config: &ResolverConfig) -> f64 {
    let bonus = if similar_cases > config.many_cases_threshold {
        config.many_cases_bonus
    } else if similar_cases > config.some_cases_threshold {
        config.some_cases_bonus
    } else {
        0.0
    };
    (success_rate + bonus).min(config.confidence_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn recency_decays_linearly_over_window() {
        let now = Utc::now();
        assert_eq!(recency(None, now, 30.0), 0.0);
        assert_eq!(recency(Some(now), now, 30.0), 1.0);
        let half = recency(Some(now - Duration::days(15)), now, 30.0);
        assert!((half - 0.5).abs() < 1e-9);
        assert_eq!(recency(Some(now - Duration::days(90)), now, 30.0), 0.0);
    }

    #[test]
    fn score_uses_configured_weights() {
        let now = Utc::now();
        let mut s = Solution::new("fix").automation_safe(true);
        s.effectiveness = 8.0;
        s.success_rate = 0.5;
        s.last_used = Some(now);
        let config = ResolverConfig::default();
        // 8×0.4 + 0.5×3 + 1×2 + 1
        assert!((score(&s, &config, now) - 7.7).abs() < 1e-9);

        s.automation_safe = false;
        s.last_used = None;
        assert!((score(&s, &config, now) - 4.7).abs() < 1e-9);
    }

    #[test]
    fn confidence_bonus_steps() {
        let config = ResolverConfig::default();
        assert_eq!(confidence(0.4, 2, &config), 0.4);
        assert!((confidence(0.4, 3, &config) - 0.5).abs() < 1e-9);
        assert!((confidence(0.4, 6, &config) - 0.6).abs() < 1e-9);
        assert_eq!(confidence(0.9, 6, &config), 0.95);
    }
}
