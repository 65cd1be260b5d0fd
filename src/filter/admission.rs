//! Admission filter for newly created tokens
//!
//! A pure predicate over a creation event and the static [`FilterConfig`].
//! Checks run in a fixed order and stop at the first violation. Disabled
//! checks are skipped entirely. Missing event fields read as false / zero.

use crate::config::FilterConfig;
use crate::stream::CreationEvent;

/// Reason why a token was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum FilterReason {
    /// Mint has a freeze authority
    Freezable,
    /// LP already burned
    LpBurned,
    /// Liquidity bundled with the launch
    LpBundle,
    /// Pool smaller than the minimum
    PoolBelowMinimum(f64),
    /// Developer holds more than the maximum
    DevHoldExceeded(f64),
    /// No social links
    NoSocials,
    /// Name/symbol or creator did not match the operator's selection
    NotMatched(String),
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterReason::Freezable => write!(f, "token is freezable"),
            FilterReason::LpBurned => write!(f, "LP is burned"),
            FilterReason::LpBundle => write!(f, "LP is bundled"),
            FilterReason::PoolBelowMinimum(sol) => {
                write!(f, "pool size {} SOL below minimum", sol)
            }
            FilterReason::DevHoldExceeded(fraction) => {
                write!(f, "dev hold {:.2}% exceeds max", fraction * 100.0)
            }
            FilterReason::NoSocials => write!(f, "no social links"),
            FilterReason::NotMatched(what) => write!(f, "{}", what),
        }
    }
}

/// Filter result
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    /// Token passed all filters
    Pass,
    /// Token was filtered
    Filtered(FilterReason),
}

impl FilterResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterResult::Pass)
    }
}

/// Evaluate every enabled check in order, stopping at the first violation
pub fn evaluate(event: &CreationEvent, config: &FilterConfig) -> FilterResult {
    if config.check_freezable && event.is_freezable.unwrap_or(false) {
        return FilterResult::Filtered(FilterReason::Freezable);
    }

    if config.check_lp_burned && event.lp_burned.unwrap_or(false) {
        return FilterResult::Filtered(FilterReason::LpBurned);
    }

    if config.skip_lp_bundles && event.is_lp_bundle.unwrap_or(false) {
        return FilterResult::Filtered(FilterReason::LpBundle);
    }

    let pool_size = event.pool_size.unwrap_or(0.0);
    if pool_size < config.min_pool_size {
        return FilterResult::Filtered(FilterReason::PoolBelowMinimum(pool_size));
    }

    let dev_hold = event.dev_hold.unwrap_or(0.0);
    if dev_hold > config.max_dev_hold {
        return FilterResult::Filtered(FilterReason::DevHoldExceeded(dev_hold));
    }

    if config.socials_required && !event.has_socials.unwrap_or(false) {
        return FilterResult::Filtered(FilterReason::NoSocials);
    }

    FilterResult::Pass
}

/// `true` iff no enabled check rejects the event
pub fn passes(event: &CreationEvent, config: &FilterConfig) -> bool {
    evaluate(event, config).is_pass()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> CreationEvent {
        CreationEvent::new("mint", "Token", "TKN", "creator")
    }

    fn config(
        check_freezable: bool,
        check_lp_burned: bool,
        skip_lp_bundles: bool,
        socials_required: bool,
    ) -> FilterConfig {
        FilterConfig {
            check_freezable,
            check_lp_burned,
            skip_lp_bundles,
            min_pool_size: 90.0,
            max_dev_hold: 0.1,
            socials_required,
        }
    }

    /// Reference model: rejected iff any enabled condition holds
    fn expected(event: &CreationEvent, c: &FilterConfig) -> bool {
        let freezable = c.check_freezable && event.is_freezable == Some(true);
        let burned = c.check_lp_burned && event.lp_burned == Some(true);
        let bundle = c.skip_lp_bundles && event.is_lp_bundle == Some(true);
        let small = event.pool_size.unwrap_or(0.0) < c.min_pool_size;
        let heavy = event.dev_hold.unwrap_or(0.0) > c.max_dev_hold;
        let no_socials = c.socials_required && event.has_socials != Some(true);
        !(freezable || burned || bundle || small || heavy || no_socials)
    }

    #[test]
    fn test_truth_table() {
        let bools = [false, true];
        // Boundary values around min_pool_size = 90 and max_dev_hold = 0.1
        let pool_sizes = [89.999, 90.0, 90.001];
        let dev_holds = [0.0999, 0.1, 0.1001];

        let mut checked = 0;
        for &cf in &bools {
            for &cl in &bools {
                for &sb in &bools {
                    for &sr in &bools {
                        let c = config(cf, cl, sb, sr);
                        for &freezable in &bools {
                            for &burned in &bools {
                                for &bundle in &bools {
                                    for &socials in &bools {
                                        for &pool in &pool_sizes {
                                            for &dev in &dev_holds {
                                                let e = event()
                                                    .with_freezable(freezable)
                                                    .with_lp_burned(burned)
                                                    .with_lp_bundle(bundle)
                                                    .with_socials(socials)
                                                    .with_pool_size(pool)
                                                    .with_dev_hold(dev);
                                                assert_eq!(
                                                    passes(&e, &c),
                                                    expected(&e, &c),
                                                    "event {:?} config {:?}",
                                                    e,
                                                    c
                                                );
                                                checked += 1;
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 16 * 16 * 9);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let c = FilterConfig::default();
        // Exactly at the minimum passes, exactly at the max hold passes
        let at_limits = event().with_pool_size(90.0).with_dev_hold(0.1);
        assert!(passes(&at_limits, &c));

        let below = event().with_pool_size(89.99).with_dev_hold(0.0);
        assert_eq!(
            evaluate(&below, &c),
            FilterResult::Filtered(FilterReason::PoolBelowMinimum(89.99))
        );

        let heavy = event().with_pool_size(100.0).with_dev_hold(0.11);
        assert_eq!(
            evaluate(&heavy, &c),
            FilterResult::Filtered(FilterReason::DevHoldExceeded(0.11))
        );
    }

    #[test]
    fn test_fail_fast_order() {
        let c = config(true, true, true, true);
        let everything_wrong = event()
            .with_freezable(true)
            .with_lp_burned(true)
            .with_lp_bundle(true)
            .with_pool_size(1.0)
            .with_dev_hold(0.9)
            .with_socials(false);
        assert_eq!(
            evaluate(&everything_wrong, &c),
            FilterResult::Filtered(FilterReason::Freezable)
        );

        let not_freezable = everything_wrong.clone().with_freezable(false);
        assert_eq!(
            evaluate(&not_freezable, &c),
            FilterResult::Filtered(FilterReason::LpBurned)
        );
    }

    #[test]
    fn test_disabled_checks_are_skipped() {
        let c = config(false, false, false, false);
        let e = event()
            .with_freezable(true)
            .with_lp_burned(true)
            .with_lp_bundle(true)
            .with_pool_size(95.0)
            .with_dev_hold(0.01);
        assert!(passes(&e, &c));
    }

    #[test]
    fn test_missing_fields_use_safe_defaults() {
        let c = FilterConfig {
            min_pool_size: 0.0,
            ..FilterConfig::default()
        };
        // No flags, no pool size, no dev hold: nothing to reject on
        assert!(passes(&event(), &c));

        // Absent pool size reads as zero against the default minimum
        assert_eq!(
            evaluate(&event(), &FilterConfig::default()),
            FilterResult::Filtered(FilterReason::PoolBelowMinimum(0.0))
        );

        // Absent socials read as "no socials"
        let needs_socials = FilterConfig {
            socials_required: true,
            ..c
        };
        assert!(!passes(&event(), &needs_socials));
    }

    #[test]
    fn test_idempotent() {
        let c = FilterConfig::default();
        let e = event().with_pool_size(120.0).with_dev_hold(0.02);
        let first = evaluate(&e, &c);
        for _ in 0..10 {
            assert_eq!(evaluate(&e, &c), first);
        }
    }
}
