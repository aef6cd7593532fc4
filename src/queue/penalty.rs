use chrono::{Duration, NaiveDate};
use log::info;

use super::PenalizedAccount;

/// Strikes at which an account is blocked from booking.
pub const STRIKE_LIMIT: i32 = 3;
pub const DEFAULT_BLOCK_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyPolicy {
    pub block_days: i64,
    /// Lets a passed `blocked_until` lift the block without admin action.
    pub auto_expire: bool,
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self {
            block_days: DEFAULT_BLOCK_DAYS,
            auto_expire: false,
        }
    }
}

impl PenalizedAccount {
    pub fn display_strikes(&self) -> i32 {
        self.strikes.min(STRIKE_LIMIT)
    }
}

pub fn on_missed(
    mut account: PenalizedAccount,
    missed_on: NaiveDate,
    today: NaiveDate,
    policy: &PenaltyPolicy,
) -> PenalizedAccount {
    account.strikes += 1;
    account.last_missed = Some(account.last_missed.map_or(missed_on, |d| d.max(missed_on)));

    if !account.blocked && account.strikes >= STRIKE_LIMIT {
        let until = today + Duration::days(policy.block_days);
        account.blocked = true;
        account.blocked_until = Some(until);
        info!(
            "account {} blocked until {} after {} strikes",
            account.username, until, account.strikes
        );
    }

    account
}

pub fn reset_strikes(mut account: PenalizedAccount) -> PenalizedAccount {
    account.strikes = 0;
    account.blocked = false;
    account.blocked_until = None;
    account
}

// Lifting a block also clears the strike history.
pub fn unblock(account: PenalizedAccount) -> PenalizedAccount {
    reset_strikes(account)
}

/// Booking guard. A patient without a penalty record has never missed.
pub fn can_book(account: Option<&PenalizedAccount>, today: NaiveDate, policy: &PenaltyPolicy) -> bool {
    match account {
        None => true,
        Some(account) if !account.blocked => true,
        Some(account) => {
            policy.auto_expire && account.blocked_until.map_or(false, |until| until <= today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn third_strike_blocks() {
        let policy = PenaltyPolicy::default();
        let today = day("2024-08-10");
        let mut account = PenalizedAccount::new("alice");

        account = on_missed(account, day("2024-08-01"), today, &policy);
        assert_eq!(account.strikes, 1);
        assert!(!account.blocked);

        account = on_missed(account, day("2024-08-02"), today, &policy);
        assert_eq!(account.strikes, 2);
        assert!(!account.blocked);

        account = on_missed(account, day("2024-08-03"), today, &policy);
        assert_eq!(account.strikes, 3);
        assert!(account.blocked);
        assert_eq!(account.blocked_until, Some(day("2024-08-24")));
        assert_eq!(account.last_missed, Some(day("2024-08-03")));
    }

    #[test]
    fn further_misses_keep_the_original_block_date() {
        let policy = PenaltyPolicy {
            block_days: 7,
            auto_expire: false,
        };
        let mut account = PenalizedAccount::new("bob");
        for _ in 0..3 {
            account = on_missed(account, day("2024-08-01"), day("2024-08-02"), &policy);
        }
        account = on_missed(account, day("2024-08-05"), day("2024-08-06"), &policy);

        assert_eq!(account.strikes, 4);
        assert_eq!(account.display_strikes(), 3);
        assert_eq!(account.blocked_until, Some(day("2024-08-09")));
    }

    #[test]
    fn reset_clears_a_blocked_account() {
        let account = PenalizedAccount {
            username: "carol".to_string(),
            strikes: 3,
            blocked: true,
            blocked_until: Some(day("2024-08-24")),
            last_missed: Some(day("2024-08-03")),
        };

        let account = reset_strikes(account);
        assert_eq!(account.strikes, 0);
        assert!(!account.blocked);
        assert_eq!(account.blocked_until, None);
        assert_eq!(reset_strikes(account.clone()), account);
    }

    #[test]
    fn unblock_resets_strikes() {
        let mut account = PenalizedAccount::new("dave");
        account.strikes = 3;
        account.blocked = true;
        account.blocked_until = Some(day("2024-08-24"));

        let account = unblock(account);
        assert_eq!(account.strikes, 0);
        assert!(!account.blocked);
    }

    #[test]
    fn booking_guard() {
        let today = day("2024-08-30");
        let mut account = PenalizedAccount::new("erin");
        account.blocked = true;
        account.blocked_until = Some(day("2024-08-24"));

        let strict = PenaltyPolicy::default();
        let expiring = PenaltyPolicy {
            auto_expire: true,
            ..strict
        };

        assert!(can_book(None, today, &strict));
        assert!(!can_book(Some(&account), today, &strict));
        assert!(can_book(Some(&account), today, &expiring));
        assert!(!can_book(Some(&account), day("2024-08-20"), &expiring));
    }
}
