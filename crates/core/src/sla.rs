//! SLA remaining-time computation and policy resolution.
//!
//! SLA is recomputed on read; there is no background ticker. Terminal
//! tickets freeze the tier computed at the moment they left the last active
//! status, so closed tickets never "break" retroactively against the current
//! clock. The frozen snapshot is persisted by the workflow engine; this
//! module only computes.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::impact::Impact;
use crate::types::Timestamp;

/// System default window when no client or product policy applies: alto=4h.
pub const DEFAULT_HOURS_ALTO: i64 = 4;

/// System default window when no client or product policy applies: medio=24h.
pub const DEFAULT_HOURS_MEDIO: i64 = 24;

/// System default window when no client or product policy applies: baixo=48h.
pub const DEFAULT_HOURS_BAIXO: i64 = 48;

/// Fraction of the window below which a ticket is at risk (20%).
const RISK_NUMERATOR: i64 = 1;
const RISK_DENOMINATOR: i64 = 5;

/// Three-tier SLA status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaTier {
    Ok,
    Risco,
    Quebrado,
}

impl SlaTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SlaTier::Ok => "ok",
            SlaTier::Risco => "risco",
            SlaTier::Quebrado => "quebrado",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "ok" => Ok(SlaTier::Ok),
            "risco" => Ok(SlaTier::Risco),
            "quebrado" => Ok(SlaTier::Quebrado),
            other => Err(CoreError::Validation(format!(
                "Invalid SLA tier '{other}'. Must be one of: ok, risco, quebrado"
            ))),
        }
    }
}

impl fmt::Display for SlaTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hour thresholds per impact level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyHours {
    pub baixo: i64,
    pub medio: i64,
    pub alto: i64,
}

impl PolicyHours {
    /// The system fallback policy.
    pub fn system_default() -> Self {
        PolicyHours {
            baixo: DEFAULT_HOURS_BAIXO,
            medio: DEFAULT_HOURS_MEDIO,
            alto: DEFAULT_HOURS_ALTO,
        }
    }

    pub fn for_impact(&self, impact: Impact) -> i64 {
        match impact {
            Impact::Baixo => self.baixo,
            Impact::Medio => self.medio,
            Impact::Alto => self.alto,
        }
    }
}

/// A policy candidate attached to a client or product.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePolicy {
    pub hours: PolicyHours,
    pub priority: i32,
}

/// Pick the applicable policy: highest `priority` wins when both a client
/// and a product policy could apply; the client policy wins a priority tie
/// as the more specific scope; system defaults when neither exists.
pub fn resolve_policy(
    client: Option<CandidatePolicy>,
    product: Option<CandidatePolicy>,
) -> PolicyHours {
    match (client, product) {
        (Some(c), Some(p)) => {
            if p.priority > c.priority {
                p.hours
            } else {
                c.hours
            }
        }
        (Some(c), None) => c.hours,
        (None, Some(p)) => p.hours,
        (None, None) => PolicyHours::system_default(),
    }
}

/// Computed SLA state for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlaResult {
    pub sla_status: SlaTier,
    pub sla_hours_remaining: i64,
}

/// Compute remaining time and tier for a non-terminal ticket.
///
/// `deadline = created_at + hours[impact]`; remaining time is reported in
/// whole hours and may be negative. Tiering uses the exact remaining
/// duration, so the tier is a monotone function of wall-clock time:
/// `ok` above 20% of the window, `risco` in (0, 20%], `quebrado` at or
/// below zero.
pub fn compute(
    created_at: Timestamp,
    impact: Impact,
    hours: PolicyHours,
    now: Timestamp,
) -> SlaResult {
    let window = Duration::hours(hours.for_impact(impact));
    let deadline = created_at + window;
    let remaining = deadline - now;

    let tier = if remaining <= Duration::zero() {
        SlaTier::Quebrado
    } else if remaining.num_seconds() * RISK_DENOMINATOR
        <= window.num_seconds() * RISK_NUMERATOR
    {
        SlaTier::Risco
    } else {
        SlaTier::Ok
    };

    SlaResult {
        sla_status: tier,
        sla_hours_remaining: remaining.num_hours(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 7, hour, minute, 0).unwrap()
    }

    fn hours(baixo: i64, medio: i64, alto: i64) -> PolicyHours {
        PolicyHours { baixo, medio, alto }
    }

    #[test]
    fn test_fresh_ticket_is_ok() {
        let result = compute(at(8, 0), Impact::Medio, PolicyHours::system_default(), at(9, 0));
        assert_eq!(result.sla_status, SlaTier::Ok);
        assert_eq!(result.sla_hours_remaining, 23);
    }

    #[test]
    fn test_default_windows_match_system_policy() {
        let defaults = PolicyHours::system_default();
        assert_eq!(defaults.for_impact(Impact::Alto), 4);
        assert_eq!(defaults.for_impact(Impact::Medio), 24);
        assert_eq!(defaults.for_impact(Impact::Baixo), 48);
    }

    #[test]
    fn test_tier_enters_risco_at_twenty_percent_of_window() {
        // 10-hour window: risco begins once remaining <= 2h.
        let policy = hours(10, 10, 10);
        let created = at(0, 0);
        // 7h59m elapsed -> 2h01m remaining -> still ok.
        let early = compute(created, Impact::Medio, policy, at(7, 59));
        assert_eq!(early.sla_status, SlaTier::Ok);
        // Exactly 2h remaining -> risco (boundary is inclusive).
        let boundary = compute(created, Impact::Medio, policy, at(8, 0));
        assert_eq!(boundary.sla_status, SlaTier::Risco);
        // 30 minutes remaining -> still risco, whole-hour remaining is 0.
        let late = compute(created, Impact::Medio, policy, at(9, 30));
        assert_eq!(late.sla_status, SlaTier::Risco);
        assert_eq!(late.sla_hours_remaining, 0);
    }

    #[test]
    fn test_tier_quebrado_at_and_past_deadline() {
        let policy = hours(10, 10, 10);
        let created = at(0, 0);
        let exact = compute(created, Impact::Baixo, policy, at(10, 0));
        assert_eq!(exact.sla_status, SlaTier::Quebrado);
        assert_eq!(exact.sla_hours_remaining, 0);
        let past = compute(created, Impact::Baixo, policy, at(13, 0));
        assert_eq!(past.sla_status, SlaTier::Quebrado);
        assert_eq!(past.sla_hours_remaining, -3);
    }

    #[test]
    fn test_remaining_hours_never_increase_over_time() {
        let policy = PolicyHours::system_default();
        let created = at(0, 0);
        let mut previous = i64::MAX;
        for elapsed_minutes in (0..=3600).step_by(90) {
            let now = created + Duration::minutes(elapsed_minutes);
            let result = compute(created, Impact::Alto, policy, now);
            assert!(
                result.sla_hours_remaining <= previous,
                "remaining hours increased at t+{elapsed_minutes}m"
            );
            previous = result.sla_hours_remaining;
        }
    }

    #[test]
    fn test_tier_never_improves_over_time() {
        fn rank(tier: SlaTier) -> u8 {
            match tier {
                SlaTier::Ok => 0,
                SlaTier::Risco => 1,
                SlaTier::Quebrado => 2,
            }
        }
        let policy = hours(6, 6, 6);
        let created = at(0, 0);
        let mut previous = 0u8;
        for elapsed_minutes in (0..=600).step_by(15) {
            let now = created + Duration::minutes(elapsed_minutes);
            let tier = compute(created, Impact::Medio, policy, now).sla_status;
            assert!(rank(tier) >= previous);
            previous = rank(tier);
        }
    }

    #[test]
    fn test_resolution_prefers_higher_priority() {
        let client = CandidatePolicy { hours: hours(1, 1, 1), priority: 5 };
        let product = CandidatePolicy { hours: hours(2, 2, 2), priority: 9 };
        assert_eq!(resolve_policy(Some(client), Some(product)), product.hours);
        assert_eq!(
            resolve_policy(Some(product), Some(client)),
            product.hours
        );
    }

    #[test]
    fn test_resolution_tie_goes_to_client_policy() {
        let client = CandidatePolicy { hours: hours(1, 1, 1), priority: 5 };
        let product = CandidatePolicy { hours: hours(2, 2, 2), priority: 5 };
        assert_eq!(resolve_policy(Some(client), Some(product)), client.hours);
    }

    #[test]
    fn test_resolution_falls_back_to_single_policy_then_default() {
        let only = CandidatePolicy { hours: hours(3, 3, 3), priority: 1 };
        assert_eq!(resolve_policy(Some(only), None), only.hours);
        assert_eq!(resolve_policy(None, Some(only)), only.hours);
        assert_eq!(resolve_policy(None, None), PolicyHours::system_default());
    }

    #[test]
    fn test_tier_parse_round_trip() {
        for tier in ["ok", "risco", "quebrado"] {
            assert_eq!(SlaTier::parse(tier).unwrap().as_str(), tier);
        }
        assert!(SlaTier::parse("vencido").is_err());
    }
}
