/// View DTOs assembled by the orchestrators
///
/// Every DTO is parsed and schema-checked at the provider boundary; nothing
/// downstream branches on raw JSON. Each one also knows how to produce a
/// deterministic synthetic stand-in for the degraded path.
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::synthetic::{display_handle, SeedSequence, Synthesize};

// ============================================================================
// CONTRACTOR DETAIL
// ============================================================================

/// Identity and registration data for one contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorProfile {
    pub id: String,
    pub name: String,
    pub legal_name: String,
    pub status: String,
    pub founded_year: u32,
    pub headquarters: String,
    #[serde(default)]
    pub industry_codes: Vec<String>,
    pub employee_count: u64,
    #[serde(default)]
    pub website: Option<String>,
}

impl Synthesize for ContractorProfile {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        let id = id_from_key(key);
        let handle = display_handle(&id);

        Self {
            name: format!("Contractor {}", handle),
            legal_name: format!("Contractor {} LLC", handle),
            status: "unverified".to_string(),
            founded_year: seq.next_range(1985, 2020) as u32,
            headquarters: "Unknown".to_string(),
            industry_codes: Vec::new(),
            employee_count: seq.next_range(10, 500),
            website: None,
            id,
        }
    }

    fn placeholder() -> Self {
        Self {
            id: String::new(),
            name: "Unknown contractor".to_string(),
            legal_name: String::new(),
            status: "unknown".to_string(),
            founded_year: 0,
            headquarters: String::new(),
            industry_codes: Vec::new(),
            employee_count: 0,
            website: None,
        }
    }
}

/// Award/performance aggregates for one contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_awarded: f64,
    pub awards_count: u64,
    pub avg_award_value: f64,
    pub win_rate_pct: f64,
    pub yoy_growth_pct: f64,
}

impl Synthesize for PerformanceMetrics {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        let awards_count = seq.next_range(3, 120);
        let avg_award_value = seq.next_f64(50_000.0, 4_000_000.0);

        Self {
            total_awarded: avg_award_value * awards_count as f64,
            awards_count,
            avg_award_value,
            win_rate_pct: seq.next_f64(5.0, 45.0),
            yoy_growth_pct: seq.next_f64(-20.0, 40.0),
        }
    }

    fn placeholder() -> Self {
        Self {
            total_awarded: 0.0,
            awards_count: 0,
            avg_award_value: 0.0,
            win_rate_pct: 0.0,
            yoy_growth_pct: 0.0,
        }
    }
}

/// One agency the contractor has been awarded work by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyLink {
    pub agency: String,
    pub awards_count: u64,
    pub total_value: f64,
}

/// Agency relationship graph for one contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyRelationships {
    #[serde(default)]
    pub agencies: Vec<AgencyLink>,
}

impl Synthesize for AgencyRelationships {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        let count = seq.next_range(1, 4) as usize;

        let agencies = (0..count)
            .map(|i| AgencyLink {
                agency: format!("Agency {}", (b'A' + i as u8) as char),
                awards_count: seq.next_range(1, 30),
                total_value: seq.next_f64(100_000.0, 10_000_000.0),
            })
            .collect();

        Self { agencies }
    }

    fn placeholder() -> Self {
        Self {
            agencies: Vec::new(),
        }
    }
}

/// One event in a contractor's activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub occurred_at: DateTime<Utc>,
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Recent activity for one contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFeed {
    #[serde(default)]
    pub events: Vec<ActivityEvent>,
}

impl Synthesize for ActivityFeed {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        let count = seq.next_range(1, 5) as usize;
        // Anchor synthetic timestamps to a fixed epoch so repeated synthesis
        // of the same key is byte-identical, not merely similar.
        let anchor = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let events = (0..count)
            .map(|_| {
                let days_ago = seq.next_range(1, 180) as i64;
                ActivityEvent {
                    occurred_at: anchor - Duration::days(days_ago),
                    kind: "award".to_string(),
                    description: "Placeholder event (no provider data)".to_string(),
                    amount: Some(seq.next_f64(10_000.0, 2_000_000.0)),
                }
            })
            .collect();

        Self { events }
    }

    fn placeholder() -> Self {
        Self { events: Vec::new() }
    }
}

/// One named contact at a contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Contact data for one contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Synthesize for ContactInfo {
    fn synthesize(_key: &str) -> Self {
        // No plausible fake emails or phone numbers; an empty contact card
        // is the honest degraded rendering.
        Self {
            contacts: Vec::new(),
            address: None,
        }
    }

    fn placeholder() -> Self {
        Self {
            contacts: Vec::new(),
            address: None,
        }
    }
}

// ============================================================================
// PORTFOLIO
// ============================================================================

/// Headline data for one tracked portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub name: String,
    pub owner: String,
    pub holdings_count: u64,
    pub total_value: f64,
}

impl Synthesize for PortfolioSummary {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        let id = id_from_key(key);

        Self {
            name: format!("Portfolio {}", display_handle(&id)),
            owner: "unknown".to_string(),
            holdings_count: seq.next_range(2, 15),
            total_value: seq.next_f64(1_000_000.0, 500_000_000.0),
        }
    }

    fn placeholder() -> Self {
        Self {
            name: "Unknown portfolio".to_string(),
            owner: String::new(),
            holdings_count: 0,
            total_value: 0.0,
        }
    }
}

/// One holding inside a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub contractor_id: String,
    pub name: String,
    pub stake_pct: f64,
    pub value: f64,
}

/// Holdings list for one portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHoldings {
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

impl Synthesize for PortfolioHoldings {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        let count = seq.next_range(2, 6) as usize;

        let holdings = (0..count)
            .map(|i| Holding {
                contractor_id: format!("UNK-{:03}", i + 1),
                name: format!("Holding {}", i + 1),
                stake_pct: seq.next_f64(1.0, 40.0),
                value: seq.next_f64(250_000.0, 50_000_000.0),
            })
            .collect();

        Self { holdings }
    }

    fn placeholder() -> Self {
        Self {
            holdings: Vec::new(),
        }
    }
}

/// Return/benchmark figures for one portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    pub change_30d_pct: f64,
    pub change_1y_pct: f64,
    pub benchmark_delta_pct: f64,
}

impl Synthesize for PortfolioPerformance {
    fn synthesize(key: &str) -> Self {
        let mut seq = SeedSequence::for_key(key);
        Self {
            change_30d_pct: seq.next_f64(-10.0, 10.0),
            change_1y_pct: seq.next_f64(-25.0, 35.0),
            benchmark_delta_pct: seq.next_f64(-8.0, 8.0),
        }
    }

    fn placeholder() -> Self {
        Self {
            change_30d_pct: 0.0,
            change_1y_pct: 0.0,
            benchmark_delta_pct: 0.0,
        }
    }
}

/// Pull the entity id out of a `{kind}:{id}:{field}` key for synthesis;
/// falls back to the raw key if the shape is unexpected.
fn id_from_key(key: &str) -> String {
    match crate::keys::EntityKey::parse(key) {
        Some(entity) => entity.id,
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_is_deterministic() {
        let a = ContractorProfile::synthesize("contractor:GHOST-1:profile");
        let b = ContractorProfile::synthesize("contractor:GHOST-1:profile");
        assert_eq!(a, b);

        let feed_a = ActivityFeed::synthesize("contractor:GHOST-1:activity");
        let feed_b = ActivityFeed::synthesize("contractor:GHOST-1:activity");
        assert_eq!(feed_a, feed_b);
    }

    #[test]
    fn test_synthesis_uses_the_entity_id() {
        let profile = ContractorProfile::synthesize("contractor:ghost-7:profile");
        assert_eq!(profile.id, "ghost-7");
        assert!(profile.name.contains("GHOST-7"));
    }

    #[test]
    fn test_metrics_are_internally_consistent() {
        let metrics = PerformanceMetrics::synthesize("contractor:GHOST-1:metrics");
        let expected = metrics.avg_award_value * metrics.awards_count as f64;
        assert!((metrics.total_awarded - expected).abs() < 1e-6);
    }

    #[test]
    fn test_placeholders_are_empty() {
        assert!(AgencyRelationships::placeholder().agencies.is_empty());
        assert!(ActivityFeed::placeholder().events.is_empty());
        assert_eq!(PerformanceMetrics::placeholder().awards_count, 0);
    }
}
