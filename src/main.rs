use anyhow::Result;
use clap::Parser;
use colored::*;
use comfy_table::Table;
use futures::future::join_all;
use regex::Regex;
use std::sync::Arc;

use vendorboard::arguments::{Arguments, Command};
use vendorboard::cache::{spawn_sweeper, BoundedCache, CacheConfig, CacheStats};
use vendorboard::chain::SharedCache;
use vendorboard::config::AppConfig;
use vendorboard::helpers::{format_count, format_currency, format_duration_ago, format_percent};
use vendorboard::invalidation::InvalidationBus;
use vendorboard::logger::{self, LogTag};
use vendorboard::orchestrator::{
    Backends, ContractorOrchestrator, ContractorView, PortfolioOrchestrator, PortfolioView,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    logger::init(args.log_level());

    let config = AppConfig::load_or_default(args.config.as_deref())?;

    let cache: SharedCache = Arc::new(BoundedCache::new(CacheConfig::custom(
        config.cache_ttl(),
        config.cache.max_entries,
    )));
    let sweeper = spawn_sweeper(cache.clone(), config.sweep_interval());

    match args.command {
        Command::View { id, json } => {
            let backends = Backends::from_config(&config)?;
            let orchestrator = ContractorOrchestrator::new(cache.clone(), &backends, &config);

            let view = orchestrator.contractor_view(&id).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_contractor_view(&view);
                print_cache_stats(&orchestrator.cache_stats());
            }
        }

        Command::Portfolio { id, json } => {
            let backends = Backends::from_config(&config)?;
            let orchestrator = PortfolioOrchestrator::new(cache.clone(), &backends, &config);

            let view = orchestrator.portfolio_view(&id).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_portfolio_view(&view);
                print_cache_stats(&orchestrator.cache_stats());
            }
        }

        Command::Stats => {
            let backends = Backends::from_config(&config)?;
            print_cache_stats(&cache.stats());
            print_backend_stats(&backends).await;
        }

        Command::Invalidate { pattern } => {
            let pattern = Regex::new(&pattern)?;
            let bus = InvalidationBus::new(cache.clone());
            let removed = bus.invalidate_pattern(&pattern);
            println!("Removed {} cache entries", removed);
        }

        Command::Demo => {
            run_demo(cache.clone(), &config).await?;
        }
    }

    sweeper.stop();
    Ok(())
}

/// Offline walkthrough against the bundled static snapshot: resolution,
/// caching, degradation, and invalidation in one process.
async fn run_demo(cache: SharedCache, config: &AppConfig) -> Result<()> {
    logger::info(LogTag::System, "Running offline demo (static data only)");

    let backends = Backends::static_only();
    let orchestrator = ContractorOrchestrator::new(cache.clone(), &backends, config);
    let portfolios = PortfolioOrchestrator::new(cache.clone(), &backends, config);

    // Concurrent fan-out across two contractors
    let views = join_all(
        ["ACME-001", "NOVA-002"]
            .iter()
            .map(|id| orchestrator.contractor_view(id)),
    )
    .await;
    for view in &views {
        print_contractor_view(view);
    }

    // Second resolve comes from the cache
    println!("{}", "Re-resolving ACME-001 (now cached)...".bold());
    let cached = orchestrator.contractor_view("ACME-001").await;
    print_provenance(&cached.provenance());

    // Unknown entity degrades to deterministic synthetic data
    println!("{}", "Resolving unknown contractor GHOST-404...".bold());
    let ghost = orchestrator.contractor_view("GHOST-404").await;
    print_provenance(&ghost.provenance());

    // Portfolio surface
    let portfolio = portfolios.portfolio_view("PF-100").await;
    print_portfolio_view(&portfolio);

    // Invalidation forces the next resolve back through the chain
    let removed = orchestrator.invalidate_contractor("ACME-001")?;
    println!("Invalidated {} entries for ACME-001", removed);
    let refetched = orchestrator.contractor_view("ACME-001").await;
    print_provenance(&refetched.provenance());

    print_cache_stats(&orchestrator.cache_stats());
    Ok(())
}

fn print_contractor_view(view: &ContractorView) {
    let heading = format!(
        "Contractor {} - {}",
        view.id,
        view.profile.value.name
    );
    println!("\n{}", heading.bold());
    if view.is_partially_degraded() {
        println!("{}", "  (some fields are fallback data)".yellow());
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Source", "Summary"]);

    let profile = &view.profile.value;
    table.add_row(vec![
        "profile".to_string(),
        view.profile.source.to_string(),
        format!(
            "{} | {} | founded {} | {} employees",
            profile.status,
            profile.headquarters,
            profile.founded_year,
            format_count(profile.employee_count)
        ),
    ]);

    let metrics = &view.metrics.value;
    table.add_row(vec![
        "metrics".to_string(),
        view.metrics.source.to_string(),
        format!(
            "{} awarded across {} awards | win rate {}",
            format_currency(metrics.total_awarded),
            format_count(metrics.awards_count),
            format_percent(metrics.win_rate_pct)
        ),
    ]);

    let agencies = &view.relationships.value.agencies;
    table.add_row(vec![
        "relationships".to_string(),
        view.relationships.source.to_string(),
        if agencies.is_empty() {
            "no agency data".to_string()
        } else {
            agencies
                .iter()
                .map(|a| format!("{} ({})", a.agency, format_currency(a.total_value)))
                .collect::<Vec<_>>()
                .join(", ")
        },
    ]);

    let events = &view.activity.value.events;
    table.add_row(vec![
        "activity".to_string(),
        view.activity.source.to_string(),
        match events.first() {
            Some(event) => format!(
                "{} events, latest: {} ({})",
                events.len(),
                event.description,
                format_duration_ago(event.occurred_at)
            ),
            None => "no recent activity".to_string(),
        },
    ]);

    let contacts = &view.contacts.value.contacts;
    table.add_row(vec![
        "contacts".to_string(),
        view.contacts.source.to_string(),
        match contacts.first() {
            Some(contact) => format!("{} ({})", contact.name, contact.title),
            None => "no contacts on file".to_string(),
        },
    ]);

    println!("{table}");
}

fn print_portfolio_view(view: &PortfolioView) {
    let heading = format!("Portfolio {} - {}", view.id, view.summary.value.name);
    println!("\n{}", heading.bold());

    let mut table = Table::new();
    table.set_header(vec!["Field", "Source", "Summary"]);

    let summary = &view.summary.value;
    table.add_row(vec![
        "summary".to_string(),
        view.summary.source.to_string(),
        format!(
            "{} holdings | total value {}",
            summary.holdings_count,
            format_currency(summary.total_value)
        ),
    ]);

    let holdings = &view.holdings.value.holdings;
    table.add_row(vec![
        "holdings".to_string(),
        view.holdings.source.to_string(),
        holdings
            .iter()
            .map(|h| format!("{} ({})", h.name, format_currency(h.value)))
            .collect::<Vec<_>>()
            .join(", "),
    ]);

    let perf = &view.performance.value;
    table.add_row(vec![
        "performance".to_string(),
        view.performance.source.to_string(),
        format!(
            "30d {} | 1y {} | vs benchmark {}",
            format_percent(perf.change_30d_pct),
            format_percent(perf.change_1y_pct),
            format_percent(perf.benchmark_delta_pct)
        ),
    ]);

    println!("{table}");
}

fn print_provenance(provenance: &[(&'static str, String)]) {
    let summary = provenance
        .iter()
        .map(|(field, source)| format!("{}={}", field, source))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  {}", summary.dimmed());
}

fn print_cache_stats(stats: &CacheStats) {
    let mut table = Table::new();
    table.set_header(vec!["Size", "Hits", "Misses", "Hit rate", "Evictions", "Expired"]);
    table.add_row(vec![
        stats.size.to_string(),
        stats.total_hits.to_string(),
        stats.total_misses.to_string(),
        format!("{:.1}%", stats.hit_rate * 100.0),
        stats.evictions.to_string(),
        stats.expirations.to_string(),
    ]);

    println!("\n{}", "Cache statistics".bold());
    println!("{table}");
}

async fn print_backend_stats(backends: &Backends) {
    let all = backends.stats().await;
    if all.is_empty() {
        println!("No HTTP backends enabled");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Backend", "Requests", "OK", "Failed", "Avg latency"]);
    for (name, stats) in all {
        table.add_row(vec![
            name.to_string(),
            stats.total_requests.to_string(),
            stats.successes.to_string(),
            stats.failures.to_string(),
            format!("{:.0}ms", stats.avg_latency_ms),
        ]);
    }

    println!("\n{}", "Backend statistics".bold());
    println!("{table}");
}
