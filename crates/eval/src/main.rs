//! Audit CLI for inspecting keyword cannibalization.
//!
//! Usage:
//!     serpclash audit --markets snapshots.json --pages crawl.json --domain acme.com
//!     serpclash classify-url https://acme.com/emergency-plumbing
//!     serpclash classify-keyword "emergency plumber dallas" --domain acme.com
//!     serpclash discover --pages crawl.json

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serpclash_classify::{classify_keyword_intent, classify_url_type};
use serpclash_detect::run_audit;
use serpclash_ingest::{parse_crawled_pages, parse_market_snapshots};
use serpclash_markets::discover_markets_from_crawl;
use serpclash_model::{AuditReport, CrawledPage};

#[derive(Parser)]
#[command(name = "serpclash")]
#[command(about = "Detect keyword cannibalization across tracked markets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full four-tier audit
    Audit {
        /// Path to the market snapshots JSON
        #[arg(long)]
        markets: String,

        /// Path to the crawled pages JSON (enables content-overlap grouping)
        #[arg(long)]
        pages: Option<String>,

        /// Domain under audit
        #[arg(short, long)]
        domain: String,

        /// Tracked city name (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Classify a URL's page type
    ClassifyUrl {
        /// URL or bare path to classify
        url: String,
    },

    /// Classify a keyword's search intent
    ClassifyKeyword {
        /// Keyword to classify
        keyword: String,

        /// Domain whose brand token counts as branded
        #[arg(short, long)]
        domain: String,

        /// Tracked city name (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,
    },

    /// Discover markets from crawled location pages
    Discover {
        /// Path to the crawled pages JSON
        #[arg(long)]
        pages: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("serpclash=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            markets,
            pages,
            domain,
            locations,
            format,
        } => run_audit_command(&markets, pages.as_deref(), &domain, &locations, &format),
        Commands::ClassifyUrl { url } => {
            println!("{}", classify_url_type(&url));
            Ok(())
        }
        Commands::ClassifyKeyword {
            keyword,
            domain,
            locations,
        } => {
            println!("{}", classify_keyword_intent(&keyword, &domain, &locations));
            Ok(())
        }
        Commands::Discover { pages, format } => run_discover(&pages, &format),
    }
}

fn run_audit_command(
    markets_path: &str,
    pages_path: Option<&str>,
    domain: &str,
    locations: &[String],
    format: &str,
) -> Result<()> {
    let markets_json = fs::read_to_string(markets_path)
        .with_context(|| format!("reading market snapshots from {markets_path}"))?;
    let markets = parse_market_snapshots(&markets_json)?;

    let pages: Vec<CrawledPage> = match pages_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading crawled pages from {path}"))?;
            parse_crawled_pages(&json)?
        }
        None => Vec::new(),
    };

    let report = run_audit(&markets, &pages, domain, locations);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &AuditReport) {
    println!("SERP-verified conflicts: {}", report.conflicts.len());
    for (i, c) in report.conflicts.iter().enumerate() {
        println!(
            "\n{}. \"{}\" in {} [{}]",
            i + 1,
            c.keyword,
            c.market,
            c.severity
        );
        println!("   Volume: {} | Intent: {}", c.search_volume, c.intent);
        println!(
            "   Primary: {} ({}, position {})",
            c.primary.url, c.primary.page_type, c.primary.position
        );
        for comp in &c.competitors {
            println!(
                "   Competing: {} ({}, position {})",
                comp.url, comp.page_type, comp.position
            );
        }
        if c.wrong_page_winning {
            println!("   Wrong page is winning (gap: {} positions)", c.position_gap);
        }
        println!("   {} {}: {}", c.guidance.icon, c.guidance.label, c.guidance.fix);
    }

    println!("\n---");
    println!("Wrong-page rankings: {}", report.wrong_page_rankings.len());
    for (i, w) in report.wrong_page_rankings.iter().enumerate() {
        println!(
            "\n{}. \"{}\" in {} [{}]",
            i + 1,
            w.keyword,
            w.market,
            w.severity
        );
        println!(
            "   {} ({}, position {}) | Volume: {}",
            w.url, w.page_type, w.position, w.search_volume
        );
        println!("   {} A {} page should rank here.", w.reason, w.ideal_page_type);
    }

    println!("\n---");
    println!("Keyword-overlap pairs: {}", report.ngram_overlaps.len());
    for (i, o) in report.ngram_overlaps.iter().enumerate() {
        println!(
            "\n{}. {} ({}) vs {} ({}) [{:.0}% overlap, {} risk]",
            i + 1,
            o.page_a,
            o.page_a_type,
            o.page_b,
            o.page_b_type,
            o.overlap_pct,
            o.risk
        );
        println!("   Shared: {}", o.shared_ngrams.join(", "));
    }

    println!("\n---");
    println!("Content-overlap groups: {}", report.content_overlaps.len());
    for (i, g) in report.content_overlaps.iter().enumerate() {
        println!("\n{}. {} risk, {} pages", i + 1, g.risk, g.pages.len());
        for page in &g.pages {
            println!("   {} ({})", page.url, page.page_type);
        }
        if !g.shared_phrases.is_empty() {
            println!("   Shared phrases: {}", g.shared_phrases.join(", "));
        }
        println!("   {} {}: {}", g.guidance.icon, g.guidance.label, g.guidance.fix);
    }

    println!("\n---");
    println!("Ranking pages: {}", report.ranking_pages.len());
    for (i, p) in report.ranking_pages.iter().take(10).enumerate() {
        println!(
            "{}. {} ({}) | {} keywords | volume {} | ETV {:.1} | best #{}",
            i + 1,
            p.url,
            p.page_type,
            p.keyword_count,
            p.total_volume,
            p.total_etv,
            p.best_position
        );
    }
}

fn run_discover(pages_path: &str, format: &str) -> Result<()> {
    let json = fs::read_to_string(pages_path)
        .with_context(|| format!("reading crawled pages from {pages_path}"))?;
    let pages = parse_crawled_pages(&json)?;

    let discovered = discover_markets_from_crawl(&pages, None);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&discovered)?);
    } else {
        println!("Discovered {} markets", discovered.len());
        for (i, m) in discovered.iter().enumerate() {
            println!("{}. {} ({})", i + 1, m.city, m.market);
        }
    }

    Ok(())
}
