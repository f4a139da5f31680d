//! Console rendering for run, enrich and status.

use catalog_sampler::{
    CategoryKey, CollectionReport, CompletionSummary, EnrichmentReport, FillRates, RidingStyle,
    SessionStats, SkillLevel, StopReason,
};
use colored::Colorize;

const SKILL_WIDTH: usize = 14;
const CELL_WIDTH: usize = 14;

pub fn print_banner(title: &str) {
    let rule = "═".repeat(44);
    println!("{}", rule.bright_cyan());
    println!("  {}", title.bright_cyan().bold());
    println!("{}", rule.bright_cyan());
}

/// Skill × style grid of `current/target`.
pub fn print_progress(summary: &CompletionSummary) {
    println!();
    print!("{:<SKILL_WIDTH$}", "");
    for style in RidingStyle::ALL {
        print!("{:>CELL_WIDTH$}", style.as_str().bold());
    }
    println!();

    for skill in SkillLevel::ALL {
        print!("{:<SKILL_WIDTH$}", skill.as_str().bold());
        for style in RidingStyle::ALL {
            let cell = match summary.breakdown.get(&CategoryKey::new(skill, style)) {
                Some(progress) => {
                    let text = format!("{}/{}", progress.current, progress.target);
                    if progress.complete {
                        text.green()
                    } else if progress.current > 0 {
                        text.yellow()
                    } else {
                        text.normal()
                    }
                }
                None => "-".dimmed(),
            };
            print!("{:>CELL_WIDTH$}", cell);
        }
        println!();
    }

    let overall = &summary.overall;
    println!();
    println!(
        "{} {}/{} ({:.1}%), {}/{} categories complete",
        "Overall:".bold(),
        overall.collected,
        overall.target,
        overall.percentage,
        summary.completed_categories,
        summary.total_categories
    );

    if !summary.next_priorities.is_empty() {
        let next: Vec<String> = summary.next_priorities.iter().map(ToString::to_string).collect();
        println!("{} {}", "Next up:".bold(), next.join(", "));
    }
}

pub fn print_stats(stats: &SessionStats) {
    println!();
    println!("{}", "Session".bold());
    println!("  admitted            {}", stats.admitted.to_string().green());
    println!("  rejected (full)     {}", stats.rejected);
    println!("  duplicates          {}", stats.duplicates);
    println!("  failed inserts      {}", stats.failed_inserts);
    println!("  store errors        {}", stats.store_errors);
    println!("  skipped fragments   {}", stats.skipped_fragments);
    println!(
        "  pages / requests    {} / {} ({:.0}% ok)",
        stats.pages_fetched,
        stats.requests_made,
        stats.success_rate() * 100.0
    );
    println!("  elapsed             {}s", stats.elapsed().num_seconds());

    for url in &stats.failed_urls {
        println!("  {} {}", "failed:".red(), url);
    }
}

pub fn print_report(report: &CollectionReport) {
    print_progress(&report.summary);
    print_stats(&report.stats);

    let reason = match report.stop_reason {
        StopReason::TargetReached => "target reached".green(),
        StopReason::PagesExhausted => "listing pages exhausted".yellow(),
        StopReason::Cancelled => "cancelled".red(),
    };
    println!();
    println!("{} {}", "Stopped:".bold(), reason);
}

pub fn print_fill_rates(rates: &FillRates) {
    println!();
    println!("{} ({} records)", "Field fill rates".bold(), rates.total);
    for (field, fill) in &rates.fields {
        let pct = format!("{:>5.1}%", fill.percentage);
        let pct = if fill.percentage >= 80.0 {
            pct.green()
        } else if fill.percentage >= 30.0 {
            pct.yellow()
        } else {
            pct.red()
        };
        println!("  {:<18} {} ({})", field, pct, fill.filled);
    }
}

pub fn print_enrichment(report: &EnrichmentReport) {
    println!();
    println!("{}", "Enrichment".bold());
    println!("  processed   {}", report.processed);
    println!("  enriched    {}", report.enriched.to_string().green());
    println!("  no data     {}", report.no_data);
    println!("  failed      {}", report.failed.to_string().red());
    println!("  skipped     {}", report.skipped);
    if report.cancelled {
        println!("  {}", "cancelled before finishing".yellow());
    }
}
