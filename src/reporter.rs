use crate::models::{
    IssueSeverity, PageAnalysis, PageContent, PageReport, ReportSummary, SeoIssue,
};
use anyhow::{Context, Result};
use colored::*;
use std::fs::File;
use std::io::Write;

pub struct Reporter;

impl Reporter {
    pub fn generate_report(page: &PageContent, analysis: PageAnalysis) -> PageReport {
        let summary = Self::calculate_summary(&analysis);
        let timestamp = chrono::Utc::now().to_rfc3339();

        PageReport {
            url: analysis.meta_tags.canonical.clone(),
            content_type: page.content_type,
            analysis,
            summary,
            timestamp,
        }
    }

    fn calculate_summary(analysis: &PageAnalysis) -> ReportSummary {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;

        for issue in Self::all_findings(analysis) {
            match issue.severity {
                IssueSeverity::Error => errors += 1,
                IssueSeverity::Warning => warnings += 1,
                IssueSeverity::Info => infos += 1,
            }
        }

        ReportSummary {
            keyword_score: analysis.keyword_report.score,
            meta_score: analysis.meta_validation.score,
            schema_score: analysis.schema_validation.as_ref().map(|v| v.score),
            link_count: analysis.links.len(),
            errors,
            warnings,
            infos,
        }
    }

    fn all_findings(analysis: &PageAnalysis) -> impl Iterator<Item = &SeoIssue> {
        [
            Some(&analysis.meta_validation),
            Some(&analysis.url_validation),
            analysis.schema_validation.as_ref(),
        ]
        .into_iter()
        .flatten()
        .flat_map(|report| report.issues.iter().chain(&report.warnings))
    }

    fn score_colored(score: u8) -> ColoredString {
        let text = format!("{}/100", score);
        if score >= 80 {
            text.bright_green()
        } else if score >= 50 {
            text.yellow()
        } else {
            text.bright_red()
        }
    }

    fn count_colored(count: usize, color: Color) -> ColoredString {
        if count > 0 {
            count.to_string().color(color)
        } else {
            count.to_string().bright_green()
        }
    }

    pub fn print_text_report(report: &PageReport) {
        let analysis = &report.analysis;
        let tags = &analysis.meta_tags;

        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "MetaScout - Page Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!("{}: {}", "URL".bright_white().bold(), report.url);
        println!("{}: {}", "Content Type".bright_white().bold(), report.content_type);
        println!("{}: {}", "Timestamp".bright_white().bold(), report.timestamp);
        println!();

        // Summary
        println!("{}", "Summary".bright_yellow().bold().underline());
        println!(
            "  Keyword Score:  {}",
            Self::score_colored(report.summary.keyword_score)
        );
        println!(
            "  Meta Score:     {}",
            Self::score_colored(report.summary.meta_score)
        );
        println!(
            "  Schema Score:   {}",
            report
                .summary
                .schema_score
                .map(Self::score_colored)
                .unwrap_or_else(|| "N/A".dimmed())
        );
        println!(
            "  Readability:    {:.1} ({})",
            analysis.readability.score, analysis.readability.level
        );
        println!(
            "  Links:          {}",
            report.summary.link_count.to_string().bright_green()
        );
        println!(
            "  Errors:         {}",
            Self::count_colored(report.summary.errors, Color::BrightRed)
        );
        println!(
            "  Warnings:       {}",
            Self::count_colored(report.summary.warnings, Color::Yellow)
        );
        println!(
            "  Info:           {}",
            report.summary.infos.to_string().bright_cyan()
        );
        println!();

        // Meta tags
        println!("{}", "Meta Tags".bright_yellow().bold().underline());
        println!(
            "  Title:       {} ({} chars)",
            tags.title.bright_white(),
            tags.title.chars().count()
        );
        println!(
            "  Description: {} ({} chars)",
            tags.description,
            tags.description.chars().count()
        );
        println!("  Keywords:    {}", tags.keywords);
        println!("  Canonical:   {}", tags.canonical);
        println!("  Robots:      {}", tags.robots);
        println!(
            "  og:type:     {}  og:image: {}",
            tags.open_graph.og_type, tags.open_graph.og_image
        );
        println!();

        // Keywords
        let keywords = &analysis.keyword_report;
        println!("{}", "Keyword Density".bright_yellow().bold().underline());
        println!("  Total words: {}", keywords.total_words);
        for (term, stats) in keywords
            .per_keyword
            .iter()
            .filter(|(_, s)| s.is_target || s.exact_matches > 0)
        {
            println!(
                "  {:<32} {:>3} exact  {:>6.2}%  {:?}",
                term,
                stats.exact_matches,
                stats.density * 100.0,
                stats.status
            );
        }
        if !keywords.recommendations.is_empty() {
            println!("  Recommendations:");
            for rec in &keywords.recommendations {
                println!("    - [{:?}] {}", rec.priority, rec.message);
            }
        }
        println!();

        // Structured data
        println!("{}", "Structured Data".bright_yellow().bold().underline());
        match &analysis.schema {
            Some(schema) => println!("  Types: {}", schema.node_types().join(", ")),
            None => println!("  {}", "No schema for this content type".dimmed()),
        }
        println!();

        // Links
        if !analysis.links.is_empty() {
            println!("{}", "Internal Links".bright_yellow().bold().underline());
            for link in &analysis.links {
                println!(
                    "  {:.2}  {} -> {} ({})",
                    link.final_score,
                    link.anchor_text.bright_white(),
                    link.url,
                    link.link_type.as_str().dimmed()
                );
            }
            println!();
        }

        // Issues
        let findings: Vec<&SeoIssue> = Self::all_findings(analysis).collect();
        if !findings.is_empty() {
            println!("{}", "Issues".bright_yellow().bold().underline());
            for issue in findings {
                let severity_str = match issue.severity {
                    IssueSeverity::Error => "ERROR".bright_red(),
                    IssueSeverity::Warning => "WARN ".yellow(),
                    IssueSeverity::Info => "INFO ".bright_cyan(),
                };
                println!("  [{}] {}", severity_str, issue.message);
            }
        }

        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }

    pub fn save_json_report(report: &PageReport, filename: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(filename)
            .with_context(|| format!("Failed to create report file: {}", filename))?;
        file.write_all(json.as_bytes())?;
        println!("Report saved to: {}", filename.bright_green());
        Ok(())
    }
}
