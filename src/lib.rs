pub mod cache;
pub mod canonical;
pub mod cli;
pub mod config;
pub mod keyword_analyzer;
pub mod link_recommender;
pub mod meta_tags;
pub mod models;
pub mod reporter;
pub mod schema;
pub mod templates;
pub mod text_metrics;
pub mod topology;

use anyhow::{Context, Result};
use cli::Cli;
use colored::*;
use config::{Config, SiteConfig, read_structured_file};
use keyword_analyzer::KeywordDensityAnalyzer;
use link_recommender::InternalLinkRecommender;
use meta_tags::MetaTagComposer;
use models::{PageAnalysis, PageContent};
use reporter::Reporter;
use schema::{SchemaData, SchemaGenerator, validate_schema};
use std::path::Path;
use std::sync::Arc;
use topology::SiteTopology;

/// Wires the keyword, metadata, schema and link pipelines over one shared
/// configuration. Cheap to share across threads.
pub struct SeoEngine {
    config: Arc<SiteConfig>,
    analyzer: Arc<KeywordDensityAnalyzer>,
    composer: MetaTagComposer,
    schema: SchemaGenerator,
    links: InternalLinkRecommender,
}

impl SeoEngine {
    pub fn new(config: SiteConfig) -> Self {
        let topology = SiteTopology::from_config(&config);
        Self::with_topology(config, topology)
    }

    pub fn with_topology(config: SiteConfig, topology: SiteTopology) -> Self {
        let config = Arc::new(config);
        let analyzer = Arc::new(KeywordDensityAnalyzer::new(config.clone()));

        Self {
            composer: MetaTagComposer::new(config.clone(), analyzer.clone()),
            schema: SchemaGenerator::new(config.clone()),
            links: InternalLinkRecommender::new(Arc::new(topology)),
            config,
            analyzer,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &KeywordDensityAnalyzer {
        &self.analyzer
    }

    pub fn meta_tags(&self) -> &MetaTagComposer {
        &self.composer
    }

    pub fn schema(&self) -> &SchemaGenerator {
        &self.schema
    }

    pub fn links(&self) -> &InternalLinkRecommender {
        &self.links
    }

    pub fn analyze(&self, page: &PageContent) -> PageAnalysis {
        let keyword_report = self.analyzer.analyze_page(page);
        let readability = text_metrics::readability(&text_metrics::plain_text(&page.raw_text));

        let meta_tags = self.composer.compose(page, &keyword_report);
        let meta_validation = self.composer.validate_meta_tags(&meta_tags);
        let url_validation = self
            .composer
            .canonicalizer()
            .validate_url_structure(&meta_tags.canonical);

        let schema = self
            .schema
            .generate_schema(page.content_type, &SchemaData::from_page(page));
        let schema_validation = schema.as_ref().map(|doc| validate_schema(&doc.0));

        let links = self.links.recommend(page);

        tracing::info!(
            url = %meta_tags.canonical,
            content_type = %page.content_type,
            keyword_score = keyword_report.score,
            links = links.len(),
            "Page analyzed"
        );

        PageAnalysis {
            keyword_report,
            readability,
            meta_tags,
            meta_validation,
            url_validation,
            schema,
            schema_validation,
            links,
        }
    }
}

fn load_config(args: &Cli) -> Result<Config> {
    match &args.config {
        Some(path) => Config::from_file(Path::new(path)),
        None => Ok(Config::from_default_paths()?.unwrap_or_default()),
    }
}

pub fn run(args: Cli) -> Result<()> {
    let json_output = args.output == "json";

    if !json_output {
        println!(
            "{}",
            "MetaScout - SEO Metadata Generator".bright_cyan().bold()
        );
        println!("{}", "=".repeat(50).bright_blue());
        println!();
    }

    let config = load_config(&args)?;
    let site = config.merge_with_cli(&args);

    let page: PageContent = read_structured_file(Path::new(&args.page))
        .with_context(|| format!("Failed to load page: {}", args.page))?;

    if !json_output {
        println!("{} {}", "Site:".bright_white().bold(), site.site_name);
        println!("{} {}", "Page:".bright_white().bold(), args.page);
        println!("{} {}", "Content type:".bright_white().bold(), page.content_type);
        println!();
    }

    if args.verbose && !json_output {
        println!("{}", "Analyzing page...".bright_yellow());
    }

    let engine = SeoEngine::new(site);
    let analysis = engine.analyze(&page);
    let report = Reporter::generate_report(&page, analysis);

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        _ => {
            Reporter::print_text_report(&report);
            if args.verbose && let Some(schema) = &report.analysis.schema {
                println!();
                println!("{}", "JSON-LD".bright_white().bold());
                println!("{}", schema.to_json_ld());
            }
        }
    }

    if let Some(filename) = args.save {
        Reporter::save_json_report(&report, &filename)?;
    }

    Ok(())
}
