use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "metascout")]
#[command(
    about = "Generate meta tags, JSON-LD structured data and internal link suggestions for a page",
    long_about = None
)]
pub struct Cli {
    /// Page description file (JSON, TOML, or YAML)
    #[arg(value_name = "PAGE")]
    pub page: String,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub output: String,

    /// Save report to file
    #[arg(short, long)]
    pub save: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the configured site name
    #[arg(long)]
    pub site_name: Option<String>,

    /// Override the configured base URL
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Disable the keyword analysis cache
    #[arg(long)]
    pub no_cache: bool,

    /// Path to site configuration file (JSON, TOML, or YAML)
    #[arg(short, long)]
    pub config: Option<String>,
}
