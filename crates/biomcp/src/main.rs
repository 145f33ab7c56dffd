//! BioMCP - Entry Point
//!
//! `biomcp run` serves the MCP tools over stdio or HTTP; the other
//! subcommands call the same domain operations directly and print the result.

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use biomcp::articles::{self, PubmedRequest};
use biomcp::config::Config;
use biomcp::formatters::ResponseFormat;
use biomcp::health;
use biomcp::server::McpServer;
use biomcp::tools::ToolContext;
use biomcp::trials::{
    self, AgeGroup, DateField, InterventionType, PrimaryPurpose, RecruitingStatus, SortOrder,
    SponsorType, StudyDesign, StudyType, TrialModule, TrialPhase, TrialQuery,
};
use biomcp::variants::{
    self, ClinicalSignificance, PolyPhenPrediction, SiftPrediction, VariantQuery, VariantSource,
};

#[derive(Parser, Debug)]
#[command(name = "biomcp")]
#[command(about = "Biomedical articles, clinical trials and variants for LLM agents")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server
    Run {
        /// Transport mode: stdio or http
        #[arg(long, default_value = "stdio")]
        transport: Transport,

        /// HTTP server port (only used with --transport http)
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
    /// PubMed articles via PubTator3
    #[command(subcommand)]
    Article(ArticleCommand),
    /// ClinicalTrials.gov studies
    #[command(subcommand)]
    Trial(TrialCommand),
    /// MyVariant.info variants
    #[command(subcommand)]
    Variant(VariantCommand),
    /// Check that every upstream API endpoint answers
    Health {
        /// Include response excerpts for failing endpoints
        #[arg(long, short = 'v')]
        verbose: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the version
    Version,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print JSON instead of Markdown
    #[arg(long, short = 'j')]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum ArticleCommand {
    /// Search articles by concept and keyword
    Search {
        #[arg(long = "gene", short = 'g')]
        genes: Vec<String>,
        #[arg(long = "variant", short = 'v')]
        variants: Vec<String>,
        #[arg(long = "disease", short = 'd')]
        diseases: Vec<String>,
        #[arg(long = "chemical", short = 'c')]
        chemicals: Vec<String>,
        #[arg(long = "keyword", short = 'k')]
        keywords: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch articles by PMID
    Get {
        #[arg(required = true)]
        pmids: Vec<u64>,
        /// Include full text when available
        #[arg(long)]
        full: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
enum TrialCommand {
    /// Search trials
    Search(Box<TrialSearchArgs>),
    /// Fetch one module of a trial
    Get {
        nct_id: String,
        /// Protocol, Locations, References or Outcomes
        #[arg(default_value = "Protocol")]
        module: TrialModule,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct TrialSearchArgs {
    #[arg(long = "condition", short = 'c')]
    conditions: Vec<String>,
    #[arg(long = "term", short = 't')]
    terms: Vec<String>,
    #[arg(long = "intervention", short = 'i')]
    interventions: Vec<String>,
    #[arg(long = "nct-id")]
    nct_ids: Vec<String>,
    #[arg(long)]
    recruiting_status: Option<RecruitingStatus>,
    #[arg(long)]
    study_type: Option<StudyType>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    long: Option<f64>,
    /// Miles from lat/long
    #[arg(long)]
    distance: Option<u32>,
    #[arg(long)]
    min_date: Option<String>,
    #[arg(long)]
    max_date: Option<String>,
    #[arg(long)]
    date_field: Option<DateField>,
    #[arg(long)]
    phase: Option<TrialPhase>,
    #[arg(long)]
    age_group: Option<AgeGroup>,
    #[arg(long)]
    primary_purpose: Option<PrimaryPurpose>,
    #[arg(long)]
    intervention_type: Option<InterventionType>,
    #[arg(long)]
    sponsor_type: Option<SponsorType>,
    #[arg(long)]
    study_design: Option<StudyDesign>,
    #[arg(long)]
    sort: Option<SortOrder>,
    #[arg(long)]
    next_page_hash: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

impl TrialSearchArgs {
    fn query(&self) -> TrialQuery {
        TrialQuery {
            conditions: self.conditions.clone(),
            terms: self.terms.clone(),
            interventions: self.interventions.clone(),
            recruiting_status: self.recruiting_status,
            study_type: self.study_type,
            nct_ids: self.nct_ids.clone(),
            lat: self.lat,
            long: self.long,
            distance: self.distance,
            min_date: self.min_date.clone(),
            max_date: self.max_date.clone(),
            date_field: self.date_field,
            phase: self.phase,
            age_group: self.age_group,
            primary_purpose: self.primary_purpose,
            intervention_type: self.intervention_type,
            sponsor_type: self.sponsor_type,
            study_design: self.study_design,
            sort: self.sort,
            next_page_hash: self.next_page_hash.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum VariantCommand {
    /// Search variants
    Search(Box<VariantSearchArgs>),
    /// Fetch one variant by id or rsID
    Get {
        variant_id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct VariantSearchArgs {
    #[arg(long)]
    gene: Option<String>,
    #[arg(long)]
    hgvsp: Option<String>,
    #[arg(long)]
    hgvsc: Option<String>,
    #[arg(long)]
    rsid: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    significance: Option<ClinicalSignificance>,
    #[arg(long)]
    max_frequency: Option<f64>,
    #[arg(long)]
    min_frequency: Option<f64>,
    #[arg(long)]
    cadd: Option<f64>,
    #[arg(long)]
    polyphen: Option<PolyPhenPrediction>,
    #[arg(long)]
    sift: Option<SiftPrediction>,
    #[arg(long = "source")]
    sources: Vec<VariantSource>,
    #[arg(long, default_value_t = 40)]
    size: u32,
    #[arg(long, default_value_t = 0)]
    offset: u32,
    #[command(flatten)]
    output: OutputArgs,
}

impl VariantSearchArgs {
    fn query(&self) -> VariantQuery {
        VariantQuery {
            gene: self.gene.clone(),
            hgvsp: self.hgvsp.clone(),
            hgvsc: self.hgvsc.clone(),
            rsid: self.rsid.clone(),
            region: self.region.clone(),
            significance: self.significance,
            max_frequency: self.max_frequency,
            min_frequency: self.min_frequency,
            cadd: self.cadd,
            polyphen: self.polyphen,
            sift: self.sift,
            sources: self.sources.clone(),
            size: self.size,
            offset: self.offset,
        }
    }
}

impl OutputArgs {
    const fn format(&self) -> ResponseFormat {
        ResponseFormat::from_json_flag(self.json)
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries MCP messages and command output
    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        subscriber.with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr);
        subscriber.with(layer).init();
    }
}

async fn run_command(ctx: &ToolContext, command: Command) -> anyhow::Result<String> {
    let output = match command {
        Command::Run { .. } | Command::Version => String::new(),
        Command::Article(ArticleCommand::Search {
            genes,
            variants,
            diseases,
            chemicals,
            keywords,
            output,
        }) => {
            let request = PubmedRequest {
                chemicals,
                diseases,
                genes,
                keywords,
                variants,
            };
            articles::search_articles(ctx, &request, output.format()).await?
        }
        Command::Article(ArticleCommand::Get {
            pmids,
            full,
            output,
        }) => articles::fetch_articles(ctx, &pmids, full, output.format()).await?,
        Command::Trial(TrialCommand::Search(args)) => {
            trials::search_trials(ctx, &args.query(), args.output.format()).await?
        }
        Command::Trial(TrialCommand::Get {
            nct_id,
            module,
            output,
        }) => trials::get_trial(ctx, &nct_id, module, output.format()).await?,
        Command::Variant(VariantCommand::Search(args)) => {
            let query = args.query();
            query.validate()?;
            variants::search_variants(ctx, &query, args.output.format()).await?
        }
        Command::Variant(VariantCommand::Get { variant_id, output }) => {
            variants::get_variant(ctx, &variant_id, output.format()).await?
        }
        Command::Health { verbose, output } => {
            health::health_report(ctx, verbose, output.format()).await?
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    if matches!(cli.command, Command::Version) {
        println!("biomcp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::from_env()?;
    tracing::debug!(
        cache = ?config.cache_backend,
        ttl = ?config.cache_ttl,
        "Loaded configuration"
    );
    let ctx = ToolContext::from_config(config)?;

    if let Command::Run { transport, port } = cli.command {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            ?transport,
            "Starting BioMCP server"
        );
        let server = McpServer::new(ctx);
        return match transport {
            Transport::Stdio => server.run_stdio().await,
            Transport::Http => server.run_http(port).await,
        };
    }

    let result = run_command(&ctx, cli.command).await;
    ctx.client.close().await;
    println!("{}", result?.trim_end());
    Ok(())
}
