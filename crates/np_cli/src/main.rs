use clap::Parser;
use np_core::{
    payout, types::validate_rate, Action, ArticleSource, Category, DashboardState, Error, KeyValueStore, Result,
    UserRecord,
};
use np_export::ExportFormat;
use np_sources::cli::{handle_fetch, QueryArgs};
use np_sources::logging::init_logging;
use np_sources::{NewsApiSource, SourceConfig, SourceManager};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch news, compute author payouts, export reports", long_about = None)]
pub struct Cli {
    /// Where settings and the login are kept: memory, file or sqlite
    #[arg(long, default_value = "file")]
    storage: String,
    /// Data directory (file) or database path (sqlite)
    #[arg(long)]
    storage_location: Option<String>,
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "NEWS_API_URL", default_value = np_sources::sources::newsapi::DEFAULT_BASE_URL)]
    api_url: String,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Remember who is using the dashboard
    Login {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        email: String,
    },
    Logout,
    Whoami,
    /// List articles matching the filters
    Fetch {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Per-author article counts and payout totals
    Payouts {
        #[command(flatten)]
        query: QueryArgs,
        /// Also list every article with its payout
        #[arg(long)]
        detailed: bool,
    },
    /// Article count per author as a bar chart
    Analytics {
        #[command(flatten)]
        query: QueryArgs,
    },
    Rates {
        #[command(subcommand)]
        command: RateCommands,
    },
    /// Write the payout report to a file
    Export {
        /// csv, pdf or sheets
        format: ExportFormat,
        /// Defaults to payout_report.<format> in the current directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Serve the dashboard HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(clap::Subcommand, Debug)]
enum RateCommands {
    Show,
    Set {
        category: Category,
        #[arg(value_parser = parse_rate)]
        value: f64,
    },
}

fn parse_rate(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|_| format!("not a number: {}", raw))?;
    validate_rate(value).map_err(|e| e.to_string())
}

struct Context {
    storage: Arc<dyn KeyValueStore>,
    sources: SourceManager,
    state: DashboardState,
}

impl Context {
    async fn load(cli: &Cli) -> Result<Self> {
        let storage = np_storage::create_storage(&cli.storage, cli.storage_location.as_deref()).await?;
        let config = SourceConfig::default()
            .with_base_url(&cli.api_url)
            .with_api_key(cli.api_key.clone());
        let source: Arc<dyn ArticleSource> = Arc::new(NewsApiSource::new(config)?);
        let rates = np_storage::load_rates(storage.as_ref()).await;
        let session = np_storage::load_session(storage.as_ref()).await;
        Ok(Self {
            storage,
            sources: SourceManager::new(source),
            state: DashboardState::new(rates, session),
        })
    }

    fn require_login(&self) -> Result<()> {
        if self.state.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Unauthenticated)
        }
    }

    /// Stores the updated rates first so a failed write leaves the old ones in place.
    async fn set_rate(&mut self, category: Category, rate: f64) -> Result<()> {
        let mut rates = self.state.rates.clone();
        rates.update_rate(category, rate);
        np_storage::save_rates(self.storage.as_ref(), &rates).await?;
        self.state = std::mem::take(&mut self.state).reduce(Action::SetRates(rates));
        Ok(())
    }

    /// Applies the filters and re-fetches, printing any upstream notice.
    async fn refresh(&mut self, query: &QueryArgs) {
        let state = std::mem::take(&mut self.state).reduce(Action::SetFilters(query.to_filter_patch()));
        self.state = self.sources.refresh(state).await;
        if let Some(error) = &self.state.error {
            eprintln!("⚠️ {}", error);
        }
    }
}

fn print_payouts(state: &DashboardState, detailed: bool) {
    let payouts = state.author_payouts();
    if payouts.is_empty() {
        println!("No payout data available.");
        return;
    }
    println!("{:<32} {:>8} {:>14}", "Author", "Articles", "Total Payout");
    for p in &payouts {
        println!("{:<32} {:>8} {:>14}", p.author, p.article_count, format!("${}", p.total_payout));
        if detailed {
            for a in &p.articles {
                println!("    {:<6} {:>8}  {}", a.category.as_str(), format!("${}", a.payout), a.title);
            }
        }
    }
    println!("{:<32} {:>8} {:>14}", "Total", state.filtered_articles.len(), format!("${}", payout::grand_total(&payouts)));
}

fn print_analytics(state: &DashboardState) {
    let counts = state.author_counts();
    let width = counts.iter().map(|c| c.author.chars().count()).max().unwrap_or(0);
    println!("Article Count by Author");
    for c in counts {
        println!("{:<width$} {} {}", c.author, "█".repeat(c.count), c.count, width = width);
    }
}

fn print_rates(state: &DashboardState) {
    for category in Category::ALL {
        println!("{:<5} ${}", category.as_str(), state.rates.rate_for(category));
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO });

    if let Err(e) = run(cli).await {
        match e {
            Error::Unauthenticated => eprintln!("❌ Not logged in, run `np login --email <email>` first"),
            other => eprintln!("❌ {}", other),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context::load(&cli).await?;

    match cli.command {
        Commands::Login { name, email } => {
            let user = UserRecord { name: name.trim().to_string(), email: email.trim().to_string() };
            if user.email.is_empty() {
                return Err(Error::InvalidQuery("email is required".to_string()));
            }
            np_storage::save_user(ctx.storage.as_ref(), &user).await?;
            ctx.state = ctx.state.reduce(Action::LoggedIn(user));
            println!("Welcome, {}", ctx.state.session.display_name().unwrap_or_default());
        }
        Commands::Logout => {
            np_storage::clear_user(ctx.storage.as_ref()).await?;
            ctx.state = ctx.state.reduce(Action::LoggedOut);
            println!("Logged out");
        }
        Commands::Whoami => match ctx.state.session.display_name() {
            Some(name) => println!("{}", name),
            None => println!("Not logged in"),
        },
        Commands::Fetch { query } => {
            handle_fetch(&query, &ctx.sources).await;
        }
        Commands::Payouts { query, detailed } => {
            ctx.require_login()?;
            ctx.refresh(&query).await;
            print_payouts(&ctx.state, detailed);
        }
        Commands::Analytics { query } => {
            ctx.require_login()?;
            ctx.refresh(&query).await;
            print_analytics(&ctx.state);
        }
        Commands::Rates { command } => {
            ctx.require_login()?;
            match command {
                RateCommands::Show => print_rates(&ctx.state),
                RateCommands::Set { category, value } => {
                    ctx.set_rate(category, value).await?;
                    print_rates(&ctx.state);
                }
            }
        }
        Commands::Export { format, output, query } => {
            ctx.require_login()?;
            ctx.refresh(&query).await;
            let payouts = ctx.state.author_payouts();
            let bytes = np_export::export(format, &payouts)?;
            let path = output.unwrap_or_else(|| PathBuf::from(format.file_name()));
            tokio::fs::write(&path, bytes).await?;
            info!("📤 Wrote {} authors to {}", payouts.len(), path.display());
        }
        Commands::Serve { addr } => {
            let state = np_web::AppState::load(ctx.sources.clone(), ctx.storage.clone()).await;
            np_web::serve(state, addr).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["np", "--storage", "memory", "rates", "set", "blog", "90"]).unwrap();
        match cli.command {
            Commands::Rates { command: RateCommands::Set { category, value } } => {
                assert_eq!(category, Category::Blog);
                assert_eq!(value, 90.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["np", "export", "pdf", "-o", "out.pdf", "--author", "jo"]).unwrap();
        assert!(matches!(cli.command, Commands::Export { format: ExportFormat::Pdf, .. }));
    }

    #[test]
    fn test_cli_rejects_negative_rates() {
        assert!(Cli::try_parse_from(["np", "rates", "set", "news", "-5"]).is_err());
        assert!(Cli::try_parse_from(["np", "rates", "set", "news", "abc"]).is_err());
        assert!(Cli::try_parse_from(["np", "rates", "set", "video", "5"]).is_err());
    }

    #[tokio::test]
    async fn test_set_rate_persists_before_applying() {
        let cli = Cli::try_parse_from(["np", "--storage", "memory", "rates", "show"]).unwrap();
        let mut ctx = Context::load(&cli).await.unwrap();
        ctx.set_rate(Category::Blog, 90.0).await.unwrap();
        assert_eq!(ctx.state.rates.rate_for(Category::Blog), 90.0);
        assert_eq!(np_storage::load_rates(ctx.storage.as_ref()).await.rate_for(Category::Blog), 90.0);

        ctx.storage = Arc::new(ReadOnlyStore);
        assert!(ctx.set_rate(Category::News, 10.0).await.is_err());
        assert_eq!(ctx.state.rates.rate_for(Category::News), 50.0);
    }

    struct ReadOnlyStore;

    #[async_trait::async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("read-only".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("12.5"), Ok(12.5));
        assert!(parse_rate("NaN").is_err());
    }
}
