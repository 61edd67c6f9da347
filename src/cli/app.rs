// ABOUTME: Main application orchestration for the applytrack CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::args::TemplatesAction;
use super::commands::{self, RenderOptions};
use super::{Args, Commands, Config};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load configuration for the parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration
    ///
    /// Logs go to stderr so rendered documents on stdout stay clean.
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let result = match self.config.logging.format.as_str() {
            "compact" => tracing_subscriber::fmt()
                .compact()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting applytrack v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        match args.command {
            Commands::Render {
                template,
                vars,
                vars_file,
                syntax,
                strict,
                output,
            } => {
                let options = RenderOptions {
                    syntax,
                    strict,
                    output,
                };
                commands::render_template(template, vars, vars_file, options, &self.config).await
            }

            Commands::Scan {
                template,
                syntax,
                format,
            } => commands::scan_template(template, syntax, format).await,

            Commands::Lint {
                template,
                syntax,
                strict,
                format,
            } => commands::lint_template(template, syntax, strict, format).await,

            Commands::Templates { action } => match action {
                TemplatesAction::List => commands::list_templates().await,
                TemplatesAction::Show { name } => commands::show_template(name).await,
            },

            Commands::Init {
                name,
                output_dir,
                document,
            } => commands::init_document(name, output_dir, document).await,

            Commands::Market {
                tracker,
                output_dir,
                as_of,
                half_life,
            } => commands::run_market(tracker, output_dir, as_of, half_life, &self.config).await,

            Commands::Report {
                tracker,
                template,
                vars,
                as_of,
                strict,
                output,
            } => {
                let options = RenderOptions {
                    syntax: Default::default(),
                    strict,
                    output,
                };
                commands::run_report(tracker, template, vars, as_of, options, &self.config).await
            }
        }
    }
}
