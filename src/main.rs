// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tarjama::app_config::{self, Config};
use tarjama::app_controller::Controller;
use tarjama::file_utils::FileManager;
use tarjama::translation::DocumentFormat;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for DocumentFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// `key: value` lines (.yml, .yaml, .txt)
    Line,
    /// XML element tree
    Xml,
}

impl From<CliFormat> for DocumentFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Line => DocumentFormat::Line,
            CliFormat::Xml => DocumentFormat::Tree,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a localization file, or every file in a directory
    Translate(TranslateArgs),

    /// Manage glossary terms
    Glossary {
        #[command(subcommand)]
        action: GlossaryAction,
    },

    /// Inspect or clear the translation memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Check that the configured provider answers
    TestConnection {
        /// Target language code to test with
        #[arg(short, long)]
        target_language: Option<String>,
    },

    /// Generate shell completions for tarjama
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Input format; detected from the extension when omitted
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Target language code (e.g., 'ar', 'fa', 'he')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Do not apply glossary terms
    #[arg(long)]
    no_glossary: bool,

    /// Do not apply the correction table
    #[arg(long)]
    no_post_edit: bool,

    /// Do not write the right-to-left display file
    #[arg(long)]
    no_reorder: bool,

    /// Do not copy the input before processing
    #[arg(long)]
    no_backup: bool,
}

#[derive(Subcommand, Debug)]
enum GlossaryAction {
    /// Add or replace a term
    Add {
        source: String,
        target: String,
    },
    /// Remove a term
    Remove {
        source: String,
    },
    /// List all terms in application order
    List,
}

#[derive(Subcommand, Debug)]
enum MemoryAction {
    /// List every remembered translation
    List,
    /// Find entries whose source or translation contains TEXT
    Search {
        text: String,
    },
    /// Remove every remembered translation
    Clear {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// tarjama - placeholder-preserving translation of localization files
#[derive(Parser, Debug)]
#[command(name = "tarjama")]
#[command(version)]
#[command(about = "Translate localization files while keeping script tokens intact")]
#[command(long_about = "tarjama translates line-based (key: value) and XML localization files.
Placeholders such as $VAR$, [Scope.GetName], @icon!, #bold text#!, |x|, (..), {..}
and GetTrait(..) calls are never sent to the translator.

EXAMPLES:
    tarjama translate menu_l_english.yml               # Translate using default config
    tarjama translate -t fa --no-reorder menu.yml      # Persian, logical order only
    tarjama translate --format xml strings.dat          # Force the XML reader
    tarjama translate localisation/                     # Every .yml/.yaml/.txt/.xml file
    tarjama glossary add open \"فتح\"                     # Always translate 'open' this way
    tarjama memory search settings                     # Look up remembered translations
    tarjama test-connection                            # Check the provider is reachable
    tarjama completions bash > tarjama.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// Optional log file, attached once the configuration is known
static LOG_FILE: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @attaches: Append every record to `path` from now on
    fn attach_file(path: &Path) -> Result<()> {
        FileManager::append_to_log_file(path, "Logging started")?;
        *LOG_FILE.lock() = Some(path.to_path_buf());
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let level = record.level();

        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "{}{} {} {}\x1B[0m",
            Self::get_color_for_level(level),
            now.format("%H:%M:%S.%3f"),
            Self::get_emoji_for_level(level),
            record.args()
        );

        if let Some(path) = LOG_FILE.lock().as_ref() {
            let _ = FileManager::append_to_log_file(path, &format!("{} - {}", level, record.args()));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = cli.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "tarjama", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => {
            let config = load_config(&cli.config_path, cli.log_level, |config| {
                if let Some(target_lang) = &args.target_language {
                    config.target_language = target_lang.clone();
                }
                config.options.use_glossary &= !args.no_glossary;
                config.options.post_edit &= !args.no_post_edit;
                config.options.reorder &= !args.no_reorder;
                config.options.backup &= !args.no_backup;
            })?;
            run_translate(config, args).await
        }
        Commands::TestConnection { target_language } => {
            let config = load_config(&cli.config_path, cli.log_level, |config| {
                if let Some(target_lang) = target_language {
                    config.target_language = target_lang;
                }
            })?;
            run_test_connection(config).await
        }
        Commands::Glossary { action } => {
            let config = load_config(&cli.config_path, cli.log_level, |_| {})?;
            run_glossary(config, action)
        }
        Commands::Memory { action } => {
            let config = load_config(&cli.config_path, cli.log_level, |_| {})?;
            run_memory(config, action)
        }
    }
}

/// Load, override, validate and apply the logging part of the configuration
fn load_config(
    config_path: &str,
    cli_log_level: Option<CliLogLevel>,
    overrides: impl FnOnce(&mut Config),
) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;
    overrides(&mut config);

    if let Some(log_level) = cli_log_level {
        config.log_level = log_level.into();
    }

    config.validate().context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());

    if let Some(log_file) = &config.log_file {
        let path = if log_file.as_os_str().is_empty() {
            FileManager::default_log_path()
        } else {
            log_file.clone()
        };
        CustomLogger::attach_file(&path)?;
    }

    Ok(config)
}

async fn run_translate(config: Config, args: TranslateArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;

    if args.input_path.is_file() {
        let job = controller.job_for(&args.input_path, args.format.map(DocumentFormat::from))?;
        let report = controller.run(job).await?;
        if let Some(reversed) = &report.reversed_path {
            info!("Display file: {}", reversed.display());
        }
        Ok(())
    } else if args.input_path.is_dir() {
        if args.format.is_some() {
            warn!("--format is ignored for directories; formats are detected per file");
        }
        let summary = controller.run_folder(args.input_path.clone()).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} of {} files failed", summary.failed, summary.failed + summary.succeeded));
        }
        Ok(())
    } else {
        Err(anyhow!("Input path does not exist: {:?}", args.input_path))
    }
}

async fn run_test_connection(config: Config) -> Result<()> {
    let provider = config.provider.kind.display_name().to_string();
    let endpoint = config.provider.effective_endpoint();
    let controller = Controller::with_config(config)?;

    info!("Testing connection to {} at {}", provider, endpoint);
    controller.test_connection().await?;
    info!("{} answered", provider);
    Ok(())
}

fn run_glossary(config: Config, action: GlossaryAction) -> Result<()> {
    let controller = Controller::with_config(config)?;

    match action {
        GlossaryAction::Add { source, target } => controller.add_glossary_term(&source, &target),
        GlossaryAction::Remove { source } => {
            if !controller.remove_glossary_term(&source)? {
                error!("Term not found: {}", source);
            }
            Ok(())
        }
        GlossaryAction::List => {
            let terms = controller.glossary_terms();
            let mut stdout = std::io::stdout();
            for term in &terms {
                writeln!(stdout, "{}\t{}", term.source, term.target)?;
            }
            info!("{} glossary terms", terms.len());
            Ok(())
        }
    }
}

fn run_memory(config: Config, action: MemoryAction) -> Result<()> {
    let controller = Controller::with_config(config)?;

    match action {
        MemoryAction::List => print_entries(&controller.memory_entries()),
        MemoryAction::Search { text } => {
            let found = controller.search_memory(&text);
            if found.is_empty() {
                warn!("No entries match '{}'", text);
            }
            print_entries(&found)
        }
        MemoryAction::Clear { yes } => {
            let count = controller.memory_entries().len();
            if count == 0 {
                info!("Translation memory is already empty");
                return Ok(());
            }
            if !yes && !confirm(&format!("Clear {} remembered translations?", count))? {
                info!("Aborted");
                return Ok(());
            }
            controller.clear_memory()?;
            Ok(())
        }
    }
}

fn print_entries(entries: &[(String, String)]) -> Result<()> {
    let mut stdout = std::io::stdout();
    for (source, target) in entries {
        writeln!(stdout, "{}\t{}", source, target)?;
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
