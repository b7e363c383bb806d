// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;

use cornucopia_convert::app_config::{self, Config};
use cornucopia_convert::app_controller::{ALL_FILE_TYPES, Controller, RunOptions};
use cornucopia_convert::pdf::PdfConverter;

/// Output type choices accepted by `-t`
#[derive(Debug, Clone, ValueEnum)]
enum CliFileType {
    All,
    Docx,
    Pdf,
    Idml,
}

impl CliFileType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::All => ALL_FILE_TYPES,
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Idml => "idml",
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for cornucopia-convert
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Cornucopia converter
///
/// Turns the card game documents into language-neutral templates and fills
/// templates with the text of a language file.
#[derive(Parser, Debug)]
#[command(name = "cornucopia-convert")]
#[command(version)]
#[command(about = "Convert OWASP Cornucopia card documents between languages and templates")]
#[command(long_about = "Converts OWASP Cornucopia documents (docx, pdf, idml).

With a language, the template document is filled with the text from the matching
language file. With the 'template' language, the original English document is
turned into a template where text has been replaced by ${...} tags.

EXAMPLES:
    cornucopia-convert                              # English docx from the default template
    cornucopia-convert -t idml -l es                # Spanish idml
    cornucopia-convert -t all -l all                # Every format and language
    cornucopia-convert -l template -t docx          # Make a new docx template
    cornucopia-convert -i my.docx -o out/cards_lang.docx
    cornucopia-convert completions bash > cornucopia-convert.bash

CONFIGURATION:
    Configuration is stored in convert.json by default. If the file doesn't exist,
    a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input (template) document; defaults to the configured template or original
    #[arg(short, long)]
    inputfile: Option<String>,

    /// Output file type; inferred from --outputfile when omitted
    #[arg(short = 't', long, value_enum)]
    outputfiletype: Option<CliFileType>,

    /// Output file; may contain the _edition, _component, _lang and _ver placeholders
    #[arg(short, long)]
    outputfile: Option<String>,

    /// Output language: template, all, or a configured language
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Output additional information and keep temporary files
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "convert.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

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

    // @returns: ANSI color for log level
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
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The level is lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "cornucopia-convert", &mut std::io::stdout());
        return Ok(());
    }

    run_convert(cli)
}

fn run_convert(options: CommandLineOptions) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let config = load_config(&options)?;
    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    debug!("Options = {:?}", options);

    let can_convert_pdf = PdfConverter::platform_supported();
    let requested_type = options.outputfiletype.as_ref().map(|t| t.as_str());
    if matches!(options.outputfiletype, Some(CliFileType::Pdf)) && !can_convert_pdf && !options.debug {
        error!(
            "Cannot convert to pdf on this system. \
             Pdf conversion is available on Windows and Mac, if MS Word is installed"
        );
        return Ok(());
    }

    let file_types = Controller::select_file_types(
        requested_type,
        options.outputfile.as_deref(),
        can_convert_pdf || options.debug,
    )?;
    if file_types.is_empty() {
        return Err(anyhow!("No output file type can be produced on this system"));
    }

    let run_options = RunOptions {
        input_file: options.inputfile.clone(),
        output_file: options.outputfile.clone(),
        debug: options.debug,
    };
    let controller = Controller::with_config(config)?.with_options(run_options);
    let languages = controller.select_languages(&options.language)?;

    let summary = controller.run(&file_types, &languages)?;
    if summary.outputs.is_empty() && summary.failed > 0 {
        return Err(anyhow!("No document could be converted"));
    }
    Ok(())
}

// Load the config file, or write a default one when it is missing
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else if options.debug {
        config.log_level = app_config::LogLevel::Debug;
    }
    if options.debug {
        config.keep_temp_files = true;
    }
    Ok(config)
}
