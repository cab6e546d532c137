mod platform;

use std::path::PathBuf;

use anyhow::Context;
use casey_core::landing::ContactForm;
use casey_core::{ExportKind, InputSource, TestId};
use clap::{Parser, Subcommand, ValueEnum};

use platform::app::{self, ContactRequest, DirectPlan, RunPlan, Selection};
use platform::config::{self, Overrides, DEFAULT_CONFIG_FILE};
use platform::logging::{self, LogDestination};

#[derive(Parser)]
#[command(name = "casey")]
#[command(version)]
#[command(about = "AI-assisted test generation and execution wizard", long_about = None)]
struct Cli {
    /// RON settings file; a missing file means defaults
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Backend base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Directory for downloaded documents and reports
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Where log lines go
    #[arg(long, global = true, value_enum, default_value = "file")]
    log: LogDestination,

    /// Show generated tests as a plain list with everything selected
    #[arg(long, global = true)]
    flat: bool,

    /// Fail instead of showing demo cases when the server returns none
    #[arg(long, global = true)]
    no_demo_fallback: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive wizard driven by line commands (default)
    Wizard,

    /// Generate tests from a source, execute them and export the results
    Run {
        #[arg(long, value_enum)]
        source: SourceArg,

        /// Figma key, document path, requirements text or website URL
        #[arg(long)]
        input: String,

        /// Website to test; website sources default to their own URL
        #[arg(long)]
        target: Option<String>,

        /// Show the browser while tests run
        #[arg(long)]
        live: bool,

        /// `all` or comma-separated test ids
        #[arg(long, default_value = "all")]
        select: String,

        /// Documents to save afterwards (comma-separated)
        #[arg(long, value_enum, value_delimiter = ',')]
        export: Vec<ExportArg>,
    },

    /// Execute a ready-made test-case file against a website
    Direct {
        /// PDF, DOC or DOCX file with test cases (16 MiB max)
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        target: String,

        #[arg(long)]
        live: bool,

        #[arg(long, value_enum, value_delimiter = ',')]
        export: Vec<ExportArg>,
    },

    /// Send a message through the landing-page contact form
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        company: String,

        #[arg(long)]
        message: String,

        /// Overrides `contact_endpoint` from the config file
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    Figma,
    Document,
    Manual,
    Website,
}

impl From<SourceArg> for InputSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Figma => InputSource::Figma,
            SourceArg::Document => InputSource::Document,
            SourceArg::Manual => InputSource::Manual,
            SourceArg::Website => InputSource::Website,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportArg {
    Tests,
    Results,
    Report,
}

impl From<ExportArg> for ExportKind {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Tests => ExportKind::TestCases,
            ExportArg::Results => ExportKind::TestResults,
            ExportArg::Report => ExportKind::Report,
        }
    }
}

fn parse_selection(raw: &str) -> anyhow::Result<Selection> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(Selection::All);
    }
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<TestId>()
                .with_context(|| format!("'{part}' is not a test id"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    if ids.is_empty() {
        anyhow::bail!("--select needs 'all' or at least one test id");
    }
    Ok(Selection::Ids(ids))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log);

    let mut settings = config::load_or_default(&cli.config);
    settings.apply(Overrides {
        api_base: cli.api_base,
        output: cli.output,
        flat: cli.flat,
        no_demo_fallback: cli.no_demo_fallback,
    });

    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Wizard => app::run_wizard(&settings),
        Commands::Run {
            source,
            input,
            target,
            live,
            select,
            export,
        } => app::run_generation(
            &settings,
            RunPlan {
                source: source.into(),
                input,
                target,
                live,
                selection: parse_selection(&select)?,
                exports: export.into_iter().map(ExportKind::from).collect(),
            },
        ),
        Commands::Direct {
            file,
            target,
            live,
            export,
        } => app::run_direct(
            &settings,
            DirectPlan {
                file,
                target,
                live,
                exports: export.into_iter().map(ExportKind::from).collect(),
            },
        ),
        Commands::Contact {
            name,
            email,
            company,
            message,
            endpoint,
        } => app::submit_contact(
            &settings,
            ContactRequest {
                form: ContactForm {
                    name,
                    email,
                    company,
                    message,
                },
                endpoint,
            },
        ),
    }
}
