// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{BufRead, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use bitext::app_config::{Config, LogLevel};
use bitext::document::{OutlineDocument, Stream};
use bitext::file_utils::FileManager;
use bitext::glossary::TranslationChoice;
use bitext::session::{Choice, InteractionSurface, Project, ProjectRegistry};
use bitext::tracker::Resync;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for the segmentable streams
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStream {
    Source,
    Translation,
}

impl From<CliStream> for Stream {
    fn from(stream: CliStream) -> Self {
        match stream {
            CliStream::Source => Stream::Source,
            CliStream::Translation => Stream::Translation,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the project sections and register the document as a project
    Init {
        /// Outline document holding the source, translation and glossary sections
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Project name (defaults to the document file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Insert segment delimiters
    Segment {
        #[command(flatten)]
        target: TargetArgs,

        /// Re-segment this stream from scratch instead
        #[arg(long, value_enum)]
        resegment: Option<CliStream>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the source segment matching a translation offset
    Locate {
        #[command(flatten)]
        target: TargetArgs,

        /// Byte offset in the translation stream
        #[arg(long)]
        at: usize,
    },

    /// Move across segments from a translation offset
    Move {
        #[command(flatten)]
        target: TargetArgs,

        /// Segments to move, negative to go back
        #[arg(long, allow_hyphen_values = true)]
        count: isize,

        /// Starting byte offset in the translation stream (defaults to its start)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Glossary term operations
    Term {
        #[command(subcommand)]
        action: TermAction,
    },

    /// List the glossary entries
    Glossary {
        #[command(flatten)]
        target: TargetArgs,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how far the translation has progressed
    Progress {
        #[command(flatten)]
        target: TargetArgs,

        /// Byte offset in the translation stream (defaults to its end)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Manage registered projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Generate shell completions for bitext
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum TermAction {
    /// Register a term and link its occurrences in the source
    Add {
        #[command(flatten)]
        target: TargetArgs,

        /// Source text of the term
        text: String,
    },

    /// Translate the next term of the segment at a translation offset
    Next {
        #[command(flatten)]
        target: TargetArgs,

        /// Byte offset in the translation stream where the translation goes
        #[arg(long)]
        at: usize,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectsAction {
    /// List registered projects
    List,
    /// Make a project the active one
    Activate { name: String },
    /// Deactivate the active project
    Deactivate,
    /// Forget a project
    Remove { name: String },
}

/// Which document to work on
#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Outline document (defaults to the active project's document)
    #[arg(short, long, value_name = "DOCUMENT")]
    document: Option<PathBuf>,
}

/// bitext - bilingual segment alignment and glossary engine
///
/// Keeps a source text and its translation in ordered correspondence inside
/// one outline document, and maintains a glossary of recurring terms.
#[derive(Parser, Debug)]
#[command(name = "bitext")]
#[command(version)]
#[command(about = "Bilingual segment alignment and glossary tool")]
#[command(long_about = "bitext splits a source text and its translation into matching segments and \
keeps track of which source segment the translator is working on.

EXAMPLES:
    bitext init book.org                       # Resolve sections and register the project
    bitext segment -d book.org                 # Segment source and translation
    bitext locate --at 1042                    # Source segment for a translation offset
    bitext move --count -2 --at 1042           # Two segments back
    bitext term add -d book.org \"apple\"        # Register a glossary term
    bitext progress                            # Progress of the active project
    bitext completions bash > bitext.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in bitext.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config_path: Option<PathBuf>,

    /// Project registry path
    #[arg(long, global = true, env = "BITEXT_REGISTRY")]
    registry: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
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

    // @initializes: Global logger, filtered by the global max level afterwards
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, color) = Self::decoration(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Terminal prompts for the interactive choice points
struct TerminalSurface {
    assume_yes: bool,
}

impl TerminalSurface {
    fn prompt(&self, question: &str) -> Option<String> {
        eprint!("{} ", question);
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl InteractionSurface for TerminalSurface {
    fn request_translation_choice(&mut self, choice: &TranslationChoice) -> Choice {
        println!("Term: {}", choice.source_text);
        for (index, candidate) in choice.candidates.iter().enumerate() {
            println!("  {}) {}", index + 1, candidate);
        }
        let Some(answer) = self.prompt("Translation (number, new text, or empty to abort):") else {
            return Choice::Aborted;
        };
        if answer.is_empty() {
            return Choice::Aborted;
        }
        match answer.parse::<usize>() {
            Ok(n) if n >= 1 && n <= choice.candidates.len() => Choice::Chosen(choice.candidates[n - 1].clone()),
            _ => Choice::Chosen(answer),
        }
    }

    fn confirm_segmentation(&mut self, stream: Stream, boundaries: usize) -> bool {
        if self.assume_yes {
            return true;
        }
        self.prompt(&format!("Insert {} delimiters into the {} stream? [y/N]", boundaries, stream))
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    fn highlight_changed(&mut self, range: Option<Range<usize>>) {
        if let Some(range) = range {
            log::debug!("Highlight at {}..{}", range.start, range.end);
        }
    }
}

/// A loaded document and the configuration that goes with it
struct Workspace {
    document_path: PathBuf,
    config: Config,
    document: OutlineDocument,
    original: String,
}

impl Workspace {
    fn open(document_path: PathBuf, config_path: &Path) -> Result<Self> {
        let config = Config::load_or_create(config_path)?;
        config.validate().context("Configuration validation failed")?;
        let document = FileManager::load_document(&document_path)?;
        Ok(Self {
            original: document.text().to_string(),
            document_path,
            config,
            document,
        })
    }

    /// Activate the project with the configured settings and languages
    fn activate(&mut self) -> Result<Project<'_, OutlineDocument>> {
        let project = Project::activate(&mut self.document, self.config.project.clone())?
            .with_languages(&self.config.source_language, &self.config.target_language);
        Ok(project)
    }

    fn save_if_changed(&self) -> Result<()> {
        if self.document.text() != self.original {
            FileManager::save_document(&self.document_path, &self.document)?;
            info!("Saved {:?}", self.document_path);
        }
        Ok(())
    }
}

struct App {
    config_path: Option<PathBuf>,
    registry_path: PathBuf,
}

impl App {
    fn registry(&self) -> Result<ProjectRegistry> {
        ProjectRegistry::load(&self.registry_path)
    }

    fn config_path_for(&self, document: &Path) -> PathBuf {
        self.config_path.clone().unwrap_or_else(|| {
            document
                .parent()
                .unwrap_or(Path::new("."))
                .join("bitext.json")
        })
    }

    /// Open the requested document, or the active project's
    fn open(&self, target: TargetArgs) -> Result<Workspace> {
        match target.document {
            Some(document) => {
                let config_path = self.config_path_for(&document);
                Workspace::open(document, &config_path)
            }
            None => {
                let registry = self.registry()?;
                let active = registry
                    .active()
                    .ok_or_else(|| anyhow!("No document given and no active project; run `bitext init` first"))?;
                let config_path = self.config_path.clone().unwrap_or_else(|| active.config_path.clone());
                Workspace::open(active.document_path.clone(), &config_path)
            }
        }
    }

    fn init(&self, document: PathBuf, name: Option<String>) -> Result<()> {
        let config_path = self.config_path_for(&document);
        let mut workspace = Workspace::open(document.clone(), &config_path)?;

        let project = workspace.activate()?;
        let roots = project.deactivate();
        workspace.config.project.pin_roots(&roots);
        workspace.config.save(&config_path)?;
        workspace.save_if_changed()?;

        let name = match name {
            Some(name) => name,
            None => document
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .ok_or_else(|| anyhow!("Cannot derive a project name from {:?}", document))?,
        };
        let mut registry = self.registry()?;
        if registry.get(&name).is_none() {
            registry.add(&name, document, config_path)?;
        }
        registry.activate(&name)?;
        registry.save(&self.registry_path)?;
        println!("Project '{}' ready (source {}, translation {}, glossary {})", name, roots.source, roots.translation, roots.glossary);
        Ok(())
    }

    fn segment(&self, target: TargetArgs, resegment: Option<CliStream>, yes: bool) -> Result<()> {
        let mut workspace = self.open(target)?;
        let mut surface = TerminalSurface { assume_yes: yes };
        {
            let mut project = workspace.activate()?;
            let inserted = match resegment {
                Some(stream) => project.resegment(stream.into(), &mut surface)?,
                None => project.segment_source(&mut surface)?,
            };
            println!("Inserted {} delimiters", inserted);
            project.deactivate();
        }
        workspace.save_if_changed()
    }

    fn locate(&self, target: TargetArgs, at: usize) -> Result<()> {
        let mut workspace = self.open(target)?;
        let mut surface = TerminalSurface { assume_yes: false };
        let mut project = workspace.activate()?;

        report_resync(project.set_cursor(at, &mut surface)?);
        if let Some(text) = project.highlighted_text() {
            println!("{}", text);
        }
        Ok(())
    }

    fn move_segments(&self, target: TargetArgs, count: isize, at: Option<usize>) -> Result<()> {
        let mut workspace = self.open(target)?;
        let mut surface = TerminalSurface { assume_yes: false };
        let mut project = workspace.activate()?;

        if let Some(at) = at {
            project.set_cursor(at, &mut surface)?;
        }
        let movement = project.move_segments(count, &mut surface)?;
        println!("Translation cursor: {}", movement.cursor);
        report_resync(movement.resync);
        if let Some(text) = project.highlighted_text() {
            println!("{}", text);
        }
        Ok(())
    }

    fn term(&self, action: TermAction) -> Result<()> {
        match action {
            TermAction::Add { target, text } => {
                let mut workspace = self.open(target)?;
                {
                    let mut project = workspace.activate()?;
                    let registration = project.register_term(&text)?;
                    println!(
                        "Registered '{}' as {} ({} occurrences linked)",
                        text, registration.term_id, registration.replacements
                    );
                    project.deactivate();
                }
                workspace.save_if_changed()
            }
            TermAction::Next { target, at } => {
                let mut workspace = self.open(target)?;
                let mut surface = TerminalSurface { assume_yes: false };
                {
                    let mut project = workspace.activate()?;
                    project.set_cursor(at, &mut surface)?;
                    match project.translate_next_term(&mut surface)? {
                        Some(term_id) => println!("Inserted translation of {}", term_id),
                        None => println!("Aborted"),
                    }
                    project.deactivate();
                }
                workspace.save_if_changed()
            }
        }
    }

    fn glossary(&self, target: TargetArgs, json: bool) -> Result<()> {
        let mut workspace = self.open(target)?;
        let project = workspace.activate()?;

        if json {
            println!("{}", serde_json::to_string_pretty(project.glossary())?);
            return Ok(());
        }
        for entry in project.glossary().iter() {
            println!(
                "{} -> {}",
                entry.source_terms.as_slice().join(" / "),
                entry.translation_alternatives.as_slice().join(", ")
            );
        }
        Ok(())
    }

    fn progress(&self, target: TargetArgs, at: Option<usize>) -> Result<()> {
        let mut workspace = self.open(target)?;
        let mut surface = TerminalSurface { assume_yes: false };
        let mut project = workspace.activate()?;

        let position = match at {
            Some(at) => at,
            None => project.translation_bounds()?.end,
        };
        report_resync(project.set_cursor(position, &mut surface)?);
        let Some(percentage) = project.progress() else {
            warn!("No source position known yet; segment the document first");
            return Ok(());
        };

        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {msg}")
                .map_err(|e| anyhow!("Invalid progress bar template: {}", e))?
                .progress_chars("█▓▒░"),
        );
        bar.set_position(percentage.clamp(0.0, 100.0) as u64);
        bar.abandon_with_message(format!("{:.1}%", percentage));
        Ok(())
    }

    fn projects(&self, action: ProjectsAction) -> Result<()> {
        let mut registry = self.registry()?;
        match action {
            ProjectsAction::List => {
                for project in registry.projects() {
                    let marker = if project.active { "*" } else { " " };
                    println!("{} {} ({:?})", marker, project.name, project.document_path);
                }
                return Ok(());
            }
            ProjectsAction::Activate { name } => {
                registry.activate(&name)?;
            }
            ProjectsAction::Deactivate => match registry.deactivate() {
                Some(name) => info!("Project '{}' deactivated", name),
                None => info!("No active project"),
            },
            ProjectsAction::Remove { name } => {
                registry.remove(&name)?;
            }
        }
        registry.save(&self.registry_path)
    }
}

fn report_resync(resync: Resync) {
    match resync {
        Resync::Located(position) => println!("Source position: {}", position),
        Resync::Mismatch { ordinal, available } => println!(
            "Segment {} has no source counterpart ({} source segments); consider re-segmenting",
            ordinal, available
        ),
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();
    if let Some(level) = cli.log_level.clone() {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    } else if let Some(path) = &cli.config_path {
        if FileManager::file_exists(path) {
            let config = Config::load_or_create(path)?;
            log::set_max_level(config.log_level.to_level_filter());
        }
    }

    let registry_path = match cli.registry {
        Some(path) => path,
        None => ProjectRegistry::default_path()?,
    };
    let app = App {
        config_path: cli.config_path,
        registry_path,
    };

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "bitext", &mut std::io::stdout());
            Ok(())
        }
        Commands::Init { document, name } => app.init(document, name),
        Commands::Segment { target, resegment, yes } => app.segment(target, resegment, yes),
        Commands::Locate { target, at } => app.locate(target, at),
        Commands::Move { target, count, at } => app.move_segments(target, count, at),
        Commands::Term { action } => app.term(action),
        Commands::Glossary { target, json } => app.glossary(target, json),
        Commands::Progress { target, at } => app.progress(target, at),
        Commands::Projects { action } => app.projects(action),
    }
}
