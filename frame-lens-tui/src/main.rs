mod logging;
mod tui;

use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use frame_lens_common::Config;
use frame_lens_core::export::{export_csv, export_json, format_page_table, print_summary, write_csv};
use frame_lens_core::projection::project_batch;
use frame_lens_core::{Dataset, ExplorerSession, NavAction, Predicate};
use logging::{init_logging, LogConfig, LogFormat};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{io, time::Duration};
use tui::app::App;
use tui::events::handle_key;
use tui::session::UiPrefs;
use tui::ui::render;

#[derive(Parser)]
#[command(name = "frame-lens", version, about = "Filter and page through a CSV or Parquet table")]
struct Cli {
    /// error, warn, info, debug or trace (overrides the config file)
    #[arg(long = "log-level", global = true)]
    log_level: Option<tracing::Level>,
    #[arg(long = "log-format", value_enum, global = true)]
    log_format: Option<LogFormat>,
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// File format actually written by `--output`/`--export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Json,
    Csv,
}

impl ExportKind {
    /// `--format table` defers to `export.format` in the config; anything
    /// but "csv" there falls back to JSON.
    fn resolve(format: OutputFormat, config: &Config) -> Self {
        match format {
            OutputFormat::Json => ExportKind::Json,
            OutputFormat::Csv => ExportKind::Csv,
            OutputFormat::Table => match config.export.format.to_ascii_lowercase().as_str() {
                "csv" => ExportKind::Csv,
                "json" => ExportKind::Json,
                other => {
                    tracing::warn!(format = other, "unsupported export format, writing json");
                    ExportKind::Json
                }
            },
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ExportKind::Json => "json",
            ExportKind::Csv => "csv",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive explorer
    Explore {
        path: PathBuf,
        #[arg(long)]
        page_size: Option<i64>,
    },
    /// Apply filters and print one page
    Query {
        path: PathBuf,
        /// `field op literal`, repeatable; e.g. --filter "country contains fra"
        #[arg(long = "filter")]
        filters: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        #[arg(long)]
        page_size: Option<i64>,
        /// 1-based
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write the whole filtered view here instead of printing a page
        #[arg(long)]
        output: Option<PathBuf>,
        /// Like --output, into the configured export directory
        #[arg(long)]
        export: bool,
    },
    /// Print column names and kinds
    Schema { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    let mut log = LogConfig::from_settings(
        &config.logging.level,
        &config.logging.format,
        config.logging.file.as_deref(),
    );
    if let Some(level) = cli.log_level { log = log.with_level(level); }
    if let Some(format) = cli.log_format { log = log.with_format(format); }
    if cli.log_file.is_some() { log = log.with_log_file(cli.log_file.clone()); }
    if matches!(cli.command, Commands::Explore { .. }) && log.log_file.is_none() {
        // the terminal belongs to the UI
        log = log.with_log_file(Some(default_log_path()));
    }
    init_logging(&log)?;

    match cli.command {
        Commands::Explore { path, page_size } => run_explore(&path, page_size, config)?,
        Commands::Query { path, filters, columns, page_size, page, format, output, export } => {
            let kind = ExportKind::resolve(format, &config);
            let output = output.or_else(|| export.then(|| export_path(&config, kind)));
            run_query(&path, &filters, columns, page_size, page, format, kind, output.as_deref(), &config)?
        }
        Commands::Schema { path } => run_schema(&path)?,
    }
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("frame-lens")
        .join("frame-lens.log")
}

fn export_path(config: &Config, kind: ExportKind) -> PathBuf {
    Path::new(&config.export.output_dir).join(format!("filtered.{}", kind.extension()))
}

fn load(path: &Path) -> anyhow::Result<Arc<Dataset>> {
    let dataset = Dataset::open(path).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    Ok(Arc::new(dataset))
}

fn page_size_or_default(flag: Option<i64>, config: &Config) -> i64 {
    flag.unwrap_or(config.display.page_size as i64)
}

fn run_schema(path: &Path) -> anyhow::Result<()> {
    let dataset = load(path)?;
    println!("{:<10} {}", "Rows:", dataset.num_rows());
    println!("{:<10} {}", "Columns:", dataset.num_columns());
    for c in dataset.columns() {
        let null = if c.nullable { "nullable" } else { "" };
        println!("  {:<24} {:<8} {:<12} {null}", c.name, c.kind, c.data_type);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_query(
    path: &Path,
    filters: &[String],
    columns: Option<Vec<String>>,
    page_size: Option<i64>,
    page: i64,
    format: OutputFormat,
    export_kind: ExportKind,
    output: Option<&Path>,
    config: &Config,
) -> anyhow::Result<()> {
    let dataset = load(path)?;
    let mut session = ExplorerSession::new(dataset, page_size_or_default(page_size, config))?;
    for expr in filters {
        let predicate = Predicate::parse_expr(expr)?;
        session.add_predicate_with(predicate)?;
    }
    for d in session.diagnostics() {
        eprintln!("warning: filter {} ignored: {}", d.key, d.error);
    }
    if let Some(cols) = columns.or_else(|| config.display.default_columns.clone()) {
        session.select_columns(cols);
    }

    if let Some(out) = output {
        if let Some(parent) = out.parent() {
            if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
        }
        match export_kind {
            ExportKind::Csv => export_csv(out, session.filtered())?,
            ExportKind::Json => export_json(out, session.filtered())?,
        }
        println!("Exported {} rows to {}", session.filtered().num_rows(), out.display());
        return Ok(());
    }

    session.navigate(NavAction::Goto(page.saturating_sub(1)));
    let state = session.page_state();
    let rows = state.bounds(session.filtered().num_rows());
    let batch = session.filtered().slice(rows);
    match format {
        OutputFormat::Table => {
            let out = session.current_page();
            print_summary(&out);
            println!("{}", format_page_table(&batch, session.selection())?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&session.current_page())?);
        }
        OutputFormat::Csv => {
            let projected = project_batch(&batch, session.selection())?;
            write_csv(io::stdout().lock(), &projected)?;
        }
    }
    Ok(())
}

fn run_explore(path: &Path, page_size: Option<i64>, config: Config) -> anyhow::Result<()> {
    let dataset = load(path)?;
    let input_path = path.display().to_string();
    let size = page_size_or_default(page_size, &config);
    let mut app = App::new(input_path.clone(), dataset, config, size)?;
    if let Some(prefs) = UiPrefs::load_for(&input_path) {
        app.restore_from_prefs(&prefs);
        // an explicit flag beats the remembered size
        if let Some(n) = page_size { app.set_page_size(n); }
    }
    tracing::info!(path = %input_path, "starting explorer");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick = Duration::from_millis(66); // 15Hz
    let result = (|| -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| render(f, &app))?;
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? { handle_key(&mut app, key); }
            }
            if app.should_quit { return Ok(()); }
        }
    })();

    if let Err(e) = app.to_prefs().save() {
        tracing::warn!(%e, "could not save ui preferences");
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}
