use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use exam_paper::config::PaperConfig;
use exam_paper::export::{write_bundle, PaperInput};
use exam_paper::ExamPaperBuilder;
use log::info;

/// Renders generated exam questions into a printable PDF.
///
/// Input files hold either a JSON array of question records or a
/// `{summary, results}` bundle previously written by `export`.
/// Fonts are looked up in `EXAM_PAPER_FONTS_DIR`, `assets/fonts` and the
/// usual Liberation font locations.
#[derive(Parser)]
#[command(author, version, about = "Exam paper renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Question records or an exported results bundle (JSON).
    input: PathBuf,

    /// Configuration file; defaults to `exam-paper.toml` when present.
    #[arg(long, env = "EXAM_PAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for written files; overrides `output_dir` from the config.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the questions to `exam-paper-v2-<date>.pdf`.
    Render {
        #[command(flatten)]
        common: CommonArgs,

        /// Date printed in the footer and file name (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Add one PDF bookmark per question (needs the `bookmarks` feature).
        #[arg(long)]
        bookmarks: bool,
    },

    /// Print where every question lands, as JSON.
    Layout {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write the `{summary, results}` JSON bundle.
    Export {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            common,
            date,
            bookmarks,
        } => run_render(&common, date, bookmarks),
        Commands::Layout { common } => run_layout(&common),
        Commands::Export { common } => run_export(&common),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn load(common: &CommonArgs) -> Result<(PaperConfig, PaperInput), Box<dyn Error>> {
    let config = PaperConfig::discover(common.config.as_deref())?;
    let input = PaperInput::load(&common.input)?;
    Ok((config, input))
}

fn output_dir(common: &CommonArgs, config: &PaperConfig) -> PathBuf {
    common.out_dir.clone().unwrap_or_else(|| config.output_dir())
}

fn run_render(
    common: &CommonArgs,
    date: Option<NaiveDate>,
    bookmarks: bool,
) -> Result<(), Box<dyn Error>> {
    let (config, input) = load(common)?;
    let records = input.records();
    let builder = ExamPaperBuilder::from_config(&config).with_date(date);

    let paper = if bookmarks {
        render_with_bookmarks(&builder, &records)?
    } else {
        builder.render(&records)?
    };
    let path = paper.save_to(output_dir(common, &config))?;
    println!(
        "Generated {} ({} pages, {} bytes)",
        path.display(),
        paper.report.page_count,
        paper.bytes.len()
    );
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn render_with_bookmarks(
    builder: &ExamPaperBuilder,
    records: &[exam_paper::QuestionRecord],
) -> exam_paper::Result<exam_paper::RenderedPaper> {
    builder.render_with_bookmarks(records)
}

#[cfg(not(feature = "bookmarks"))]
fn render_with_bookmarks(
    builder: &ExamPaperBuilder,
    records: &[exam_paper::QuestionRecord],
) -> exam_paper::Result<exam_paper::RenderedPaper> {
    log::warn!("built without the `bookmarks` feature; rendering without bookmarks");
    builder.render(records)
}

fn run_layout(common: &CommonArgs) -> Result<(), Box<dyn Error>> {
    let (config, input) = load(common)?;
    let paper = ExamPaperBuilder::from_config(&config).render(&input.records())?;
    println!("{}", serde_json::to_string_pretty(&paper.report)?);
    Ok(())
}

fn run_export(common: &CommonArgs) -> Result<(), Box<dyn Error>> {
    let (config, input) = load(common)?;
    let source = file_name(&common.input);
    let bundle = input.into_bundle(source);
    let path = write_bundle(&bundle, output_dir(common, &config), Utc::now())?;
    info!("summary: {:?}", bundle.summary);
    println!(
        "Exported {} results to {}",
        bundle.results.len(),
        path.display()
    );
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
