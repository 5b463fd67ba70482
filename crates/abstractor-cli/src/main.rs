use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use abstractor_core::config_file::{self, ConfigFile};
use abstractor_ingest::{OutputLayout, PdfBackend, process_pdf, segment_pdf};
use abstractor_llm::{GenerationConfig, Generator, OpenAiBackend};

mod inputs;
mod output;

use output::ColorMode;

const DEFAULT_OUT_DIR: &str = "outputs";

/// Summarize academic PDFs into Markdown, JSON, and a cumulative CSV table
#[derive(Parser, Debug)]
#[command(name = "abstractor", version, about, long_about = None)]
struct Cli {
    /// A PDF file, or a directory whose PDFs are processed in name order
    input: PathBuf,

    /// Output directory [default: `[output] out_dir` from config, else "outputs"]
    #[arg(long, alias = "out_dir")]
    out_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Dry run: extract and segment each PDF, print the sections, write nothing
    #[arg(long)]
    dry_run: bool,

    /// Skip generation and write empty summaries (same as FORCE_MOCK=1)
    #[arg(long)]
    force_mock: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let file_config = config_file::load_config();
    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());
    let pdfs = inputs::resolve_inputs(&cli.input)?;
    if pdfs.is_empty() {
        println!("No PDF files found in {}", cli.input.display());
        return Ok(());
    }

    let pdf = abstractor_ingest::pdf_backend(file_config.pdf.as_ref())?;

    if cli.dry_run {
        return dry_run(&pdfs, &*pdf, color);
    }

    let out_dir = resolve_out_dir(cli.out_dir, &file_config);
    std::fs::create_dir_all(&out_dir).map_err(|e| {
        anyhow::anyhow!("Cannot create output directory {}: {}", out_dir.display(), e)
    })?;

    let mut generation = GenerationConfig::from_env(file_config.generation.as_ref());
    generation.force_mock |= cli.force_mock;
    if generation.force_mock {
        tracing::info!("offline mode: summaries will be left empty");
    } else if !generation.has_credential() {
        tracing::warn!("OPENAI_API_KEY not set; summaries will be left empty");
    }
    tracing::debug!(config = ?generation, "generation settings");

    let backend = OpenAiBackend::new(&generation);
    let generator = Generator::new(generation, backend);
    let layout = OutputLayout::new(&out_dir);

    let bar = progress_bar(pdfs.len(), cli.input.is_dir());
    let mut stdout = std::io::stdout();
    for path in &pdfs {
        bar.set_message(output::display_name(path));
        let result = process_pdf(path, &layout, &*pdf, &generator).await;
        if let Err(ref e) = result {
            tracing::debug!(path = %path.display(), error = ?e, "document failed");
        }
        bar.suspend(|| output::print_result(&mut stdout, path, &result, color))?;
        bar.inc(1);
    }
    bar.finish_and_clear();
    stdout.flush()?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flag > `[output] out_dir` > "outputs".
fn resolve_out_dir(flag: Option<PathBuf>, file_config: &ConfigFile) -> PathBuf {
    flag.or_else(|| {
        file_config
            .output
            .as_ref()
            .and_then(|o| o.out_dir.as_ref())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
}

/// Batch progress on stderr; hidden for a single-file run.
fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn dry_run(pdfs: &[PathBuf], pdf: &dyn PdfBackend, color: ColorMode) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    for path in pdfs {
        match segment_pdf(path, pdf) {
            Ok((pages, segmentation)) => {
                output::print_sections(&mut stdout, path, &pages, &segmentation, color)?
            }
            Err(e) => writeln!(stdout, "✗ Failed on {}: {}", path.display(), e)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstractor_core::config_file::OutputSection;
    use std::path::Path;

    #[test]
    fn out_dir_precedence() {
        let file_config = ConfigFile {
            output: Some(OutputSection {
                out_dir: Some("from-config".into()),
            }),
            ..Default::default()
        };
        assert_eq!(
            resolve_out_dir(Some("flag".into()), &file_config),
            Path::new("flag")
        );
        assert_eq!(resolve_out_dir(None, &file_config), Path::new("from-config"));
        assert_eq!(
            resolve_out_dir(None, &ConfigFile::default()),
            Path::new("outputs")
        );
    }

    #[test]
    fn out_dir_alias_is_accepted() {
        let cli = Cli::try_parse_from(["abstractor", "papers", "--out_dir", "elsewhere"]).unwrap();
        assert_eq!(cli.out_dir, Some(PathBuf::from("elsewhere")));
        let cli = Cli::try_parse_from(["abstractor", "papers", "--out-dir", "x", "--force-mock"])
            .unwrap();
        assert_eq!(cli.out_dir, Some(PathBuf::from("x")));
        assert!(cli.force_mock);
        assert!(!cli.dry_run);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["abstractor"]).is_err());
    }
}
