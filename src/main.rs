use std::path::PathBuf;
use std::process;

use clap::Parser;

use notulen_pdf::{JsonDirSource, MeetingRecord, RenderOptions, Template, render_from_source};

#[derive(Parser)]
#[command(name = "notulen-pdf", version, about = "Render meeting minutes and attendance roster to PDF")]
struct Cli {
    /// Meeting record as JSON
    input: PathBuf,

    /// Directory with users.json, units.json and optionally settings.json
    #[arg(long)]
    refs: PathBuf,

    /// Output PDF path (defaults to the suggested file name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Template configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run(cli: Cli) -> notulen_pdf::Result<PathBuf> {
    let template = Template::load(cli.config.as_deref())?;
    let options = RenderOptions::new(template)?;

    let meeting: MeetingRecord = serde_json::from_slice(&std::fs::read(&cli.input)?)?;
    let source = JsonDirSource::new(cli.refs);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let rendered = runtime.block_on(render_from_source(&meeting, &source, &options))?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&rendered.file_name));
    std::fs::write(&output, &rendered.bytes)?;
    log::info!(
        "Wrote {} ({} pages, {} bytes)",
        output.display(),
        rendered.page_count,
        rendered.bytes.len()
    );
    Ok(output)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => println!("{}", output.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
