use clap::Parser;
use glbscope::reader::{extract_metadata_with, scan_chunks, ExtractOptions, Extraction};
use glbscope::render_pretty;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status for "valid input, nothing to show".
const EXIT_NOTHING: u8 = 2;

#[derive(Parser)]
#[command(name = "glbscope", about = "Print the camera, node, scene and asset descriptors of a .glb file")]
struct Cli {
    /// Path to the .glb file
    input: PathBuf,
    /// Top-level JSON key to keep (repeatable); defaults to asset, scenes, nodes, cameras
    #[arg(short, long = "key", value_name = "NAME")]
    keys: Vec<String>,
    /// List the container's chunks instead of printing metadata
    #[arg(long)]
    chunks: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = if cli.chunks {
        list_chunks(&cli)
    } else {
        print_metadata(&cli)
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("glbscope: {}: {}", cli.input.display(), e);
            ExitCode::FAILURE
        }
    }
}

// ── commands ─────────────────────────────────────────────────────────────────

fn print_metadata(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::default();
    if !cli.keys.is_empty() {
        options.keys = cli.keys.clone();
    }

    match extract_metadata_with(&cli.input, &options)? {
        Extraction::Metadata(map) => {
            println!("{}", render_pretty(&map)?);
            Ok(ExitCode::SUCCESS)
        }
        Extraction::NotThisFormat { .. } => {
            println!("Not a valid GLB file");
            Ok(ExitCode::from(EXIT_NOTHING))
        }
        Extraction::NoJsonChunk => {
            eprintln!("glbscope: {}: no JSON chunk found", cli.input.display());
            Ok(ExitCode::from(EXIT_NOTHING))
        }
    }
}

fn list_chunks(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (header, chunks) = scan_chunks(&cli.input)?;
    if !header.has_glb_magic() {
        println!("Not a valid GLB file");
        return Ok(ExitCode::from(EXIT_NOTHING));
    }

    println!("── GLB ──────────────────────────────────────────────────");
    println!("  Path           {}", cli.input.display());
    println!("  Version        {}", header.version);
    println!("  Declared size  {} B", header.total_length);
    println!("  Chunks         {}", chunks.len());
    println!("  {:>10}  {:<6} {:>12}", "Offset", "Type", "Length");
    for c in &chunks {
        println!("  {:>10}  {:<6} {:>12}", c.offset, c.kind.to_string(), c.length);
    }
    Ok(ExitCode::SUCCESS)
}
