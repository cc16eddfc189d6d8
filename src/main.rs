use clap::{Parser, Subcommand};
use rethumb::imaging::{Quality, Sharpening, decode};
use rethumb::output::{self, FileReport, ThumbnailInfo};
use rethumb::{RebuildOptions, extract_thumbnail, rebuild_thumbnail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "rethumb")]
#[command(about = "Rebuild embedded Exif thumbnails in JPEG files")]
#[command(long_about = "\
Rebuild embedded Exif thumbnails in JPEG files

Cameras embed a small preview JPEG inside each file's Exif data; file
managers and photo tools show it instead of decoding the full image. After
editing, the stored preview goes stale, or was tiny and blocky to begin
with. rethumb re-renders it from the full-resolution pixels and splices it
back in. Nothing else in the file changes: pixel data, orientation tag and
all other metadata fields are carried through byte for byte.

The new thumbnail is rendered in as-stored pixel orientation (viewers apply
the file's orientation tag to the preview too), scaled to the requested
long edge, and encoded at the requested quality, falling back to 80% and
then 75% if the result would not fit the ~50 KiB Exif budget.

Each output file is verified by re-extracting and decoding its new
thumbnail. Files that cannot be processed are reported individually; the
rest of the batch continues.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild embedded thumbnails, writing updated copies
    Rebuild(RebuildArgs),
    /// Extract the embedded thumbnail from a JPEG file
    Extract(ExtractArgs),
}

#[derive(clap::Args, Clone)]
struct RebuildArgs {
    /// JPEG files or directories (directories are walked recursively)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Thumbnail size on the longer edge, in pixels
    #[arg(long, default_value_t = rethumb::DEFAULT_SIZE)]
    size: u32,

    /// JPEG quality for the first encoding attempt (1-100)
    #[arg(long, default_value_t = 80)]
    quality: u8,

    /// Directory for updated files (defaults to writing alongside the source)
    #[arg(long, conflicts_with = "in_place")]
    out_dir: Option<PathBuf>,

    /// Overwrite source files instead of writing copies
    #[arg(long)]
    in_place: bool,

    /// Disable the post-resize sharpening pass
    #[arg(long)]
    no_sharpen: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Source JPEG file
    path: PathBuf,

    /// Output path (defaults to <stem>-thumb.jpg next to the source)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Rebuild(args) => run_rebuild(&args),
        Command::Extract(args) => run_extract(&args),
    }
}

fn run_rebuild(args: &RebuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let files = collect_inputs(&args.paths)?;
    if files.is_empty() {
        return Err("no JPEG files found in the given paths".into());
    }
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let options = RebuildOptions {
        size: args.size,
        quality: Quality::new(args.quality),
        sharpening: if args.no_sharpen {
            None
        } else {
            Some(Sharpening::light())
        },
    };

    // One file at a time; a failure is recorded and the batch moves on.
    let reports: Vec<FileReport> = files
        .iter()
        .map(|file| match process_file(file, args, &options) {
            Ok((output_path, info)) => FileReport::success(file.clone(), output_path, info),
            Err(error) => FileReport::failure(file.clone(), error),
        })
        .collect();

    if args.json {
        println!("{}", output::reports_to_json(&reports)?);
    } else {
        output::print_reports(&reports);
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        return Err(format!("{failed} of {} file(s) failed", reports.len()).into());
    }
    Ok(())
}

/// Rebuild one file and verify the result by re-extracting and decoding the
/// thumbnail that was just embedded.
fn process_file(
    path: &Path,
    args: &RebuildArgs,
    options: &RebuildOptions,
) -> Result<(PathBuf, ThumbnailInfo), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("read failed: {e}"))?;

    let rebuilt = rebuild_thumbnail(&bytes, options).map_err(|e| e.to_string())?;

    let thumbnail = extract_thumbnail(&rebuilt)
        .map_err(|e| format!("verification failed: {e}"))?;
    let decoded = decode(&thumbnail)
        .map_err(|e| format!("verification failed: embedded thumbnail does not decode: {e}"))?;

    let output_path = output_path(path, args);
    std::fs::write(&output_path, &rebuilt).map_err(|e| format!("write failed: {e}"))?;

    Ok((
        output_path,
        ThumbnailInfo {
            width: decoded.width(),
            height: decoded.height(),
            bytes: thumbnail.len(),
        },
    ))
}

fn run_extract(args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&args.path)?;
    let thumbnail = extract_thumbnail(&bytes)?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| sibling_with_suffix(&args.path, "-thumb"));
    std::fs::write(&out, &thumbnail)?;

    println!("{} ({} bytes) -> {}", args.path.display(), thumbnail.len(), out.display());
    Ok(())
}

/// Expand the given paths into a flat list of JPEG files.
fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_jpeg_path(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            // Explicitly named files are taken as-is, whatever the extension.
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// Where the updated copy of `source` goes.
fn output_path(source: &Path, args: &RebuildArgs) -> PathBuf {
    if args.in_place {
        return source.to_path_buf();
    }
    if let Some(dir) = &args.out_dir {
        return dir.join(source.file_name().unwrap_or_default());
    }
    sibling_with_suffix(source, "-rethumb")
}

/// `photos/IMG_1.jpg` + `-rethumb` → `photos/IMG_1-rethumb.jpg`
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("jpg");
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}
