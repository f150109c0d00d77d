use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wavhuff::{
    CompressionReport, DefaultPipeline, FfmpegEncoder, Quality, Settings, Stage, WavInfo,
};

#[derive(Parser)]
#[command(name = "wavhuff")]
#[command(version)]
#[command(about = "WAV to MP3 compressor with prefix-code guided pre-processing", long_about = None)]
struct Cli {
    /// Settings file (TOML); defaults to ./wavhuff.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a WAV file to MP3
    Compress {
        /// Input WAV file
        input: PathBuf,
        /// Output MP3 file (default: <input>_huffman.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        encode: EncodeArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert an MP3 file back to WAV
    Decompress {
        /// Input MP3 file
        input: PathBuf,
        /// Output WAV file (default: <input>_from_mp3.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compress every WAV file in a folder into <folder>/compressed
    Batch {
        /// Folder containing WAV files
        folder: PathBuf,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Show information about a WAV file
    Info {
        /// Input WAV file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct EncodeArgs {
    /// MP3 bitrate (e.g. 64k, 128k, 192k, 320k)
    #[arg(short, long)]
    bitrate: Option<String>,
    /// MP3 quality (low, medium, high)
    #[arg(short, long)]
    quality: Option<String>,
    /// Quantization depth in bits (1-16)
    #[arg(long)]
    bits: Option<u8>,
    /// Reducer window size
    #[arg(long)]
    factor: Option<usize>,
}

impl EncodeArgs {
    /// Command line flags win over file and environment settings
    fn apply(self, settings: &mut Settings) -> Result<()> {
        if let Some(bitrate) = self.bitrate {
            settings.bitrate = bitrate;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality.parse::<Quality>()?;
        }
        if let Some(bits) = self.bits {
            settings.quantization_bits = bits;
        }
        if let Some(factor) = self.factor {
            settings.compression_factor = factor;
        }
        settings.validate()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Compress {
            input,
            output,
            encode,
            json,
        } => {
            encode.apply(&mut settings)?;
            compress(&settings, &input, output.as_deref(), json)?;
        }
        Commands::Decompress { input, output } => {
            decompress(&settings, &input, output.as_deref())?;
        }
        Commands::Batch { folder, encode } => {
            encode.apply(&mut settings)?;
            batch(&settings, &folder)?;
        }
        Commands::Info { input, json } => {
            info(&input, json)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn check_encoder(settings: &Settings) {
    let encoder = FfmpegEncoder::new(&settings.encoder.program, settings.encoder_timeout());
    if !encoder.is_available() {
        eprintln!(
            "warning: '{}' was not found or failed to run; install FFmpeg (https://ffmpeg.org/download.html)",
            encoder.program().display()
        );
    }
}

fn compress(settings: &Settings, input: &Path, output: Option<&Path>, json: bool) -> Result<()> {
    check_encoder(settings);
    let pipeline = DefaultPipeline::from_settings(settings)?;

    if !json {
        println!("Compressing {}...", input.display());
    }

    let total = Stage::SEQUENCE.len();
    let report = pipeline
        .compress_with_progress(input, output, |stage| {
            if json {
                return;
            }
            match Stage::SEQUENCE.iter().position(|s| *s == stage) {
                Some(i) if stage != Stage::Done => println!("  [{}/{}] {}...", i + 1, total - 1, stage),
                _ => {}
            }
        })
        .context("Compression failed")?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json_str);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &CompressionReport) {
    const MB: f64 = 1024.0 * 1024.0;

    println!("Done!");
    println!("───────────────────────────────");
    println!("  Input:        {}", report.input.display());
    println!("  Channels:     {}", report.params.channels);
    println!("  Sample rate:  {} Hz", report.params.sample_rate);
    println!("  Bit depth:    {}", report.params.bit_depth());
    println!("  Duration:     {:.2}s", report.params.duration_secs());
    println!("  Samples:      {}", report.original_samples);
    println!(
        "  Quantized:    {} bits, {} unique symbols",
        report.quantization_bits, report.unique_symbols
    );
    if let Some((min, max)) = report.value_range {
        println!("  Value range:  {} to {}", min, max);
    }
    println!(
        "  Prefix codes: {:.2} bits/symbol avg, {} max",
        report.average_code_length, report.max_code_length
    );
    println!(
        "  Reduced:      {} -> {} samples ({:.1}% fewer, factor {})",
        report.original_samples,
        report.reduced_samples,
        report.window_reduction_percent,
        report.compression_factor
    );
    println!(
        "  Intermediate: {:.2} MB ({:.1}% reduction)",
        report.intermediate_size as f64 / MB,
        report.intermediate_reduction_percent
    );
    println!("  Output:       {}", report.output.display());
    println!(
        "  MP3:          {} ({} quality)",
        report.bitrate, report.quality
    );
    println!("  Original:     {:.2} MB", report.original_data_size as f64 / MB);
    println!("  Final:        {:.2} MB", report.final_size as f64 / MB);
    println!("  Reduction:    {:.1}%", report.total_reduction_percent);

    match (&report.validated_duration_secs, &report.warning) {
        (Some(secs), _) => println!("  Valid MP3:    {:.2}s", secs),
        (None, Some(warning)) => println!("  Warning:      {}", warning),
        (None, None) => {}
    }
}

fn decompress(settings: &Settings, input: &Path, output: Option<&Path>) -> Result<()> {
    let pipeline = DefaultPipeline::from_settings(settings)?;

    println!("Converting {} to WAV...", input.display());
    match pipeline.convert_back(input, output) {
        Ok(report) => {
            println!("✓ Conversion complete");
            println!("  Output: {}", report.output.display());
            Ok(())
        }
        Err(e) => bail!("✗ Conversion failed: {}", e),
    }
}

fn batch(settings: &Settings, folder: &Path) -> Result<()> {
    check_encoder(settings);
    let pipeline = DefaultPipeline::from_settings(settings)?;

    let report = pipeline
        .compress_folder(folder, |i, n, path| {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            println!("[{}/{}] {}", i, n, name);
        })
        .context("Batch compression failed")?;

    if report.total == 0 {
        bail!("No WAV files found in {}", folder.display());
    }

    for failure in &report.failures {
        println!("  ✗ {}: {}", failure.input.display(), failure.error);
    }
    println!(
        "Done: {}/{} files converted into {}",
        report.successful(),
        report.total,
        report.output_dir.display()
    );

    Ok(())
}

fn info(input: &Path, json: bool) -> Result<()> {
    let info: WavInfo = wavhuff::wav_info(input).context("Failed to read WAV file")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("WAV Audio File");
    println!("───────────────────────────────");
    println!("  Channels:    {}", info.channels);
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Bit depth:   {}", info.bit_depth);
    println!("  Duration:    {:.2}s", info.duration_secs);
    println!("  Frames:      {}", info.frame_count);
    println!("  Data size:   {} bytes", info.data_size);
    println!("  File size:   {} bytes", info.file_size);

    Ok(())
}
