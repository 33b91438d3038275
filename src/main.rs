use clap::{Parser, Subcommand};
use pixel2svg::config::{self, Config};
use pixel2svg::convert::{self, ConvertRequest};
use pixel2svg::imaging::{ResizeRequest, RustBackend};
use pixel2svg::output::{self, ConsoleReporter};
use pixel2svg::types::Transparency;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

fn version_string() -> &'static str {
    let on_tag = env!("PIXEL2SVG_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("PIXEL2SVG_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pixel2svg")]
#[command(about = "Lossless raster to SVG conversion for pixel art")]
#[command(long_about = "\
Lossless raster to SVG conversion for pixel art

Every pixel of the input is painted by exactly one <rect>. Neighbouring
pixels of identical colour are merged into larger rectangles, scanning
row by row and growing each rectangle right, then down.

Supported inputs: jpg, jpeg, png, gif, bmp, tif, tiff, webp.

Fully transparent pixels are left unpainted unless --transparency preserve
is given. Colours are written as the shortest hex form (#123 or #112234),
with fill-opacity for partially transparent pixels.

Settings are read from ./pixel2svg.toml or --config FILE.
Run 'pixel2svg gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./pixel2svg.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print only a one-line summary
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone, Copy)]
struct ResizeArgs {
    /// Resize to this width before converting (keeps aspect ratio if alone)
    #[arg(long)]
    width: Option<u32>,

    /// Resize to this height before converting (keeps aspect ratio if alone)
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an image to SVG
    Convert {
        /// Input image
        input: PathBuf,

        /// Output file (default: input with .svg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        resize: ResizeArgs,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,

        /// How to handle fully transparent pixels (overrides config)
        #[arg(long, value_enum)]
        transparency: Option<Transparency>,

        /// Print the conversion report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate an input and show what would be converted
    Check {
        /// Input image
        input: PathBuf,

        #[command(flatten)]
        resize: ResizeArgs,
    },
    /// Print a stock pixel2svg.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Convert {
            input,
            output,
            resize,
            force,
            transparency,
            json,
        } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            if let Some(t) = transparency {
                config.output.transparency = t;
            }
            let request = ConvertRequest {
                input,
                output,
                width: resize.width,
                height: resize.height,
                overwrite: force,
            };
            // JSON goes to stdout alone, so status lines are silenced too.
            let quiet = cli.quiet || json;
            let mut reporter = ConsoleReporter::new(quiet, config.progress.interval());
            let report = convert::convert(&request, &config, &mut reporter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if cli.quiet {
                output::print_quiet_summary(&report);
            } else {
                output::print_summary(&report);
            }
        }
        Command::Check { input, resize } => {
            let config: Config = config::load_config(cli.config.as_deref())?;
            let request = ResizeRequest {
                width: resize.width,
                height: resize.height,
            };
            let info = convert::inspect(&RustBackend::new(), &input, request, &config)?;
            if !cli.quiet {
                output::print_check_output(&info);
            }
            println!("==> {} is valid", input.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
