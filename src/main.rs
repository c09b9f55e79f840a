use anyhow::{Result, anyhow, bail};
use log::{LevelFilter, info};
use shift_vision::core_modules::pixel_buffer::PixelBuffer;
use shift_vision::emitter::{self, EmitOptions, GeometryFormat};
use shift_vision::overlay;
use shift_vision::pipeline::{DiffConfig, DiffPipeline};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "\
shift_vision [options...] old-image new-image
  -v, --verbose              Increase trace verbosity (repeatable)
  --range=N                  Chebyshev search radius in cells (default 2)
  --min-size=N               Minimum chunk side length in pixels (default 10)
  --threshold=F[%]           Color tolerance in the 0-255 channel scale
  --same                     Only print regions that matched in place
  --no-join                  Skip joining adjacent matches
  --dump-images              Write an annotated overlay to /tmp/shift_vision-dump.png
  --imagemagick              Print rects as WxH+X+Y instead of X,Y+WxH
  -h, --help                 This help";

struct CliOptions {
    config: DiffConfig,
    emit: EmitOptions,
    dump_images: bool,
    verbose: u32,
    old_path: PathBuf,
    new_path: PathBuf,
}

enum Command {
    Help,
    Run(CliOptions),
}

fn parse_positive(value: &str, flag: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| anyhow!("Invalid {flag} ({value}), must be a positive integer value"))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut config = DiffConfig::default();
    let mut emit = EmitOptions::default();
    let mut dump_images = false;
    let mut verbose = 0u32;
    let mut positionals: Vec<PathBuf> = Vec::new();

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Ok(Command::Help);
        } else if arg == "-v" || arg == "--verbose" {
            verbose += 1;
        } else if arg == "--imagemagick" {
            emit.format = GeometryFormat::ImageMagick;
        } else if arg == "--dump-images" {
            dump_images = true;
        } else if arg == "--no-join" {
            config.join = false;
        } else if arg == "--same" {
            emit.same_only = true;
        } else if let Some(value) = arg.strip_prefix("--threshold=") {
            let (number, percent) = match value.strip_suffix('%') {
                Some(stripped) => (stripped, true),
                None => (value, false),
            };
            let parsed = number
                .parse::<f32>()
                .ok()
                .filter(|t| *t >= 0.0)
                .ok_or_else(|| {
                    anyhow!("Invalid threshold ({value}), must be a non-negative value")
                })?;
            config.threshold = if percent {
                parsed / 100.0 * 256.0
            } else {
                parsed
            };
        } else if let Some(value) = arg.strip_prefix("--min-size=") {
            config.min_size = parse_positive(value, "--min-size")?;
        } else if let Some(value) = arg.strip_prefix("--range=") {
            config.range = parse_positive(value, "--range")?;
        } else if arg.starts_with('-') {
            eprintln!("{USAGE}");
            bail!("Unknown option {arg}");
        } else {
            positionals.push(PathBuf::from(arg));
        }
    }

    if positionals.len() > 2 {
        eprintln!("{USAGE}");
        bail!("Too many args");
    }
    let Some(new_path) = positionals.pop() else {
        eprintln!("{USAGE}");
        bail!("Not enough args");
    };
    let Some(old_path) = positionals.pop() else {
        eprintln!("{USAGE}");
        bail!("Not enough args");
    };

    Ok(Command::Run(CliOptions {
        config,
        emit,
        dump_images,
        verbose,
        old_path,
        new_path,
    }))
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args)? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Run(options) => options,
    };

    let level = match options.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
    info!(
        "range: {} min-size: {} threshold: {}",
        options.config.range, options.config.min_size, options.config.threshold
    );

    let old = Arc::new(PixelBuffer::load(&options.old_path)?);
    let new = Arc::new(PixelBuffer::load(&options.new_path)?);

    let pipeline = DiffPipeline::new(old.clone(), new.clone(), options.config.clone())?;
    let report = pipeline.run();

    for (index, pair) in report.matches.iter().enumerate() {
        let marker = if pair.new_chunk.all_transparent() {
            " transparent"
        } else {
            ""
        };
        if pair.in_place() {
            info!(
                "Match {index} {}{marker} SAME",
                emitter::format_rect(&pair.new_chunk.rect(), options.emit.format)
            );
        } else {
            info!(
                "Match {index} {}{marker} FOUND AT {}",
                emitter::format_rect(&pair.new_chunk.rect(), options.emit.format),
                emitter::format_rect(&pair.old_chunk.rect(), options.emit.format)
            );
        }
    }

    if options.dump_images {
        overlay::dump(&old, &new, &report, Path::new(overlay::DUMP_PATH))?;
    }

    for line in emitter::emit_report(&report, options.emit) {
        println!("{line}");
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
