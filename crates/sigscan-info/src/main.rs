mod args;
mod config;
mod logging;
mod paths;

use std::time::Instant;

use clap::Parser;
use eyre::{bail, Result, WrapErr};
use owo_colors::OwoColorize;
use sigscan::{system, Alignment, Backends, ScanContext, ScanMode, ScanOptions, Signature};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use args::Args;
use config::Config;
use logging::setup_logging;
use paths::get_config_filepath;

/// `lea rax, [rip + rel32]` followed by a call, short enough for single vector verification
const SHORT: &str = "48 8D 05 ?? ?? ?? ?? E8";

/// Size of the buffer the self check scans
const CHECK_SIZE: usize = 1 << 20;

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_filepath("sigscan-info.toml")?,
    };

    let config = Config::load(&config_path)
        .wrap_err_with(|| format!("failed to load config {}", config_path.display()))?;

    setup_logging(&config)?;
    debug!(path = %config.path().display(), "loaded config");

    print_system();
    print_backends(&config.scan);

    for signature in [Signature::parse(SHORT)?, long_signature()?] {
        for alignment in [Alignment::X1, Alignment::X16] {
            let options = ScanOptions {
                alignment,
                ..config.scan.clone()
            };

            print_context(&signature, &options)?;
        }
    }

    if args.no_check {
        return Ok(());
    }

    self_check(&config.scan)
}

fn print_system() {
    println!("{}", "[System]".bold().bright_green());

    for line in system().to_string().lines() {
        println!("  {line}");
    }

    println!();
}

fn print_backends(options: &ScanOptions) {
    println!("{}", "[Backends]".bold().bright_green());

    for mode in ScanMode::iter() {
        let supported = mode.is_supported(system());
        let allowed = options.backends.allows(mode);

        let state = match (supported, allowed) {
            (true, true) => "available".green().to_string(),
            (true, false) => "disabled".yellow().to_string(),
            (false, _) => "unsupported".red().to_string(),
        };

        println!("  {:<8} {:>3} bytes  {state}", mode.to_string(), mode.vector_size());
    }

    println!();
}

fn print_context(signature: &Signature, options: &ScanOptions) -> Result<()> {
    let context = ScanContext::with_options(signature, options)
        .wrap_err_with(|| format!("failed to build a context for {signature}"))?;

    info!(
        len = signature.len(),
        alignment = %context.alignment(),
        hint = %options.hint,
        mode = %context.mode(),
        anchor = context.anchor(),
        pair = context.has_pair(),
        "resolved"
    );

    Ok(())
}

/// 100 elements, longer than any vector
fn long_signature() -> Result<Signature> {
    let elements = (0..100u8).map(|i| (i % 3 != 1).then(|| i.wrapping_mul(37) ^ 0x5A));
    Ok(Signature::new(elements)?)
}

/// Scan a buffer with a planted match using every available backend
fn self_check(options: &ScanOptions) -> Result<()> {
    println!();
    println!("{}", "[Self check]".bold().bright_green());

    let signature = Signature::parse(SHORT)?;
    let planted = [0x48, 0x8D, 0x05, 0x10, 0x20, 0x30, 0x40, 0xE8];

    let mut data = vec![0xCC; CHECK_SIZE];
    let at = CHECK_SIZE - 4099;
    data[at..at + planted.len()].copy_from_slice(&planted);

    for mode in ScanMode::iter().filter(|&mode| mode.is_supported(system())) {
        let options = ScanOptions {
            alignment: Alignment::X1,
            backends: Backends::only(mode),
            ..options.clone()
        };

        let context = ScanContext::with_options(&signature, &options)?;

        let start = Instant::now();
        let found = context.find(&data);
        let elapsed = start.elapsed();

        if found != Some(at) {
            bail!("{mode} found {found:?}, expected {at}");
        }

        println!(
            "  {:<8} {} in {elapsed:?}",
            mode.to_string(),
            "ok".green()
        );
    }

    Ok(())
}
