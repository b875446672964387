//! File-based chain processing command.

use std::fs;
use std::path::PathBuf;

use cadena_chain::{ChainProcessor, MAX_CHANNELS};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::ChainArgs;
use crate::wav::{WavSpec, read_wav, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    chain: ChainArgs,

    /// Restore parameters and order from a saved state before processing
    #[arg(long)]
    state: Option<PathBuf>,

    /// Save parameters and order after processing
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Queue a random order every N blocks while processing
    #[arg(long)]
    reorder_every: Option<usize>,

    /// Seed for --reorder-every
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(args.bit_depth, 16 | 24 | 32),
        "unsupported bit depth {} (expected 16, 24 or 32)",
        args.bit_depth
    );
    anyhow::ensure!(args.block_size > 0, "block size must be at least 1");

    println!("Reading {}...", args.input.display());
    let (mut channels, spec) = read_wav(&args.input)?;
    let frames = channels.first().map_or(0, Vec::len);
    anyhow::ensure!(
        channels.len() <= MAX_CHANNELS,
        "{} channels, at most {} supported",
        channels.len(),
        MAX_CHANNELS
    );
    println!(
        "  {} frames x {} ch, {} Hz, {:.2}s",
        frames,
        channels.len(),
        spec.sample_rate,
        frames as f32 / spec.sample_rate as f32
    );

    let config = args
        .chain
        .to_config()?
        .with_sample_rate(spec.sample_rate as f32)
        .with_max_block_size(args.block_size)
        .with_channels(channels.len());
    let (mut processor, mut controller) = ChainProcessor::new(&config)?;

    if let Some(path) = &args.state {
        let report = controller.load_state(&fs::read(path)?)?;
        println!(
            "Restored {} parameter(s) from {}",
            report.params_restored,
            path.display()
        );
        for id in &report.params_ignored {
            println!("  ignored unknown parameter {id}");
        }
        if let Some(error) = &report.order_error {
            println!("  saved order ignored: {error}");
        }
    }

    println!("Order: {}", controller.current_order());
    let bypassed: Vec<String> = config.bypass.iter().map(ToString::to_string).collect();
    if !bypassed.is_empty() {
        println!("Bypassed: {}", bypassed.join(", "));
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let input_rms = rms(&channels);
    let input_peak = peak(&channels);

    for (index, start) in (0..frames).step_by(args.block_size).enumerate() {
        let end = (start + args.block_size).min(frames);

        if let Some(every) = args.reorder_every {
            if every > 0 && index > 0 && index % every == 0 {
                controller.randomize_order(&mut rng)?;
            }
        }

        let mut blocks: Vec<&mut [f32]> =
            channels.iter_mut().map(|c| &mut c[start..end]).collect();
        processor.process(&mut blocks);
        pb.set_position(end as u64);
    }
    pb.finish_with_message("done");

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(input_rms),
        linear_to_db(input_peak)
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&channels)),
        linear_to_db(peak(&channels))
    );
    println!("  Final order: {}", processor.working_order());
    println!("  {}", controller.diagnostics());
    controller.log_diagnostics();

    let out_spec = WavSpec {
        bits_per_sample: args.bit_depth,
        ..spec
    };
    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &channels, out_spec)?;

    if let Some(path) = &args.save_state {
        fs::write(path, controller.save_state()?)?;
        println!("Saved state to {}", path.display());
    }

    println!("Done!");
    Ok(())
}

fn rms(channels: &[Vec<f32>]) -> f32 {
    let count: usize = channels.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    let sum: f32 = channels.iter().flatten().map(|s| s * s).sum();
    (sum / count as f32).sqrt()
}

fn peak(channels: &[Vec<f32>]) -> f32 {
    channels.iter().flatten().map(|s| s.abs()).fold(0.0, f32::max)
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
