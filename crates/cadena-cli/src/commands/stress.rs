//! Reorder stress command.
//!
//! Runs the processor on the calling thread and a controller on a second
//! thread that queues random orders as fast as asked, then reports what the
//! audio side adopted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use cadena_chain::{ChainError, ChainProcessor};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::ChainArgs;

#[derive(Args)]
pub struct StressArgs {
    #[command(flatten)]
    chain: ChainArgs,

    /// Blocks to render
    #[arg(long, default_value = "10000")]
    blocks: usize,

    /// Orders queued by the control thread per rendered block
    #[arg(long, default_value = "4")]
    reorders_per_block: usize,

    /// Block size in samples
    #[arg(long, default_value = "128")]
    block_size: usize,

    /// RNG seed for the control thread
    #[arg(long, default_value = "0")]
    seed: u64,
}

pub fn run(args: StressArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.block_size > 0, "block size must be at least 1");

    let config = args
        .chain
        .to_config()?
        .with_max_block_size(args.block_size);
    let (mut processor, mut controller) = ChainProcessor::new(&config)?;
    let channels = config.channels;

    println!(
        "Stress: {} blocks x {} samples x {} ch, {} reorder(s) per block",
        args.blocks, args.block_size, channels, args.reorders_per_block
    );

    let rendered = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));

    let control = {
        let rendered = Arc::clone(&rendered);
        let done = Arc::clone(&done);
        let per_block = args.reorders_per_block;
        let mut rng = StdRng::seed_from_u64(args.seed);
        thread::spawn(move || {
            let mut queued = 0usize;
            let mut dropped = 0usize;
            let mut seen = 0;
            while !done.load(Ordering::Acquire) {
                let now = rendered.load(Ordering::Acquire);
                if now == seen {
                    thread::yield_now();
                    continue;
                }
                seen = now;
                for _ in 0..per_block {
                    match controller.randomize_order(&mut rng) {
                        Ok(_) => queued += 1,
                        Err(ChainError::QueueFull) => dropped += 1,
                        Err(e) => tracing::error!(error = %e, "reorder failed"),
                    }
                }
            }
            (controller, queued, dropped)
        })
    };

    let pb = ProgressBar::new(args.blocks as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut buffers = vec![vec![0.0_f32; args.block_size]; channels];
    let mut non_finite = 0usize;
    let start = Instant::now();
    for block in 0..args.blocks {
        for (ch, buffer) in buffers.iter_mut().enumerate() {
            for (i, sample) in buffer.iter_mut().enumerate() {
                let n = (block * args.block_size + i) as f32;
                *sample = 0.5 * (n * 0.01 + ch as f32).sin();
            }
        }
        let mut slices: Vec<&mut [f32]> = buffers.iter_mut().map(Vec::as_mut_slice).collect();
        processor.process(&mut slices);
        non_finite += buffers.iter().flatten().filter(|s| !s.is_finite()).count();

        rendered.store(block + 1, Ordering::Release);
        if block % 256 == 0 {
            pb.set_position(block as u64);
        }
    }
    let elapsed = start.elapsed();
    pb.finish_with_message("done");

    done.store(true, Ordering::Release);
    let (controller, queued, dropped) = control
        .join()
        .map_err(|_| anyhow::anyhow!("control thread panicked"))?;

    // One more block adopts whatever the control thread queued last
    let mut slices: Vec<&mut [f32]> = buffers.iter_mut().map(Vec::as_mut_slice).collect();
    processor.process(&mut slices);

    let audio_secs = (args.blocks * args.block_size) as f64 / f64::from(config.sample_rate);
    println!("\nResults:");
    println!("  Queued:        {queued}");
    println!("  Dropped:       {dropped}");
    println!("  {}", controller.diagnostics());
    println!("  Final order:   {}", processor.working_order());
    println!(
        "  Realtime:      {:.1}x ({:.3}s for {:.3}s of audio)",
        audio_secs / elapsed.as_secs_f64().max(f64::EPSILON),
        elapsed.as_secs_f64(),
        audio_secs
    );
    controller.log_diagnostics();

    anyhow::ensure!(non_finite == 0, "{non_finite} non-finite output samples");
    anyhow::ensure!(
        processor.working_order() == controller.current_order(),
        "final order was not adopted"
    );
    println!("OK");
    Ok(())
}
