//! Stage listing and parameter information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use cadena_chain::{ChainOrder, ChainParams, StageKind};
use clap::Args;

#[derive(Args)]
pub struct StagesArgs {
    /// Show parameters for a single stage
    #[arg(value_name = "STAGE")]
    stage: Option<StageKind>,
}

pub fn run(args: StagesArgs) -> anyhow::Result<()> {
    let params = ChainParams::new();

    match args.stage {
        Some(kind) => print_stage(&params, kind),
        None => {
            println!("Stages (default order: {})", ChainOrder::STANDARD);
            println!();
            println!("  {:3}  {:18}  {:18}  {}", "#", "Id", "Name", "Parameters");
            println!("  {:3}  {:18}  {:18}  {}", "-", "--", "----", "----------");
            for kind in StageKind::ALL {
                println!(
                    "  {:3}  {:18}  {:18}  {}",
                    kind.ordinal(),
                    kind.id(),
                    kind.name(),
                    params.stage_params(kind).len()
                );
            }
            println!();
            println!("Use 'cadena stages <STAGE>' for parameter details.");
        }
    }
    Ok(())
}

fn print_stage(params: &ChainParams, kind: StageKind) {
    println!("{}", kind.name());
    println!("{}", "=".repeat(kind.name().len()));
    println!();
    println!("  {:26}  {:12}  {:10}  {}", "Id", "Default", "Min", "Max");
    println!("  {:26}  {:12}  {:10}  {}", "--", "-------", "---", "---");

    for param in params.stage_params(kind) {
        let desc = param.descriptor();
        println!(
            "  {:26}  {:12}  {:10}  {}",
            desc.id,
            param.display_value(),
            desc.min,
            desc.max
        );
    }
    println!();
    println!("Example usage:");
    println!();
    if let Some(first) = params.stage_params(kind).first() {
        println!(
            "  cadena process input.wav output.wav --param {}={}",
            first.id(),
            first.descriptor().default
        );
    }
    println!("  cadena process input.wav output.wav --bypass {}", kind.id());
}
