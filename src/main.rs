use std::path::PathBuf;
use std::process;

use clap::Parser;

use treefit::{run, Config};

#[derive(Parser)]
#[clap(version, about = "Train a decision-tree classifier from a labeled CSV dataset")]
struct Args {
    /// Path to the training data CSV file
    #[clap(long)]
    data: PathBuf,
    /// Path to save the trained model
    #[clap(long)]
    model: PathBuf,
    /// Max depth for the decision tree
    #[clap(long, default_value_t = 3)]
    depth: usize,
}

fn main() {
    let args = Args::parse();

    let config = Config {
        data: args.data,
        model: args.model,
        depth: args.depth,
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
