// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use clap::Parser;
use tokio::io::stdout;

use shop_impact::{run_with_args, Args};

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();
    run_with_args(args, stdout()).await.unwrap();
}
