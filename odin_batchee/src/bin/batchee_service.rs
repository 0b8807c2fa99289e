/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_batchee::{AggregationPolicy, BatcheeConfig, BatcheeService, load_config};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "batch the TEMPO granules of a STAC catalog into per-scan catalogs")]
pub struct Args {
    /// root catalog of the granules to batch
    #[arg(long)]
    pub source: PathBuf,

    /// directory to write batch catalogs and items to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// RON config file (defaults are used if not set)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// overrides the aggregation policy of the config
    #[arg(long, value_enum)]
    pub policy: Option<AggregationPolicy>,

    /// enable debug output on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn main()->Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { EnvFilter::new("debug") } else { EnvFilter::from_default_env() };
    tracing_subscriber::fmt()
        .with_env_filter( filter)
        .with_writer( std::io::stderr)
        .init();

    let mut config: BatcheeConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => BatcheeConfig::default()
    };
    if let Some(policy) = args.policy {
        config.aggregation = policy;
    }

    let service = BatcheeService::from_config( &config)?;
    for path in service.run( &args.source, &args.output_dir)? {
        println!("{}", path.display());
    }

    Ok(())
}
