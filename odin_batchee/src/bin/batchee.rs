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

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_batchee::{BatchClassifier, DEFAULT_TIMEZONE};

/// debugging aid: print the batches of the given TEMPO granule filenames as JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = "simple CLI wrapper around the TEMPO granule batcher")]
pub struct Args {
    /// enable debug output on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// the filenames for which batches will be determined
    #[arg(num_args=1.., required=true)]
    pub file_names: Vec<String>,
}

fn main()->Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { EnvFilter::new("debug") } else { EnvFilter::from_default_env() };
    tracing_subscriber::fmt()
        .with_env_filter( filter)
        .with_writer( std::io::stderr)
        .init();

    let classifier = BatchClassifier::with_timezone( DEFAULT_TIMEZONE)?;
    let groups = classifier.group_filenames( &args.file_names)?;

    println!("{}", serde_json::to_string_pretty( &groups)?);
    Ok(())
}
