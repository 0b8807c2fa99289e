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

//! grouping of TEMPO granules into batches that can be concatenated downstream. Batches are determined
//! solely from granule filenames: all granules of the same scan on the same (US Central) calendar day
//! end up in the same batch, even if the scan crosses UTC midnight.

use std::{fs, path::Path};
use serde::{Serialize,Deserialize};
use chrono_tz::Tz;

pub mod errors;
pub use errors::{Result, OdinBatcheeError};

pub mod classifier;
pub use classifier::*;

pub mod assembler;
pub use assembler::*;

pub mod service;
pub use service::*;

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct BatcheeConfig {
    pub timezone: Tz, // civil timezone of the scan schedule, used to determine the day of a granule
    pub aggregation: AggregationPolicy,
    pub output_media_type: String, // for output data assets
}

impl Default for BatcheeConfig {
    fn default ()->Self {
        BatcheeConfig {
            timezone: DEFAULT_TIMEZONE,
            aggregation: AggregationPolicy::default(),
            output_media_type: NETCDF4_MEDIA_TYPE.to_string(),
        }
    }
}

/// load a RON config. Fields that are not specified are defaulted
pub fn load_config (path: impl AsRef<Path>)->Result<BatcheeConfig> {
    let data = fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( &data)? )
}
