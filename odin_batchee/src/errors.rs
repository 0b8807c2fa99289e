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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinBatcheeError>;

#[derive(Error,Debug)]
pub enum OdinBatcheeError {

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),

    #[error("config parse error {0}")]
    ConfigParseError( #[from] ron::error::SpannedError),

    #[error("regex error {0}")]
    RegexError( #[from] regex::Error),

    #[error("STAC error {0}")]
    StacError( #[from] odin_stac::OdinStacError),

    #[error("granule {0} does not have a NetCDF-4 data asset")]
    MissingDataAssetError( String ),

    #[error("granule {0} does not have a temporal extent")]
    MissingTimeRangeError( String ),

    #[error("invalid acquisition time '{1}' in granule filename {0}")]
    InvalidAcquisitionTimeError( String, String ),

    #[error("got {n_indices} batch indices for {n_records} granule records")]
    IndexMismatchError { n_records: usize, n_indices: usize },

    #[error("operation failed {0}")]
    OpFailedError(String),
}

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        OdinBatcheeError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
