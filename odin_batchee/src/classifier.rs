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

use std::fmt;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::errors::{OdinBatcheeError, Result};

/// position of a batch in first-seen order of its key
pub type BatchIndex = usize;

/// the timezone of the ground system clock that schedules TEMPO scans
pub const DEFAULT_TIMEZONE: Tz = Tz::America__Chicago;

/* #region TEMPO filename grammar ***************************************************************************/

// file name convention (anchored at the start, everything up to TEMPO_ is ignored):
//
//    TEMPO_«product»«-PROXY»*_«level»_«NRT_»?«version»_«yyyymmdd»T«hhmmss»Z_S«nnn»G«nn»«trailer».nc
//
//    product: one or more of [1-9A-Z], e.g. NO2, HCHO, O3TOT
//    level: L + one digit
//    version: V + digits
//    yyyymmdd, hhmmss: UTC start of granule
//    Snnn: daily scan id (unique per local calendar day)
//    Gnn: granule id (unique within scan)
//
// e.g. TEMPO_NO2_L2_V03_20240731T235252Z_S016G04.nc
pub const TEMPO_FILENAME_PATTERN: &str = concat!(
    r"^.*TEMPO_",
    r"(?P<product_type>[1-9A-Z]+)",
    r"(?P<proxy>(?:-PROXY)*)_",
    r"(?P<processing_level>L[0-9])_",
    r"(?P<nrt>NRT_)?",
    r"(?P<version_id>V[0-9]+)_",
    r"(?P<day>[0-9]{8})T",
    r"(?P<time>[0-9]{6})Z_",
    r"(?P<scan_id>S[0-9]{3})",
    r"(?P<granule_id>G[0-9]{2}).*\.nc",
);

/// the compiled TEMPO filename grammar. Create once and share by reference
#[derive(Debug,Clone)]
pub struct TempoGrammar {
    re: Regex
}

impl TempoGrammar {
    pub fn new ()->Result<Self> {
        Ok( TempoGrammar { re: Regex::new( TEMPO_FILENAME_PATTERN)? } )
    }

    /// parse the fields encoded in `filename`, which can be a plain name, a path or a URL
    pub fn parse (&self, filename: &str)->Option<TempoFileInfo> {
        let name = base_name( filename);
        self.re.captures( name).map(|cap| TempoFileInfo::from_captures( &cap))
    }

    pub fn is_match (&self, filename: &str)->bool {
        self.re.is_match( base_name( filename))
    }
}

/// the last path element of a path or URL
fn base_name (s: &str)->&str {
    s.rsplit('/').next().unwrap_or(s)
}

/// the fields of a TEMPO granule filename. Day and time are kept as the (UTC) digit strings of the name
#[derive(Debug,Clone,PartialEq)]
pub struct TempoFileInfo {
    pub product_type: String, // e.g. "NO2"
    pub is_proxy: bool,
    pub processing_level: String, // e.g. "L2"
    pub is_nrt: bool,
    pub version_id: String, // e.g. "V03"
    pub day: String, // yyyymmdd
    pub time: String, // hhmmss
    pub scan_id: String, // e.g. "S016"
    pub granule_id: String, // e.g. "G04"
}

impl TempoFileInfo {
    fn from_captures (cap: &Captures)->Self {
        TempoFileInfo {
            product_type: cap["product_type"].to_string(),
            is_proxy: !cap["proxy"].is_empty(),
            processing_level: cap["processing_level"].to_string(),
            is_nrt: cap.name("nrt").is_some(),
            version_id: cap["version_id"].to_string(),
            day: cap["day"].to_string(),
            time: cap["time"].to_string(),
            scan_id: cap["scan_id"].to_string(),
            granule_id: cap["granule_id"].to_string(),
        }
    }

    /// the UTC start of the granule, None if the digits are not a valid date and time
    pub fn acquisition_time (&self)->Option<DateTime<Utc>> {
        parse_tempo_dtg( &self.day, &self.time)
    }
}

/// parse the 8 digit day and 6 digit time of a TEMPO filename as UTC
pub fn parse_tempo_dtg (day: &str, time: &str)->Option<DateTime<Utc>> {
    if day.len() == 8 && time.len() == 6 && day.is_ascii() && time.is_ascii()
        && let Ok(year) = day[0..4].parse::<i32>()
        && let Ok(month) = day[4..6].parse::<u32>()
        && let Ok(dom) = day[6..8].parse::<u32>()
        && let Ok(hour) = time[0..2].parse::<u32>()
        && let Ok(min) = time[2..4].parse::<u32>()
        && let Ok(sec) = time[4..6].parse::<u32>()
        && let Some(nd) = NaiveDate::from_ymd_opt( year, month, dom)
        && let Some(nt) = NaiveTime::from_hms_opt( hour, min, sec) {
        Some( NaiveDateTime::new( nd, nt).and_utc())
    } else {
        None
    }
}

/* #endregion TEMPO filename grammar */

/* #region batch classification *****************************************************************************/

/// granules share a batch iff their keys are equal
#[derive(Debug,Clone,PartialEq,Eq,Hash)]
pub struct BatchKey {
    pub day: String, // yyyymmdd in the target timezone
    pub scan_id: String,
}

impl fmt::Display for BatchKey {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{}/{}", self.day, self.scan_id)
    }
}

/// the calendar day (yyyymmdd) of a UTC date in the given timezone
pub fn localized_day (date: &DateTime<Utc>, tz: &Tz)->String {
    date.with_timezone(tz).format("%Y%m%d").to_string()
}

/// assigns batch indices to TEMPO granule filenames. Batch indices are given out in order of first
/// appearance of a key, which makes them a function of input order - batch 0 is not necessarily the earliest
#[derive(Debug,Clone)]
pub struct BatchClassifier {
    grammar: TempoGrammar,
    timezone: Tz,
}

impl BatchClassifier {
    pub fn new (grammar: TempoGrammar, timezone: Tz)->Self {
        BatchClassifier { grammar, timezone }
    }

    pub fn with_timezone (timezone: Tz)->Result<Self> {
        Ok( BatchClassifier::new( TempoGrammar::new()?, timezone))
    }

    pub fn grammar (&self)->&TempoGrammar { &self.grammar }
    pub fn timezone (&self)->Tz { self.timezone }

    /// None if `filename` does not match the grammar, error if it matches but does not encode a valid time
    pub fn batch_key (&self, filename: &str)->Result<Option<BatchKey>> {
        match self.grammar.parse( filename) {
            Some(info) => {
                let date = info.acquisition_time().ok_or_else(|| {
                    OdinBatcheeError::InvalidAcquisitionTimeError( filename.to_string(), format!("{}T{}", info.day, info.time))
                })?;
                Ok( Some( BatchKey { day: localized_day( &date, &self.timezone), scan_id: info.scan_id }))
            }
            None => Ok(None)
        }
    }

    /// the batch index for each of the given filenames, aligned with the input. Entries for filenames that do not
    /// match the grammar are None
    pub fn classify<S: AsRef<str>> (&self, filenames: &[S])->Result<Vec<Option<BatchIndex>>> {
        info!("classifying {} filenames", filenames.len());

        let mut batches: IndexMap<BatchKey,BatchIndex> = IndexMap::new();
        let mut indices: Vec<Option<BatchIndex>> = Vec::with_capacity( filenames.len());

        for name in filenames {
            let name = name.as_ref();
            match self.batch_key( name)? {
                Some(key) => {
                    let next_idx = batches.len();
                    let idx = *batches.entry( key).or_insert( next_idx);
                    indices.push( Some(idx));
                }
                None => {
                    warn!("ignoring granule that does not match TEMPO filename grammar: {name}");
                    indices.push( None);
                }
            }
        }

        debug!("batch keys: {:?}", batches.keys().map(|k| k.to_string()).collect::<Vec<_>>());
        info!("{} batches for {} matching filenames", batches.len(), indices.iter().flatten().count());

        Ok(indices)
    }

    /// the batch indices of all matching filenames in input order. Non-matching filenames are omitted
    pub fn batch_indices<S: AsRef<str>> (&self, filenames: &[S])->Result<Vec<BatchIndex>> {
        Ok( self.classify( filenames)?.into_iter().flatten().collect() )
    }

    /// the matching filenames grouped by batch, in batch index order
    pub fn group_filenames<S: AsRef<str>> (&self, filenames: &[S])->Result<Vec<Vec<String>>> {
        let indices = self.classify( filenames)?;
        let mut groups: IndexMap<BatchIndex,Vec<String>> = IndexMap::new();

        for (name, idx) in filenames.iter().zip( indices.iter()) {
            if let Some(idx) = idx {
                groups.entry( *idx).or_default().push( name.as_ref().to_string());
            }
        }

        Ok( groups.into_values().collect() )
    }
}

/* #endregion batch classification */
