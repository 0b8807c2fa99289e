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

use serde::{Serialize,Deserialize};
use indexmap::IndexMap;
use uuid::Uuid;
use tracing::{debug, info};
use odin_stac::{Asset, Bbox, Item, TimeRange, ROLE_DATA};

use crate::classifier::BatchIndex;
use crate::errors::{OdinBatcheeError, Result, op_failed};

pub const NETCDF_MEDIA_TYPES: [&str;2] = ["application/x-netcdf", "application/x-netcdf4"];
pub const NETCDF_EXTENSIONS: [&str;2] = [".nc4", ".nc"];
pub const NETCDF4_MEDIA_TYPE: &str = "application/x-netcdf4";

/// how member granules of a batch are turned into output items
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize,clap::ValueEnum)]
pub enum AggregationPolicy {
    /// one output item per member granule, each with a single `data` asset
    #[default]
    PerMember,
    /// one output item per batch covering the union of member extents, with `data_<n>` assets in member order
    Merged,
}

/* #region data asset resolution ****************************************************************************/

/// a NetCDF asset either has a NetCDF media type or, lacking a media type, a NetCDF file extension
pub fn is_netcdf_asset (asset: &Asset)->bool {
    match &asset.media_type {
        Some(media_type) => NETCDF_MEDIA_TYPES.contains( &media_type.as_str()),
        None => {
            let href = asset.href.to_lowercase();
            NETCDF_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
        }
    }
}

/// the href of the first NetCDF asset with a `data` role
pub fn data_url (item: &Item)->Option<&str> {
    item.assets.values()
        .find(|a| a.has_role( ROLE_DATA) && is_netcdf_asset(a))
        .map(|a| a.href.as_str())
}

/// the data urls of all items, failing if any item lacks one
pub fn data_urls (items: &[Item])->Result<Vec<&str>> {
    items.iter()
        .map(|item| data_url(item).ok_or_else(|| OdinBatcheeError::MissingDataAssetError( item.id.clone())))
        .collect()
}

/* #endregion data asset resolution */

/* #region batch assembly ***********************************************************************************/

/// one batch of granules. Ids are generated per run and do not relate to input ids
#[derive(Debug,Clone)]
pub struct BatchRecord {
    pub id: String,
    pub index: BatchIndex,
    pub items: Vec<Item>,
    pub bbox: Option<Bbox>,
    pub time_range: TimeRange,
}

impl BatchRecord {
    /// the hrefs of all output assets in item/asset order
    pub fn data_urls (&self)->Vec<&str> {
        self.items.iter().flat_map(|i| i.assets.values().map(|a| a.href.as_str())).collect()
    }
}

/// `Empty` means there was nothing to batch, which is not the same as zero batches
#[derive(Debug,Clone)]
pub enum Assembly {
    Empty,
    Batches(Vec<BatchRecord>),
}

struct Member<'a> {
    item: &'a Item,
    url: &'a str,
    time_range: TimeRange,
}

fn new_id ()->String {
    Uuid::new_v4().to_string()
}

#[derive(Debug,Clone)]
pub struct BatchAssembler {
    policy: AggregationPolicy,
    media_type: String,
}

impl BatchAssembler {
    pub fn new (policy: AggregationPolicy, media_type: impl ToString)->Self {
        BatchAssembler { policy, media_type: media_type.to_string() }
    }

    pub fn policy (&self)->AggregationPolicy { self.policy }

    /// group `records` by their (lockstep aligned) batch indices. Records with a `None` index did not match the
    /// filename grammar and are skipped. Batches are returned in ascending index order, members in input order.
    /// This fails as a whole if any record lacks a data asset, or any batch member lacks a temporal extent
    pub fn assemble (&self, records: &[Item], batch_indices: &[Option<BatchIndex>])->Result<Assembly> {
        let urls = data_urls( records)?;
        self.assemble_resolved( records, &urls, batch_indices)
    }

    /// same as [`assemble`](Self::assemble) for callers that already resolved the data urls of `records`
    /// (e.g. to classify them). `urls` has to be aligned with `records`
    pub fn assemble_resolved (&self, records: &[Item], urls: &[&str], batch_indices: &[Option<BatchIndex>])->Result<Assembly> {
        if records.is_empty() {
            info!("no granules to batch");
            return Ok( Assembly::Empty )
        }

        if records.len() != batch_indices.len() {
            return Err( OdinBatcheeError::IndexMismatchError{ n_records: records.len(), n_indices: batch_indices.len() })
        }
        if records.len() != urls.len() {
            return Err( op_failed!("got {} data urls for {} granule records", urls.len(), records.len()))
        }

        let mut groups: IndexMap<BatchIndex,Vec<Member>> = IndexMap::new();
        for ((item, url), idx) in records.iter().zip( urls.iter().copied()).zip( batch_indices.iter()) {
            if let Some(idx) = idx {
                let time_range = item.time_range().ok_or_else(|| OdinBatcheeError::MissingTimeRangeError( item.id.clone()))?;
                groups.entry( *idx).or_default().push( Member { item, url, time_range });
            }
        }
        groups.sort_keys();

        let batches = groups.iter()
            .map(|(idx, members)| self.build_batch( *idx, members))
            .collect::<Result<Vec<BatchRecord>>>()?;

        info!("assembled {} batches from {} granules ({:?})", batches.len(), records.len(), self.policy);
        Ok( Assembly::Batches(batches) )
    }

    fn build_batch (&self, index: BatchIndex, members: &[Member])->Result<BatchRecord> {
        let bbox = members.iter().filter_map(|m| m.item.bbox()).reduce(|a,b| a.union(&b));
        let time_range = members.iter().map(|m| m.time_range).reduce(|a,b| a.union(&b))
            .ok_or_else(|| op_failed!("batch {} has no members", index))?;

        let items = match self.policy {
            AggregationPolicy::PerMember => {
                members.iter().map(|m| {
                    let mut item = Item::new( new_id()).with_bbox( m.item.bbox()).with_time_range( &m.time_range);
                    item.add_asset( ROLE_DATA, self.data_asset( m.url));
                    item
                }).collect()
            }
            AggregationPolicy::Merged => {
                let mut item = Item::new( new_id()).with_bbox( bbox).with_time_range( &time_range);
                for (i, m) in members.iter().enumerate() {
                    item.add_asset( format!("{ROLE_DATA}_{i}"), self.data_asset( m.url));
                }
                vec![item]
            }
        };

        let batch = BatchRecord { id: new_id(), index, items, bbox, time_range };
        debug!("batch {} ({}): {} members", batch.index, batch.id, members.len());

        Ok(batch)
    }

    fn data_asset (&self, url: &str)->Asset {
        Asset::new( url).with_title( url).with_media_type( &self.media_type).with_role( ROLE_DATA)
    }
}

/* #endregion batch assembly */
