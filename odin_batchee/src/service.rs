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

use std::{fs, path::{Path,PathBuf}};
use uuid::Uuid;
use tracing::{debug, error, info};
use odin_stac::{Catalog, Item, collect_items, read_catalog, write_catalog, write_json};

use crate::BatcheeConfig;
use crate::assembler::{Assembly, BatchAssembler, data_urls};
use crate::classifier::{BatchClassifier, BatchIndex};
use crate::errors::Result;

/// name of the JSON manifest listing the batch catalog files of a run
pub const BATCH_CATALOGS_FILE: &str = "batch-catalogs.json";
/// name of the catalog file written if there was nothing to batch
pub const SINGLE_CATALOG_FILE: &str = "catalog.json";

/// a batch as an output catalog, holding one or more items
#[derive(Debug,Clone)]
pub struct BatchCatalog {
    pub index: BatchIndex,
    pub catalog: Catalog,
    pub items: Vec<Item>,
}

#[derive(Debug,Clone)]
pub enum BatchOutput {
    /// terminal result for a source without items
    Single(Catalog),
    Batches(Vec<BatchCatalog>),
}

/// turns a source catalog of TEMPO granules into one catalog per batch. Each invocation is independent
#[derive(Debug,Clone)]
pub struct BatcheeService {
    classifier: BatchClassifier,
    assembler: BatchAssembler,
}

impl BatcheeService {
    pub fn new (classifier: BatchClassifier, assembler: BatchAssembler)->Self {
        BatcheeService { classifier, assembler }
    }

    pub fn from_config (config: &BatcheeConfig)->Result<Self> {
        let classifier = BatchClassifier::with_timezone( config.timezone)?;
        let assembler = BatchAssembler::new( config.aggregation, &config.output_media_type);
        Ok( BatcheeService::new( classifier, assembler))
    }

    pub fn classifier (&self)->&BatchClassifier { &self.classifier }
    pub fn assembler (&self)->&BatchAssembler { &self.assembler }

    /// batch the `items` of `catalog`. Either all batches are returned or a single error
    pub fn process_catalog (&self, catalog: &Catalog, items: &[Item])->Result<BatchOutput> {
        info!("processing catalog {} with {} items", catalog.id, items.len());

        let res = self.batch_catalog_items( catalog, items);
        if let Err(e) = &res {
            error!("batching catalog {} failed: {e:?}", catalog.id);
        }
        res
    }

    fn batch_catalog_items (&self, catalog: &Catalog, items: &[Item])->Result<BatchOutput> {
        if items.is_empty() {
            return Ok( BatchOutput::Single( catalog.clone_empty( Uuid::new_v4())))
        }

        let urls = data_urls( items)?;
        debug!("granule urls: {urls:?}");

        let batch_indices = self.classifier.classify( &urls)?;
        debug!("batch indices: {batch_indices:?}");

        match self.assembler.assemble_resolved( items, &urls, &batch_indices)? {
            Assembly::Empty => Ok( BatchOutput::Single( catalog.clone_empty( Uuid::new_v4()))),
            Assembly::Batches(batches) => {
                let catalogs = batches.into_iter().map(|batch| {
                    BatchCatalog { index: batch.index, catalog: catalog.clone_empty( &batch.id), items: batch.items }
                }).collect();
                Ok( BatchOutput::Batches(catalogs))
            }
        }
    }

    /// read the catalog tree rooted at `source`, batch its items and write the result to `output_dir`.
    /// Nothing is written if batching fails. Returns the paths of the written catalog files
    pub fn run (&self, source: impl AsRef<Path>, output_dir: impl AsRef<Path>)->Result<Vec<PathBuf>> {
        let source = source.as_ref();
        let catalog = read_catalog( source)?;
        let items = collect_items( source)?;

        let output = self.process_catalog( &catalog, &items)?;
        write_output( output_dir, &output)
    }
}

/// batches are written as `catalog<n>.json` plus a `batch-catalogs.json` manifest, the terminal result of an
/// empty source as a single `catalog.json`
pub fn write_output (dir: impl AsRef<Path>, output: &BatchOutput)->Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all( dir)?;

    match output {
        BatchOutput::Single(catalog) => {
            let path = write_catalog( dir, SINGLE_CATALOG_FILE, catalog, &[])?;
            info!("no batches, wrote {:?}", path);
            Ok( vec![path] )
        }
        BatchOutput::Batches(batches) => {
            let mut paths: Vec<PathBuf> = Vec::with_capacity( batches.len());
            let mut filenames: Vec<String> = Vec::with_capacity( batches.len());

            for (i, batch) in batches.iter().enumerate() {
                let filename = format!("catalog{i}.json");
                paths.push( write_catalog( dir, &filename, &batch.catalog, &batch.items)?);
                filenames.push( filename);
            }
            write_json( &dir.join( BATCH_CATALOGS_FILE), &filenames)?;

            info!("wrote {} batch catalogs to {:?}", batches.len(), dir);
            Ok(paths)
        }
    }
}
