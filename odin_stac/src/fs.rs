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

use std::{collections::HashSet, fs::{self,File}, io::{BufReader,BufWriter,Write}, path::{Path,PathBuf}};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{Catalog, Item, Link, REL_ITEM, REL_CHILD, REL_NEXT, REL_ROOT, REL_SELF};
use crate::errors::{Result, OdinStacError, op_failed};

fn read_json<T: DeserializeOwned> (path: &Path)->Result<T> {
    let reader = BufReader::new( File::open(path)?);
    serde_json::from_reader( reader).map_err(|source| OdinStacError::ParseError{ path: path.to_path_buf(), source })
}

pub fn write_json<T: Serialize> (path: &Path, value: &T)->Result<()> {
    let mut writer = BufWriter::new( File::create(path)?);
    serde_json::to_writer_pretty( &mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn read_catalog (path: impl AsRef<Path>)->Result<Catalog> {
    read_json( path.as_ref())
}

pub fn read_item (path: impl AsRef<Path>)->Result<Item> {
    read_json( path.as_ref())
}

/// resolve a link href relative to the directory of the file that contains the link.
/// Only local references (relative, absolute or `file://` hrefs) can be resolved
pub fn resolve_href (base_dir: &Path, href: &str)->Result<PathBuf> {
    if href.is_empty() {
        return Err( op_failed!("empty link href in {:?}", base_dir))
    }

    if let Some(path) = href.strip_prefix("file://") {
        Ok( PathBuf::from(path))
    } else if href.contains("://") {
        Err( OdinStacError::UnresolvableLinkError( href.to_string()))
    } else {
        let path = Path::new(href);
        if path.is_absolute() { Ok( path.to_path_buf()) } else { Ok( base_dir.join(path)) }
    }
}

/// get all items reachable from the catalog at `path`, following item, child and next (paging) links
/// in the order in which they appear. Each file is only read once
pub fn collect_items (path: impl AsRef<Path>)->Result<Vec<Item>> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut items: Vec<Item> = Vec::new();

    collect_catalog_items( path.as_ref(), &mut visited, &mut items)?;
    debug!("collected {} items from {:?}", items.len(), path.as_ref());

    Ok(items)
}

fn collect_catalog_items (path: &Path, visited: &mut HashSet<PathBuf>, items: &mut Vec<Item>)->Result<()> {
    let path = fs::canonicalize(path)?;
    if !visited.insert( path.clone()) {
        return Ok(())
    }

    let catalog = read_catalog( &path)?;
    let base_dir = path.parent().unwrap_or( Path::new("."));

    for link in &catalog.links {
        match link.rel.as_str() {
            REL_ITEM => {
                let item_path = fs::canonicalize( resolve_href( base_dir, &link.href)?)?;
                if visited.insert( item_path.clone()) {
                    items.push( read_item( &item_path)?);
                }
            }
            REL_CHILD | REL_NEXT => {
                collect_catalog_items( &resolve_href( base_dir, &link.href)?, visited, items)?;
            }
            _ => {} // self, root, parent etc. are not traversed
        }
    }

    Ok(())
}

/// write `items` to `<dir>/<catalog-id>/<item-id>.json` and the catalog (with respective relative item links)
/// to `<dir>/<filename>`. The written catalog is its own root: structural links of the input catalog are
/// replaced by `root` and `self` links to `<filename>` and the item links.
/// Returns the path of the written catalog file
pub fn write_catalog (dir: impl AsRef<Path>, filename: &str, catalog: &Catalog, items: &[Item])->Result<PathBuf> {
    let dir = dir.as_ref();
    let mut catalog = catalog.clone();
    catalog.links.retain(|l| !l.is_structural());
    let own_href = format!("./{filename}");
    catalog.links.push( Link::json( REL_ROOT, &own_href));
    catalog.links.push( Link::json( REL_SELF, &own_href));

    if !items.is_empty() {
        let item_dir = dir.join( &catalog.id);
        fs::create_dir_all( &item_dir)?;

        for item in items {
            let item_filename = format!("{}.json", item.id);
            write_json( &item_dir.join( &item_filename), item)?;
            catalog.links.push( Link::item( format!("./{}/{}", catalog.id, item_filename)));
        }
    } else {
        fs::create_dir_all( dir)?;
    }

    let path = dir.join( filename);
    write_json( &path, &catalog)?;
    debug!("wrote catalog {} with {} items to {:?}", catalog.id, items.len(), path);

    Ok(path)
}
