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
use chrono_tz::Tz;
use odin_stac::{Catalog, REL_ROOT, collect_items, read_catalog, resolve_href};
use odin_batchee::*;

fn resource (name: &str)->PathBuf {
    Path::new( env!("CARGO_MANIFEST_DIR")).join("resources/catalogs").join(name)
}

fn service (policy: AggregationPolicy)->BatcheeService {
    let config = BatcheeConfig { aggregation: policy, ..BatcheeConfig::default() };
    BatcheeService::from_config( &config).unwrap()
}

fn granule_url (name: &str)->String {
    format!("https://data.example.com/TEMPO/{name}.nc")
}

fn scan_urls (scan: &str, t: [&str;2])->Vec<String> {
    vec![
        granule_url( &format!("TEMPO_NO2_L2_V03_20240601T{}Z_{scan}G01", t[0])),
        granule_url( &format!("TEMPO_NO2_L2_V03_20240601T{}Z_{scan}G02", t[1])),
    ]
}

fn expected_batches ()->Vec<Vec<String>> {
    vec![
        scan_urls( "S012", ["120101", "120107"]),
        scan_urls( "S013", ["120202", "120209"]),
        scan_urls( "S014", ["120303", "120310"]),
    ]
}

/// all links of the catalog at `path` refer to existing files within `dir`
fn check_links_resolve (dir: &Path, path: &Path)->Result<()> {
    let dir = fs::canonicalize( dir)?;
    let catalog = read_catalog( path)?;
    assert!( catalog.links.iter().any(|l| l.rel == REL_ROOT));

    for link in &catalog.links {
        let target = resolve_href( &dir, &link.href)?;
        assert!( target.is_file(), "{} link {} of {:?} does not resolve", link.rel, link.href, path);
        assert!( fs::canonicalize( &target)?.starts_with( &dir));
    }
    Ok(())
}

/// read back the written batch catalogs and check them against the expected per-scan data urls
fn check_batch_output (dir: &Path, paths: &[PathBuf])->Result<()> {
    let manifest: Vec<String> = serde_json::from_slice( &fs::read( dir.join( BATCH_CATALOGS_FILE))?)?;
    assert_eq!( manifest, vec!["catalog0.json", "catalog1.json", "catalog2.json"]);
    assert_eq!( paths.len(), 3);
    assert!( !dir.join( SINGLE_CATALOG_FILE).exists());

    for (filename, expected) in manifest.iter().zip( expected_batches().iter()) {
        let path = dir.join( filename);
        check_links_resolve( dir, &path)?;
        let catalog = read_catalog( &path)?;
        assert_ne!( catalog.id, "tempo-source");
        assert_eq!( catalog.description, "TEMPO NO2 L2 granules");

        let items = collect_items( &path)?;
        assert_eq!( items.len(), 2);

        let mut urls: Vec<String> = Vec::new();
        for item in &items {
            let data = &item.assets["data"];
            assert_eq!( data.media_type.as_deref(), Some("application/x-netcdf4"));
            assert_eq!( data.roles, vec!["data".to_string()]);
            assert!( item.bbox().is_some());
            assert!( item.time_range().is_some());
            urls.push( data.href.clone());
        }
        assert_eq!( &urls, expected);
    }
    Ok(())
}

// run with "cargo test --test test_service test_unpaged_catalog -- --nocapture"
#[test]
fn test_unpaged_catalog ()->Result<()> {
    let out = tempfile::tempdir()?;
    let paths = service( AggregationPolicy::PerMember).run( resource("catalog.json"), out.path())?;
    println!("{paths:?}");

    check_batch_output( out.path(), &paths)
}

#[test]
fn test_paged_catalog ()->Result<()> {
    let out = tempfile::tempdir()?;
    let paths = service( AggregationPolicy::PerMember).run( resource("catalog0.json"), out.path())?;

    check_batch_output( out.path(), &paths)
}

#[test]
fn test_merged_output ()->Result<()> {
    let out = tempfile::tempdir()?;
    service( AggregationPolicy::Merged).run( resource("catalog.json"), out.path())?;

    let items = collect_items( out.path().join("catalog1.json"))?;
    assert_eq!( items.len(), 1);

    let urls: Vec<&str> = items[0].assets.values().map(|a| a.href.as_str()).collect();
    assert_eq!( urls, expected_batches()[1]);
    assert_eq!( items[0].bbox().map(|b| b.to_vec()), Some( vec![-120.0, 28.0, -90.0, 42.0]));
    Ok(())
}

#[test]
fn test_empty_catalog ()->Result<()> {
    let out = tempfile::tempdir()?;
    let paths = service( AggregationPolicy::PerMember).run( resource("empty.json"), out.path())?;

    assert_eq!( paths, vec![out.path().join( SINGLE_CATALOG_FILE)]);
    assert!( !out.path().join( BATCH_CATALOGS_FILE).exists());

    let catalog = read_catalog( &paths[0])?;
    assert_ne!( catalog.id, "tempo-empty");
    check_links_resolve( out.path(), &paths[0])?;
    assert!( collect_items( &paths[0])?.is_empty());
    Ok(())
}

#[test]
fn test_missing_data_asset () {
    let out = tempfile::tempdir().unwrap();
    let res = service( AggregationPolicy::PerMember).run( resource("missing_asset.json"), out.path());

    match res {
        Err(OdinBatcheeError::MissingDataAssetError(id)) => assert_eq!( id, "granule_99"),
        other => panic!("expected missing data asset error, got {other:?}")
    }
    assert_eq!( fs::read_dir( out.path()).unwrap().count(), 0);
}

#[test]
fn test_process_catalog ()->Result<()> {
    let catalog = Catalog::new( "in-memory", "no items");
    match service( AggregationPolicy::PerMember).process_catalog( &catalog, &[])? {
        BatchOutput::Single(c) => assert_ne!( c.id, "in-memory"),
        BatchOutput::Batches(_) => panic!("expected single catalog")
    }

    let source = resource("catalog.json");
    let items = collect_items( &source)?;
    match service( AggregationPolicy::PerMember).process_catalog( &read_catalog( &source)?, &items)? {
        BatchOutput::Batches(batches) => {
            let idx: Vec<BatchIndex> = batches.iter().map(|b| b.index).collect();
            assert_eq!( idx, vec![0, 1, 2]);
            for b in &batches {
                assert_eq!( b.items.len(), 2);
                assert!( b.catalog.links.iter().all(|l| !l.is_structural()));
            }
        }
        BatchOutput::Single(_) => panic!("expected batches")
    }
    Ok(())
}

#[test]
fn test_load_config ()->Result<()> {
    let config = load_config( Path::new( env!("CARGO_MANIFEST_DIR")).join("configs/batchee.ron"))?;
    assert_eq!( config.timezone, Tz::America__Chicago);
    assert_eq!( config.aggregation, AggregationPolicy::PerMember);
    assert_eq!( config.output_media_type, NETCDF4_MEDIA_TYPE);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("partial.ron");
    fs::write( &path, "BatcheeConfig( aggregation: Merged )")?;
    let config = load_config( &path)?;
    assert_eq!( config.aggregation, AggregationPolicy::Merged);
    assert_eq!( config.timezone, DEFAULT_TIMEZONE);
    Ok(())
}

#[test]
fn test_service_from_config ()->Result<()> {
    let config = BatcheeConfig { timezone: Tz::UTC, aggregation: AggregationPolicy::Merged, ..BatcheeConfig::default() };
    let service = BatcheeService::from_config( &config)?;

    assert_eq!( service.classifier().timezone(), Tz::UTC);
    assert!( service.classifier().grammar().is_match( "TEMPO_NO2_L2_V03_20240601T120101Z_S012G01.nc"));
    assert_eq!( service.assembler().policy(), AggregationPolicy::Merged);
    Ok(())
}
