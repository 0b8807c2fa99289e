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

//! the subset of the SpatioTemporal Asset Catalog (STAC) 1.0 record model we need to describe
//! granules and batches of granules. Fields we do not interpret are preserved verbatim so that
//! records survive a read/write cycle.

use std::fmt;
use serde::{Serialize,Deserialize};
use serde_json::{Map,Value};
use chrono::{DateTime,Utc};
use indexmap::IndexMap;
use geojson::{Geometry, Value as GeoValue};

pub mod errors;
pub use errors::{Result,OdinStacError};

pub mod fs;
pub use fs::*;

pub const STAC_VERSION: &str = "1.0.0";

pub const REL_ITEM: &str = "item";
pub const REL_CHILD: &str = "child";
pub const REL_NEXT: &str = "next";
pub const REL_PREV: &str = "prev";
pub const REL_PARENT: &str = "parent";
pub const REL_ROOT: &str = "root";
pub const REL_SELF: &str = "self";

// links that position a catalog within its tree. They do not survive a copy into another tree
const STRUCTURAL_RELS: [&str;7] = [REL_ITEM, REL_CHILD, REL_NEXT, REL_PREV, REL_PARENT, REL_ROOT, REL_SELF];

pub const ROLE_DATA: &str = "data";

fn default_stac_version()->String { STAC_VERSION.to_string() }
fn catalog_type()->String { "Catalog".to_string() }
fn feature_type()->String { "Feature".to_string() }

/* #region links and assets *************************************************************************************/

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename="type", default, skip_serializing_if="Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new (rel: impl ToString, href: impl ToString)->Self {
        Link { rel: rel.to_string(), href: href.to_string(), media_type: None, title: None }
    }

    pub fn json (rel: impl ToString, href: impl ToString)->Self {
        Link { media_type: Some("application/json".to_string()), ..Link::new( rel, href) }
    }

    pub fn item (href: impl ToString)->Self {
        Link::json( REL_ITEM, href)
    }

    pub fn is_structural (&self)->bool {
        STRUCTURAL_RELS.contains( &self.rel.as_str())
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub title: Option<String>,
    #[serde(rename="type", default, skip_serializing_if="Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if="Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String,Value>,
}

impl Asset {
    pub fn new (href: impl ToString)->Self {
        Asset { href: href.to_string(), title: None, media_type: None, roles: Vec::new(), extra: Map::new() }
    }

    pub fn with_title (mut self, title: impl ToString)->Self { self.title = Some(title.to_string()); self }
    pub fn with_media_type (mut self, media_type: impl ToString)->Self { self.media_type = Some(media_type.to_string()); self }
    pub fn with_role (mut self, role: impl ToString)->Self { self.roles.push( role.to_string()); self }

    pub fn has_role (&self, role: &str)->bool {
        self.roles.iter().any(|r| r == role)
    }
}

/* #endregion links and assets */

/* #region extents **********************************************************************************************/

/// a 2D bounding box in `[west, south, east, north]` order (degrees)
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Bbox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bbox {
    pub fn new (west: f64, south: f64, east: f64, north: f64)->Self {
        Bbox { west, south, east, north }
    }

    /// accepts both 2D (4 element) and 3D (6 element) STAC bboxes. Elevation is dropped
    pub fn from_wsen (wsen: &[f64])->Option<Self> {
        match wsen.len() {
            4 => Some( Bbox::new( wsen[0], wsen[1], wsen[2], wsen[3])),
            6 => Some( Bbox::new( wsen[0], wsen[1], wsen[3], wsen[4])),
            _ => None
        }
    }

    pub fn to_vec (&self)->Vec<f64> {
        vec![self.west, self.south, self.east, self.north]
    }

    /// component-wise min of the minimums and max of the maximums
    pub fn union (&self, other: &Bbox)->Bbox {
        Bbox {
            west: self.west.min( other.west),
            south: self.south.min( other.south),
            east: self.east.max( other.east),
            north: self.north.max( other.north),
        }
    }

    pub fn crosses_antimeridian (&self)->bool { self.west > self.east }

    /// the closed (counter-clockwise) GeoJSON polygon for this box. Boxes that cross the antimeridian
    /// are split into a multi-polygon
    pub fn to_geometry (&self)->Geometry {
        if self.crosses_antimeridian() {
            Geometry::new( GeoValue::MultiPolygon( vec![
                ring( self.west, self.south, 180.0, self.north),
                ring( -180.0, self.south, self.east, self.north)
            ]))
        } else {
            Geometry::new( GeoValue::Polygon( ring( self.west, self.south, self.east, self.north)))
        }
    }
}

fn ring (west: f64, south: f64, east: f64, north: f64)->Vec<Vec<Vec<f64>>> {
    vec![ vec![
        vec![west, south],
        vec![east, south],
        vec![east, north],
        vec![west, north],
        vec![west, south],
    ]]
}

impl fmt::Display for Bbox {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "[{},{},{},{}]", self.west, self.south, self.east, self.north)
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>)->Self {
        TimeRange { start, end }
    }

    /// earliest start and latest end
    pub fn union (&self, other: &TimeRange)->TimeRange {
        TimeRange { start: self.start.min( other.start), end: self.end.max( other.end) }
    }
}

/* #endregion extents */

/* #region catalogs and items ***********************************************************************************/

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Catalog {
    #[serde(rename="type", default="catalog_type")]
    pub catalog_type: String,
    #[serde(default="default_stac_version")]
    pub stac_version: String,
    #[serde(default, skip_serializing_if="Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub extra: Map<String,Value>,
}

impl Catalog {
    pub fn new (id: impl ToString, description: impl ToString)->Self {
        Catalog {
            catalog_type: catalog_type(),
            stac_version: default_stac_version(),
            stac_extensions: Vec::new(),
            id: id.to_string(),
            description: description.to_string(),
            title: None,
            links: Vec::new(),
            extra: Map::new()
        }
    }

    /// a copy of this catalog under a new id without any item, child, paging, parent, root or self links
    pub fn clone_empty (&self, id: impl ToString)->Catalog {
        let mut catalog = self.clone();
        catalog.id = id.to_string();
        catalog.links.retain(|l| !l.is_structural());
        catalog
    }

    pub fn links_with_rel<'a> (&'a self, rel: &'a str)->impl Iterator<Item=&'a Link> {
        self.links.iter().filter( move |l| l.rel == rel)
    }
}

#[derive(Debug,Clone,PartialEq,Default,Serialize,Deserialize)]
pub struct Properties {
    // STAC requires this to be present even if null
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String,Value>,
}

impl Properties {
    pub fn from_time_range (range: &TimeRange)->Self {
        Properties { datetime: None, start_datetime: Some(range.start), end_datetime: Some(range.end), extra: Map::new() }
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Item {
    #[serde(rename="type", default="feature_type")]
    pub item_type: String,
    #[serde(default="default_stac_version")]
    pub stac_version: String,
    #[serde(default, skip_serializing_if="Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub assets: IndexMap<String,Asset>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub collection: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String,Value>,
}

impl Item {
    pub fn new (id: impl ToString)->Self {
        Item {
            item_type: feature_type(),
            stac_version: default_stac_version(),
            stac_extensions: Vec::new(),
            id: id.to_string(),
            geometry: None,
            bbox: None,
            properties: Properties::default(),
            links: Vec::new(),
            assets: IndexMap::new(),
            collection: None,
            extra: Map::new()
        }
    }

    /// set both bbox and the geometry derived from it
    pub fn with_bbox (mut self, bbox: Option<Bbox>)->Self {
        self.geometry = bbox.map(|b| b.to_geometry());
        self.bbox = bbox.map(|b| b.to_vec());
        self
    }

    pub fn with_time_range (mut self, range: &TimeRange)->Self {
        self.properties = Properties::from_time_range( range);
        self
    }

    pub fn add_asset (&mut self, key: impl ToString, asset: Asset) {
        self.assets.insert( key.to_string(), asset);
    }

    pub fn bbox (&self)->Option<Bbox> {
        self.bbox.as_ref().and_then(|wsen| Bbox::from_wsen( wsen))
    }

    /// the explicit start/end range if set, otherwise the nominal datetime is used for missing ends
    pub fn time_range (&self)->Option<TimeRange> {
        let p = &self.properties;
        let start = p.start_datetime.or( p.datetime)?;
        let end = p.end_datetime.or( p.datetime)?;
        Some( TimeRange::new( start, end))
    }
}

/* #endregion catalogs and items */
