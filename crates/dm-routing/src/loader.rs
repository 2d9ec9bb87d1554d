//! CSV package manifest loader.
//!
//! # CSV format
//!
//! One row per package, coordinates in metres:
//!
//! ```csv
//! package_id,pickup_x,pickup_y,delivery_x,delivery_y
//! 0,0.0,0.0,1200.0,0.0
//! 1,1500.0,0.0,1500.0,900.0
//! ```
//!
//! Packages come back in file order, all in `NeedsPickup`.

use std::collections::HashSet;
use std::io::Read;

use serde::Deserialize;

use dm_core::{PackageId, Point};

use crate::{Package, RoutingError, RoutingResult};

#[derive(Deserialize)]
struct PackageRecord {
    package_id: u32,
    pickup_x:   f64,
    pickup_y:   f64,
    delivery_x: f64,
    delivery_y: f64,
}

/// Load packages from a CSV file.
pub fn load_packages_csv(path: &std::path::Path) -> RoutingResult<Vec<Package>> {
    let file = std::fs::File::open(path)?;
    load_packages_reader(file)
}

/// Like [`load_packages_csv`] but accepts any `Read` source.
pub fn load_packages_reader<R: Read>(reader: R) -> RoutingResult<Vec<Package>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for result in csv_reader.deserialize::<PackageRecord>() {
        let row = result.map_err(|e| RoutingError::Parse(e.to_string()))?;
        let id = PackageId(row.package_id);
        if !seen.insert(id) {
            return Err(RoutingError::DuplicatePackage(id));
        }
        let coords = [row.pickup_x, row.pickup_y, row.delivery_x, row.delivery_y];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(RoutingError::Parse(format!("package {id}: non-finite coordinate")));
        }
        packages.push(Package::new(
            id,
            Point::new(row.pickup_x, row.pickup_y),
            Point::new(row.delivery_x, row.delivery_y),
        ));
    }

    Ok(packages)
}
