//! Closed table of Karnataka district centres
//!
//! Names follow the labels used by the frontend district picker, e.g.
//! "Mysuru (Mysore)". Lookups also accept either half of such a label.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::Coordinates;

/// (name, latitude, longitude)
const DISTRICTS: &[(&str, f64, f64)] = &[
    ("Bagalkot", 16.1691, 75.6615),
    ("Ballari (Bellary)", 15.1394, 76.9214),
    ("Belagavi (Belgaum)", 15.8497, 74.4977),
    ("Bengaluru Rural", 13.2257, 77.3910),
    ("Bengaluru Urban", 12.9716, 77.5946),
    ("Bidar", 17.9104, 77.5199),
    ("Chamarajanagar", 11.9261, 76.9398),
    ("Chikkaballapur", 13.4355, 77.7278),
    ("Chikkamagaluru", 13.3161, 75.7747),
    ("Chitradurga", 14.2251, 76.3980),
    ("Dakshina Kannada", 12.9141, 74.8560),
    ("Davanagere", 14.4644, 75.9218),
    ("Dharwad", 15.4589, 75.0078),
    ("Gadag", 15.4166, 75.6290),
    ("Hassan", 13.0068, 76.0996),
    ("Haveri", 14.7951, 75.3990),
    ("Kalaburagi (Gulbarga)", 17.3297, 76.8343),
    ("Kodagu (Coorg)", 12.4244, 75.7382),
    ("Kolar", 13.1360, 78.1290),
    ("Koppal", 15.3550, 76.1548),
    ("Mandya", 12.5218, 76.8958),
    ("Mysuru (Mysore)", 12.2958, 76.6394),
    ("Raichur", 16.2120, 77.3566),
    ("Ramanagara", 12.7159, 77.2826),
    ("Shivamogga (Shimoga)", 13.9299, 75.5681),
    ("Tumakuru (Tumkur)", 13.3379, 77.1010),
    ("Udupi", 13.3409, 74.7421),
    ("Uttara Kannada (Karwar)", 14.8182, 74.1240),
    ("Vijayapura (Bijapur)", 16.8302, 75.7100),
    ("Yadgir", 16.7700, 77.1383),
    ("Vijayanagara", 15.3350, 76.4700),
];

static EXACT: LazyLock<HashMap<&'static str, Coordinates>> = LazyLock::new(|| {
    DISTRICTS
        .iter()
        .map(|&(name, lat, lon)| (name, Coordinates::new(lat, lon)))
        .collect()
});

static ALIASES: LazyLock<HashMap<String, Coordinates>> = LazyLock::new(|| {
    let mut aliases = HashMap::new();
    for &(name, lat, lon) in DISTRICTS {
        let point = Coordinates::new(lat, lon);
        for alias in name_variants(name) {
            aliases.entry(alias).or_insert(point);
        }
    }
    aliases
});

/// "Mysuru (Mysore)" -> ["mysuru (mysore)", "mysuru", "mysore"]
fn name_variants(name: &str) -> Vec<String> {
    let mut variants = vec![normalize(name)];
    if let Some((primary, rest)) = name.split_once('(') {
        variants.push(normalize(primary));
        variants.push(normalize(rest.trim_end_matches(')')));
    }
    variants
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Look up a district centre by name
#[must_use]
pub fn lookup(name: &str) -> Option<Coordinates> {
    EXACT
        .get(name)
        .or_else(|| ALIASES.get(&normalize(name)))
        .copied()
}

/// All district labels, sorted
#[must_use]
pub fn district_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = DISTRICTS.iter().map(|&(name, _, _)| name).collect();
    names.sort_unstable();
    names
}
