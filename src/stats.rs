//! Per-route activity statistics.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::direction::{Bearing, classify};
use crate::models::{Route, Vehicle};

/// Active vehicle counts for one route, split by bearing bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub route_number: String,
    pub route_name: String,
    pub north_eastbound: usize,
    pub south_westbound: usize,
    pub total_active: usize,
}

impl RouteStats {
    pub fn new(route: &Route) -> Self {
        RouteStats {
            route_number: route.route_number.clone(),
            route_name: route.route_name.clone(),
            north_eastbound: 0,
            south_westbound: 0,
            total_active: 0,
        }
    }

    fn count(&mut self, bearing: Bearing) {
        match bearing {
            Bearing::NorthEast => self.north_eastbound += 1,
            Bearing::SouthWest => self.south_westbound += 1,
        }
        self.total_active += 1;
    }
}

/// Joins `routes` with `vehicles`, producing one record per route.
///
/// Routes without vehicles still get a zeroed record. Vehicles whose route is
/// not in `routes` are dropped. Output is ordered by [`compare_route_ids`].
pub fn compute(routes: &[Route], vehicles: &[Vehicle]) -> Vec<RouteStats> {
    let mut by_route: HashMap<&str, RouteStats> = HashMap::with_capacity(routes.len());
    for route in routes {
        by_route
            .entry(route.route_number.as_str())
            .or_insert_with(|| RouteStats::new(route));
    }

    for vehicle in vehicles {
        if let Some(stats) = by_route.get_mut(vehicle.route.as_str()) {
            stats.count(classify(&vehicle.heading));
        }
    }

    let mut result: Vec<RouteStats> = by_route.into_values().collect();
    result.sort_by(|a, b| compare_route_ids(&a.route_number, &b.route_number));
    result
}

/// Orders route identifiers so that numeric ids sort by value ("9" before
/// "22") ahead of alphanumeric ids, which sort lexically among themselves.
pub fn compare_route_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, name: &str) -> Route {
        Route {
            route_number: id.to_string(),
            route_name: name.to_string(),
            route_color: "#000000".to_string(),
            rtdd: id.to_string(),
        }
    }

    fn vehicle(route: &str, heading: &str) -> Vehicle {
        Vehicle {
            vehicle_id: "1".to_string(),
            timestamp: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            heading: heading.to_string(),
            pattern_id: String::new(),
            pattern_distance: String::new(),
            route: route.to_string(),
            destination: String::new(),
            delayed: false,
            tablock_id: String::new(),
            trip_id: String::new(),
            origin_trip_no: String::new(),
            zone: String::new(),
        }
    }

    #[test]
    fn test_counts_by_bearing() {
        let stats = compute(
            &[route("8", "Halsted")],
            &[vehicle("8", "90"), vehicle("8", "270")],
        );
        assert_eq!(
            stats,
            vec![RouteStats {
                route_number: "8".into(),
                route_name: "Halsted".into(),
                north_eastbound: 1,
                south_westbound: 1,
                total_active: 2,
            }]
        );
    }

    #[test]
    fn test_routes_without_vehicles_are_zeroed() {
        let stats = compute(&[route("8", "Halsted"), route("9", "Ashland")], &[]);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.total_active == 0
            && s.north_eastbound == 0
            && s.south_westbound == 0));
    }

    #[test]
    fn test_unknown_routes_are_dropped() {
        let stats = compute(
            &[route("8", "Halsted")],
            &[vehicle("8", "10"), vehicle("999", "10"), vehicle("", "10")],
        );
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_active, 1);
    }

    #[test]
    fn test_malformed_heading_counts_as_south_west() {
        let stats = compute(&[route("8", "Halsted")], &[vehicle("8", "n/a")]);
        assert_eq!(stats[0].south_westbound, 1);
        assert_eq!(stats[0].total_active, 1);
    }

    #[test]
    fn test_totals_match_matched_vehicles() {
        let routes = vec![route("3", "King Drive"), route("X9", "Ashland Express"), route("22", "Clark")];
        let vehicles = vec![
            vehicle("3", "0"),
            vehicle("3", "200"),
            vehicle("22", "bad"),
            vehicle("X9", "359"),
            vehicle("77", "90"),
        ];

        let stats = compute(&routes, &vehicles);

        assert_eq!(stats.len(), routes.len());
        for s in &stats {
            assert_eq!(s.total_active, s.north_eastbound + s.south_westbound);
        }
        let total: usize = stats.iter().map(|s| s.total_active).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_sorted_numeric_aware() {
        let routes = vec![
            route("X9", ""),
            route("22", ""),
            route("9", ""),
            route("J14", ""),
            route("100", ""),
            route("4", ""),
        ];
        let ids: Vec<String> = compute(&routes, &[])
            .into_iter()
            .map(|s| s.route_number)
            .collect();
        assert_eq!(ids, vec!["4", "9", "22", "100", "J14", "X9"]);
    }

    #[test]
    fn test_compare_route_ids_is_total() {
        let ids = ["10", "9", "1A", "09", "A", "b", "-1"];
        for a in ids {
            for b in ids {
                assert_eq!(compare_route_ids(a, b), compare_route_ids(b, a).reverse());
            }
        }
        assert_eq!(compare_route_ids("9", "22"), Ordering::Less);
        assert_eq!(compare_route_ids("10", "1A"), Ordering::Less);
        assert_eq!(compare_route_ids("9", "09"), Ordering::Greater);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(RouteStats::new(&route("8", "Halsted"))).unwrap();
        assert_eq!(json["routeNumber"], "8");
        assert_eq!(json["northEastbound"], 0);
        assert_eq!(json["totalActive"], 0);
    }
}
