//! Wire envelope of the provider's JSON responses.
//!
//! Every response is wrapped in a single `bustime-response` object holding a
//! payload array (`routes` or `vehicle`) and an optional `error` array. Scalar
//! fields are inconsistently encoded as strings or numbers, so they decode
//! through [`FlexString`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Route, Vehicle};

/// One entry of the upstream `error` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamError {
    #[serde(default)]
    pub msg: String,
}

/// A scalar that may arrive as a JSON string or a JSON number, stored in its
/// string form. `null` decodes to the empty string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlexString(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for FlexString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<RawScalar>::deserialize(deserializer)? {
            Some(RawScalar::Text(s)) => FlexString(s),
            Some(RawScalar::Number(n)) => FlexString(n.to_string()),
            None => FlexString::default(),
        })
    }
}

impl From<FlexString> for String {
    fn from(value: FlexString) -> Self {
        value.0
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(rename = "bustime-response")]
    pub body: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoutesBody {
    #[serde(default)]
    pub error: Vec<UpstreamError>,
    #[serde(default)]
    pub routes: Vec<WireRoute>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VehiclesBody {
    #[serde(default)]
    pub error: Vec<UpstreamError>,
    #[serde(default, rename = "vehicle")]
    pub vehicles: Vec<WireVehicle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireRoute {
    rt: FlexString,
    rtnm: FlexString,
    rtclr: FlexString,
    rtdd: FlexString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireVehicle {
    vid: FlexString,
    tmstmp: FlexString,
    lat: FlexString,
    lon: FlexString,
    hdg: FlexString,
    pid: FlexString,
    pdist: FlexString,
    rt: FlexString,
    des: FlexString,
    dly: Option<bool>,
    tablockid: FlexString,
    tatripid: FlexString,
    origtatripno: FlexString,
    zone: FlexString,
}

impl From<WireRoute> for Route {
    fn from(r: WireRoute) -> Self {
        Route {
            route_number: r.rt.into(),
            route_name: r.rtnm.into(),
            route_color: r.rtclr.into(),
            rtdd: r.rtdd.into(),
        }
    }
}

impl From<WireVehicle> for Vehicle {
    fn from(v: WireVehicle) -> Self {
        Vehicle {
            vehicle_id: v.vid.into(),
            timestamp: v.tmstmp.into(),
            latitude: v.lat.into(),
            longitude: v.lon.into(),
            heading: v.hdg.into(),
            pattern_id: v.pid.into(),
            pattern_distance: v.pdist.into(),
            route: v.rt.into(),
            destination: v.des.into(),
            delayed: v.dly.unwrap_or_default(),
            tablock_id: v.tablockid.into(),
            trip_id: v.tatripid.into(),
            origin_trip_no: v.origtatripno.into(),
            zone: v.zone.into(),
        }
    }
}
