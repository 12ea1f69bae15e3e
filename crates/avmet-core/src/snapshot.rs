use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

// path the upstream generator publishes the snapshot under, relative to the
// dashboard origin
pub const SNAPSHOT_PATH: &str = "data/weather-data.json";

// One observation per station as found in the snapshot document. Every field
// is optional: the upstream generator writes null for anything it could not
// extract, and falls back to a bare `{station, metar, error}` entry when a
// station could not be fetched at all.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Observation {
    pub station: Option<String>,
    pub metar: Option<String>,
    pub wind_direction: Option<f64>, // in degrees true
    pub wind_speed: Option<f64>,     // in knots
    pub wind_gust: Option<f64>,      // in knots
    pub visibility: Option<f64>,     // in statute miles
    pub temperature_c: Option<f64>,
    pub dew_point_c: Option<f64>,
    pub cloud_ceiling: Option<f64>, // in ft AGL, 99999 for no ceiling
    pub altimeter: Option<String>,
    pub timestamp: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub stations: BTreeMap<String, Observation>,
}

impl Snapshot {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl Observation {
    pub fn observed_at(&self) -> Option<OffsetDateTime> {
        let raw = self.timestamp.as_deref()?;
        match OffsetDateTime::parse(raw, &Rfc3339) {
            Ok(ts) => Some(ts),
            Err(err) => {
                log::debug!("Ignoring unparseable observation timestamp {}: {}", raw, err);
                None
            }
        }
    }
}

// Fetch the pre-built snapshot document. Best effort: any failure is logged
// and turned into `None`, a single attempt with no retry. The document shape
// is not validated here, see `Snapshot::from_value`.
pub async fn fetch_snapshot(url: &str) -> Option<Value> {
    match try_fetch(url).await {
        Ok(data) => Some(data),
        Err(err) => {
            log::warn!("Could not fetch weather snapshot from {}: {:#}", url, err);
            None
        }
    }
}

async fn try_fetch(url: &str) -> Result<Value, anyhow::Error> {
    let client = reqwest::Client::new();

    // the snapshot is regenerated in place, so make sure no client or
    // intermediary cache serves a stale copy
    let res = client
        .get(url)
        .header("Cache-Control", "no-cache, no-store, must-revalidate")
        .header("Pragma", "no-cache")
        .header("Expires", "0")
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(anyhow!("unexpected HTTP status {}", res.status()));
    }

    res.json().await.context("snapshot is not valid JSON")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn reference_snapshot() -> Value {
        json!({
            "lastUpdated": "2024-03-18T14:32:10.482910Z",
            "kcps": {
                "station": "KCPS",
                "metar": "KCPS 181453Z 19010G15KT 2 1/2SM BR BKN012 24/20 A2992",
                "windDirection": 190.0,
                "windSpeed": 10.0,
                "windGust": 15.0,
                "visibility": 2.5,
                "temperatureC": 24.0,
                "dewPointC": 20.0,
                "cloudCeiling": 1200.0,
                "altimeter": "A2992",
                "timestamp": "2024-03-18T14:53:00Z"
            },
            "kstl": {
                "station": "KSTL",
                "metar": "Data unavailable",
                "error": "Failed to fetch METAR"
            }
        })
    }

    #[test]
    fn test_snapshot_from_value() {
        let snapshot = Snapshot::from_value(reference_snapshot()).unwrap();

        assert_eq!(
            snapshot.last_updated.as_deref(),
            Some("2024-03-18T14:32:10.482910Z")
        );
        assert_eq!(snapshot.stations.len(), 2);

        let kcps = &snapshot.stations["kcps"];
        assert_eq!(kcps.station.as_deref(), Some("KCPS"));
        assert_eq!(kcps.wind_direction, Some(190.0));
        assert_eq!(kcps.wind_speed, Some(10.0));
        assert_eq!(kcps.wind_gust, Some(15.0));
        assert_eq!(kcps.visibility, Some(2.5));
        assert_eq!(kcps.temperature_c, Some(24.0));
        assert_eq!(kcps.dew_point_c, Some(20.0));
        assert_eq!(kcps.cloud_ceiling, Some(1_200.0));
        assert_eq!(kcps.altimeter.as_deref(), Some("A2992"));
        assert_eq!(kcps.error, None);
    }

    #[test]
    fn test_snapshot_degraded_station_entry() {
        let snapshot = Snapshot::from_value(reference_snapshot()).unwrap();

        let kstl = &snapshot.stations["kstl"];
        assert_eq!(kstl.station.as_deref(), Some("KSTL"));
        assert_eq!(kstl.error.as_deref(), Some("Failed to fetch METAR"));
        assert_eq!(kstl.wind_direction, None);
        assert_eq!(kstl.temperature_c, None);
        assert_eq!(kstl.observed_at(), None);
    }

    #[test]
    fn test_snapshot_tolerates_unknown_and_null_fields() {
        let snapshot = Snapshot::from_value(json!({
            "kcps": { "windSpeed": 0.0, "windDirection": null }
        }))
        .unwrap();

        let kcps = &snapshot.stations["kcps"];
        assert_eq!(kcps.wind_speed, Some(0.0));
        assert_eq!(kcps.wind_direction, None);
        assert_eq!(snapshot.last_updated, None);
    }

    #[test]
    fn test_observed_at() {
        let obs = Observation {
            timestamp: Some("2024-03-18T14:53:00Z".to_string()),
            ..Default::default()
        };
        let ts = obs.observed_at().unwrap();
        assert_eq!(ts.hour(), 14);
        assert_eq!(ts.minute(), 53);

        let obs = Observation {
            timestamp: Some("181453Z".to_string()),
            ..Default::default()
        };
        assert_eq!(obs.observed_at(), None);
        assert_eq!(Observation::default().observed_at(), None);
    }

    #[tokio::test]
    async fn test_fetch_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/weather-data.json"))
            .and(header("Cache-Control", "no-cache, no-store, must-revalidate"))
            .and(header("Pragma", "no-cache"))
            .and(header("Expires", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reference_snapshot()))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/{}", server.uri(), SNAPSHOT_PATH);
        assert_eq!(fetch_snapshot(&url).await, Some(reference_snapshot()));
    }

    #[tokio::test]
    async fn test_fetch_snapshot_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = format!("{}/{}", server.uri(), SNAPSHOT_PATH);
        assert_eq!(fetch_snapshot(&url).await, None);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
            .mount(&server)
            .await;

        let url = format!("{}/{}", server.uri(), SNAPSHOT_PATH);
        assert_eq!(fetch_snapshot(&url).await, None);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_unreachable() {
        // port from the dynamic range with nothing listening on it
        assert_eq!(fetch_snapshot("http://127.0.0.1:59999/data.json").await, None);
    }
}
