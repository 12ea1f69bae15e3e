use serde::Serialize;

use crate::metrics::{
    ceiling_agl, celsius_to_fahrenheit, crosswind_component, effective_wind_speed, heat_index,
    is_ceiling_restricted, is_visibility_restricted, relative_humidity, DEFAULT_MIN_CEILING_FT,
    DEFAULT_MIN_VISIBILITY_SM,
};
use crate::snapshot::Observation;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Minimums {
    pub ceiling_ft: f64,
    pub visibility_sm: f64,
}

impl Default for Minimums {
    fn default() -> Self {
        Minimums {
            ceiling_ft: DEFAULT_MIN_CEILING_FT,
            visibility_sm: DEFAULT_MIN_VISIBILITY_SM,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Airfield {
    pub name: String,
    // runway idents as painted, e.g. "12L" or "30"
    pub runways: Vec<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayWind {
    pub runway: String,
    pub heading: Option<f64>,
    pub crosswind: Option<f64>, // in knots, unsigned
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedConditions {
    pub station: Option<String>,
    pub temperature_f: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub heat_index_f: Option<f64>,
    pub wind_speed_kt: Option<f64>,
    pub ceiling_ft: Option<f64>,
    pub visibility_sm: Option<f64>,
    pub ceiling_restricted: bool,
    pub visibility_restricted: bool,
    pub active_runway: Option<String>,
    pub runway_winds: Vec<RunwayWind>,
}

fn runway_heading(ident: &str) -> Option<f64> {
    let lrc: &[_] = &['L', 'R', 'C'];
    match ident.trim_matches(lrc).parse::<f64>() {
        Ok(dir) => Some(dir * 10.0), // e.g. 04 to 040
        Err(_) => {
            log::error!("Error parsing runway: {}", ident);
            None
        }
    }
}

impl Airfield {
    pub fn active_runway(&self, wind_direction: f64) -> Option<&str> {
        for rwy in &self.runways {
            if let Some(heading) = runway_heading(rwy) {
                let phi = (wind_direction - heading).abs() % 360.0;
                let distance = if phi > 180.0 { 360.0 - phi } else { phi };
                if distance <= 90.0 {
                    return Some(rwy);
                }
            }
        }

        None
    }

    pub fn derive_conditions(&self, obs: &Observation, minimums: &Minimums) -> DerivedConditions {
        let temperature_f = celsius_to_fahrenheit(obs.temperature_c);
        let humidity = relative_humidity(obs.temperature_c, obs.dew_point_c);
        // chained on the derived values, so a station reporting only °C
        // still gets a heat index
        let heat_index_f = heat_index(temperature_f, humidity);

        let runway_winds = self
            .runways
            .iter()
            .map(|rwy| {
                let heading = runway_heading(rwy);
                RunwayWind {
                    runway: rwy.clone(),
                    heading,
                    crosswind: heading.and_then(|h| {
                        crosswind_component(obs.wind_direction, obs.wind_speed, h, obs.wind_gust)
                    }),
                }
            })
            .collect();

        DerivedConditions {
            station: obs.station.clone(),
            temperature_f,
            relative_humidity: humidity,
            heat_index_f,
            wind_speed_kt: effective_wind_speed(obs.wind_speed, obs.wind_gust),
            ceiling_ft: ceiling_agl(obs.cloud_ceiling),
            visibility_sm: obs.visibility,
            ceiling_restricted: is_ceiling_restricted(obs.cloud_ceiling, minimums.ceiling_ft),
            visibility_restricted: is_visibility_restricted(
                obs.visibility,
                minimums.visibility_sm,
            ),
            active_runway: obs
                .wind_direction
                .and_then(|dir| self.active_runway(dir))
                .map(String::from),
            runway_winds,
        }
    }
}
