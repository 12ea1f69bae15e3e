pub const KNOTS_PER_MPH: f64 = 0.868976;

// upstream snapshot sentinel for clear skies / no ceiling reported
pub const NO_CEILING: f64 = 99_999.0;

pub const DEFAULT_MIN_CEILING_FT: f64 = 1_500.0;
pub const DEFAULT_MIN_VISIBILITY_SM: f64 = 3.0;

// saturation vapor pressure in hPa (simplified Magnus form), see
// https://www.wpc.ncep.noaa.gov/html/temp2humid.shtml
fn vapor_pressure(temperature_c: f64) -> f64 {
    6.1078 * ((17.27 * temperature_c) / (temperature_c + 237.3)).exp()
}

// not clamped to [0, 100]: a dew point above the temperature yields more
// than 100%, which callers are expected to tolerate
pub fn relative_humidity(temperature_c: Option<f64>, dew_point_c: Option<f64>) -> Option<f64> {
    let t = temperature_c?;
    let dp = dew_point_c?;
    Some(vapor_pressure(dp) / vapor_pressure(t) * 100.0)
}

// Steadman regression as published by NOAA, see
// https://www.wpc.ncep.noaa.gov/html/heatindex_formula.shtml
pub fn heat_index(temperature_f: Option<f64>, relative_humidity: Option<f64>) -> Option<f64> {
    let t = temperature_f?;
    if t < 80.0 {
        // heat index is the same as the temperature below 80 °F
        return Some(t);
    }
    let rh = relative_humidity?;

    Some(
        -42.379 + 2.04901523 * t + 10.14333127 * rh
            - 0.22475541 * t * rh
            - 0.00683783 * t * t
            - 0.05481717 * rh * rh
            + 0.00122874 * t * t * rh
            + 0.00085282 * t * rh * rh
            - 0.00000199 * t * t * rh * rh,
    )
}

pub fn celsius_to_fahrenheit(celsius: Option<f64>) -> Option<f64> {
    celsius.map(|c| c * 9.0 / 5.0 + 32.0)
}

pub fn mph_to_knots(mph: Option<f64>) -> Option<f64> {
    mph.map(|v| v * KNOTS_PER_MPH)
}

pub fn knots_to_mph(knots: Option<f64>) -> Option<f64> {
    knots.map(|v| v / KNOTS_PER_MPH)
}

// a gust only counts if it is actually reported above zero, and it only
// overrides the steady wind when it is the stronger of the two
pub fn effective_wind_speed(speed: Option<f64>, gust: Option<f64>) -> Option<f64> {
    let gust = gust.filter(|g| *g > 0.0);
    match (speed, gust) {
        (None, None) => None,
        (None, Some(g)) => Some(g),
        (Some(s), Some(g)) if g > s => Some(g),
        (Some(s), _) => Some(s),
    }
}

// unsigned magnitude of the wind component perpendicular to the runway,
// in the same unit as the wind speed
pub fn crosswind_component(
    wind_direction: Option<f64>,
    wind_speed: Option<f64>,
    runway_heading: f64,
    wind_gust: Option<f64>,
) -> Option<f64> {
    let dir = wind_direction?;
    let speed = effective_wind_speed(wind_speed, wind_gust)?;

    let phi = (dir - runway_heading).abs() % 360.0;
    let angle = if phi > 180.0 { 360.0 - phi } else { phi };

    Some(speed * angle.to_radians().sin())
}

pub fn ceiling_agl(ceiling_ft: Option<f64>) -> Option<f64> {
    // heights are already above ground level, only the sentinel is filtered
    ceiling_ft.filter(|c| *c < NO_CEILING)
}

pub fn is_ceiling_restricted(ceiling_ft: Option<f64>, minimum_ft: f64) -> bool {
    ceiling_agl(ceiling_ft).map_or(false, |c| c < minimum_ft)
}

pub fn is_visibility_restricted(visibility_sm: Option<f64>, minimum_sm: f64) -> bool {
    visibility_sm.map_or(false, |v| v < minimum_sm)
}
