//! Geographic math for viewport reasoning.
//!
//! Pure functions over latitude/longitude points and rectangular viewport
//! bounds. Nothing here allocates or fails; degenerate inputs produce
//! well-defined numeric results documented on each function.

mod types;

pub use types::{LatLon, ViewportBounds};

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default tolerance for [`bounds_approx_equal`] in degrees (~11 m at the equator).
pub const DEFAULT_BOUNDS_TOLERANCE_DEG: f64 = 1e-4;

/// Great-circle distance between two points in meters.
#[inline]
pub fn haversine_distance_m(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h marginally past 1.0 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Approximate viewport area in square meters.
///
/// Squares the haversine length of the south-west to north-east diagonal.
/// This over-estimates the true area and is only meant for the
/// "zoomed out too far" gate, never for real geometry.
pub fn approx_area_sq_m(bounds: &ViewportBounds) -> f64 {
    let diagonal = haversine_distance_m(bounds.south_west(), bounds.north_east());
    diagonal * diagonal
}

/// Largest relative change between two viewports, as a fraction (0.2 == 20%).
///
/// Takes the maximum of the center latitude shift, center longitude shift,
/// latitude span delta and longitude span delta, each divided by the
/// corresponding span of `old`.
///
/// A component whose old span is zero cannot be normalised. If that
/// component did not move it contributes `0.0`; otherwise the result is
/// `f64::INFINITY` so callers treat the viewport as changed.
pub fn bounds_change_percent(old: &ViewportBounds, new: &ViewportBounds) -> f64 {
    let (old_lat, old_lon) = old.center();
    let (new_lat, new_lon) = new.center();
    let old_lat_span = old.lat_span();
    let old_lon_span = old.lon_span();

    let components = [
        ((new_lat - old_lat).abs(), old_lat_span),
        ((new_lon - old_lon).abs(), old_lon_span),
        ((new.lat_span() - old_lat_span).abs(), old_lat_span),
        ((new.lon_span() - old_lon_span).abs(), old_lon_span),
    ];

    components
        .iter()
        .map(|&(delta, span)| normalised(delta, span))
        .fold(0.0, f64::max)
}

fn normalised(delta: f64, span: f64) -> f64 {
    if span > 0.0 {
        delta / span
    } else if delta == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

/// True when all four edges of `a` and `b` differ by less than `tolerance_deg`.
pub fn bounds_approx_equal(a: &ViewportBounds, b: &ViewportBounds, tolerance_deg: f64) -> bool {
    (a.north - b.north).abs() < tolerance_deg
        && (a.south - b.south).abs() < tolerance_deg
        && (a.east - b.east).abs() < tolerance_deg
        && (a.west - b.west).abs() < tolerance_deg
}
