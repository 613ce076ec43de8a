//! `towerlens query`: fetch the towers inside one viewport.

use clap::Args;
use towerlens::app::{AppConfig, KnownStorage, TowerLensApp};
use towerlens::config::ConfigFile;
use towerlens::coordinator::FetchOutcome;
use towerlens::geo::ViewportBounds;
use towerlens::scheduler::CameraPosition;
use towerlens::tower::{QueryParams, RadioFilter};

use super::common::RadioArg;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Northern edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,

    /// Eastern edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Western edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,

    /// Map zoom level
    #[arg(long, default_value = "14")]
    pub zoom: f64,

    /// Only towers of this radio technology
    #[arg(long, value_enum)]
    pub radio: Option<RadioArg>,

    /// Mobile country code of the operator to show
    #[arg(long, requires = "mnc")]
    pub mcc: Option<u16>,

    /// Mobile network code of the operator to show
    #[arg(long, requires = "mcc")]
    pub mnc: Option<u16>,
}

impl QueryArgs {
    fn bounds(&self) -> Result<ViewportBounds, CliError> {
        if !(-90.0..=90.0).contains(&self.north) || !(-90.0..=90.0).contains(&self.south) {
            return Err(CliError::InvalidArgument(
                "latitudes must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.east) || !(-180.0..=180.0).contains(&self.west) {
            return Err(CliError::InvalidArgument(
                "longitudes must be between -180 and 180".to_string(),
            ));
        }
        if self.north <= self.south {
            return Err(CliError::InvalidArgument(
                "north must be greater than south".to_string(),
            ));
        }
        if self.east <= self.west {
            return Err(CliError::InvalidArgument(
                "east must be greater than west".to_string(),
            ));
        }
        Ok(ViewportBounds::new(self.north, self.south, self.east, self.west))
    }

    fn params(&self, source: &str) -> QueryParams {
        let mut params = QueryParams::default().with_source(source);
        if let Some(radio) = self.radio {
            params = params.with_radio(RadioFilter::Only(radio.into()));
        }
        if let (Some(mcc), Some(mnc)) = (self.mcc, self.mnc) {
            params = params.with_operator(mcc, mnc);
        }
        params
    }
}

pub async fn run(args: QueryArgs, config: &ConfigFile) -> Result<(), CliError> {
    let camera = CameraPosition::new(args.bounds()?, args.zoom);
    let app_config = AppConfig::from_config_file(config)
        .with_query_params(args.params(&config.backend.source))
        .with_known_storage(KnownStorage::Memory);

    let app = TowerLensApp::start(app_config).await?;
    let outcome = app.on_camera_idle(camera).await;
    app.shutdown();

    match outcome {
        FetchOutcome::Fetched { .. } => {}
        FetchOutcome::TooZoomedOut => {
            println!("Viewport too large to query; zoom in or narrow the bounds.");
            return Ok(());
        }
        other => return Err(CliError::QueryFailed(other.to_string())),
    }

    let towers = app.coordinator().current_entities();
    if towers.is_empty() {
        println!("No towers in this area.");
        return Ok(());
    }

    println!("{:<5} {:<22} {:>10} {:>11} {:>8}", "RADIO", "CELL", "LAT", "LON", "RANGE");
    for tower in towers.iter() {
        let range = tower
            .range_m
            .map(|r| format!("{:.0}m", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<5} {:<22} {:>10.5} {:>11.5} {:>8}",
            tower.radio.to_string(),
            tower.identity.to_string(),
            tower.position.lat,
            tower.position.lon,
            range
        );
    }
    println!();
    println!("{} towers", towers.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerlens::tower::RadioTech;

    fn args() -> QueryArgs {
        QueryArgs {
            north: 47.7,
            south: 47.6,
            east: -122.2,
            west: -122.3,
            zoom: 14.0,
            radio: None,
            mcc: None,
            mnc: None,
        }
    }

    #[test]
    fn test_bounds_validation() {
        assert!(args().bounds().is_ok());

        let mut inverted = args();
        inverted.north = 47.5;
        assert!(matches!(inverted.bounds(), Err(CliError::InvalidArgument(_))));

        let mut off_world = args();
        off_world.east = 190.0;
        assert!(off_world.bounds().is_err());
    }

    #[test]
    fn test_params_from_args() {
        let mut a = args();
        a.radio = Some(RadioArg::Lte);
        a.mcc = Some(310);
        a.mnc = Some(260);

        let params = a.params("survey");
        assert_eq!(params.radio, RadioFilter::Only(RadioTech::Lte));
        assert_eq!(params.operator.map(|o| (o.mcc, o.mnc)), Some((310, 260)));
        assert_eq!(params.source, "survey");
    }
}
