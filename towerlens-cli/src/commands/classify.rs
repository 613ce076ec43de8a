//! `towerlens classify`: is an observed tower new?

use clap::Args;
use towerlens::app::{AppConfig, TowerLensApp};
use towerlens::config::ConfigFile;
use towerlens::tower::TowerKey;

use super::common::RadioArg;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Radio technology of the serving cell
    #[arg(long, value_enum)]
    pub radio: RadioArg,

    /// Mobile country code
    #[arg(long)]
    pub mcc: u16,

    /// Mobile network code
    #[arg(long)]
    pub mnc: u16,

    /// Location / tracking area code
    #[arg(long)]
    pub area: u32,

    /// Cell identity
    #[arg(long)]
    pub cell: u64,
}

impl ClassifyArgs {
    pub fn key(&self) -> TowerKey {
        TowerKey::new(self.radio.into(), self.mcc, self.mnc, self.area, self.cell)
    }
}

pub async fn run(args: ClassifyArgs, config: &ConfigFile) -> Result<(), CliError> {
    let key = args.key();
    if !key.is_plausible() {
        tracing::warn!(tower = %key, "Identity looks like a modem placeholder");
    }

    let app = TowerLensApp::start(AppConfig::from_config_file(config)).await?;
    let classification = app.classify_tower(key).await;
    app.shutdown();

    println!("{}", classification);
    Ok(())
}
