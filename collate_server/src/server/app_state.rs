use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::{config::Config, consts::DEFAULT_CONFIG_PATH, database::Database};

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub database: Database,
}

impl AppState {
    pub async fn try_new(config_path: Option<&OsStr>) -> Result<Self> {
        let path = config_path.map_or_else(
            || PathBuf::from(DEFAULT_CONFIG_PATH),
            |path| Path::new(path).to_path_buf(),
        );

        let config = Config::read_or_create(&path).await?;
        let database = Database::try_new(&config.database).await?;

        Ok(Self { config, database })
    }
}
