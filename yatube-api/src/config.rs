use serde::Deserialize;
use std::{net::IpAddr, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, warn};
use yatube_common::pagination::PageSize;
use yatube_db::{
    client::DbClient,
    memory::MemoryStore,
    store::{ContentStore, StoreError},
};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error connecting to the database: {0}")]
    Store(#[from] StoreError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn default_database_max_connections() -> u32 {
    5
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Env {
    pub server_address: IpAddr,
    pub server_port: u16,
    /// Page size of every post listing.
    #[serde(default)]
    pub posts_on_page: PageSize,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
}

pub fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

pub async fn connect_store(env: &Env) -> Result<Arc<dyn ContentStore>, InitError> {
    match &env.database_url {
        Some(url) => {
            let client = DbClient::connect(url, env.database_max_connections).await?;
            info!("Connected to database");
            Ok(Arc::new(client))
        }
        None => {
            warn!("DATABASE_URL is not set, content is kept in memory and lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
