use clap::Parser;
use std::net::SocketAddr;

/// Demo server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "crudrest")]
#[command(about = "REST CRUD endpoints over the demo catalog")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CRUDREST_BIND", default_value = "127.0.0.1:18080")]
    pub bind_addr: SocketAddr,

    /// Start with an empty store
    #[arg(long, env = "CRUDREST_NO_SEED", default_value_t = false)]
    pub no_seed: bool,

    /// Tracing filter used when `RUST_LOG` is unset
    #[arg(long, env = "CRUDREST_LOG", default_value = "crudrest=debug,tower_http=info")]
    pub log_filter: String,
}

impl ServerConfig {
    /// Set the bind address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Skip demo data
    pub fn no_seed(mut self, no_seed: bool) -> Self {
        self.no_seed = no_seed;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 18080)),
            no_seed: false,
            log_filter: "crudrest=debug,tower_http=info".to_string(),
        }
    }
}
