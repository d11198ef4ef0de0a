use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "coordinator",
    version,
    about = "Distributed controller for the fuzzing swarm"
)]
pub struct Cli {
    #[arg(long, env = "REDIS_HOST", default_value = "localhost")]
    pub redis_host: String,

    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    pub redis_port: u16,

    #[arg(long, env = "REDIS_PASSWORD")]
    pub redis_password: Option<String>,

    #[arg(long, env = "DB_PATH", default_value = "ffuf_coordinator.db")]
    pub db_path: String,

    #[arg(long, env = "TURSO_AUTH_TOKEN")]
    pub db_auth_token: Option<String>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}",
                password, self.redis_host, self.redis_port
            ),
            None => format!("redis://{}:{}", self.redis_host, self.redis_port),
        }
    }
}
