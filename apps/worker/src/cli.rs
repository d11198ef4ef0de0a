use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "worker", version, about = "Fuzzing swarm worker agent")]
pub struct Cli {
    /// Optional path to a config file; currently unused beyond validating it exists,
    /// kept for parity with the CLI surface operators expect.
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    #[arg(long, env = "WORKER_ID")]
    pub worker_id: Option<String>,

    #[arg(long, env = "REDIS_HOST", default_value = "localhost")]
    pub redis_host: String,

    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    pub redis_port: u16,

    #[arg(long, env = "REDIS_PASSWORD")]
    pub redis_password: Option<String>,

    #[arg(long, env = "WORKER_THREADS", default_value_t = 10)]
    pub threads: u32,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Name of the fuzzer executable to invoke.
    #[arg(long, env = "FUZZER_BINARY", default_value = "ffuf")]
    pub fuzzer_binary: String,
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

    pub fn resolved_worker_id(&self) -> String {
        self.worker_id.clone().unwrap_or_else(|| {
            let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "worker".to_string());
            format!("{hostname}-{}", &uuid_like_suffix())
        })
    }
}

fn uuid_like_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:x}", nanos & 0xffff_ffff)
}
