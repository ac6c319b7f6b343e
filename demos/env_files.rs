//! Loading variables from env files before binding

use envarfig::{EnvBind, Settings};
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Debug, Default, EnvBind)]
struct Config {
    #[env("API_KEY,required")]
    pub api_key: String,

    #[env("DATABASE_HOST,default=localhost")]
    pub database_host: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("envarfig=debug"))
        .init();

    let mut env_file = NamedTempFile::new()?;
    writeln!(env_file, "API_KEY=super_secret_api_key_12345")?;
    writeln!(env_file, "DATABASE_HOST=db.internal")?;

    // Variables already set in the process win over the file
    std::env::set_var("DATABASE_HOST", "db.override");

    let settings = Settings::default().with_env_files([env_file.path()]);
    let mut config = Config::default();
    envarfig::bind(&mut config, &settings)?;

    println!("Configuration loaded from env file:");
    println!("  API Key: {}", config.api_key);
    println!("  Database Host: {}", config.database_host);

    Ok(())
}
