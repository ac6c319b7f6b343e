//! Sequences, arrays, maps and raw byte strings

use envarfig::{Complex, EnvBind, Opaque, Settings};
use std::collections::HashMap;

#[derive(Debug, Default, EnvBind)]
struct Config {
    // Exactly two ports, separated by ';'
    #[env("PORTS,delimiter=';'")]
    pub ports: [u16; 2],

    // Any number of hosts
    #[env("ALLOWED_HOSTS,default='localhost'")]
    pub allowed_hosts: Vec<String>,

    // Key/value pairs
    #[env("RATE_LIMITS")]
    pub rate_limits: HashMap<String, u32>,

    // Raw bytes instead of a list of numbers
    #[env("SIGNING_KEY,isstring")]
    pub signing_key: Vec<u8>,

    #[env("CALIBRATION")]
    pub calibration: Complex<f64>,

    // Stored as text
    #[env("EXTRA")]
    pub extra: Opaque,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("PORTS", "8080;9090");
    std::env::set_var("RATE_LIMITS", "{search:100, upload:5}");
    std::env::set_var("SIGNING_KEY", "s3cr3t,with,commas");
    std::env::set_var("CALIBRATION", "0.5 - 1.25i");
    std::env::set_var("EXTRA", "anything");

    let mut config = Config::default();
    envarfig::bind(&mut config, &Settings::default().with_auto_load_env(false))?;

    println!("Ports: {:?}", config.ports);
    println!("Allowed hosts: {:?}", config.allowed_hosts);
    println!("Rate limits: {:?}", config.rate_limits);
    println!("Signing key: {} bytes", config.signing_key.len());
    println!("Calibration: {}", config.calibration);
    println!("Extra: {}", config.extra);

    // Wrong number of ports
    std::env::set_var("PORTS", "8080;9090;1");
    if let Err(e) = envarfig::bind(&mut config, &Settings::default().with_auto_load_env(false)) {
        println!("Error: {e}");
    }

    Ok(())
}
