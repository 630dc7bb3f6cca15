use std::{
  env::{self, VarError},
  fmt::Display,
  str::FromStr,
  time::Duration,
};

use libreclaim::prelude::*;

use crate::api::errors::AppError;

#[derive(Clone)]
pub struct Config {
  pub env: Env,
  pub listen_addr: String,
  pub api_key: Option<String>,

  // Extraction settings
  pub raster_side: u32,
  pub palette_size: usize,
  pub palette_stride: usize,
  pub edge_threshold: f64,
  pub extraction_concurrency: usize,
  pub decode_timeout: Duration,
  pub max_image_bytes: usize,
  pub enable_cache: bool,
  pub cache_capacity: usize,

  // Match settings
  pub max_candidates: usize,
  pub allow_internal_urls: bool,

  // Debugging
  pub enable_tracing: bool,
  pub enable_prometheus: bool,
}

impl Default for Config {
  fn default() -> Self {
    let reclaim = ReclaimConfig::default();

    Config {
      env: Env::Dev,
      listen_addr: "0.0.0.0:8000".into(),
      api_key: None,
      raster_side: reclaim.side,
      palette_size: reclaim.descriptor.palette_size,
      palette_stride: reclaim.descriptor.palette_stride,
      edge_threshold: reclaim.descriptor.edge_threshold,
      extraction_concurrency: reclaim.concurrency,
      decode_timeout: reclaim.decode_timeout,
      max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
      enable_cache: false,
      cache_capacity: 1024,
      max_candidates: 100,
      allow_internal_urls: false,
      enable_tracing: false,
      enable_prometheus: false,
    }
  }
}

impl Config {
  pub async fn from_env() -> Result<Config, AppError> {
    let defaults = Config::default();

    let config = Config {
      env: Env::from(env::var("ENV").unwrap_or("dev".into())),
      listen_addr: env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
      api_key: env::var("API_KEY").ok().filter(|key| !key.is_empty()),
      raster_side: parse_env("RASTER_SIDE", defaults.raster_side)?,
      palette_size: parse_env("PALETTE_SIZE", defaults.palette_size)?,
      palette_stride: parse_env("PALETTE_STRIDE", defaults.palette_stride)?,
      edge_threshold: parse_env("EDGE_THRESHOLD", defaults.edge_threshold)?,
      extraction_concurrency: parse_env("EXTRACTION_CONCURRENCY", defaults.extraction_concurrency)?,
      decode_timeout: Duration::from_millis(parse_env("DECODE_TIMEOUT_MS", defaults.decode_timeout.as_millis() as u64)?),
      max_image_bytes: parse_env("MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
      enable_cache: env::var("ENABLE_CACHE").unwrap_or_default() == "1",
      cache_capacity: parse_env("CACHE_CAPACITY", defaults.cache_capacity)?,
      max_candidates: parse_env("MAX_CANDIDATES", defaults.max_candidates)?,
      allow_internal_urls: env::var("ALLOW_INTERNAL_URLS").unwrap_or_default() == "1",
      enable_tracing: env::var("ENABLE_TRACING").unwrap_or_default() == "1",
      enable_prometheus: env::var("ENABLE_PROMETHEUS").unwrap_or_default() == "1",
    };

    if config.max_candidates == 0 {
      return Err(AppError::ConfigError("MAX_CANDIDATES must be at least 1".into()));
    }

    Ok(config)
  }

  pub fn reclaim_config(&self) -> ReclaimConfig {
    ReclaimConfig::builder()
      .side(self.raster_side)
      .descriptor(DescriptorParams {
        palette_size: self.palette_size,
        palette_stride: self.palette_stride,
        edge_threshold: self.edge_threshold,
      })
      .concurrency(self.extraction_concurrency)
      .decode_timeout(self.decode_timeout)
      .maybe_cache_capacity(self.enable_cache.then_some(self.cache_capacity))
      .build()
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Env {
  Dev,
  Production,
}

impl From<String> for Env {
  fn from(value: String) -> Self {
    match value.as_ref() {
      "dev" => Env::Dev,
      "production" => Env::Production,
      _ => Env::Dev,
    }
  }
}

pub fn parse_env<T>(name: &str, default: T) -> anyhow::Result<T>
where
  T: FromStr,
  T::Err: Display,
{
  match env::var(name) {
    Ok(value) if value.is_empty() => Ok(default),
    Ok(value) => Ok(value.parse::<T>().map_err(|err| AppError::ConfigError(format!("could not read {name}: {err}")))?),
    Err(err) => match err {
      VarError::NotPresent => Ok(default),
      _ => Err(AppError::ConfigError(format!("could not read {name}: {err}")).into()),
    },
  }
}

#[cfg(test)]
mod tests {
  use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    time::Duration,
  };

  use super::{Config, Env};

  const VARS: &[&str] = &[
    "ENV",
    "LISTEN_ADDR",
    "API_KEY",
    "RASTER_SIDE",
    "PALETTE_STRIDE",
    "EXTRACTION_CONCURRENCY",
    "DECODE_TIMEOUT_MS",
    "ENABLE_CACHE",
    "CACHE_CAPACITY",
    "MAX_CANDIDATES",
    "ALLOW_INTERNAL_URLS",
    "ENABLE_TRACING",
    "ENABLE_PROMETHEUS",
  ];

  fn reset() {
    unsafe {
      for var in VARS {
        env::remove_var(var);
      }
    }
  }

  #[serial_test::serial]
  #[tokio::test]
  async fn parse_config_from_env() {
    unsafe {
      env::set_var("ENV", "production");
      env::set_var("LISTEN_ADDR", "0.0.0.0:8080");
      env::set_var("API_KEY", "secret");
      env::set_var("RASTER_SIDE", "32");
      env::set_var("PALETTE_STRIDE", "1");
      env::set_var("EXTRACTION_CONCURRENCY", "2");
      env::set_var("DECODE_TIMEOUT_MS", "250");
      env::set_var("ENABLE_CACHE", "1");
      env::set_var("CACHE_CAPACITY", "10");
      env::set_var("MAX_CANDIDATES", "20");
      env::set_var("ALLOW_INTERNAL_URLS", "1");
      env::set_var("ENABLE_TRACING", "1");
    }

    let config = Config::from_env().await.unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.listen_addr, "0.0.0.0:8080");
    assert_eq!(config.api_key, Some("secret".to_string()));
    assert_eq!(config.raster_side, 32);
    assert_eq!(config.max_candidates, 20);
    assert_eq!(config.allow_internal_urls, true);
    assert_eq!(config.enable_tracing, true);
    assert_eq!(config.enable_prometheus, false);

    let reclaim = config.reclaim_config();

    assert_eq!(reclaim.side, 32);
    assert_eq!(reclaim.descriptor.palette_stride, 1);
    assert_eq!(reclaim.concurrency, 2);
    assert_eq!(reclaim.decode_timeout, Duration::from_millis(250));
    assert_eq!(reclaim.cache_capacity, Some(10));

    reset();
  }

  #[serial_test::serial]
  #[tokio::test]
  async fn default_config() {
    reset();

    let config = Config::from_env().await.unwrap();

    assert_eq!(config.env, Env::Dev);
    assert_eq!(config.api_key, None);
    assert_eq!(config.max_candidates, 100);
    assert_eq!(config.allow_internal_urls, false);
    assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
    assert_eq!(config.reclaim_config().cache_capacity, None);
    assert_eq!(config.reclaim_config().side, 64);
  }

  #[serial_test::serial]
  #[tokio::test]
  async fn invalid_config() {
    unsafe {
      env::set_var("MAX_CANDIDATES", "0");
    }

    assert!(matches!(Config::from_env().await, Err(_)));

    unsafe {
      env::set_var("MAX_CANDIDATES", "many");
    }

    assert!(matches!(Config::from_env().await, Err(_)));

    reset();
  }

  #[tokio::test]
  #[serial_test::serial]
  async fn parse_env() {
    unsafe {
      env::set_var("INT", "42");
      env::set_var("BOOL", "true");
      env::set_var("IP", "1.2.3.4");
    }

    assert_eq!(super::parse_env::<u32>("INT", 0).unwrap(), 42);
    assert_eq!(super::parse_env::<bool>("BOOL", true).unwrap(), true);
    assert_eq!(super::parse_env::<IpAddr>("IP", IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))).unwrap(), IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)));
    assert_eq!(super::parse_env::<u32>("UNSET_VARIABLE", 7).unwrap(), 7);

    assert!(matches!(super::parse_env::<u32>("BOOL", 0), Err(_)));
  }
}
