//! Core library for the Weather Block service.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The OpenWeatherMap client behind the [`CurrentWeather`] seam
//! - The transient store, snapshot cache and per-client rate limiter
//! - [`WeatherService`], the cache-aside fetch composition consumed by
//!   every adapter surface
//!
//! It is used by `weatherblock-server` and `weatherblock-cli`, but can be
//! reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod rate;
pub mod service;
pub mod transient;

pub use cache::SnapshotCache;
pub use config::Config;
pub use error::WeatherError;
pub use model::{WeatherSnapshot, normalize_city};
pub use provider::{CurrentWeather, OpenWeatherClient, client_from_config};
pub use rate::{RateDecision, RateLimiter};
pub use service::WeatherService;
pub use transient::{MemoryTransients, TransientStore};
