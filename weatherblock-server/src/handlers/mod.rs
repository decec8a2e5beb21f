mod admin;
mod health;
mod weather;

pub use admin::{clear_credential, set_credential};
pub use health::health_check;
pub use weather::get_weather;
