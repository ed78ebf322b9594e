//! Blocking client for the Panasonic Comfort Cloud service.
//!
//! ```no_run
//! use comfort_cloud::client::ComfortCloudClient;
//!
//! # fn main() -> Result<(), comfort_cloud::error::ClientError> {
//! let mut client = ComfortCloudClient::new("");
//! client.login("username", "password")?;
//! let devices = client.list_devices()?;
//! let status = client.get_device_status(&devices[0])?;
//! println!("{}", status.parameters.inside_temperature);
//! client.set_temperature(&devices[0], 19.5)?;
//! # Ok(())
//! # }
//! ```

pub mod models {
    pub mod command;
    pub mod comfort_cloud;
}

pub mod cli;
pub mod client;
pub mod config;
pub mod decode;
pub mod directory;
pub mod error;
pub mod session;
pub mod transport;
