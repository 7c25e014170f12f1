//! List machine vision transport-layer interfaces and the cameras attached to them.
//!
//! A [`system::Session`] over a [`system::TransportLayer`] gives interface and camera lists; [`enumeration::enumerate`] walks them reading TL node maps with [`node::read_string_property`] and [`display`] prints the result. The native backend discovers USB3 Vision cameras with nusb; [`backend::dump`] replays a system from JSON.
#![warn(missing_docs)]
use simple_logger::SimpleLogger;

pub mod backend;
pub mod colour;
pub mod config;
pub mod display;
pub mod enumeration;
pub mod error;
pub mod node;
pub mod system;

/// Set camenum module and binary log level
pub fn set_log_level(debug: u8) -> crate::error::Result<()> {
    match debug {
        // just use env if not passed
        0 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Error.to_level_filter())
            .env(),
        1 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Info.to_level_filter()),
        2 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Debug.to_level_filter()),
        _ => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Trace.to_level_filter()),
    }
    .init()
    .map_err(|e| {
        crate::error::Error::new(
            crate::error::ErrorKind::Other("simple_logger"),
            &format!("Failed to set log level: {}", e),
        )
    })?;

    Ok(())
}
