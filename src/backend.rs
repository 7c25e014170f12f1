//! [`crate::system::TransportLayer`] implementations
//!
//! [`dump`] replays a system from JSON and is always available. [`usb`] discovers USB3 Vision cameras natively and requires the 'native' feature.
use crate::error::{Error, ErrorKind, Result};
use crate::system::TransportLayer;

pub mod dump;
#[cfg(feature = "native")]
pub mod usb;

/// Transport layer for the running system
///
/// Uses [`usb::UsbTransport`] when the 'native' feature is enabled, otherwise returns [`crate::error::ErrorKind::Unsupported`].
pub fn system_transport() -> Result<Box<dyn TransportLayer>> {
    #[cfg(feature = "native")]
    {
        Ok(Box::new(usb::UsbTransport::new()))
    }

    #[cfg(not(feature = "native"))]
    {
        Err(Error::new(
            ErrorKind::Unsupported,
            "camenum built without 'native' feature; only --from-json is supported",
        ))
    }
}

/// Transport layer replaying `file_path` if supplied, otherwise [`system_transport`]
pub fn get_transport(from_json: Option<&str>) -> Result<Box<dyn TransportLayer>> {
    match from_json {
        Some(path) if path.trim().is_empty() => Err(Error::new(
            ErrorKind::InvalidArg,
            "--from-json requires a dump file path",
        )),
        Some(path) => Ok(Box::new(dump::DumpTransport::from_file(path)?)),
        None => system_transport(),
    }
}
