//! Enumerate interfaces and the cameras attached to each one
//!
//! [`enumerate`] runs the full pass over a [`Session`]: list interfaces and all cameras, query each interface for its cameras and read their TL device nodes, then clear the lists and release the session. The result is an [`Enumeration`] which [`crate::display`] prints; no handle escapes the pass.
//!
//! ```
//! use camenum::backend::dump::{DumpTransport, SystemDump};
//! use camenum::enumeration::{self, Status};
//! use camenum::system::Session;
//!
//! let dump: SystemDump = serde_json::from_str(r#"{"interfaces": [{}]}"#).unwrap();
//! let session = Session::acquire(Box::new(DumpTransport::new(dump)));
//! let e = enumeration::enumerate(session).unwrap();
//! assert_eq!(e.interface_count, 1);
//! assert_eq!(e.camera_count, 0);
//! assert_eq!(e.status(), Status::NotEnoughCameras);
//! assert_eq!(e.status().exit_code(), -1);
//! ```
use serde::Serialize;

use crate::error::Result;
use crate::node::{self, NodeMap};
use crate::system::{self, Interface, LibraryVersion, Session};

/// Outcome of an enumeration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Every interface was queried without a reported failure
    Success,
    /// No interfaces or no cameras; interfaces were not queried
    NotEnoughCameras,
    /// At least one interface query reported a failure
    InterfaceFailure,
}

impl Status {
    /// Process exit code: 0 on success, -1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Success => 0,
            Status::NotEnoughCameras | Status::InterfaceFailure => -1,
        }
    }
}

/// TL device information of one camera on an interface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CameraInfo {
    /// Index within the interface camera list
    pub index: usize,
    /// `DeviceVendorName` if available and readable
    pub vendor_name: Option<String>,
    /// `DeviceModelName` if available and readable
    pub model_name: Option<String>,
    /// `DeviceSerialNumber` if available and readable
    pub serial_number: Option<String>,
}

impl CameraInfo {
    /// Read camera `index` from its TL device node map
    pub fn from_node_map(index: usize, node_map: &NodeMap) -> Self {
        CameraInfo {
            index,
            vendor_name: node::read_string_property(node_map, node::DEVICE_VENDOR_NAME),
            model_name: node::read_string_property(node_map, node::DEVICE_MODEL_NAME),
            serial_number: node::read_string_property(node_map, node::DEVICE_SERIAL_NUMBER),
        }
    }
}

/// Result of querying one interface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceInfo {
    /// Index within the interface list
    pub index: usize,
    /// `InterfaceDisplayName` if available and readable
    pub display_name: Option<String>,
    /// Interface node map was reached; false when the failure happened getting it
    #[serde(skip)]
    pub node_map_read: bool,
    /// Cameras on the interface after refresh
    pub cameras: Vec<CameraInfo>,
    /// Failure reported by the subsystem while querying
    pub error: Option<String>,
}

impl InterfaceInfo {
    fn new(index: usize) -> Self {
        InterfaceInfo {
            index,
            ..Default::default()
        }
    }

    /// Query reported a failure
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything found by [`enumerate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enumeration {
    /// Transport layer library name
    pub library_name: String,
    /// Transport layer library version
    pub library_version: LibraryVersion,
    /// Number of interfaces visible
    pub interface_count: usize,
    /// Number of cameras visible across all interfaces
    pub camera_count: usize,
    /// Per interface results, empty when [`Status::NotEnoughCameras`]
    pub interfaces: Vec<InterfaceInfo>,
}

impl Enumeration {
    /// Whether there were interfaces and cameras to query
    pub fn has_cameras(&self) -> bool {
        self.interface_count > 0 && self.camera_count > 0
    }

    /// Overall status of the pass
    pub fn status(&self) -> Status {
        if !self.has_cameras() {
            Status::NotEnoughCameras
        } else if self.interfaces.iter().any(|i| i.is_failed()) {
            Status::InterfaceFailure
        } else {
            Status::Success
        }
    }
}

fn read_interface<'a>(
    interface: &mut (dyn Interface + 'a),
    info: &mut InterfaceInfo,
) -> Result<()> {
    info.display_name =
        node::read_string_property(interface.tl_node_map()?, node::INTERFACE_DISPLAY_NAME);
    info.node_map_read = true;

    interface.update_cameras()?;
    let mut cameras = system::interface_cameras(interface)?;
    log::debug!("Interface {} has {} cameras", info.index, cameras.len());
    info.cameras = cameras
        .iter()
        .enumerate()
        .map(|(i, c)| CameraInfo::from_node_map(i, c.tl_device_node_map()))
        .collect();
    cameras.clear();

    Ok(())
}

/// Query interface `index`: read its display name, refresh and read its cameras
///
/// A failure reported by the subsystem is recorded in [`InterfaceInfo::error`] rather than returned so that the caller can continue with the remaining interfaces.
pub fn query_interface<'a>(index: usize, interface: &mut (dyn Interface + 'a)) -> InterfaceInfo {
    let mut info = InterfaceInfo::new(index);
    if let Err(e) = read_interface(interface, &mut info) {
        log::warn!("Failed to query interface {}: {}", index, e);
        info.error = Some(e.message().to_owned());
    }
    info
}

/// Enumerate all interfaces and cameras then release `session`
///
/// Interfaces are only queried when there is at least one interface and one camera. Every interface is queried even if an earlier one fails. Lists are cleared before the session is released on every path.
pub fn enumerate(session: Session) -> Result<Enumeration> {
    let mut enumeration = Enumeration {
        library_name: session.library_name().to_string(),
        library_version: session.library_version(),
        interface_count: 0,
        camera_count: 0,
        interfaces: Vec::new(),
    };

    {
        let mut interfaces = session.interfaces()?;
        let mut cameras = session.cameras()?;
        enumeration.interface_count = interfaces.len();
        enumeration.camera_count = cameras.len();
        log::info!(
            "Found {} interfaces and {} cameras",
            enumeration.interface_count,
            enumeration.camera_count
        );

        if enumeration.has_cameras() {
            let mut any_failed = false;
            for (index, interface) in interfaces.iter_mut().enumerate() {
                let info = query_interface(index, interface);
                any_failed |= info.is_failed();
                enumeration.interfaces.push(info);
            }
            if any_failed {
                log::warn!("One or more interfaces failed to query");
            }
        }

        cameras.clear();
        interfaces.clear();
    }

    session.release()?;

    Ok(enumeration)
}
