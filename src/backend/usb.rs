//! Native USB3 Vision discovery using nusb (pure Rust). Requires 'native' feature.
//!
//! Each USB bus carrying a device is an interface. A camera is any device with a USB3 Vision interface (class 0xEF, subclass 0x05); no control channel is opened so only what the OS already knows about the device is published in the TL device node map.
use ::nusb;
use usb_ids::{self, FromId};

use crate::error::{Error, ErrorKind, Result};
use crate::node::{self, Node, NodeMap};
use crate::system::{Camera, Interface, LibraryVersion, TransportLayer};

/// Miscellaneous device class, used by USB3 Vision
pub const U3V_CLASS: u8 = 0xEF;
/// USB3 Vision subclass within [`U3V_CLASS`]
pub const U3V_SUBCLASS: u8 = 0x05;

/// Whether a USB interface class/subclass pair is USB3 Vision
pub fn is_u3v_interface(class: u8, subclass: u8) -> bool {
    class == U3V_CLASS && subclass == U3V_SUBCLASS
}

fn is_u3v_device(device_info: &nusb::DeviceInfo) -> bool {
    device_info
        .interfaces()
        .any(|i| is_u3v_interface(i.class(), i.subclass()))
}

/// Node for a descriptor string; published unreadable when the OS could not read it
fn string_node(name: &str, value: Option<String>) -> Node {
    match value {
        Some(v) => Node::new(name, v),
        None => Node::unreadable(name),
    }
}

/// Interface TL node map for bus `bus_id`
pub fn bus_node_map(bus_id: &str) -> NodeMap {
    NodeMap::new()
        .with(Node::new(node::INTERFACE_ID, bus_id))
        .with(Node::new(
            node::INTERFACE_DISPLAY_NAME,
            format!("USB3 Vision bus {}", bus_id),
        ))
        .with(Node::new(node::INTERFACE_TYPE, "U3V"))
}

/// Descriptor details of a USB device the TL device node map is built from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceDescriptor {
    /// iManufacturer string if the OS could read it
    pub manufacturer: Option<String>,
    /// iProduct string if the OS could read it
    pub product: Option<String>,
    /// iSerialNumber string if the OS could read it
    pub serial: Option<String>,
    /// idVendor
    pub vendor_id: u16,
    /// idProduct
    pub product_id: u16,
    /// Bus number
    pub bus: u8,
    /// Device address on the bus
    pub address: u8,
}

impl From<&nusb::DeviceInfo> for DeviceDescriptor {
    fn from(device_info: &nusb::DeviceInfo) -> Self {
        DeviceDescriptor {
            manufacturer: device_info.manufacturer_string().map(|s| s.to_string()),
            product: device_info.product_string().map(|s| s.to_string()),
            serial: device_info.serial_number().map(|s| s.to_string()),
            vendor_id: device_info.vendor_id(),
            product_id: device_info.product_id(),
            bus: device_info.bus_number(),
            address: device_info.device_address(),
        }
    }
}

fn vendor_name(vid: u16) -> Option<String> {
    usb_ids::Vendor::from_id(vid).map(|v| v.name().to_string())
}

fn model_name(vid: u16, pid: u16) -> Option<String> {
    usb_ids::Device::from_vid_pid(vid, pid)
        .map(|d| d.name().to_string())
}

/// TL device node map for a USB3 Vision device
///
/// Vendor and model fall back to the usb-ids database when the descriptor strings are missing; anything still unknown is published unreadable.
pub fn device_node_map(descriptor: &DeviceDescriptor) -> NodeMap {
    let vid = descriptor.vendor_id;
    let pid = descriptor.product_id;

    let vendor = descriptor.manufacturer.clone().or_else(|| vendor_name(vid));
    let model = descriptor.product.clone().or_else(|| model_name(vid, pid));

    NodeMap::new()
        .with(string_node(node::DEVICE_VENDOR_NAME, vendor))
        .with(string_node(node::DEVICE_MODEL_NAME, model))
        .with(string_node(node::DEVICE_SERIAL_NUMBER, descriptor.serial.clone()))
        .with(Node::new(
            node::DEVICE_ID,
            format!("{}-{}", descriptor.bus, descriptor.address),
        ))
        .with(Node::new(node::DEVICE_VENDOR_ID, vid as i64))
        .with(Node::new(node::DEVICE_PRODUCT_ID, pid as i64))
        .with(Node::new(node::DEVICE_TYPE, "U3V"))
}

fn list_devices() -> Result<impl Iterator<Item = nusb::DeviceInfo>> {
    nusb::list_devices().map_err(|e| {
        Error::new(
            ErrorKind::Nusb,
            &format!("Failed to list USB devices: {}", e),
        )
    })
}

/// (bus number, node map) of every USB3 Vision device currently attached
fn list_u3v_devices() -> Result<Vec<(String, NodeMap)>> {
    let mut cameras = Vec::new();
    for device_info in list_devices()? {
        log::trace!("Checking {:?}", device_info);
        if is_u3v_device(&device_info) {
            let descriptor = DeviceDescriptor::from(&device_info);
            log::debug!(
                "Found U3V device {:04x}:{:04x} on bus {}",
                descriptor.vendor_id,
                descriptor.product_id,
                descriptor.bus
            );
            cameras.push((descriptor.bus.to_string(), device_node_map(&descriptor)));
        }
    }

    Ok(cameras)
}

#[derive(Debug)]
struct UsbCamera {
    node_map: NodeMap,
}

impl Camera for UsbCamera {
    fn tl_device_node_map(&self) -> &NodeMap {
        &self.node_map
    }
}

#[derive(Debug)]
struct UsbBus {
    bus_id: String,
    node_map: NodeMap,
    cameras: Vec<NodeMap>,
}

impl Interface for UsbBus {
    fn tl_node_map(&self) -> Result<&NodeMap> {
        Ok(&self.node_map)
    }

    fn update_cameras(&mut self) -> Result<()> {
        self.cameras = list_u3v_devices()?
            .into_iter()
            .filter(|(bus_id, _)| *bus_id == self.bus_id)
            .map(|(_, node_map)| node_map)
            .collect();
        log::debug!("Bus {} has {} cameras", self.bus_id, self.cameras.len());
        Ok(())
    }

    fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>> {
        Ok(self
            .cameras
            .iter()
            .map(|m| {
                Box::new(UsbCamera {
                    node_map: m.clone(),
                }) as Box<dyn Camera + '_>
            })
            .collect())
    }
}

/// USB3 Vision [`TransportLayer`] using nusb
#[derive(Debug, Default)]
pub struct UsbTransport;

impl UsbTransport {
    /// New transport
    pub fn new() -> Self {
        UsbTransport
    }
}

impl TransportLayer for UsbTransport {
    fn library_name(&self) -> &str {
        env!("CARGO_PKG_NAME")
    }

    fn library_version(&self) -> LibraryVersion {
        LibraryVersion::new(
            env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            0,
            env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        )
    }

    fn interfaces(&self) -> Result<Vec<Box<dyn Interface + '_>>> {
        let mut bus_ids: Vec<u8> = Vec::new();
        for device_info in list_devices()? {
            let bus = device_info.bus_number();
            if !bus_ids.contains(&bus) {
                bus_ids.push(bus);
            }
        }
        bus_ids.sort();

        Ok(bus_ids
            .into_iter()
            .map(|bus| {
                let bus_id = bus.to_string();
                Box::new(UsbBus {
                    node_map: bus_node_map(&bus_id),
                    bus_id,
                    cameras: Vec::new(),
                }) as Box<dyn Interface + '_>
            })
            .collect())
    }

    fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>> {
        Ok(list_u3v_devices()?
            .into_iter()
            .map(|(_, node_map)| Box::new(UsbCamera { node_map }) as Box<dyn Camera + '_>)
            .collect())
    }
}
