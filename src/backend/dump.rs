//! Transport layer replayed from a JSON description of a system
//!
//! Used with `--from-json` to enumerate a system captured elsewhere, and by the tests. Interfaces can carry a [`Fault`] to replay a failing subsystem call.
//!
//! ```json
//! {
//!   "library-name": "Spinnaker",
//!   "library-version": { "major": 4, "minor": 0, "type": 0, "build": 116 },
//!   "interfaces": [
//!     {
//!       "node-map": [{ "name": "InterfaceDisplayName", "value": "USB bus 2" }],
//!       "cameras": [
//!         { "node-map": [{ "name": "DeviceVendorName", "value": "Acme" }] }
//!       ],
//!       "fault": { "stage": "update", "message": "interface busy" }
//!     }
//!   ]
//! }
//! ```
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};

use crate::error::{Error, ErrorKind, Result};
use crate::node::NodeMap;
use crate::system::{Camera, Interface, LibraryVersion, TransportLayer};

fn default_library_name() -> String {
    "Dump".into()
}

/// Subsystem call at which a [`Fault`] is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultStage {
    /// [`Interface::tl_node_map`]
    NodeMap,
    /// [`Interface::update_cameras`]
    Update,
    /// [`Interface::cameras`]
    Cameras,
}

/// Failure replayed while querying an interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fault {
    /// Call that fails
    pub stage: FaultStage,
    /// Message carried by the error
    pub message: String,
}

/// Camera as described in a dump
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CameraDump {
    /// TL device node map
    #[serde(default)]
    pub node_map: NodeMap,
}

/// Interface as described in a dump
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InterfaceDump {
    /// Interface TL node map
    #[serde(default)]
    pub node_map: NodeMap,
    /// Cameras attached, visible after an update
    #[serde(default)]
    pub cameras: Vec<CameraDump>,
    /// Optional failure when queried
    #[serde(default)]
    pub fault: Option<Fault>,
}

/// Full system description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemDump {
    /// Name printed with the library version
    #[serde(default = "default_library_name")]
    pub library_name: String,
    /// Library version
    #[serde(default)]
    pub library_version: LibraryVersion,
    /// Interfaces in subsystem order
    #[serde(default)]
    pub interfaces: Vec<InterfaceDump>,
    /// Global camera list; every interface camera when not supplied
    #[serde(default)]
    pub cameras: Option<Vec<CameraDump>>,
    /// Failure raised when listing interfaces
    #[serde(default)]
    pub fault: Option<String>,
}

impl Default for SystemDump {
    fn default() -> Self {
        SystemDump {
            library_name: default_library_name(),
            library_version: Default::default(),
            interfaces: Vec::new(),
            cameras: None,
            fault: None,
        }
    }
}

impl SystemDump {
    /// Read from .json at `file_path`
    pub fn from_file(file_path: &str) -> Result<SystemDump> {
        let f = File::open(file_path).map_err(|e| {
            Error::new(
                ErrorKind::Io,
                &format!("Failed to open dump {}: {}", file_path, e),
            )
        })?;
        let mut br = BufReader::new(f);
        let mut data = String::new();

        br.read_to_string(&mut data)?;
        serde_json::from_str::<SystemDump>(&data).map_err(|e| {
            Error::new(
                ErrorKind::Parsing,
                &format!("Failed to parse dump {}: {}", file_path, e),
            )
        })
    }
}

#[derive(Debug)]
struct DumpCamera<'a> {
    dump: &'a CameraDump,
}

impl Camera for DumpCamera<'_> {
    fn tl_device_node_map(&self) -> &NodeMap {
        &self.dump.node_map
    }
}

#[derive(Debug)]
struct DumpInterface<'a> {
    dump: &'a InterfaceDump,
    refreshed: bool,
}

impl DumpInterface<'_> {
    fn check_fault(&self, stage: FaultStage) -> Result<()> {
        match self.dump.fault.as_ref() {
            Some(f) if f.stage == stage => Err(Error::transport(&f.message)),
            _ => Ok(()),
        }
    }
}

impl Interface for DumpInterface<'_> {
    fn tl_node_map(&self) -> Result<&NodeMap> {
        self.check_fault(FaultStage::NodeMap)?;
        Ok(&self.dump.node_map)
    }

    fn update_cameras(&mut self) -> Result<()> {
        self.check_fault(FaultStage::Update)?;
        self.refreshed = true;
        Ok(())
    }

    fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>> {
        self.check_fault(FaultStage::Cameras)?;
        if !self.refreshed {
            log::debug!("Interface cameras queried before update, none visible");
            return Ok(Vec::new());
        }
        Ok(self
            .dump
            .cameras
            .iter()
            .map(|c| Box::new(DumpCamera { dump: c }) as Box<dyn Camera + '_>)
            .collect())
    }
}

/// [`TransportLayer`] over a [`SystemDump`]
#[derive(Debug)]
pub struct DumpTransport {
    dump: SystemDump,
}

impl DumpTransport {
    /// New transport replaying `dump`
    pub fn new(dump: SystemDump) -> Self {
        DumpTransport { dump }
    }

    /// New transport from .json at `file_path`
    pub fn from_file(file_path: &str) -> Result<Self> {
        log::info!("Replaying system from {}", file_path);
        Ok(DumpTransport::new(SystemDump::from_file(file_path)?))
    }
}

impl TransportLayer for DumpTransport {
    fn library_name(&self) -> &str {
        &self.dump.library_name
    }

    fn library_version(&self) -> LibraryVersion {
        self.dump.library_version
    }

    fn interfaces(&self) -> Result<Vec<Box<dyn Interface + '_>>> {
        if let Some(fault) = self.dump.fault.as_ref() {
            return Err(Error::transport(fault));
        }
        Ok(self
            .dump
            .interfaces
            .iter()
            .map(|i| {
                Box::new(DumpInterface {
                    dump: i,
                    refreshed: false,
                }) as Box<dyn Interface + '_>
            })
            .collect())
    }

    fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>> {
        let cameras: Vec<&CameraDump> = match self.dump.cameras.as_ref() {
            Some(c) => c.iter().collect(),
            None => self
                .dump
                .interfaces
                .iter()
                .flat_map(|i| i.cameras.iter())
                .collect(),
        };
        Ok(cameras
            .into_iter()
            .map(|c| Box::new(DumpCamera { dump: c }) as Box<dyn Camera + '_>)
            .collect())
    }
}
