//! System session, interface and camera lists over a [`TransportLayer`]
//!
//! The transport layer is the device subsystem: a vendor SDK, the native USB3 Vision discovery in [`crate::backend::usb`] or a replayed dump in [`crate::backend::dump`]. [`Session`] owns it between acquire and release. Lists borrow the session so they cannot outlive it and [`Session::release`] cannot be called while any list is alive.
//!
//! ```
//! use camenum::backend::dump::{DumpTransport, SystemDump};
//! use camenum::system::Session;
//!
//! let dump: SystemDump = serde_json::from_str(r#"{"interfaces": []}"#).unwrap();
//! let session = Session::acquire(Box::new(DumpTransport::new(dump)));
//! let interfaces = session.interfaces().unwrap();
//! assert!(interfaces.is_empty());
//! drop(interfaces);
//! session.release().unwrap();
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::node::NodeMap;

/// Four part library version of the transport layer: `major.minor.type.build`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Release type
    #[serde(rename = "type")]
    pub kind: u32,
    /// Build number
    pub build: u32,
}

impl LibraryVersion {
    /// New version
    pub fn new(major: u32, minor: u32, kind: u32, build: u32) -> Self {
        LibraryVersion {
            major,
            minor,
            kind,
            build,
        }
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.kind, self.build
        )
    }
}

/// Camera handle as seen by the transport layer, before the device is opened
pub trait Camera: fmt::Debug {
    /// Transport layer device node map; readable without opening the camera
    fn tl_device_node_map(&self) -> &NodeMap;
}

/// Transport layer interface handle such as a USB bus or network adapter
pub trait Interface: fmt::Debug {
    /// Transport layer node map of the interface
    fn tl_node_map(&self) -> Result<&NodeMap>;

    /// Refresh the cameras visible on this interface
    ///
    /// The interface camera list is not kept current by the transport layer; this must be called before [`Interface::cameras`].
    fn update_cameras(&mut self) -> Result<()>;

    /// Cameras found by the last [`Interface::update_cameras`]
    fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>>;
}

/// Device subsystem capability set
pub trait TransportLayer: fmt::Debug {
    /// Name used when printing the library version
    fn library_name(&self) -> &str;

    /// Version of the transport layer library
    fn library_version(&self) -> LibraryVersion;

    /// Interfaces currently visible, in subsystem order
    fn interfaces(&self) -> Result<Vec<Box<dyn Interface + '_>>>;

    /// All cameras currently visible across every interface
    fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>>;

    /// Tear down the subsystem; called once by [`Session`]
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Ordered list of handles borrowed from a [`Session`] or an [`Interface`]
///
/// Cleared explicitly with [`HandleList::clear`] or when dropped.
pub struct HandleList<'a, T: ?Sized + 'a> {
    name: &'static str,
    items: Vec<Box<T>>,
    _owner: std::marker::PhantomData<&'a ()>,
}

/// List of [`Interface`] handles
pub type InterfaceList<'a> = HandleList<'a, dyn Interface + 'a>;
/// List of [`Camera`] handles
pub type CameraList<'a> = HandleList<'a, dyn Camera + 'a>;

impl<'a, T: ?Sized + 'a> HandleList<'a, T> {
    fn new(name: &'static str, items: Vec<Box<T>>) -> Self {
        log::trace!("Populated {} list with {} handles", name, items.len());
        HandleList {
            name,
            items,
            _owner: std::marker::PhantomData,
        }
    }

    /// Number of handles in list
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// List is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Handle at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).map(|b| &**b)
    }

    /// Mutable handle at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index).map(|b| &mut **b)
    }

    /// Iterate handles
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|b| &**b)
    }

    /// Iterate handles mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().map(|b| &mut **b)
    }

    /// Release all handles held by the list
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            log::trace!("Clearing {} {} handles", self.items.len(), self.name);
        }
        self.items.clear();
    }
}

impl<'a, T: ?Sized + 'a> Drop for HandleList<'a, T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, T: ?Sized + 'a> fmt::Debug for HandleList<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HandleList")
            .field("name", &self.name)
            .field("len", &self.items.len())
            .finish()
    }
}

/// Camera list of an [`Interface`]
pub fn interface_cameras<'a>(interface: &'a dyn Interface) -> Result<CameraList<'a>> {
    Ok(HandleList::new("interface camera", interface.cameras()?))
}

/// Process wide handle on a [`TransportLayer`]
///
/// Released exactly once: by [`Session::release`] or, on an early return, when dropped.
#[derive(Debug)]
pub struct Session {
    transport: Box<dyn TransportLayer>,
    released: bool,
}

impl Session {
    /// Acquire session on `transport`
    pub fn acquire(transport: Box<dyn TransportLayer>) -> Session {
        log::debug!(
            "Acquired {} session, library version {}",
            transport.library_name(),
            transport.library_version()
        );
        Session {
            transport,
            released: false,
        }
    }

    /// Name of transport library
    pub fn library_name(&self) -> &str {
        self.transport.library_name()
    }

    /// Version of transport library
    pub fn library_version(&self) -> LibraryVersion {
        self.transport.library_version()
    }

    /// Query interfaces currently visible; fresh on each call
    pub fn interfaces(&self) -> Result<InterfaceList<'_>> {
        Ok(HandleList::new("interface", self.transport.interfaces()?))
    }

    /// Query all cameras currently visible; fresh on each call
    pub fn cameras(&self) -> Result<CameraList<'_>> {
        Ok(HandleList::new("camera", self.transport.cameras()?))
    }

    /// Release the session and the transport layer
    pub fn release(mut self) -> Result<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        log::debug!("Releasing {} session", self.transport.library_name());
        self.transport.release()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.release_inner() {
            log::error!("Failed to release session: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use crate::node::{self, Node};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Shared record of what a [`MockTransport`] saw
    #[derive(Debug, Default)]
    pub(crate) struct MockLog {
        pub releases: Cell<usize>,
        pub live_handles: Cell<isize>,
        pub live_at_release: Cell<isize>,
        pub updates: RefCell<Vec<usize>>,
        pub queried_cameras: RefCell<Vec<usize>>,
    }

    #[derive(Debug)]
    struct Guard(Rc<MockLog>);

    impl Guard {
        fn new(log: &Rc<MockLog>) -> Self {
            log.live_handles.set(log.live_handles.get() + 1);
            Guard(Rc::clone(log))
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            self.0.live_handles.set(self.0.live_handles.get() - 1);
        }
    }

    #[derive(Debug, Clone)]
    pub(crate) struct MockInterface {
        pub node_map: NodeMap,
        pub cameras: Vec<NodeMap>,
        pub fault: Option<String>,
    }

    impl MockInterface {
        pub fn named(name: &str) -> Self {
            MockInterface {
                node_map: NodeMap::new().with(Node::new(node::INTERFACE_DISPLAY_NAME, name)),
                cameras: Vec::new(),
                fault: None,
            }
        }

        pub fn with_camera(mut self, vendor: Option<&str>, model: Option<&str>) -> Self {
            let mut map = NodeMap::new();
            if let Some(v) = vendor {
                map.insert(Node::new(node::DEVICE_VENDOR_NAME, v));
            }
            if let Some(m) = model {
                map.insert(Node::new(node::DEVICE_MODEL_NAME, m));
            }
            self.cameras.push(map);
            self
        }

        pub fn with_fault(mut self, message: &str) -> Self {
            self.fault = Some(message.to_string());
            self
        }
    }

    #[derive(Debug)]
    struct MockInterfaceHandle {
        index: usize,
        interface: MockInterface,
        refreshed: bool,
        log: Rc<MockLog>,
        _guard: Guard,
    }

    #[derive(Debug)]
    struct MockCamera {
        node_map: NodeMap,
        _guard: Guard,
    }

    impl Camera for MockCamera {
        fn tl_device_node_map(&self) -> &NodeMap {
            &self.node_map
        }
    }

    impl Interface for MockInterfaceHandle {
        fn tl_node_map(&self) -> Result<&NodeMap> {
            Ok(&self.interface.node_map)
        }

        fn update_cameras(&mut self) -> Result<()> {
            self.log.updates.borrow_mut().push(self.index);
            if let Some(fault) = self.interface.fault.as_ref() {
                return Err(Error::transport(fault));
            }
            self.refreshed = true;
            Ok(())
        }

        fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>> {
            self.log.queried_cameras.borrow_mut().push(self.index);
            if !self.refreshed {
                return Ok(Vec::new());
            }
            Ok(self
                .interface
                .cameras
                .iter()
                .map(|m| {
                    Box::new(MockCamera {
                        node_map: m.clone(),
                        _guard: Guard::new(&self.log),
                    }) as Box<dyn Camera>
                })
                .collect())
        }
    }

    /// In-memory transport that records releases and outstanding handles
    #[derive(Debug)]
    pub(crate) struct MockTransport {
        pub interfaces: Vec<MockInterface>,
        /// Cameras visible globally but on no listed interface
        pub unattached: Vec<NodeMap>,
        pub log: Rc<MockLog>,
    }

    impl MockTransport {
        pub fn new(interfaces: Vec<MockInterface>) -> (Self, Rc<MockLog>) {
            let log = Rc::new(MockLog::default());
            (
                MockTransport {
                    interfaces,
                    unattached: Vec::new(),
                    log: Rc::clone(&log),
                },
                log,
            )
        }

        pub fn with_unattached_camera(mut self) -> Self {
            self.unattached.push(NodeMap::new());
            self
        }
    }

    impl TransportLayer for MockTransport {
        fn library_name(&self) -> &str {
            "Mock"
        }

        fn library_version(&self) -> LibraryVersion {
            LibraryVersion::new(1, 2, 3, 4)
        }

        fn interfaces(&self) -> Result<Vec<Box<dyn Interface + '_>>> {
            Ok(self
                .interfaces
                .iter()
                .enumerate()
                .map(|(index, i)| {
                    Box::new(MockInterfaceHandle {
                        index,
                        interface: i.clone(),
                        refreshed: false,
                        log: Rc::clone(&self.log),
                        _guard: Guard::new(&self.log),
                    }) as Box<dyn Interface>
                })
                .collect())
        }

        fn cameras(&self) -> Result<Vec<Box<dyn Camera + '_>>> {
            Ok(self
                .interfaces
                .iter()
                .flat_map(|i| i.cameras.iter())
                .chain(self.unattached.iter())
                .map(|m| {
                    Box::new(MockCamera {
                        node_map: m.clone(),
                        _guard: Guard::new(&self.log),
                    }) as Box<dyn Camera>
                })
                .collect())
        }

        fn release(&mut self) -> Result<()> {
            self.log.releases.set(self.log.releases.get() + 1);
            self.log.live_at_release.set(self.log.live_handles.get());
            Ok(())
        }
    }

    #[test]
    fn test_library_version_display() {
        assert_eq!(LibraryVersion::new(4, 0, 0, 116).to_string(), "4.0.0.116");
    }

    #[test]
    fn test_release_once() {
        let (transport, log) = MockTransport::new(vec![]);
        let session = Session::acquire(Box::new(transport));
        session.release().unwrap();
        assert_eq!(log.releases.get(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let (transport, log) = MockTransport::new(vec![]);
        {
            let _session = Session::acquire(Box::new(transport));
        }
        assert_eq!(log.releases.get(), 1);
    }

    #[test]
    fn test_clear_drops_handles() {
        let interface = MockInterface::named("a").with_camera(Some("Acme"), None);
        let (transport, log) = MockTransport::new(vec![interface]);
        let session = Session::acquire(Box::new(transport));
        let mut interfaces = session.interfaces().unwrap();
        let cameras = session.cameras().unwrap();
        assert_eq!(interfaces.len(), 1);
        assert_eq!(cameras.len(), 1);
        assert_eq!(log.live_handles.get(), 2);
        interfaces.clear();
        assert!(interfaces.is_empty());
        assert_eq!(log.live_handles.get(), 1);
        drop(cameras);
        drop(interfaces);
        session.release().unwrap();
        assert_eq!(log.live_at_release.get(), 0);
    }

    #[test]
    fn test_interface_cameras_require_update() {
        let interface = MockInterface::named("a").with_camera(Some("Acme"), Some("X1"));
        let (transport, _log) = MockTransport::new(vec![interface]);
        let session = Session::acquire(Box::new(transport));
        let mut interfaces = session.interfaces().unwrap();
        let interface = interfaces.get_mut(0).unwrap();
        assert!(interface_cameras(interface).unwrap().is_empty());
        interface.update_cameras().unwrap();
        let cameras = interface_cameras(interface).unwrap();
        assert_eq!(cameras.len(), 1);
        assert_eq!(
            node::read_string_property(
                cameras.get(0).unwrap().tl_device_node_map(),
                node::DEVICE_MODEL_NAME
            ),
            Some("X1".to_string())
        );
    }
}
