//! Printing of [`Enumeration`] results
//!
//! Text output follows the classic enumeration example layout: library version, counts, then each interface display name followed by one block per camera. [`print_json`] prints the same data as JSON.
use std::io::{self, Write};

use crate::colour::{self, ColourTheme};
use crate::enumeration::{CameraInfo, Enumeration, InterfaceInfo, Status};
use crate::system::LibraryVersion;

/// Printed when the interface has no readable display name
pub const INTERFACE_NAME_NOT_READABLE: &str = "Interface display name not readable";
/// Printed in place of camera blocks when an interface has none
pub const NO_DEVICES_DETECTED: &str = "No devices detected.";
/// Printed when there are no interfaces or no cameras
pub const NOT_ENOUGH_CAMERAS: &str = "Not enough cameras!";
/// Heading printed before the interfaces
pub const QUERYING_INTERFACES: &str = "*** QUERYING INTERFACES ***";
/// Prompt printed before exiting
pub const EXIT_PROMPT: &str = "Done! Press Enter to exit...";

/// Settings for printing
#[derive(Debug, Default, Clone)]
pub struct PrintSettings {
    /// Colours to use, `None` for plain output
    pub colours: Option<ColourTheme>,
    /// Print serial number after each device
    pub verbose: bool,
}

impl PrintSettings {
    fn paint(&self, s: &str, pick: fn(&ColourTheme) -> Option<colored::Color>) -> String {
        colour::paint(s, self.colours.as_ref().and_then(pick))
    }
}

fn print_camera<W: Write>(
    w: &mut W,
    camera: &CameraInfo,
    settings: &PrintSettings,
) -> io::Result<()> {
    write!(
        w,
        "\tDevice {} ",
        settings.paint(&camera.index.to_string(), |c| c.index)
    )?;
    if let Some(vendor) = camera.vendor_name.as_ref() {
        write!(w, "{} ", settings.paint(vendor, |c| c.vendor))?;
    }
    if let Some(model) = camera.model_name.as_ref() {
        write!(w, "{}", settings.paint(model, |c| c.model))?;
    }
    writeln!(w)?;
    if settings.verbose {
        if let Some(serial) = camera.serial_number.as_ref() {
            writeln!(w, "\t\tSerial {}", settings.paint(serial, |c| c.serial))?;
        }
    }
    writeln!(w)
}

/// Print interface display name then its camera blocks, or the failure it reported
pub fn print_interface<W: Write>(
    w: &mut W,
    interface: &InterfaceInfo,
    settings: &PrintSettings,
) -> io::Result<()> {
    if interface.node_map_read {
        match interface.display_name.as_ref() {
            Some(name) => writeln!(w, "{}", settings.paint(name, |c| c.interface))?,
            None => writeln!(
                w,
                "{}",
                settings.paint(INTERFACE_NAME_NOT_READABLE, |c| c.fallback)
            )?,
        }
    }

    if let Some(error) = interface.error.as_ref() {
        return writeln!(
            w,
            "{}",
            settings.paint(&format!("Error: {}", error), |c| c.error)
        );
    }

    if interface.cameras.is_empty() {
        writeln!(
            w,
            "\t{}",
            settings.paint(NO_DEVICES_DETECTED, |c| c.fallback)
        )?;
        return writeln!(w);
    }

    for camera in interface.cameras.iter() {
        print_camera(w, camera, settings)?;
    }

    Ok(())
}

/// Print the transport layer library version line
pub fn print_library_version<W: Write>(
    w: &mut W,
    library_name: &str,
    library_version: &LibraryVersion,
    settings: &PrintSettings,
) -> io::Result<()> {
    writeln!(
        w,
        "{} library version: {}",
        library_name,
        settings.paint(&library_version.to_string(), |c| c.library)
    )?;
    writeln!(w)
}

/// Print the full enumeration as text
pub fn print_enumeration<W: Write>(
    w: &mut W,
    enumeration: &Enumeration,
    settings: &PrintSettings,
) -> io::Result<()> {
    print_library_version(
        w,
        &enumeration.library_name,
        &enumeration.library_version,
        settings,
    )?;
    print_results(w, enumeration, settings)
}

/// Print the counts then each interface; everything after the library version line
pub fn print_results<W: Write>(
    w: &mut W,
    enumeration: &Enumeration,
    settings: &PrintSettings,
) -> io::Result<()> {
    writeln!(
        w,
        "Number of interfaces detected: {}",
        settings.paint(&enumeration.interface_count.to_string(), |c| c.number)
    )?;
    writeln!(w)?;
    writeln!(
        w,
        "Number of cameras detected: {}",
        settings.paint(&enumeration.camera_count.to_string(), |c| c.number)
    )?;
    writeln!(w)?;

    if !enumeration.has_cameras() {
        return writeln!(w, "{}", settings.paint(NOT_ENOUGH_CAMERAS, |c| c.error));
    }

    writeln!(w)?;
    writeln!(w, "{}", settings.paint(QUERYING_INTERFACES, |c| c.heading))?;
    writeln!(w)?;

    for interface in enumeration.interfaces.iter() {
        print_interface(w, interface, settings)?;
    }

    Ok(())
}

/// Print the exit prompt; separated by a blank line unless the pass exited early
pub fn print_exit_prompt<W: Write>(w: &mut W, status: Status) -> io::Result<()> {
    if status != Status::NotEnoughCameras {
        writeln!(w)?;
    }
    writeln!(w, "{}", EXIT_PROMPT)
}

/// Print the enumeration as pretty JSON
pub fn print_json<W: Write>(w: &mut W, enumeration: &Enumeration) -> io::Result<()> {
    let json = serde_json::to_string_pretty(enumeration)?;
    writeln!(w, "{}", json)
}
