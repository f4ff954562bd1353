//! USB device discovery and transfer primitives.
//!
//! Commands travel over interface 1: 8-byte frames as class control
//! transfers, color matrices as bulk writes to the interface's OUT endpoint.
//! Transfers block and are never retried; a failure after a partial write
//! leaves the firmware in an unspecified state, so the retry decision belongs
//! to the caller.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use rusb::{Device, DeviceDescriptor, Direction, GlobalContext};

use crate::error::{Error, Result};
use crate::frame::CommandFrame;

/// Vendor id of the keyboards this protocol is known to work with.
pub const DEFAULT_VENDOR: u16 = 0x048d;

/// Interface carrying the vendor lighting protocol.
const LIGHTING_INTERFACE: u8 = 1;

/// bmRequestType: host-to-device, class, interface.
const CTRL_REQUEST_TYPE: u8 = 0x21;
/// bRequest: SET_REPORT.
const CTRL_REQUEST: u8 = 0x09;
/// wValue expected by the firmware for command frames.
const CTRL_VALUE: u16 = 0x0300;
/// wIndex: the lighting interface.
const CTRL_INDEX: u16 = 0x0001;

/// Zero means no timeout; transfers block on the transport default.
const TIMEOUT: Duration = Duration::from_secs(0);

/// Vendor/product allow-list. A vendor mapped to `None` accepts any product.
#[derive(Debug, Clone)]
pub struct AllowList(HashMap<u16, Option<Vec<u16>>>);

impl AllowList {
    /// Keyboards known to speak this protocol.
    pub fn builtin() -> Self {
        let mut list = HashMap::new();
        list.insert(DEFAULT_VENDOR, Some(vec![0xce00, 0x600b, 0x7001]));
        AllowList(list)
    }

    /// A single vendor, restricted to one product or accepting any.
    pub fn single(vendor: u16, product: Option<u16>) -> Self {
        let mut list = HashMap::new();
        list.insert(vendor, product.map(|product| vec![product]));
        AllowList(list)
    }

    pub fn contains(&self, vendor: u16, product: u16) -> bool {
        match self.0.get(&vendor) {
            Some(Some(products)) => products.contains(&product),
            Some(None) => true,
            None => false,
        }
    }
}

/// Write primitives the control center drives. A trait seam so command
/// sequencing can be exercised against a recording fake.
pub trait CommandSink {
    /// Issue one control transfer carrying `frame`.
    fn write_control(&self, frame: &CommandFrame) -> Result<()>;

    /// Write `payload` to the bulk OUT endpoint `repeat` times in sequence.
    fn write_bulk(&self, payload: &[u8], repeat: usize) -> Result<()>;
}

/// An opened keyboard with the lighting interface claimed.
pub struct Keyboard {
    handle: rusb::DeviceHandle<GlobalContext>,
    vendor_id: u16,
    product_id: u16,
    out_endpoint: u8,
}

impl Keyboard {
    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }
}

impl CommandSink for Keyboard {
    fn write_control(&self, frame: &CommandFrame) -> Result<()> {
        debug!("control write {:02x?}", frame.as_bytes());

        self.handle
            .write_control(
                CTRL_REQUEST_TYPE,
                CTRL_REQUEST,
                CTRL_VALUE,
                CTRL_INDEX,
                frame.as_bytes(),
                TIMEOUT,
            )
            .map_err(|source| Error::Transport { op: "control transfer", source })?;

        Ok(())
    }

    fn write_bulk(&self, payload: &[u8], repeat: usize) -> Result<()> {
        debug!(
            "bulk write x{repeat}, {} bytes to endpoint 0x{:02x}",
            payload.len(),
            self.out_endpoint
        );

        for _ in 0..repeat {
            self.handle
                .write_bulk(self.out_endpoint, payload, TIMEOUT)
                .map_err(|source| Error::Transport { op: "bulk write", source })?;
        }

        Ok(())
    }
}

/// Enumerate allow-listed keyboards and prepare each for transfers.
pub fn discover(allow: &AllowList) -> Result<Vec<Keyboard>> {
    let devices =
        rusb::devices().map_err(|source| Error::Transport { op: "enumeration", source })?;

    let mut keyboards = Vec::new();
    for device in devices.iter() {
        // Devices without a readable descriptor cannot be ours.
        let descriptor = match device.device_descriptor() {
            Ok(descriptor) => descriptor,
            Err(_) => continue,
        };

        if !allow.contains(descriptor.vendor_id(), descriptor.product_id()) {
            continue;
        }

        keyboards.push(open(&device, &descriptor)?);
    }

    info!("found {} keyboard(s)", keyboards.len());

    Ok(keyboards)
}

/// Open a matched device: detach the kernel driver where the platform
/// requires an exclusive claim, claim the lighting interface and locate its
/// OUT endpoint.
fn open(device: &Device<GlobalContext>, descriptor: &DeviceDescriptor) -> Result<Keyboard> {
    let mut handle =
        device.open().map_err(|source| Error::Transport { op: "open", source })?;

    if rusb::supports_detach_kernel_driver() {
        let active = handle
            .kernel_driver_active(LIGHTING_INTERFACE)
            .map_err(|source| Error::Transport { op: "kernel driver query", source })?;

        if active {
            info!(
                "detaching kernel driver from {:04x}:{:04x} interface {LIGHTING_INTERFACE}",
                descriptor.vendor_id(),
                descriptor.product_id()
            );
            handle
                .detach_kernel_driver(LIGHTING_INTERFACE)
                .map_err(|source| Error::Transport { op: "kernel driver detach", source })?;
        }
    }

    handle
        .claim_interface(LIGHTING_INTERFACE)
        .map_err(|source| Error::Transport { op: "interface claim", source })?;

    let out_endpoint = find_out_endpoint(device)?;

    Ok(Keyboard {
        handle,
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        out_endpoint,
    })
}

/// First OUT endpoint of the lighting interface.
fn find_out_endpoint(device: &Device<GlobalContext>) -> Result<u8> {
    let config = device
        .active_config_descriptor()
        .map_err(|source| Error::Transport { op: "config descriptor", source })?;

    for interface in config.interfaces() {
        if interface.number() != LIGHTING_INTERFACE {
            continue;
        }

        for descriptor in interface.descriptors() {
            for endpoint in descriptor.endpoint_descriptors() {
                if endpoint.direction() == Direction::Out {
                    return Ok(endpoint.address());
                }
            }
        }
    }

    Err(Error::Transport { op: "endpoint lookup", source: rusb::Error::NotFound })
}
