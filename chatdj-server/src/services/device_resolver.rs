//! Playback device selection
//!
//! Picks exactly one target device per negotiation. Priority:
//! 1. The device of the live playback session
//! 2. Any device the device list flags as active
//! 3. The first interactive surface: a computer/web/browser device, or one whose
//!    name carries a browser or app marker
//! 4. The first device in list order
//!
//! Devices are re-fetched on every call; the set can change between requests.

use super::media_service::{MediaService, ServiceError};
use chatdj_common::DeviceRef;
use tracing::{debug, info, warn};

/// Device types treated as interactive surfaces
const PREFERRED_KINDS: &[&str] = &["computer", "web", "browser"];

/// Name fragments marking a browser or desktop app
const PREFERRED_NAME_TOKENS: &[&str] = &["chrome", "spotify", "web player", "browser"];

/// Resolve the device to play on, or `None` when the account has no devices
pub async fn resolve(service: &dyn MediaService) -> Result<Option<DeviceRef>, ServiceError> {
    if let Some(device) = service.current_playback_device().await? {
        info!(device = %device.name, kind = %device.kind, "Using currently playing device");
        return Ok(Some(device));
    }

    let devices = service.devices().await?;
    if devices.is_empty() {
        warn!("No playback devices found");
        return Ok(None);
    }

    for device in &devices {
        debug!(
            device = %device.name,
            kind = %device.kind,
            active = device.active,
            "Available device"
        );
    }

    let selected = select(&devices).cloned();
    if let Some(device) = &selected {
        info!(device = %device.name, kind = %device.kind, "Selected playback device");
    }
    Ok(selected)
}

/// Apply the list priority policy (steps 2-4) to an enumerated device list
pub fn select(devices: &[DeviceRef]) -> Option<&DeviceRef> {
    devices
        .iter()
        .find(|d| d.active)
        .or_else(|| devices.iter().find(|d| is_preferred(d)))
        .or_else(|| devices.first())
}

fn is_preferred(device: &DeviceRef) -> bool {
    let kind = device.kind.to_lowercase();
    let name = device.name.to_lowercase();

    PREFERRED_KINDS.contains(&kind.as_str())
        || PREFERRED_NAME_TOKENS.iter().any(|token| name.contains(token))
}
