//! Wrapper around the Vulkan device used by the rest of the crate.

use crate::VulkanObject;
use ash::vk;
use std::{fmt, sync::Arc};

/// Options handed down from the translation layer's configuration file.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceConfig {
    /// Whether the background state cache and precompilation worker may be
    /// attached to the pipeline manager. Can still be overridden off with
    /// the `SCORIA_STATE_CACHE` environment variable.
    pub enable_state_cache: bool,
}

/// An open channel of communication with a Vulkan device.
///
/// Owns the `VkDevice` handle and destroys it when dropped. The instance the
/// device was created from is only borrowed, for physical-device property
/// queries; its lifetime remains the responsibility of the caller.
pub struct Device {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    config: DeviceConfig,
}

impl Device {
    /// Wraps an already-created Vulkan device.
    ///
    /// # Safety
    ///
    /// - `device` must have been created from `physical_device`, which must
    ///   belong to `instance`.
    /// - The device must support Vulkan 1.1 (descriptor update templates).
    /// - Ownership of `device` is transferred; it must not be destroyed
    ///   elsewhere. `instance` must outlive the returned object.
    pub unsafe fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        config: DeviceConfig,
    ) -> Arc<Device> {
        let properties = instance.get_physical_device_properties(physical_device);

        Arc::new(Device {
            device,
            physical_device,
            properties,
            config,
        })
    }

    /// Returns the function table used to call into the device.
    #[inline]
    pub fn fns(&self) -> &ash::Device {
        &self.device
    }

    /// Returns the physical device the device was created from.
    #[inline]
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Returns the limits of the physical device.
    #[inline]
    pub fn limits(&self) -> &vk::PhysicalDeviceLimits {
        &self.properties.limits
    }

    /// Returns the configuration the device was created with.
    #[inline]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_device(None);
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("handle", &self.device.handle())
            .field("physical_device", &self.physical_device)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

unsafe impl VulkanObject for Device {
    type Handle = vk::Device;

    #[inline]
    fn handle(&self) -> Self::Handle {
        self.device.handle()
    }
}

/// Implemented on objects that belong to a Vulkan device.
pub unsafe trait DeviceOwned {
    /// Returns the device that owns `self`.
    fn device(&self) -> &Arc<Device>;
}
