//! Driver-level pipeline cache.

use crate::device::{Device, DeviceOwned};
use crate::{VulkanError, VulkanObject};
use ash::vk;
use std::sync::Arc;

/// Opaque cache the driver fills while compiling pipelines.
///
/// One cache is owned by the pipeline manager and passed to every pipeline
/// compilation. Its contents can be extracted with [`get_data`] so the
/// state cache can persist them between runs.
///
/// [`get_data`]: PipelineCache::get_data
#[derive(Debug)]
pub struct PipelineCache {
    device: Arc<Device>,
    handle: vk::PipelineCache,
}

impl PipelineCache {
    /// Creates an empty pipeline cache.
    pub fn new(device: Arc<Device>) -> Result<Arc<PipelineCache>, VulkanError> {
        let create_info = vk::PipelineCacheCreateInfo::default();

        let handle = unsafe { device.fns().create_pipeline_cache(&create_info, None) }
            .map_err(VulkanError::from)?;

        Ok(Arc::new(PipelineCache { device, handle }))
    }

    /// Retrieves the cache contents from the driver.
    pub fn get_data(&self) -> Result<Vec<u8>, VulkanError> {
        unsafe { self.device.fns().get_pipeline_cache_data(self.handle) }
            .map_err(VulkanError::from)
    }
}

impl Drop for PipelineCache {
    fn drop(&mut self) {
        unsafe {
            self.device.fns().destroy_pipeline_cache(self.handle, None);
        }
    }
}

unsafe impl VulkanObject for PipelineCache {
    type Handle = vk::PipelineCache;

    #[inline]
    fn handle(&self) -> Self::Handle {
        self.handle
    }
}

unsafe impl DeviceOwned for PipelineCache {
    #[inline]
    fn device(&self) -> &Arc<Device> {
        &self.device
    }
}
