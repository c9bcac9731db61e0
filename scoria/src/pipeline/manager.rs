//! Creation and caching of pipeline objects.

use crate::device::Device;
use crate::pipeline::cache::PipelineCache;
use crate::pipeline::compute::{ComputePipeline, ComputePipelineShaders};
use crate::pipeline::graphics::{GraphicsPipeline, GraphicsPipelineShaders};
use crate::pipeline::layout::{BindingLayout, BindingLayoutObjects};
use crate::shader::Shader;
use crate::VulkanError;
use foldhash::HashMap;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

/// Interface to the background shader precompiler.
///
/// Implemented by the state cache, which records shaders as they are
/// registered and compiles known pipelines ahead of their first use. The
/// pipeline manager only forwards registrations and lifecycle requests;
/// everything else about the worker is its own business.
pub trait StateCache: Send + Sync {
    /// Records a newly created shader.
    fn register_shader(&self, shader: &Arc<Shader>);

    /// Checks whether worker threads are still busy compiling shaders.
    fn is_compiling_shaders(&self) -> bool;

    /// Asks the worker threads to finish up and exit.
    fn stop_worker_threads(&self);
}

/// Number of pipeline objects created so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineCount {
    pub num_compute_pipelines: u32,
    pub num_graphics_pipelines: u32,
}

#[derive(Default)]
struct PipelineCaches {
    compute: HashMap<ComputePipelineShaders, Arc<ComputePipeline>>,
    graphics: HashMap<GraphicsPipelineShaders, Arc<GraphicsPipeline>>,
    layouts: HashMap<BindingLayout, Arc<BindingLayoutObjects>>,
}

/// Creates and owns all pipeline objects of a device.
///
/// Pipelines are deduplicated by the identity of the shaders they are
/// created from; binding layout objects are deduplicated by the structural
/// value of their binding layout, so pipelines built from different shader
/// combinations share layout objects whenever the merged layouts come out
/// equal. One mutex guards all three caches for the whole duration of a
/// get-or-create call: pipeline creation is rare compared to draw
/// submission, and a single lock keeps the locking order trivial. Entries
/// are never evicted, so returned `Arc`s stay valid for the manager's
/// lifetime.
pub struct PipelineManager {
    device: Arc<Device>,
    cache: Arc<PipelineCache>,
    state_cache: Option<Arc<dyn StateCache>>,
    caches: Mutex<PipelineCaches>,
    num_compute_pipelines: AtomicU32,
    num_graphics_pipelines: AtomicU32,
}

impl PipelineManager {
    /// Creates a pipeline manager for the given device.
    ///
    /// The state cache collaborator is kept only if the device
    /// configuration enables it and the `SCORIA_STATE_CACHE` environment
    /// variable is not set to `0`.
    pub fn new(
        device: Arc<Device>,
        state_cache: Option<Arc<dyn StateCache>>,
    ) -> Result<Arc<PipelineManager>, VulkanError> {
        let cache = PipelineCache::new(device.clone())?;

        let use_state_cache =
            std::env::var("SCORIA_STATE_CACHE").map_or(true, |value| value != "0");

        let state_cache = if use_state_cache && device.config().enable_state_cache {
            if state_cache.is_some() {
                info!("Using state cache");
            }
            state_cache
        } else {
            if state_cache.is_some() {
                info!("State cache disabled");
            }
            None
        };

        Ok(Arc::new(PipelineManager {
            device,
            cache,
            state_cache,
            caches: Mutex::new(PipelineCaches::default()),
            num_compute_pipelines: AtomicU32::new(0),
            num_graphics_pipelines: AtomicU32::new(0),
        }))
    }

    /// Returns the device the manager was created for.
    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Returns the driver pipeline cache shared by all pipeline
    /// compilations.
    #[inline]
    pub fn pipeline_cache(&self) -> &Arc<PipelineCache> {
        &self.cache
    }

    /// Retrieves or creates the compute pipeline for a set of shaders.
    ///
    /// Returns `None`, without touching any cache, if no compute shader is
    /// supplied.
    pub fn create_compute_pipeline(
        &self,
        shaders: &ComputePipelineShaders,
    ) -> Result<Option<Arc<ComputePipeline>>, VulkanError> {
        let Some(cs) = shaders.cs.as_ref() else {
            return Ok(None);
        };

        let mut caches = self.caches.lock();

        if let Some(pipeline) = caches.compute.get(shaders) {
            return Ok(Some(pipeline.clone()));
        }

        let layout = Self::create_pipeline_layout(&self.device, &mut caches.layouts, cs.bindings())?;

        let pipeline = Arc::new(ComputePipeline::new(shaders.clone(), layout));
        caches.compute.insert(shaders.clone(), pipeline.clone());
        self.num_compute_pipelines.fetch_add(1, Ordering::Relaxed);

        Ok(Some(pipeline))
    }

    /// Retrieves or creates the graphics pipeline for a set of shaders.
    ///
    /// Returns `None`, without touching any cache, if no vertex shader is
    /// supplied. The binding layouts of the present stages are merged in
    /// pipeline order so that binding numbers are reproducible across
    /// equal shader combinations.
    pub fn create_graphics_pipeline(
        &self,
        shaders: &GraphicsPipelineShaders,
    ) -> Result<Option<Arc<GraphicsPipeline>>, VulkanError> {
        let Some(vs) = shaders.vs.as_ref() else {
            return Ok(None);
        };

        let mut caches = self.caches.lock();

        if let Some(pipeline) = caches.graphics.get(shaders) {
            return Ok(Some(pipeline.clone()));
        }

        let mut merged_layout = BindingLayout::new();
        merged_layout.merge(vs.bindings());

        for stage in [&shaders.tcs, &shaders.tes, &shaders.gs, &shaders.fs] {
            if let Some(shader) = stage {
                merged_layout.merge(shader.bindings());
            }
        }

        let layout = Self::create_pipeline_layout(&self.device, &mut caches.layouts, &merged_layout)?;

        let pipeline = Arc::new(GraphicsPipeline::new(shaders.clone(), layout));
        caches.graphics.insert(shaders.clone(), pipeline.clone());
        self.num_graphics_pipelines.fetch_add(1, Ordering::Relaxed);

        Ok(Some(pipeline))
    }

    /// Forwards a new shader to the state cache, if one is attached.
    pub fn register_shader(&self, shader: &Arc<Shader>) {
        if let Some(state_cache) = &self.state_cache {
            state_cache.register_shader(shader);
        }
    }

    /// Returns the number of pipelines created so far.
    pub fn pipeline_count(&self) -> PipelineCount {
        PipelineCount {
            num_compute_pipelines: self.num_compute_pipelines.load(Ordering::Relaxed),
            num_graphics_pipelines: self.num_graphics_pipelines.load(Ordering::Relaxed),
        }
    }

    /// Checks whether the state cache is still precompiling pipelines.
    pub fn is_compiling_shaders(&self) -> bool {
        self.state_cache
            .as_ref()
            .is_some_and(|state_cache| state_cache.is_compiling_shaders())
    }

    /// Stops the state cache's worker threads.
    pub fn stop_worker_threads(&self) {
        if let Some(state_cache) = &self.state_cache {
            state_cache.stop_worker_threads();
        }
    }

    /// Retrieves or creates the layout objects for a binding layout.
    ///
    /// Runs inside the caches' critical section, so at most one instance
    /// per distinct layout value can ever be constructed.
    fn create_pipeline_layout(
        device: &Arc<Device>,
        layouts: &mut HashMap<BindingLayout, Arc<BindingLayoutObjects>>,
        layout: &BindingLayout,
    ) -> Result<Arc<BindingLayoutObjects>, VulkanError> {
        if let Some(objects) = layouts.get(layout) {
            return Ok(objects.clone());
        }

        debug!("Creating pipeline layout objects");

        let objects = BindingLayoutObjects::new(device.clone(), layout)?;
        layouts.insert(layout.clone(), objects.clone());

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::{BindingInfo, PushConstantRange};
    use ash::vk;
    use std::sync::atomic::AtomicU32;

    fn shader(stage: vk::ShaderStageFlags, slots: &[u32]) -> Arc<Shader> {
        let bindings: Vec<BindingInfo> = slots
            .iter()
            .map(|&slot| BindingInfo {
                descriptor_type: vk::DescriptorType::UNIFORM_BUFFER,
                resource_binding: slot,
                view_type: vk::ImageViewType::TYPE_2D,
                stages: vk::ShaderStageFlags::empty(),
                access: vk::AccessFlags::UNIFORM_READ,
            })
            .collect();

        Shader::new(stage, &bindings, PushConstantRange::default())
    }

    #[test]
    fn missing_mandatory_stage_yields_none() {
        let device = test_device!();
        let manager = PipelineManager::new(device, None).unwrap();

        let compute = manager
            .create_compute_pipeline(&ComputePipelineShaders::default())
            .unwrap();
        assert!(compute.is_none());

        let graphics = manager
            .create_graphics_pipeline(&GraphicsPipelineShaders {
                fs: Some(shader(vk::ShaderStageFlags::FRAGMENT, &[0])),
                ..Default::default()
            })
            .unwrap();
        assert!(graphics.is_none());

        assert_eq!(manager.pipeline_count(), PipelineCount::default());
    }

    #[test]
    fn pipelines_are_created_once_per_shader_set() {
        let device = test_device!();
        let manager = PipelineManager::new(device, None).unwrap();

        let shaders = ComputePipelineShaders {
            cs: Some(shader(vk::ShaderStageFlags::COMPUTE, &[0, 1])),
        };

        let first = manager.create_compute_pipeline(&shaders).unwrap().unwrap();
        let second = manager.create_compute_pipeline(&shaders).unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.pipeline_count().num_compute_pipelines, 1);
    }

    #[test]
    fn equal_binding_layouts_share_layout_objects() {
        let device = test_device!();
        let manager = PipelineManager::new(device, None).unwrap();

        // Two different shader combinations with identical interfaces.
        let first = manager
            .create_graphics_pipeline(&GraphicsPipelineShaders {
                vs: Some(shader(vk::ShaderStageFlags::VERTEX, &[0])),
                fs: Some(shader(vk::ShaderStageFlags::FRAGMENT, &[4])),
                ..Default::default()
            })
            .unwrap()
            .unwrap();

        let second = manager
            .create_graphics_pipeline(&GraphicsPipelineShaders {
                vs: Some(shader(vk::ShaderStageFlags::VERTEX, &[0])),
                fs: Some(shader(vk::ShaderStageFlags::FRAGMENT, &[4])),
                ..Default::default()
            })
            .unwrap()
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(first.layout(), second.layout()));
        assert_eq!(manager.pipeline_count().num_graphics_pipelines, 2);
    }

    #[test]
    fn concurrent_creation_constructs_one_pipeline() {
        let device = test_device!();
        let manager = PipelineManager::new(device, None).unwrap();

        let shaders = ComputePipelineShaders {
            cs: Some(shader(vk::ShaderStageFlags::COMPUTE, &[0])),
        };

        let results: Vec<_> = std::thread::scope(|scope| {
            (0..8)
                .map(|_| {
                    let manager = &manager;
                    let shaders = &shaders;
                    scope.spawn(move || {
                        manager
                            .create_compute_pipeline(shaders)
                            .unwrap()
                            .unwrap()
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        for pipeline in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], pipeline));
        }

        assert_eq!(manager.pipeline_count().num_compute_pipelines, 1);
    }

    #[derive(Default)]
    struct StateCacheStub {
        registered: AtomicU32,
        stopped: AtomicU32,
    }

    impl StateCache for StateCacheStub {
        fn register_shader(&self, _shader: &Arc<Shader>) {
            self.registered.fetch_add(1, Ordering::Relaxed);
        }

        fn is_compiling_shaders(&self) -> bool {
            true
        }

        fn stop_worker_threads(&self) {
            self.stopped.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn state_cache_gating_and_forwarding() {
        let device = test_device!(crate::device::DeviceConfig {
            enable_state_cache: true,
        });

        // The environment override wins over the device configuration.
        std::env::set_var("SCORIA_STATE_CACHE", "0");
        let stub = Arc::new(StateCacheStub::default());
        let manager = PipelineManager::new(device.clone(), Some(stub.clone())).unwrap();

        manager.register_shader(&shader(vk::ShaderStageFlags::COMPUTE, &[0]));
        assert!(!manager.is_compiling_shaders());
        assert_eq!(stub.registered.load(Ordering::Relaxed), 0);

        std::env::set_var("SCORIA_STATE_CACHE", "1");
        let stub = Arc::new(StateCacheStub::default());
        let manager = PipelineManager::new(device, Some(stub.clone())).unwrap();

        manager.register_shader(&shader(vk::ShaderStageFlags::COMPUTE, &[0]));
        assert!(manager.is_compiling_shaders());
        manager.stop_worker_threads();

        assert_eq!(stub.registered.load(Ordering::Relaxed), 1);
        assert_eq!(stub.stopped.load(Ordering::Relaxed), 1);

        std::env::remove_var("SCORIA_STATE_CACHE");
    }
}
