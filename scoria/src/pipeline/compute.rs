//! Compute pipeline objects.

use crate::pipeline::layout::BindingLayoutObjects;
use crate::shader::Shader;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Shaders that make up a compute pipeline.
///
/// Compared and hashed by shader identity; this is the compute pipeline
/// cache key.
#[derive(Clone, Debug, Default)]
pub struct ComputePipelineShaders {
    pub cs: Option<Arc<Shader>>,
}

impl PartialEq for ComputePipelineShaders {
    fn eq(&self, other: &Self) -> bool {
        shader_id(&self.cs) == shader_id(&other.cs)
    }
}

impl Eq for ComputePipelineShaders {}

impl Hash for ComputePipelineShaders {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(shader_id(&self.cs));
    }
}

/// A compute pipeline.
///
/// Holds the shader and the resolved binding layout; the draw-time code
/// compiles and binds the actual `VkPipeline` handles against the layout
/// stored here. Instances are created and owned by the pipeline manager
/// and live as long as it does.
#[derive(Debug)]
pub struct ComputePipeline {
    shaders: ComputePipelineShaders,
    layout: Arc<BindingLayoutObjects>,
}

impl ComputePipeline {
    pub(crate) fn new(
        shaders: ComputePipelineShaders,
        layout: Arc<BindingLayoutObjects>,
    ) -> ComputePipeline {
        ComputePipeline { shaders, layout }
    }

    /// Returns the shaders the pipeline was created from.
    #[inline]
    pub fn shaders(&self) -> &ComputePipelineShaders {
        &self.shaders
    }

    /// Returns the binding layout objects of the pipeline.
    #[inline]
    pub fn layout(&self) -> &Arc<BindingLayoutObjects> {
        &self.layout
    }
}

pub(crate) fn shader_id(shader: &Option<Arc<Shader>>) -> u64 {
    shader.as_ref().map_or(0, |shader| shader.id().get())
}
