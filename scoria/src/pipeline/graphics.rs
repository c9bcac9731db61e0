//! Graphics pipeline objects.

use crate::pipeline::compute::shader_id;
use crate::pipeline::layout::BindingLayoutObjects;
use crate::shader::Shader;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Shaders that make up a graphics pipeline.
///
/// Any stage other than the vertex shader may be absent. Compared and
/// hashed by shader identity; this is the graphics pipeline cache key.
#[derive(Clone, Debug, Default)]
pub struct GraphicsPipelineShaders {
    pub vs: Option<Arc<Shader>>,
    pub tcs: Option<Arc<Shader>>,
    pub tes: Option<Arc<Shader>>,
    pub gs: Option<Arc<Shader>>,
    pub fs: Option<Arc<Shader>>,
}

impl PartialEq for GraphicsPipelineShaders {
    fn eq(&self, other: &Self) -> bool {
        shader_id(&self.vs) == shader_id(&other.vs)
            && shader_id(&self.tcs) == shader_id(&other.tcs)
            && shader_id(&self.tes) == shader_id(&other.tes)
            && shader_id(&self.gs) == shader_id(&other.gs)
            && shader_id(&self.fs) == shader_id(&other.fs)
    }
}

impl Eq for GraphicsPipelineShaders {}

impl Hash for GraphicsPipelineShaders {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(shader_id(&self.vs));
        state.write_u64(shader_id(&self.tcs));
        state.write_u64(shader_id(&self.tes));
        state.write_u64(shader_id(&self.gs));
        state.write_u64(shader_id(&self.fs));
    }
}

/// A graphics pipeline.
///
/// Holds the shader set and the binding layout merged from all present
/// stages. The state-dependent `VkPipeline` variants are compiled by the
/// draw-time code against the layout stored here. Instances are created and
/// owned by the pipeline manager and live as long as it does.
#[derive(Debug)]
pub struct GraphicsPipeline {
    shaders: GraphicsPipelineShaders,
    layout: Arc<BindingLayoutObjects>,
}

impl GraphicsPipeline {
    pub(crate) fn new(
        shaders: GraphicsPipelineShaders,
        layout: Arc<BindingLayoutObjects>,
    ) -> GraphicsPipeline {
        GraphicsPipeline { shaders, layout }
    }

    /// Returns the shaders the pipeline was created from.
    #[inline]
    pub fn shaders(&self) -> &GraphicsPipelineShaders {
        &self.shaders
    }

    /// Returns the binding layout objects of the pipeline.
    #[inline]
    pub fn layout(&self) -> &Arc<BindingLayoutObjects> {
        &self.layout
    }
}
