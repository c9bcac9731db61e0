//! Pipeline objects, their layouts, and the manager that caches both.
//!
//! A pipeline is created from a set of per-stage [`Shader`] objects. The
//! [`manager`] merges their binding layouts, resolves the merged layout to
//! Vulkan objects through [`layout`], and caches the resulting pipeline
//! object by shader identity. The [`slots`] module carries the older
//! single-descriptor-set scheme still used by utility pipelines.
//!
//! [`Shader`]: crate::shader::Shader

pub use self::cache::PipelineCache;
pub use self::compute::{ComputePipeline, ComputePipelineShaders};
pub use self::graphics::{GraphicsPipeline, GraphicsPipelineShaders};
pub use self::layout::{
    BindingInfo, BindingLayout, BindingLayoutObjects, BindingMapping, DescriptorSets,
    PushConstantRange,
};
pub use self::manager::{PipelineCount, PipelineManager, StateCache};
pub use self::slots::{DescriptorSlotMapping, SlotPipelineLayout};

pub mod cache;
pub mod compute;
pub mod graphics;
pub mod layout;
pub mod manager;
pub mod slots;
