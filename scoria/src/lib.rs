//! Binding layouts and pipeline management for the Scoria translation layer.
//!
//! Scoria re-expresses a per-shader-stage resource model (buffers, images,
//! samplers and push constants addressed by flat resource slot numbers) in
//! terms of Vulkan's descriptor set and pipeline layout model. This crate
//! contains the parts of that translation that deal with pipelines:
//!
//! - [`pipeline::layout`] assigns shader resource bindings to a fixed set of
//!   descriptor sets, merges bindings that are identical across stages, and
//!   builds the Vulkan descriptor set layouts, descriptor update templates
//!   and pipeline layout for a finalized binding layout.
//! - [`pipeline::slots`] is the older single-descriptor-set scheme, still
//!   used for utility pipelines, including its dynamic-offset descriptor
//!   optimization.
//! - [`pipeline::manager`] deduplicates binding layout objects by structural
//!   equality and pipeline objects by shader identity, under one shared lock.
//!
//! Shader compilation and reflection happen elsewhere; a [`shader::Shader`]
//! enters this crate with its binding list already reflected. Likewise, the
//! per-state compilation of the actual `VkPipeline` handles is driven by the
//! draw-time code, which consumes the layout objects produced here.


pub mod descriptor;
pub mod device;
pub mod pipeline;
pub mod shader;

use ash::vk;
use std::{error::Error, fmt};

/// Hard cap on the number of bindings a single-set pipeline layout can hold.
///
/// A shader interface that exceeds this count cannot fit the descriptor
/// budget of any supported device, so exceeding it is treated as a fatal
/// configuration error rather than something to recover from.
pub const MAX_ACTIVE_BINDINGS: u32 = 384;

/// Gives access to the raw Vulkan handle of an object.
pub unsafe trait VulkanObject {
    /// The type of the raw handle.
    type Handle: vk::Handle;

    /// Returns the raw Vulkan handle of the object.
    fn handle(&self) -> Self::Handle;
}

/// Error reported by a failed Vulkan call.
///
/// Covers the error codes the object-creation entry points used by this
/// crate can return; anything else is passed through as [`Unrecognized`].
///
/// [`Unrecognized`]: VulkanError::Unrecognized
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VulkanError {
    OutOfHostMemory,
    OutOfDeviceMemory,
    InitializationFailed,
    DeviceLost,
    Fragmentation,
    Unrecognized(vk::Result),
}

impl From<vk::Result> for VulkanError {
    fn from(result: vk::Result) -> Self {
        match result {
            vk::Result::ERROR_OUT_OF_HOST_MEMORY => Self::OutOfHostMemory,
            vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => Self::OutOfDeviceMemory,
            vk::Result::ERROR_INITIALIZATION_FAILED => Self::InitializationFailed,
            vk::Result::ERROR_DEVICE_LOST => Self::DeviceLost,
            vk::Result::ERROR_FRAGMENTATION => Self::Fragmentation,
            result => Self::Unrecognized(result),
        }
    }
}

impl Error for VulkanError {}

impl fmt::Display for VulkanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfHostMemory => write!(f, "a host memory allocation has failed"),
            Self::OutOfDeviceMemory => write!(f, "a device memory allocation has failed"),
            Self::InitializationFailed => {
                write!(f, "initialization of an object could not be completed")
            }
            Self::DeviceLost => write!(f, "the logical or physical device has been lost"),
            Self::Fragmentation => {
                write!(f, "a descriptor pool creation has failed due to fragmentation")
            }
            Self::Unrecognized(result) => {
                write!(f, "unrecognized Vulkan error code {}", result.as_raw())
            }
        }
    }
}

/// Error returned when constructing a pipeline layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineLayoutError {
    /// The shader interface declares more bindings than a single descriptor
    /// set may hold. See [`MAX_ACTIVE_BINDINGS`].
    TooManyBindings(u32),
    /// A Vulkan object creation call failed.
    Creation(VulkanError),
}

impl From<VulkanError> for PipelineLayoutError {
    fn from(err: VulkanError) -> Self {
        Self::Creation(err)
    }
}

impl Error for PipelineLayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TooManyBindings(_) => None,
            Self::Creation(err) => Some(err),
        }
    }
}

impl fmt::Display for PipelineLayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyBindings(count) => {
                write!(f, "too many active bindings in pipeline layout ({})", count)
            }
            Self::Creation(_) => write!(f, "failed to create pipeline layout objects"),
        }
    }
}
