//! Descriptor data as written through update templates, and the dirty
//! tracking used to decide which descriptor sets need rewriting.

use crate::pipeline::layout::DescriptorSets;
use ash::vk;

/// Generic descriptor payload.
///
/// The draw-time binding layer gathers one `DescriptorInfo` per binding into
/// a packed array and writes a whole descriptor set with a single
/// `vkUpdateDescriptorSetWithTemplate` call. The update template entries
/// created alongside each set layout address this array with a fixed stride
/// of `size_of::<DescriptorInfo>()`, so every descriptor kind must occupy
/// the same number of bytes regardless of which member is meaningful.
#[repr(C)]
#[derive(Clone, Copy)]
pub union DescriptorInfo {
    pub image: vk::DescriptorImageInfo,
    pub buffer: vk::DescriptorBufferInfo,
    pub texel_buffer: vk::BufferView,
}

impl Default for DescriptorInfo {
    fn default() -> Self {
        DescriptorInfo {
            buffer: vk::DescriptorBufferInfo::default(),
        }
    }
}

const SET_RANGE: usize = 2 * DescriptorSets::SET_COUNT as usize;

/// Tracks which descriptor sets have to be updated before the next draw or
/// dispatch.
///
/// Resource bindings are dirtied by stage, separately for buffer bindings
/// and view (image/sampler) bindings; the queries translate those stage
/// masks into set bitmasks under the set aliasing rules of
/// [`DescriptorSets`]. The table of currently bound descriptor sets is kept
/// here as well, one slot per (bind point, set index) pair.
#[derive(Debug)]
pub struct DescriptorState {
    dirty_buffers: vk::ShaderStageFlags,
    dirty_views: vk::ShaderStageFlags,
    sets: [vk::DescriptorSet; SET_RANGE],
}

impl DescriptorState {
    pub fn new() -> Self {
        DescriptorState {
            dirty_buffers: vk::ShaderStageFlags::empty(),
            dirty_views: vk::ShaderStageFlags::empty(),
            sets: [vk::DescriptorSet::null(); SET_RANGE],
        }
    }

    pub fn dirty_buffers(&mut self, stages: vk::ShaderStageFlags) {
        self.dirty_buffers |= stages;
    }

    pub fn dirty_views(&mut self, stages: vk::ShaderStageFlags) {
        self.dirty_views |= stages;
    }

    pub fn dirty_stages(&mut self, stages: vk::ShaderStageFlags) {
        self.dirty_buffers |= stages;
        self.dirty_views |= stages;
    }

    pub fn clear_stages(&mut self, stages: vk::ShaderStageFlags) {
        self.dirty_buffers &= !stages;
        self.dirty_views &= !stages;
    }

    pub fn has_dirty_graphics_sets(&self) -> bool {
        (self.dirty_buffers | self.dirty_views).intersects(vk::ShaderStageFlags::ALL_GRAPHICS)
    }

    pub fn has_dirty_compute_sets(&self) -> bool {
        (self.dirty_buffers | self.dirty_views).intersects(vk::ShaderStageFlags::COMPUTE)
    }

    /// Returns the bitmask of graphics descriptor sets that need updating.
    ///
    /// Rebinding a lower-numbered set disturbs every set bound above it, so
    /// fragment view dirt (set 0) also flags the fragment buffer set (set 1).
    pub fn dirty_graphics_sets(&self) -> u32 {
        let mut result = 0u32;

        if self.dirty_buffers.intersects(vk::ShaderStageFlags::FRAGMENT) {
            result |= 1 << DescriptorSets::FS_BUFFERS;
        }

        if self.dirty_views.intersects(vk::ShaderStageFlags::FRAGMENT) {
            result |= (1 << DescriptorSets::FS_VIEWS) | (1 << DescriptorSets::FS_BUFFERS);
        }

        let pre_raster = vk::ShaderStageFlags::ALL_GRAPHICS & !vk::ShaderStageFlags::FRAGMENT;

        if (self.dirty_buffers | self.dirty_views).intersects(pre_raster) {
            result |= 1 << DescriptorSets::VS_ALL;
        }

        result
    }

    pub fn dirty_compute_sets(&self) -> u32 {
        let mut result = 0u32;

        if (self.dirty_buffers | self.dirty_views).intersects(vk::ShaderStageFlags::COMPUTE) {
            result |= 1 << DescriptorSets::CS_ALL;
        }

        result
    }

    /// Forgets all bound descriptor sets.
    pub fn clear_sets(&mut self) {
        self.sets = [vk::DescriptorSet::null(); SET_RANGE];
    }

    /// Returns the descriptor set bound at the given bind point and index.
    pub fn set(&self, bind_point: vk::PipelineBindPoint, index: u32) -> vk::DescriptorSet {
        self.sets[set_slot(bind_point, index)]
    }

    pub fn set_mut(
        &mut self,
        bind_point: vk::PipelineBindPoint,
        index: u32,
    ) -> &mut vk::DescriptorSet {
        &mut self.sets[set_slot(bind_point, index)]
    }
}

impl Default for DescriptorState {
    fn default() -> Self {
        Self::new()
    }
}

fn set_slot(bind_point: vk::PipelineBindPoint, index: u32) -> usize {
    debug_assert!(matches!(
        bind_point,
        vk::PipelineBindPoint::GRAPHICS | vk::PipelineBindPoint::COMPUTE
    ));
    debug_assert!(index < DescriptorSets::SET_COUNT);

    bind_point.as_raw() as usize * DescriptorSets::SET_COUNT as usize + index as usize
}
