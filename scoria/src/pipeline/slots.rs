//! Single-descriptor-set pipeline layouts.
//!
//! Predecessor of the set-partitioned scheme in [`layout`](super::layout),
//! kept for utility pipelines whose handful of bindings fit comfortably
//! into one descriptor set. Shader stages declare their resource slots into
//! a [`DescriptorSlotMapping`], which assigns one Vulkan binding per slot;
//! uniform buffer bindings can then be rewritten to their dynamic-offset
//! equivalent before the Vulkan objects are created.

use crate::descriptor::DescriptorInfo;
use crate::device::{Device, DeviceOwned};
use crate::pipeline::layout::PushConstantRange;
use crate::{PipelineLayoutError, VulkanObject, MAX_ACTIVE_BINDINGS};
use ash::vk;
use smallvec::SmallVec;
use std::{mem::size_of, sync::Arc};

/// A resource slot declared by a shader stage.
#[derive(Clone, Copy, Debug)]
pub struct ResourceSlot {
    /// Resource slot number.
    pub slot: u32,
    /// Descriptor type of the resource.
    pub descriptor_type: vk::DescriptorType,
    /// Compatible image view type.
    pub view_type: vk::ImageViewType,
    /// Ways the resource may be accessed.
    pub access: vk::AccessFlags,
}

/// A slot resolved to a Vulkan binding, together with the stages that
/// declared it. Each binding stores exactly one descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorSlot {
    pub slot: u32,
    pub descriptor_type: vk::DescriptorType,
    pub view_type: vk::ImageViewType,
    pub stages: vk::ShaderStageFlags,
    pub access: vk::AccessFlags,
}

/// Collects the resource slots of all stages of a pipeline and assigns
/// Vulkan binding numbers to them.
#[derive(Clone, Debug, Default)]
pub struct DescriptorSlotMapping {
    slots: Vec<DescriptorSlot>,
    push_const: PushConstantRange,
}

impl DescriptorSlotMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of Vulkan bindings.
    #[inline]
    pub fn binding_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Returns all bindings, in binding-number order.
    #[inline]
    pub fn bindings(&self) -> &[DescriptorSlot] {
        &self.slots
    }

    /// Returns the accumulated push constant range.
    #[inline]
    pub fn push_const_range(&self) -> PushConstantRange {
        self.push_const
    }

    /// Declares a slot for a shader stage.
    ///
    /// If another stage already declared the same slot number, its stage
    /// and access masks are extended; otherwise a new binding is added.
    pub fn define_slot(&mut self, stage: vk::ShaderStageFlags, desc: &ResourceSlot) {
        match self.binding_id(desc.slot) {
            Some(binding_id) => {
                let slot = &mut self.slots[binding_id as usize];
                slot.stages |= stage;
                slot.access |= desc.access;
            }
            None => self.slots.push(DescriptorSlot {
                slot: desc.slot,
                descriptor_type: desc.descriptor_type,
                view_type: desc.view_type,
                stages: stage,
                access: desc.access,
            }),
        }
    }

    /// Declares a push constant range for a shader stage. The accumulated
    /// range grows to the widest `offset + size` seen.
    pub fn define_push_const_range(
        &mut self,
        stage: vk::ShaderStageFlags,
        offset: u32,
        size: u32,
    ) {
        self.push_const.stages |= stage;
        self.push_const.size = self.push_const.size.max(offset + size);
    }

    /// Returns the binding number assigned to a slot, if any.
    ///
    /// A linear search; the number of bindings used by a shader is much
    /// smaller than the number of resource slots available to the system.
    pub fn binding_id(&self, slot: u32) -> Option<u32> {
        self.slots
            .iter()
            .position(|entry| entry.slot == slot)
            .map(|index| index as u32)
    }

    /// Replaces static uniform buffer bindings by their dynamic-offset
    /// equivalent, if their count lies within the given device limit.
    /// Dynamic descriptors let the caller rebind a buffer at a new offset
    /// without rewriting the descriptor itself.
    ///
    /// Must be called before any Vulkan objects are created from the
    /// mapping; the descriptor type is baked into the set layout.
    pub fn make_descriptors_dynamic(&mut self, uniform_buffers: u32, _storage_buffers: u32) {
        if self.count_descriptors(vk::DescriptorType::UNIFORM_BUFFER) <= uniform_buffers {
            self.replace_descriptors(
                vk::DescriptorType::UNIFORM_BUFFER,
                vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
            );
        }
    }

    fn count_descriptors(&self, descriptor_type: vk::DescriptorType) -> u32 {
        self.slots
            .iter()
            .filter(|slot| slot.descriptor_type == descriptor_type)
            .count() as u32
    }

    fn replace_descriptors(&mut self, old: vk::DescriptorType, new: vk::DescriptorType) {
        for slot in &mut self.slots {
            if slot.descriptor_type == old {
                slot.descriptor_type = new;
            }
        }
    }
}

/// Pipeline layout with a single descriptor set.
///
/// Creates one descriptor set layout and one descriptor update template
/// (both skipped when there are no bindings) and a pipeline layout
/// referencing the single set.
#[derive(Debug)]
pub struct SlotPipelineLayout {
    device: Arc<Device>,
    push_const: PushConstantRange,
    set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    template: vk::DescriptorUpdateTemplate,
    slots: Vec<DescriptorSlot>,
    dynamic_slots: Vec<u32>,
    descriptor_type_mask: u32,
}

impl SlotPipelineLayout {
    /// Creates the Vulkan objects for the given slot mapping.
    ///
    /// Fails with [`PipelineLayoutError::TooManyBindings`] if the mapping
    /// exceeds [`MAX_ACTIVE_BINDINGS`]; a shader interface of that size
    /// cannot fit a single descriptor set on any supported device. Native
    /// failures destroy all objects created by this call before returning.
    pub fn new(
        device: Arc<Device>,
        mapping: &DescriptorSlotMapping,
        bind_point: vk::PipelineBindPoint,
    ) -> Result<Arc<SlotPipelineLayout>, PipelineLayoutError> {
        let bindings = mapping.bindings();

        if bindings.len() as u32 > MAX_ACTIVE_BINDINGS {
            return Err(PipelineLayoutError::TooManyBindings(bindings.len() as u32));
        }

        let fns = device.fns();

        let mut bindings_vk: SmallVec<[vk::DescriptorSetLayoutBinding<'_>; 16]> =
            SmallVec::with_capacity(bindings.len());
        let mut entries_vk: SmallVec<[vk::DescriptorUpdateTemplateEntry; 16]> =
            SmallVec::with_capacity(bindings.len());

        let mut dynamic_slots = Vec::new();
        let mut descriptor_type_mask = 0u32;

        for (index, slot) in bindings.iter().enumerate() {
            bindings_vk.push(
                vk::DescriptorSetLayoutBinding::default()
                    .binding(index as u32)
                    .descriptor_type(slot.descriptor_type)
                    .descriptor_count(1)
                    .stage_flags(slot.stages),
            );

            entries_vk.push(
                vk::DescriptorUpdateTemplateEntry::default()
                    .dst_binding(index as u32)
                    .dst_array_element(0)
                    .descriptor_count(1)
                    .descriptor_type(slot.descriptor_type)
                    .offset(index * size_of::<DescriptorInfo>())
                    .stride(0),
            );

            if slot.descriptor_type == vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC {
                dynamic_slots.push(index as u32);
            }

            descriptor_type_mask |= descriptor_type_bit(slot.descriptor_type);
        }

        // No descriptor set layout is needed if there are no bindings.
        let mut set_layout = vk::DescriptorSetLayout::null();

        if !bindings.is_empty() {
            let set_layout_info =
                vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings_vk);

            set_layout = unsafe { fns.create_descriptor_set_layout(&set_layout_info, None) }
                .map_err(|err| PipelineLayoutError::Creation(err.into()))?;
        }

        let set_layouts = [set_layout];
        let push_const = mapping.push_const_range();
        let push_const_vk = [push_const.to_vk()];

        let mut pipeline_layout_info = vk::PipelineLayoutCreateInfo::default();

        if !bindings.is_empty() {
            pipeline_layout_info = pipeline_layout_info.set_layouts(&set_layouts);
        }

        if push_const.size != 0 {
            pipeline_layout_info = pipeline_layout_info.push_constant_ranges(&push_const_vk);
        }

        let pipeline_layout =
            match unsafe { fns.create_pipeline_layout(&pipeline_layout_info, None) } {
                Ok(handle) => handle,
                Err(err) => {
                    unsafe { fns.destroy_descriptor_set_layout(set_layout, None) };
                    return Err(PipelineLayoutError::Creation(err.into()));
                }
            };

        // Without bindings there are no descriptors to update, so no
        // template is needed either.
        let mut template = vk::DescriptorUpdateTemplate::null();

        if !bindings.is_empty() {
            let template_info = vk::DescriptorUpdateTemplateCreateInfo::default()
                .descriptor_update_entries(&entries_vk)
                .template_type(vk::DescriptorUpdateTemplateType::DESCRIPTOR_SET)
                .descriptor_set_layout(set_layout)
                .pipeline_bind_point(bind_point)
                .pipeline_layout(pipeline_layout)
                .set(0);

            template = match unsafe { fns.create_descriptor_update_template(&template_info, None) }
            {
                Ok(handle) => handle,
                Err(err) => {
                    unsafe {
                        fns.destroy_pipeline_layout(pipeline_layout, None);
                        fns.destroy_descriptor_set_layout(set_layout, None);
                    }
                    return Err(PipelineLayoutError::Creation(err.into()));
                }
            };
        }

        Ok(Arc::new(SlotPipelineLayout {
            device,
            push_const,
            set_layout,
            pipeline_layout,
            template,
            slots: bindings.to_vec(),
            dynamic_slots,
            descriptor_type_mask,
        }))
    }

    /// Number of resource bindings.
    #[inline]
    pub fn binding_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Returns the binding with the given binding number.
    #[inline]
    pub fn binding(&self, id: u32) -> &DescriptorSlot {
        &self.slots[id as usize]
    }

    /// Returns all bindings.
    #[inline]
    pub fn bindings(&self) -> &[DescriptorSlot] {
        &self.slots
    }

    /// Returns the push constant range.
    #[inline]
    pub fn push_const_range(&self) -> PushConstantRange {
        self.push_const
    }

    /// Returns the descriptor set layout, or a null handle if the layout
    /// has no bindings.
    #[inline]
    pub fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout {
        self.set_layout
    }

    /// Returns the pipeline layout.
    #[inline]
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    /// Returns the descriptor update template, or a null handle if the
    /// layout has no bindings.
    #[inline]
    pub fn descriptor_template(&self) -> vk::DescriptorUpdateTemplate {
        self.template
    }

    /// Number of bindings using a dynamic descriptor type.
    #[inline]
    pub fn dynamic_binding_count(&self) -> u32 {
        self.dynamic_slots.len() as u32
    }

    /// Returns the `id`-th dynamic binding.
    #[inline]
    pub fn dynamic_binding(&self, id: u32) -> &DescriptorSlot {
        self.binding(self.dynamic_slots[id as usize])
    }

    /// Checks whether at least one binding uses the static uniform buffer
    /// descriptor type.
    #[inline]
    pub fn has_static_buffer_bindings(&self) -> bool {
        self.descriptor_type_mask & descriptor_type_bit(vk::DescriptorType::UNIFORM_BUFFER) != 0
    }

    /// Returns the stages that can write to a resource through this layout.
    /// Storage buffers and images are assumed to be written if present;
    /// used for synchronization purposes.
    pub fn storage_descriptor_stages(&self) -> vk::ShaderStageFlags {
        let mut stages = vk::ShaderStageFlags::empty();

        for slot in &self.slots {
            if slot.access.intersects(vk::AccessFlags::SHADER_WRITE) {
                stages |= slot.stages;
            }
        }

        stages
    }
}

impl Drop for SlotPipelineLayout {
    fn drop(&mut self) {
        let fns = self.device.fns();

        unsafe {
            fns.destroy_descriptor_update_template(self.template, None);
            fns.destroy_pipeline_layout(self.pipeline_layout, None);
            fns.destroy_descriptor_set_layout(self.set_layout, None);
        }
    }
}

unsafe impl VulkanObject for SlotPipelineLayout {
    type Handle = vk::PipelineLayout;

    #[inline]
    fn handle(&self) -> Self::Handle {
        self.pipeline_layout
    }
}

unsafe impl DeviceOwned for SlotPipelineLayout {
    #[inline]
    fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

fn descriptor_type_bit(descriptor_type: vk::DescriptorType) -> u32 {
    let raw = descriptor_type.as_raw();

    if (0..32).contains(&raw) {
        1u32 << raw
    } else {
        0
    }
}
