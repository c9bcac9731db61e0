//! Binding layouts, and the Vulkan objects created from them.
//!
//! Shader resource bindings are distributed over a small fixed number of
//! descriptor sets, chosen by update frequency so that the draw-time code
//! can rewrite only the sets that actually changed. Bindings that are
//! declared identically in multiple stages are merged into one Vulkan
//! binding with a combined stage mask, which keeps descriptor sets small
//! and descriptor updates cheap.

use crate::descriptor::DescriptorInfo;
use crate::device::{Device, DeviceOwned};
use crate::{VulkanError, VulkanObject};
use ash::vk;
use foldhash::HashMap;
use smallvec::SmallVec;
use std::{mem::size_of, sync::Arc};

/// Descriptor set indices used by pipeline layouts.
///
/// Only three sets are used. Compute pipelines put everything into set 0;
/// graphics pipelines spread their bindings over all three. The two bind
/// points never share a pipeline, so `CS_ALL` and `FS_VIEWS` can alias the
/// same index without ever colliding.
///
/// Fragment-stage buffers get a set of their own because uniform buffers
/// are typically rebound every draw, while image and sampler bindings
/// change far less often; separating them lets the caller push only the
/// changed set. All remaining graphics-stage bindings are pooled into one
/// set, as such resources are rarely updated between draws.
#[derive(Clone, Copy, Debug)]
pub struct DescriptorSets;

impl DescriptorSets {
    pub const CS_ALL: u32 = 0;
    pub const FS_VIEWS: u32 = 0;
    pub const FS_BUFFERS: u32 = 1;
    pub const VS_ALL: u32 = 2;
    pub const SET_COUNT: u32 = 3;
}

/// A push constant range accumulated over one or more shader stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    pub stages: vk::ShaderStageFlags,
    pub offset: u32,
    pub size: u32,
}

impl PushConstantRange {
    pub(crate) fn to_vk(self) -> vk::PushConstantRange {
        vk::PushConstantRange::default()
            .stage_flags(self.stages)
            .offset(self.offset)
            .size(self.size)
    }
}

/// Metadata for a single resource binding in a shader, or in a pipeline
/// formed from multiple shaders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingInfo {
    /// Vulkan descriptor type.
    pub descriptor_type: vk::DescriptorType,
    /// Resource slot number the binding was declared with.
    pub resource_binding: u32,
    /// Compatible image view type.
    pub view_type: vk::ImageViewType,
    /// Stages that can access the resource.
    pub stages: vk::ShaderStageFlags,
    /// Ways the resource may be accessed.
    pub access: vk::AccessFlags,
}

impl BindingInfo {
    /// Computes the descriptor set index for this binding, based on the
    /// stages that use it.
    pub fn compute_set_index(&self) -> u32 {
        if self.stages.intersects(vk::ShaderStageFlags::COMPUTE) {
            DescriptorSets::CS_ALL
        } else if self.stages.intersects(vk::ShaderStageFlags::FRAGMENT) {
            if self.descriptor_type == vk::DescriptorType::UNIFORM_BUFFER
                || self.descriptor_type == vk::DescriptorType::STORAGE_BUFFER
            {
                DescriptorSets::FS_BUFFERS
            } else {
                DescriptorSets::FS_VIEWS
            }
        } else {
            DescriptorSets::VS_ALL
        }
    }

    /// Checks whether two bindings can collapse into one Vulkan binding.
    ///
    /// That is the case if they refer to the same resource with the same
    /// descriptor and view type, and end up in the same descriptor set.
    pub fn can_merge(&self, other: &BindingInfo) -> bool {
        if self.stages.intersects(vk::ShaderStageFlags::FRAGMENT)
            != other.stages.intersects(vk::ShaderStageFlags::FRAGMENT)
        {
            return false;
        }

        self.descriptor_type == other.descriptor_type
            && self.resource_binding == other.resource_binding
            && self.view_type == other.view_type
    }

    /// Merges the stage and access masks of two otherwise identical binding
    /// declarations.
    pub fn merge(&mut self, other: &BindingInfo) {
        self.stages |= other.stages;
        self.access |= other.access;
    }
}

/// All resource bindings and the push constant range of a pipeline, mapped
/// out per descriptor set.
///
/// Bindings that only differ in stage are merged on insertion, so Vulkan
/// binding numbers — the position of each entry within its set — depend on
/// insertion order. Callers must treat them as opaque until the layout is
/// finalized and resolved through [`BindingLayoutObjects`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BindingLayout {
    bindings: [Vec<BindingInfo>; DescriptorSets::SET_COUNT as usize],
    push_const: PushConstantRange,
}

impl BindingLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of Vulkan bindings in the given set.
    #[inline]
    pub fn binding_count(&self, set: u32) -> u32 {
        self.bindings[set as usize].len() as u32
    }

    /// Returns the bindings of the given set, in binding-number order.
    #[inline]
    pub fn bindings(&self, set: u32) -> &[BindingInfo] {
        &self.bindings[set as usize]
    }

    /// Returns the accumulated push constant range.
    #[inline]
    pub fn push_constant_range(&self) -> PushConstantRange {
        self.push_const
    }

    /// Adds a binding to the layout, merging it into an existing entry of
    /// its target set if one is compatible.
    pub fn add_binding(&mut self, binding: BindingInfo) {
        let set = binding.compute_set_index();

        for entry in &mut self.bindings[set as usize] {
            if entry.can_merge(&binding) {
                entry.merge(&binding);
                return;
            }
        }

        self.bindings[set as usize].push(binding);
    }

    /// Extends the push constant range to the union of the current and the
    /// given byte span. The range never shrinks.
    pub fn add_push_constant_range(&mut self, range: PushConstantRange) {
        let old_end = self.push_const.offset + self.push_const.size;
        let new_end = range.offset + range.size;

        self.push_const.stages |= range.stages;
        self.push_const.offset = self.push_const.offset.min(range.offset);
        self.push_const.size = old_end.max(new_end) - self.push_const.offset;
    }

    /// Adds all bindings and the push constant range of another layout.
    ///
    /// Used to combine per-stage layouts into one pipeline-wide layout.
    /// Since binding numbers are assigned in insertion order, layouts must
    /// be merged in a fixed stage order for the result to be reproducible.
    pub fn merge(&mut self, other: &BindingLayout) {
        for set in &other.bindings {
            for binding in set {
                self.add_binding(*binding);
            }
        }

        self.add_push_constant_range(other.push_const);
    }
}

/// Resolved location of a resource binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingMapping {
    /// Descriptor set index.
    pub set: u32,
    /// Binding number within the set.
    pub binding: u32,
    /// Position of the binding in the flattened list of all bindings of the
    /// pipeline, counted across sets in set order. Used by the caller's
    /// dirty-binding bitmask.
    pub flat_index: u32,
}

/// Vulkan objects created for a binding layout.
///
/// For each descriptor set this creates a descriptor set layout and, if the
/// set has any bindings, a descriptor update template that writes the whole
/// set from a packed [`DescriptorInfo`] array in one call. A pipeline
/// layout referencing all sets and the push constant range ties them
/// together. One instance exists per distinct [`BindingLayout`] value; the
/// pipeline manager deduplicates them by structural equality.
#[derive(Debug)]
pub struct BindingLayoutObjects {
    device: Arc<Device>,
    layout: BindingLayout,
    pipeline_layout: vk::PipelineLayout,
    set_mask: u32,
    set_layouts: [vk::DescriptorSetLayout; DescriptorSets::SET_COUNT as usize],
    set_templates: [vk::DescriptorUpdateTemplate; DescriptorSets::SET_COUNT as usize],
    binding_offsets: [u32; DescriptorSets::SET_COUNT as usize],
    mapping: HashMap<u32, BindingMapping>,
}

impl BindingLayoutObjects {
    /// Creates the Vulkan objects for the given binding layout.
    ///
    /// On failure, every object created by this call up to that point is
    /// destroyed again before the error is returned; a partially
    /// constructed instance is never observable.
    pub fn new(
        device: Arc<Device>,
        layout: &BindingLayout,
    ) -> Result<Arc<BindingLayoutObjects>, VulkanError> {
        let fns = device.fns();

        let mut set_layouts = [vk::DescriptorSetLayout::null(); DescriptorSets::SET_COUNT as usize];
        let mut set_templates =
            [vk::DescriptorUpdateTemplate::null(); DescriptorSets::SET_COUNT as usize];
        let mut binding_offsets = [0u32; DescriptorSets::SET_COUNT as usize];
        let mut set_mask = 0u32;
        let mut mapping = HashMap::default();

        let mut flat_index = 0u32;

        for set in 0..DescriptorSets::SET_COUNT {
            binding_offsets[set as usize] = flat_index;

            let bindings = layout.bindings(set);

            let mut bindings_vk: SmallVec<[vk::DescriptorSetLayoutBinding<'_>; 16]> =
                SmallVec::with_capacity(bindings.len());
            let mut entries_vk: SmallVec<[vk::DescriptorUpdateTemplateEntry; 16]> =
                SmallVec::with_capacity(bindings.len());

            for (index, binding) in bindings.iter().enumerate() {
                bindings_vk.push(
                    vk::DescriptorSetLayoutBinding::default()
                        .binding(index as u32)
                        .descriptor_type(binding.descriptor_type)
                        .descriptor_count(1)
                        .stage_flags(binding.stages),
                );

                entries_vk.push(
                    vk::DescriptorUpdateTemplateEntry::default()
                        .dst_binding(index as u32)
                        .dst_array_element(0)
                        .descriptor_count(1)
                        .descriptor_type(binding.descriptor_type)
                        .offset(index * size_of::<DescriptorInfo>())
                        .stride(size_of::<DescriptorInfo>()),
                );

                // A slot used by both fragment and non-fragment stages shows
                // up in two sets; the lookup keeps the first, lower-set entry.
                mapping.entry(binding.resource_binding).or_insert(BindingMapping {
                    set,
                    binding: index as u32,
                    flat_index,
                });

                flat_index += 1;
            }

            let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings_vk);

            set_layouts[set as usize] =
                match unsafe { fns.create_descriptor_set_layout(&layout_info, None) } {
                    Ok(handle) => handle,
                    Err(err) => {
                        unsafe { destroy_set_objects(fns, &set_layouts, &set_templates) };
                        return Err(err.into());
                    }
                };

            if !bindings.is_empty() {
                let template_info = vk::DescriptorUpdateTemplateCreateInfo::default()
                    .descriptor_update_entries(&entries_vk)
                    .template_type(vk::DescriptorUpdateTemplateType::DESCRIPTOR_SET)
                    .descriptor_set_layout(set_layouts[set as usize]);

                set_templates[set as usize] =
                    match unsafe { fns.create_descriptor_update_template(&template_info, None) } {
                        Ok(handle) => handle,
                        Err(err) => {
                            unsafe { destroy_set_objects(fns, &set_layouts, &set_templates) };
                            return Err(err.into());
                        }
                    };

                set_mask |= 1u32 << set;
            }
        }

        let push_const = layout.push_constant_range();
        let push_const_vk = [push_const.to_vk()];

        let mut pipeline_layout_info =
            vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);

        if !push_const.stages.is_empty() && push_const.size != 0 {
            pipeline_layout_info = pipeline_layout_info.push_constant_ranges(&push_const_vk);
        }

        let pipeline_layout = match unsafe { fns.create_pipeline_layout(&pipeline_layout_info, None) }
        {
            Ok(handle) => handle,
            Err(err) => {
                unsafe { destroy_set_objects(fns, &set_layouts, &set_templates) };
                return Err(err.into());
            }
        };

        Ok(Arc::new(BindingLayoutObjects {
            device,
            layout: layout.clone(),
            pipeline_layout,
            set_mask,
            set_layouts,
            set_templates,
            binding_offsets,
            mapping,
        }))
    }

    /// Returns the binding layout the objects were created from.
    #[inline]
    pub fn layout(&self) -> &BindingLayout {
        &self.layout
    }

    /// Returns the bitmask of descriptor sets with a non-zero binding count.
    #[inline]
    pub fn set_mask(&self) -> u32 {
        self.set_mask
    }

    /// Returns the flat index of the first binding of the given set.
    #[inline]
    pub fn first_binding(&self, set: u32) -> u32 {
        self.binding_offsets[set as usize]
    }

    /// Returns the descriptor set layout for the given set. The layout
    /// exists even for sets without bindings.
    #[inline]
    pub fn set_layout(&self, set: u32) -> vk::DescriptorSetLayout {
        self.set_layouts[set as usize]
    }

    /// Returns the descriptor update template for the given set, or a null
    /// handle if the set has no bindings.
    #[inline]
    pub fn set_update_template(&self, set: u32) -> vk::DescriptorUpdateTemplate {
        self.set_templates[set as usize]
    }

    /// Returns the pipeline layout.
    #[inline]
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    /// Looks up where a resource slot ended up after set assignment and
    /// merging, or `None` if no binding uses the slot.
    #[inline]
    pub fn lookup_binding(&self, slot: u32) -> Option<BindingMapping> {
        self.mapping.get(&slot).copied()
    }

    /// Returns the access flags of all bindings combined. Used to decide
    /// whether any resource bound to the pipeline can be written, which
    /// drives barrier placement.
    pub fn access_flags(&self) -> vk::AccessFlags {
        let mut access = vk::AccessFlags::empty();

        for set in 0..DescriptorSets::SET_COUNT {
            for binding in self.layout.bindings(set) {
                access |= binding.access;
            }
        }

        access
    }
}

impl Drop for BindingLayoutObjects {
    fn drop(&mut self) {
        let fns = self.device.fns();

        unsafe {
            fns.destroy_pipeline_layout(self.pipeline_layout, None);
            destroy_set_objects(fns, &self.set_layouts, &self.set_templates);
        }
    }
}

unsafe impl VulkanObject for BindingLayoutObjects {
    type Handle = vk::PipelineLayout;

    #[inline]
    fn handle(&self) -> Self::Handle {
        self.pipeline_layout
    }
}

unsafe impl DeviceOwned for BindingLayoutObjects {
    #[inline]
    fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

/// Destroys per-set objects in reverse creation order. Null handles are
/// skipped by the driver, so this is also used to roll back a partially
/// completed construction.
unsafe fn destroy_set_objects(
    fns: &ash::Device,
    set_layouts: &[vk::DescriptorSetLayout],
    set_templates: &[vk::DescriptorUpdateTemplate],
) {
    for set in (0..set_layouts.len()).rev() {
        fns.destroy_descriptor_update_template(set_templates[set], None);
        fns.destroy_descriptor_set_layout(set_layouts[set], None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn binding(
        descriptor_type: vk::DescriptorType,
        slot: u32,
        stages: vk::ShaderStageFlags,
        access: vk::AccessFlags,
    ) -> BindingInfo {
        BindingInfo {
            descriptor_type,
            resource_binding: slot,
            view_type: vk::ImageViewType::TYPE_2D,
            stages,
            access,
        }
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn set_index_follows_stage_and_type() {
        let cs = binding(
            vk::DescriptorType::STORAGE_IMAGE,
            0,
            vk::ShaderStageFlags::COMPUTE,
            vk::AccessFlags::SHADER_WRITE,
        );
        assert_eq!(cs.compute_set_index(), DescriptorSets::CS_ALL);

        let fs_ubo = binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            1,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::UNIFORM_READ,
        );
        assert_eq!(fs_ubo.compute_set_index(), DescriptorSets::FS_BUFFERS);

        let fs_ssbo = binding(
            vk::DescriptorType::STORAGE_BUFFER,
            2,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::SHADER_READ,
        );
        assert_eq!(fs_ssbo.compute_set_index(), DescriptorSets::FS_BUFFERS);

        let fs_image = binding(
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            3,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::SHADER_READ,
        );
        assert_eq!(fs_image.compute_set_index(), DescriptorSets::FS_VIEWS);

        let vs_ubo = binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            4,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::UNIFORM_READ,
        );
        assert_eq!(vs_ubo.compute_set_index(), DescriptorSets::VS_ALL);

        let gs_image = binding(
            vk::DescriptorType::SAMPLED_IMAGE,
            5,
            vk::ShaderStageFlags::GEOMETRY,
            vk::AccessFlags::SHADER_READ,
        );
        assert_eq!(gs_image.compute_set_index(), DescriptorSets::VS_ALL);
    }

    #[test]
    fn merge_combines_stage_and_access_masks() {
        let mut vs = binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            0,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::UNIFORM_READ,
        );
        let gs = binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            0,
            vk::ShaderStageFlags::GEOMETRY,
            vk::AccessFlags::SHADER_READ,
        );

        assert!(vs.can_merge(&gs));
        assert!(gs.can_merge(&vs));

        vs.merge(&gs);
        assert_eq!(
            vs.stages,
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::GEOMETRY
        );
        assert_eq!(
            vs.access,
            vk::AccessFlags::UNIFORM_READ | vk::AccessFlags::SHADER_READ
        );
    }

    #[test]
    fn fragment_presence_blocks_merging() {
        let vs = binding(
            vk::DescriptorType::STORAGE_BUFFER,
            7,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::SHADER_READ,
        );
        let fs = binding(
            vk::DescriptorType::STORAGE_BUFFER,
            7,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::SHADER_READ,
        );

        assert!(!vs.can_merge(&fs));
    }

    #[test]
    fn add_binding_merges_in_place() {
        let mut layout = BindingLayout::new();
        layout.add_binding(binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            0,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::UNIFORM_READ,
        ));
        layout.add_binding(binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            0,
            vk::ShaderStageFlags::GEOMETRY,
            vk::AccessFlags::UNIFORM_READ,
        ));

        assert_eq!(layout.binding_count(DescriptorSets::VS_ALL), 1);
        assert_eq!(
            layout.bindings(DescriptorSets::VS_ALL)[0].stages,
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::GEOMETRY
        );
    }

    #[test]
    fn binding_numbers_follow_insertion_order() {
        let mut layout = BindingLayout::new();

        for slot in [4, 2, 9] {
            layout.add_binding(binding(
                vk::DescriptorType::UNIFORM_BUFFER,
                slot,
                vk::ShaderStageFlags::VERTEX,
                vk::AccessFlags::UNIFORM_READ,
            ));
        }

        let bindings = layout.bindings(DescriptorSets::VS_ALL);
        assert_eq!(bindings[0].resource_binding, 4);
        assert_eq!(bindings[1].resource_binding, 2);
        assert_eq!(bindings[2].resource_binding, 9);
    }

    #[test]
    fn push_constant_union_is_order_independent() {
        let low = PushConstantRange {
            stages: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size: 16,
        };
        let high = PushConstantRange {
            stages: vk::ShaderStageFlags::FRAGMENT,
            offset: 16,
            size: 16,
        };

        let mut a = BindingLayout::new();
        a.add_push_constant_range(low);
        a.add_push_constant_range(high);

        let mut b = BindingLayout::new();
        b.add_push_constant_range(high);
        b.add_push_constant_range(low);

        let expected = PushConstantRange {
            stages: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            offset: 0,
            size: 32,
        };
        assert_eq!(a.push_constant_range(), expected);
        assert_eq!(b.push_constant_range(), expected);
    }

    #[test]
    fn merging_is_deterministic() {
        let mut vs = BindingLayout::new();
        vs.add_binding(binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            0,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::UNIFORM_READ,
        ));
        vs.add_binding(binding(
            vk::DescriptorType::SAMPLED_IMAGE,
            3,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::SHADER_READ,
        ));

        let mut fs = BindingLayout::new();
        fs.add_binding(binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            0,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::UNIFORM_READ,
        ));
        fs.add_push_constant_range(PushConstantRange {
            stages: vk::ShaderStageFlags::FRAGMENT,
            offset: 0,
            size: 8,
        });

        let mut first = BindingLayout::new();
        first.merge(&vs);
        first.merge(&fs);

        let mut second = BindingLayout::new();
        second.merge(&vs);
        second.merge(&fs);

        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));

        // Merging the same layout again must not add new bindings.
        first.merge(&fs);
        assert_eq!(first, second);
    }

    #[test]
    fn layout_objects_resolve_resource_slots() {
        let device = test_device!();

        let mut layout = BindingLayout::new();
        layout.add_binding(binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            4,
            vk::ShaderStageFlags::VERTEX,
            vk::AccessFlags::UNIFORM_READ,
        ));
        layout.add_binding(binding(
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            7,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::SHADER_READ,
        ));
        layout.add_binding(binding(
            vk::DescriptorType::UNIFORM_BUFFER,
            2,
            vk::ShaderStageFlags::FRAGMENT,
            vk::AccessFlags::UNIFORM_READ,
        ));

        let objects = BindingLayoutObjects::new(device, &layout).unwrap();

        // Sets 0 and 1 are active, the shared graphics set only holds the
        // vertex UBO.
        assert_eq!(
            objects.set_mask(),
            (1 << DescriptorSets::FS_VIEWS)
                | (1 << DescriptorSets::FS_BUFFERS)
                | (1 << DescriptorSets::VS_ALL)
        );

        let image = objects.lookup_binding(7).unwrap();
        assert_eq!(image.set, DescriptorSets::FS_VIEWS);
        assert_eq!(image.binding, 0);

        let fs_ubo = objects.lookup_binding(2).unwrap();
        assert_eq!(fs_ubo.set, DescriptorSets::FS_BUFFERS);
        assert_eq!(fs_ubo.binding, 0);

        let vs_ubo = objects.lookup_binding(4).unwrap();
        assert_eq!(vs_ubo.set, DescriptorSets::VS_ALL);
        assert_eq!(vs_ubo.binding, 0);

        assert_eq!(objects.lookup_binding(11), None);

        assert!(objects.access_flags().contains(vk::AccessFlags::SHADER_READ));
        assert_ne!(objects.pipeline_layout(), vk::PipelineLayout::null());
        assert_ne!(
            objects.set_update_template(DescriptorSets::FS_BUFFERS),
            vk::DescriptorUpdateTemplate::null()
        );
    }

    #[test]
    fn empty_sets_get_a_layout_but_no_template() {
        let device = test_device!();

        let mut layout = BindingLayout::new();
        layout.add_binding(binding(
            vk::DescriptorType::STORAGE_BUFFER,
            0,
            vk::ShaderStageFlags::COMPUTE,
            vk::AccessFlags::SHADER_WRITE,
        ));

        let objects = BindingLayoutObjects::new(device, &layout).unwrap();

        assert_eq!(objects.set_mask(), 1 << DescriptorSets::CS_ALL);
        assert_ne!(
            objects.set_layout(DescriptorSets::VS_ALL),
            vk::DescriptorSetLayout::null()
        );
        assert_eq!(
            objects.set_update_template(DescriptorSets::VS_ALL),
            vk::DescriptorUpdateTemplate::null()
        );
        assert_eq!(objects.first_binding(DescriptorSets::VS_ALL), 1);
    }
}
