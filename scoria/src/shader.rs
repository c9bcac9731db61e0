//! Shader objects as seen by the pipeline manager.
//!
//! Compilation and reflection live outside this crate; by the time a shader
//! reaches the pipeline manager, its resource interface has already been
//! reflected into a flat binding list. The `Shader` type aggregates that
//! list into a per-shader [`BindingLayout`] and carries the identity used to
//! key the pipeline caches.

use crate::pipeline::layout::{BindingInfo, BindingLayout, PushConstantRange};
use ash::vk;
use std::{
    hash::{Hash, Hasher},
    num::NonZeroU64,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// A shader participating in pipeline creation.
///
/// Two shaders are considered equal only if they are the same object; the
/// identity doubles as the pipeline cache key, so shaders must be created
/// once and shared.
#[derive(Debug)]
pub struct Shader {
    id: NonZeroU64,
    stage: vk::ShaderStageFlags,
    bindings: BindingLayout,
}

impl Shader {
    /// Creates a shader from its stage and reflected resource interface.
    ///
    /// The stage mask of every binding is replaced by `stage`; bindings that
    /// only differ in their access mask collapse into one entry. The push
    /// constant range is ignored if it is empty.
    pub fn new(
        stage: vk::ShaderStageFlags,
        bindings: &[BindingInfo],
        push_const: PushConstantRange,
    ) -> Arc<Shader> {
        let mut layout = BindingLayout::default();

        for binding in bindings {
            layout.add_binding(BindingInfo {
                stages: stage,
                ..*binding
            });
        }

        if push_const.size != 0 {
            layout.add_push_constant_range(PushConstantRange {
                stages: stage,
                ..push_const
            });
        }

        Arc::new(Shader {
            id: next_id(),
            stage,
            bindings: layout,
        })
    }

    /// Returns the stage this shader executes in.
    #[inline]
    pub fn stage(&self) -> vk::ShaderStageFlags {
        self.stage
    }

    /// Returns the shader's resource interface.
    #[inline]
    pub fn bindings(&self) -> &BindingLayout {
        &self.bindings
    }

    #[inline]
    pub(crate) fn id(&self) -> NonZeroU64 {
        self.id
    }
}

impl PartialEq for Shader {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shader {}

impl Hash for Shader {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn next_id() -> NonZeroU64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);

    NonZeroU64::new(COUNTER.fetch_add(1, Ordering::Relaxed)).unwrap_or_else(|| {
        eprintln!("shader ID counter has overflown");
        std::process::abort();
    })
}
