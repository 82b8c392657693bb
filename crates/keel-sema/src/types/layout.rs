// types/layout.rs
//
// Byte width and alignment of types, memoized per arena.

use rustc_hash::FxHashSet;

use crate::errors::LayoutError;
use crate::types::{ArrayBound, Field, Kind, TypeArena, TypeId, TypeKind};

/// Words in a slice descriptor: data pointer, length, capacity.
const SLICE_WORDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    pub width: u64,
    pub align: u64,
}

impl Layout {
    pub const EMPTY: Layout = Layout { width: 0, align: 1 };
}

fn round_up(offset: u64, align: u64) -> Option<u64> {
    offset.checked_add(align - 1).map(|v| v / align * align)
}

impl TypeArena {
    /// Width and alignment of `ty`.
    ///
    /// Pointer-like types are one machine word and do not look at their
    /// element, so cycles through them are finite. A cycle through value
    /// types (struct fields, fixed arrays) is `InfiniteSize`.
    pub fn width_and_alignment(&mut self, ty: TypeId) -> Result<Layout, LayoutError> {
        let mut visiting = FxHashSet::default();
        self.layout_of(ty, &mut visiting)
    }

    /// Memoized width, if already computed.
    pub fn cached_layout(&self, ty: TypeId) -> Option<Layout> {
        self.layouts.get(&ty).copied()
    }

    /// Byte offset of each struct field.
    pub fn field_offsets(&mut self, ty: TypeId) -> Result<Vec<u64>, LayoutError> {
        let fields: Vec<Field> = self.fields(ty).to_vec();
        let mut visiting = FxHashSet::default();
        visiting.insert(ty);
        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0u64;
        for field in &fields {
            let layout = self.layout_of(field.ty, &mut visiting)?;
            offset = round_up(offset, layout.align).ok_or(LayoutError::TooLarge(ty))?;
            offsets.push(offset);
            offset = offset
                .checked_add(layout.width)
                .ok_or(LayoutError::TooLarge(ty))?;
        }
        Ok(offsets)
    }

    fn layout_of(
        &mut self,
        ty: TypeId,
        visiting: &mut FxHashSet<TypeId>,
    ) -> Result<Layout, LayoutError> {
        if let Some(&layout) = self.layouts.get(&ty) {
            return Ok(layout);
        }
        if !visiting.insert(ty) {
            tracing::debug!(?ty, "value type contains itself");
            return Err(LayoutError::InfiniteSize(ty));
        }
        let result = self.compute_layout(ty, visiting);
        visiting.remove(&ty);
        let layout = result?;
        tracing::trace!(?ty, width = layout.width, align = layout.align, "computed layout");
        self.layouts.insert(ty, layout);
        Ok(layout)
    }

    fn compute_layout(
        &mut self,
        ty: TypeId,
        visiting: &mut FxHashSet<TypeId>,
    ) -> Result<Layout, LayoutError> {
        let word = Layout {
            width: self.target.ptr_width,
            align: self.target.align_for(self.target.ptr_width),
        };
        match self.kind(ty).clone() {
            TypeKind::Basic(kind) => {
                let width = kind
                    .basic_width(&self.target)
                    .ok_or(LayoutError::NoWidth(ty))?;
                let align = if kind == Kind::String {
                    word.align
                } else {
                    self.target.align_for(width)
                };
                Ok(Layout { width, align })
            }
            TypeKind::Ptr(_)
            | TypeKind::Chan { .. }
            | TypeKind::Map { .. }
            | TypeKind::Interface(_)
            | TypeKind::Func(_) => Ok(word),
            TypeKind::Array {
                bound: ArrayBound::Dynamic,
                ..
            } => Ok(Layout {
                width: SLICE_WORDS * word.width,
                align: word.align,
            }),
            TypeKind::Array {
                elem,
                bound: ArrayBound::Fixed(n),
            } => {
                let elem = self.layout_of(elem, visiting)?;
                let width = elem
                    .width
                    .checked_mul(n)
                    .ok_or(LayoutError::TooLarge(ty))?;
                Ok(Layout {
                    width,
                    align: elem.align,
                })
            }
            TypeKind::Struct(fields) => {
                let mut offset = 0u64;
                let mut align = 1u64;
                for field in &fields {
                    let layout = self.layout_of(field.ty, visiting)?;
                    offset = round_up(offset, layout.align).ok_or(LayoutError::TooLarge(ty))?;
                    offset = offset
                        .checked_add(layout.width)
                        .ok_or(LayoutError::TooLarge(ty))?;
                    align = align.max(layout.align);
                }
                let align = align.min(self.target.max_align);
                let width = round_up(offset, align).ok_or(LayoutError::TooLarge(ty))?;
                Ok(Layout { width, align })
            }
            TypeKind::Forward => Err(LayoutError::UnresolvedForward(ty)),
            TypeKind::Ideal | TypeKind::Nil => Err(LayoutError::NoWidth(ty)),
            TypeKind::Error => Ok(Layout::EMPTY),
        }
    }
}
