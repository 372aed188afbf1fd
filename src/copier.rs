//! Shallow field copying between two instances of the same type.
//!
//! Used to snapshot mutable state (lazy-loading proxy internals) without a
//! constructor call. Each type declares an explicit field-descriptor list,
//! composed with its ancestor chain's descriptors; the copy is best-effort:
//! a descriptor may report a field as skipped (immutable fields) and skipped
//! fields are swallowed, never rolled back nor surfaced.

use tracing::trace;

/// Result of applying one field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Skipped,
}

/// One copyable field of `T`.
pub struct FieldCopier<T: ?Sized> {
    name: &'static str,
    copy: Box<dyn Fn(&T, &mut T) -> CopyOutcome>,
}

impl<T: ?Sized> FieldCopier<T> {
    pub fn new(
        name: &'static str,
        copy: impl Fn(&T, &mut T) -> CopyOutcome + 'static,
    ) -> Self {
        Self {
            name,
            copy: Box::new(copy),
        }
    }

    /// Descriptor for an immutable field: enumerated in the chain, always
    /// skipped.
    pub fn immutable(name: &'static str) -> Self {
        Self::new(name, |_, _| CopyOutcome::Skipped)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, source: &T, destination: &mut T) -> CopyOutcome {
        (self.copy)(source, destination)
    }
}

/// Project an embedded ancestor's descriptors onto the outer type, so a type
/// chain enumerates every level's declared fields exactly once.
pub fn lift<B, T>(
    copiers: Vec<FieldCopier<B>>,
    get: fn(&T) -> &B,
    get_mut: fn(&mut T) -> &mut B,
) -> Vec<FieldCopier<T>>
where
    B: 'static,
    T: 'static,
{
    copiers
        .into_iter()
        .map(|copier| {
            FieldCopier::new(copier.name, move |src: &T, dst: &mut T| {
                copier.apply(get(src), get_mut(dst))
            })
        })
        .collect()
}

/// A type whose declared fields (own and ancestor-chain) can be copied.
pub trait CopyFields: Sized {
    /// Field descriptors in chain order: ancestor fields first, own fields
    /// last, each level enumerating only its own declared fields.
    fn field_copiers() -> Vec<FieldCopier<Self>>;
}

/// Copy every copyable field from `source` to `destination`, returning how
/// many fields were copied. Skipped fields are logged and ignored; fields
/// already copied stay copied.
pub fn copy_fields<T: CopyFields>(source: &T, destination: &mut T) -> usize {
    let mut copied = 0;
    for copier in T::field_copiers() {
        match copier.apply(source, destination) {
            CopyOutcome::Copied => copied += 1,
            CopyOutcome::Skipped => {
                trace!(field = copier.name(), "field skipped during copy");
            }
        }
    }
    copied
}

/// Generate clone-based [`FieldCopier`] descriptors for the named fields of a
/// type.
#[macro_export]
macro_rules! field_copiers {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        vec![
            $(
                $crate::copier::FieldCopier::new(
                    stringify!($field),
                    |src: &$ty, dst: &mut $ty| {
                        dst.$field = src.$field.clone();
                        $crate::copier::CopyOutcome::Copied
                    },
                )
            ),*
        ]
    };
}
