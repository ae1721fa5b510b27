
mod index;
mod molecule;

use crate::prelude::*;

/// Allocate `n` atoms of the same element.
pub(crate) fn alloc(arena: &mut AtomArena, element: Element, n: usize) -> Vec<AtomId> {
    (0..n).map(|_| arena.insert(Atom::new(element))).collect()
}
