//! Backing storage for atoms. Everything else in the crate refers to atoms
//! through the handles issued here, so handle equality *is* atom identity.

use crate::core::Atom;
use crate::error::{Error, Result};
use slab::Slab;
use std::fmt::{self, Display, Formatter};
use std::ops::{Index, IndexMut};

/// Stable handle to an atom in an [`AtomArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct AtomId(u32);
impl AtomId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
impl Display for AtomId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The arena owns every atom and hands out [`AtomId`]s. There is no removal
/// operation, so a handle stays valid (and unique) for the arena's lifetime.
#[derive(Debug, Default, Clone)]
pub struct AtomArena {
    atoms: Slab<Atom>,
}
impl AtomArena {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            atoms: Slab::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, atom: Atom) -> AtomId {
        let index = self.atoms.insert(atom);
        assert!(
            index <= u32::MAX as usize,
            "atom arena overflowed the 32-bit handle space"
        );
        AtomId::new(index)
    }

    /// Allocate a copy of `id` under a fresh identity.
    pub fn duplicate(&mut self, id: AtomId) -> Result<AtomId> {
        let atom = *self.get(id).ok_or(Error::UnknownAtom(id))?;
        Ok(self.insert(atom))
    }

    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id.index())
    }
    pub fn get_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id.index())
    }
    pub fn contains(&self, id: AtomId) -> bool {
        self.atoms.contains(id.index())
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// All atoms in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> + '_ {
        self.atoms.iter().map(|(i, atom)| (AtomId::new(i), atom))
    }
}
impl Index<AtomId> for AtomArena {
    type Output = Atom;
    fn index(&self, id: AtomId) -> &Atom {
        &self.atoms[id.index()]
    }
}
impl IndexMut<AtomId> for AtomArena {
    fn index_mut(&mut self, id: AtomId) -> &mut Atom {
        &mut self.atoms[id.index()]
    }
}
