//! A complex is an unordered collection of disjoint islands and lone atoms,
//! assembled by a staging builder that aggregates bonds at build time.

use crate::aggregate::aggregate;
use crate::arena::{AtomArena, AtomId};
use crate::core::{Atom, Bond, BondKey, BondOrder, Species};
use crate::error::{Error, Result};
use crate::molecule::Molecule;
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use itertools::Either;
use std::collections::hash_map::Entry;
use tracing::{debug, instrument};

/// One member of a complex: a bonded island or a single unbonded atom.
#[derive(Debug, Clone)]
pub enum Subspecies {
    Island(Molecule),
    Lone(AtomId),
}
impl Subspecies {
    pub fn contains(&self, atom: AtomId) -> bool {
        match self {
            Self::Island(mol) => mol.contains(atom),
            Self::Lone(id) => *id == atom,
        }
    }
    pub fn as_island(&self) -> Option<&Molecule> {
        match self {
            Self::Island(mol) => Some(mol),
            Self::Lone(_) => None,
        }
    }
}
impl Species for Subspecies {
    fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        match self {
            Self::Island(mol) => Either::Left(mol.atoms()),
            Self::Lone(id) => Either::Right(std::iter::once(*id)),
        }
    }
    fn atom_count(&self) -> usize {
        match self {
            Self::Island(mol) => mol.atom_count(),
            Self::Lone(_) => 1,
        }
    }
    fn duplicate(&self, atoms: &mut AtomArena) -> Result<Self> {
        match self {
            Self::Island(mol) => mol.duplicate(atoms).map(Self::Island),
            Self::Lone(id) => atoms.duplicate(*id).map(Self::Lone),
        }
    }
}

/// A partition of atoms into disjoint subspecies. Subspecies keep their
/// build order and atoms enumerate in it, so index-based codecs can rely on
/// the ordering for the object's lifetime.
#[derive(Debug, Clone)]
pub struct Complex {
    subspecies: Vec<Subspecies>,
    labels: HashMap<String, AtomId>,
    names: HashMap<AtomId, String>,
}
impl Complex {
    pub fn subspecies(&self) -> &[Subspecies] {
        &self.subspecies
    }
    pub fn molecules(&self) -> impl Iterator<Item = &Molecule> + '_ {
        self.subspecies.iter().filter_map(Subspecies::as_island)
    }
    pub fn lone_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.subspecies.iter().filter_map(|s| match s {
            Subspecies::Lone(id) => Some(*id),
            Subspecies::Island(_) => None,
        })
    }
    pub fn contains(&self, atom: AtomId) -> bool {
        self.subspecies.iter().any(|s| s.contains(atom))
    }

    /// Look an atom up by its display label.
    pub fn atom_named(&self, label: &str) -> Result<AtomId> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))
    }
    pub fn label_of(&self, atom: AtomId) -> Option<&str> {
        self.names.get(&atom).map(String::as_str)
    }

    /// The stable atom list for index-based serialization.
    pub fn atom_rows(&self) -> Vec<AtomId> {
        self.atoms().collect()
    }

    /// Every bond as `(index, index, order)` into [`Self::atom_rows`].
    pub fn bond_rows(&self) -> Vec<(usize, usize, BondOrder)> {
        let index: HashMap<AtomId, usize> = self
            .atoms()
            .enumerate()
            .map(|(row, id)| (id, row))
            .collect();
        self.molecules()
            .flat_map(|mol| mol.bonds())
            .map(|bond| {
                let (a, b) = bond.atoms();
                (index[&a], index[&b], bond.order())
            })
            .collect()
    }

    /// Reconstruct a complex from row-indexed tables, re-running the full
    /// builder validation rather than trusting the input. Atoms are allocated
    /// into `arena` up front; a failed decode leaves them allocated but
    /// unreferenced.
    #[instrument(level = "debug", skip_all, fields(atoms = atoms.len(), bonds = rows.len()))]
    pub fn from_rows(
        atoms: &[Atom],
        rows: &[(usize, usize, BondOrder)],
        arena: &mut AtomArena,
    ) -> Result<Self> {
        let ids: Vec<AtomId> = atoms.iter().map(|&atom| arena.insert(atom)).collect();
        let fetch = |row: usize, index: usize| {
            ids.get(index).copied().ok_or(Error::BadAtomIndex {
                row,
                index,
                len: ids.len(),
            })
        };
        let mut builder = ComplexBuilder::new();
        for &id in &ids {
            builder.add_atom(id)?;
        }
        for (row, &(i, j, order)) in rows.iter().enumerate() {
            builder.add_bond(Bond::new(fetch(row, i)?, fetch(row, j)?, order)?)?;
        }
        builder.build(arena)
    }
}
impl Species for Complex {
    fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.subspecies.iter().flat_map(|s| s.atoms())
    }
    fn atom_count(&self) -> usize {
        self.subspecies.iter().map(Subspecies::atom_count).sum()
    }
    fn duplicate(&self, atoms: &mut AtomArena) -> Result<Self> {
        let mut map = HashMap::new();
        let mut subspecies = Vec::with_capacity(self.subspecies.len());
        for sub in &self.subspecies {
            subspecies.push(match sub {
                Subspecies::Island(mol) => {
                    Subspecies::Island(mol.duplicate_mapped(atoms, &mut map)?)
                }
                Subspecies::Lone(id) => {
                    let fresh = atoms.duplicate(*id)?;
                    map.insert(*id, fresh);
                    Subspecies::Lone(fresh)
                }
            });
        }
        // labeled atoms are always members, so the map covers them
        let labels = self
            .labels
            .iter()
            .map(|(label, id)| (label.clone(), map[id]))
            .collect();
        let names = self
            .names
            .iter()
            .map(|(id, label)| (map[id], label.clone()))
            .collect();
        Ok(Self {
            subspecies,
            labels,
            names,
        })
    }
}

/// Stages atoms, bonds, and display labels, validating each call before any
/// state changes; [`ComplexBuilder::build`] runs the aggregation.
#[derive(Debug, Default, Clone)]
pub struct ComplexBuilder {
    bonds: Vec<Bond>,
    orders: HashMap<BondKey, BondOrder>,
    loners: Vec<AtomId>,
    staged: HashSet<AtomId>,
    labels: HashMap<String, AtomId>,
    names: HashMap<AtomId, String>,
}
impl ComplexBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an atom as a standalone subspecies. A bond staged over the same
    /// atom takes precedence at build time.
    pub fn add_atom(&mut self, atom: AtomId) -> Result<()> {
        if !self.staged.insert(atom) {
            return Err(Error::DuplicateAtom(atom));
        }
        self.loners.push(atom);
        Ok(())
    }

    /// Attach a display label. Labels are a secondary key, not identity:
    /// one label per atom, one atom per label.
    pub fn label(&mut self, atom: AtomId, label: &str) -> Result<()> {
        if let Some(&prior) = self.labels.get(label) {
            if prior != atom {
                return Err(Error::LabelClash {
                    label: label.to_string(),
                    prior,
                    next: atom,
                });
            }
        }
        if let Some(old) = self.names.get(&atom) {
            if old != label {
                return Err(Error::Relabeled {
                    atom,
                    old: old.clone(),
                    new: label.to_string(),
                });
            }
        }
        self.labels.insert(label.to_string(), atom);
        self.names.insert(atom, label.to_string());
        Ok(())
    }

    /// Stage a bond. The same pair with the same order collapses to one;
    /// the same pair with a different order is rejected on the spot.
    pub fn add_bond(&mut self, bond: Bond) -> Result<()> {
        let (a, b) = bond.atoms();
        match self.orders.entry(bond.key()) {
            Entry::Occupied(entry) => {
                let first = *entry.get();
                if first != bond.order() {
                    return Err(Error::ConflictingOrder {
                        a,
                        b,
                        first,
                        second: bond.order(),
                    });
                }
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(bond.order());
                self.bonds.push(bond);
                Ok(())
            }
        }
    }

    /// Convenience for [`Self::add_bond`].
    pub fn bond(&mut self, a: AtomId, b: AtomId, order: BondOrder) -> Result<()> {
        self.add_bond(Bond::new(a, b, order)?)
    }

    /// Aggregate the staged bonds into islands, keep uncovered staged atoms
    /// as lone subspecies, and assemble the complex. The builder is left
    /// untouched, so a failed build can be corrected and retried.
    #[instrument(level = "debug", skip_all, fields(bonds = self.bonds.len(), loners = self.loners.len()))]
    pub fn build(&self, atoms: &AtomArena) -> Result<Complex> {
        for bond in &self.bonds {
            let (a, b) = bond.atoms();
            for id in [a, b] {
                if !atoms.contains(id) {
                    return Err(Error::UnknownAtom(id));
                }
            }
        }
        for &id in self.loners.iter().chain(self.names.keys()) {
            if !atoms.contains(id) {
                return Err(Error::UnknownAtom(id));
            }
        }

        // conflicts were rejected at staging time, so this can't fail
        let groups = aggregate(&self.bonds)?;
        let mut covered = HashSet::with_capacity(self.staged.len());
        let mut subspecies = Vec::with_capacity(groups.len() + self.loners.len());
        for group in groups {
            let mol = Molecule::from_component(group);
            covered.extend(mol.atoms());
            subspecies.push(Subspecies::Island(mol));
        }
        for &id in &self.loners {
            if covered.insert(id) {
                subspecies.push(Subspecies::Lone(id));
            } else {
                debug!(atom = %id, "lone registration superseded by a bond");
            }
        }
        // a label must name an atom that actually made it in
        for &id in self.names.keys() {
            if !covered.contains(&id) {
                return Err(Error::UnknownAtom(id));
            }
        }
        Ok(Complex {
            subspecies,
            labels: self.labels.clone(),
            names: self.names.clone(),
        })
    }
}
