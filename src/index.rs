//! Online-mutable picture of the bond graph. Vertices are atoms, hyperedge
//! records group each connected fragment, and bond records carry the order
//! property. Fragments merge as bonds arrive, so callers never rebuild.
//!
//! The central invariant: every registered atom belongs to exactly one live
//! fragment at all times. Violations are defects and panic, never self-heal.

use crate::arena::{AtomArena, AtomId};
use crate::complex::{Complex, ComplexBuilder};
use crate::core::{Bond, BondKey, BondOrder};
use crate::error::{Error, Result};
use ahash::HashMap;
use itertools::Itertools;
use slab::Slab;
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, instrument};

/// Handle to a fragment. Like a graph index, it's only meaningful until the
/// next mutation: a merge can retire it and a later merge can reuse the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FragId(u32);
impl FragId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
impl Display for FragId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
struct EdgeId(u32);
impl EdgeId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    frag: FragId,
    edges: SmallVec<EdgeId, 4>,
}

#[derive(Debug, Clone)]
struct Fragment {
    members: Vec<AtomId>,
}

/// The proxy record a bond edge routes through; it owns the order property.
#[derive(Debug, Clone)]
struct BondRecord {
    a: AtomId,
    b: AtomId,
    order: BondOrder,
}

/// Normalized, comparable image of a [`FragmentIndex`], used to prove that a
/// failed call left the index untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    atoms: Vec<(AtomId, FragId)>,
    fragments: Vec<(FragId, Vec<AtomId>)>,
    bonds: Vec<(AtomId, AtomId, BondOrder)>,
}

/// Incremental fragment index over atoms and bonds.
#[derive(Debug, Default, Clone)]
pub struct FragmentIndex {
    verts: HashMap<AtomId, Vertex>,
    frags: Slab<Fragment>,
    edges: Slab<BondRecord>,
    registered: Vec<AtomId>,
}
impl FragmentIndex {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an atom, immediately wrapped in a fresh singleton fragment.
    pub fn add_atom(&mut self, atom: AtomId) -> Result<FragId> {
        if self.verts.contains_key(&atom) {
            return Err(Error::DuplicateAtom(atom));
        }
        let frag = FragId::new(self.frags.insert(Fragment {
            members: vec![atom],
        }));
        self.verts.insert(
            atom,
            Vertex {
                frag,
                edges: SmallVec::new(),
            },
        );
        self.registered.push(atom);
        #[cfg(debug_assertions)]
        self.check();
        Ok(frag)
    }

    /// Record a bond between two registered atoms, merging their fragments
    /// if they differ. All validation happens before any state changes, so a
    /// returned error means the index is exactly as it was.
    #[instrument(level = "debug", skip(self))]
    pub fn add_bond(&mut self, a: AtomId, b: AtomId, order: BondOrder) -> Result<()> {
        if a == b {
            return Err(Error::SelfBond(a));
        }
        let fa = self.verts.get(&a).ok_or(Error::UnknownAtom(a))?.frag;
        let fb = self.verts.get(&b).ok_or(Error::UnknownAtom(b))?.frag;
        if self.edge_between(a, b).is_some() {
            return Err(Error::DuplicateBond(a, b));
        }

        if fa != fb {
            self.merge(fa, fb);
        }
        let edge = EdgeId::new(self.edges.insert(BondRecord { a, b, order }));
        self.vert_mut(a).edges.push(edge);
        self.vert_mut(b).edges.push(edge);
        #[cfg(debug_assertions)]
        self.check();
        Ok(())
    }

    /// Merge the smaller member set into the larger; bounds total re-parent
    /// work across any sequence of merges.
    fn merge(&mut self, fa: FragId, fb: FragId) -> FragId {
        let (winner, loser) = if self.frags[fa.index()].members.len()
            >= self.frags[fb.index()].members.len()
        {
            (fa, fb)
        } else {
            (fb, fa)
        };
        debug!(%winner, %loser, "merging fragments");
        let members = std::mem::take(&mut self.frags[loser.index()].members);
        // every vertex is re-parented before the losing record goes away
        for &atom in &members {
            self.vert_mut(atom).frag = winner;
        }
        self.frags[winner.index()].members.extend(members);
        self.frags.remove(loser.index());
        winner
    }

    fn vert_mut(&mut self, atom: AtomId) -> &mut Vertex {
        self.verts
            .get_mut(&atom)
            .unwrap_or_else(|| panic!("atom {atom} vanished from the vertex table"))
    }

    fn edge_between(&self, a: AtomId, b: AtomId) -> Option<EdgeId> {
        let vert = self.verts.get(&a)?;
        vert.edges.iter().copied().find(|&e| {
            let rec = &self.edges[e.index()];
            rec.a == b || rec.b == b
        })
    }

    pub fn contains(&self, atom: AtomId) -> bool {
        self.verts.contains_key(&atom)
    }
    pub fn atom_count(&self) -> usize {
        self.verts.len()
    }
    pub fn bond_count(&self) -> usize {
        self.edges.len()
    }
    pub fn fragment_count(&self) -> usize {
        self.frags.len()
    }

    /// Registered atoms, in registration order.
    pub fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.registered.iter().copied()
    }
    /// All bond edges, in creation order.
    pub fn bonds(&self) -> impl Iterator<Item = Bond> + '_ {
        self.edges
            .iter()
            .map(|(_, rec)| Bond::raw(rec.a, rec.b, rec.order))
    }

    /// Direct neighbors of `atom`.
    pub fn bonded_atoms(&self, atom: AtomId) -> Result<Vec<AtomId>> {
        let vert = self.verts.get(&atom).ok_or(Error::UnknownAtom(atom))?;
        Ok(vert
            .edges
            .iter()
            .map(|&e| {
                let rec = &self.edges[e.index()];
                if rec.a == atom {
                    rec.b
                } else {
                    rec.a
                }
            })
            .collect())
    }

    pub fn bond_order(&self, a: AtomId, b: AtomId) -> Result<BondOrder> {
        for id in [a, b] {
            if !self.verts.contains_key(&id) {
                return Err(Error::UnknownAtom(id));
            }
        }
        let edge = self.edge_between(a, b).ok_or(Error::NoSuchBond(a, b))?;
        Ok(self.edges[edge.index()].order)
    }

    /// Change a bond's order in place, returning the old one.
    pub fn set_order(&mut self, a: AtomId, b: AtomId, order: BondOrder) -> Result<BondOrder> {
        for id in [a, b] {
            if !self.verts.contains_key(&id) {
                return Err(Error::UnknownAtom(id));
            }
        }
        let edge = self.edge_between(a, b).ok_or(Error::NoSuchBond(a, b))?;
        Ok(std::mem::replace(
            &mut self.edges[edge.index()].order,
            order,
        ))
    }

    /// The fragment `atom` currently belongs to.
    pub fn fragment_of(&self, atom: AtomId) -> Result<FragId> {
        self.verts
            .get(&atom)
            .map(|v| v.frag)
            .ok_or(Error::UnknownAtom(atom))
    }
    /// Member atoms of a live fragment.
    pub fn fragment(&self, frag: FragId) -> Option<&[AtomId]> {
        self.frags.get(frag.index()).map(|f| f.members.as_slice())
    }
    pub fn fragments(&self) -> impl Iterator<Item = (FragId, &[AtomId])> + '_ {
        self.frags
            .iter()
            .map(|(i, f)| (FragId::new(i), f.members.as_slice()))
    }
    pub fn same_fragment(&self, a: AtomId, b: AtomId) -> Result<bool> {
        Ok(self.fragment_of(a)? == self.fragment_of(b)?)
    }

    /// Rebuild a [`Complex`] from the current atoms and bonds through the
    /// immutable path. Its islands partition atoms exactly as the fragments
    /// here do.
    #[instrument(level = "debug", skip_all, fields(atoms = self.atom_count(), bonds = self.bond_count()))]
    pub fn rebuild(&self, atoms: &AtomArena) -> Result<Complex> {
        let mut builder = ComplexBuilder::new();
        for atom in self.atoms() {
            builder.add_atom(atom)?;
        }
        for bond in self.bonds() {
            builder.add_bond(bond)?;
        }
        builder.build(atoms)
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            atoms: self
                .verts
                .iter()
                .map(|(&atom, vert)| (atom, vert.frag))
                .sorted()
                .collect(),
            fragments: self
                .frags
                .iter()
                .map(|(i, frag)| {
                    let mut members = frag.members.clone();
                    members.sort_unstable();
                    (FragId::new(i), members)
                })
                .sorted()
                .collect(),
            bonds: self
                .edges
                .iter()
                .map(|(_, rec)| {
                    let BondKey(a, b) = BondKey::new(rec.a, rec.b);
                    (a, b, rec.order)
                })
                .sorted_by_key(|&(a, b, _)| (a, b))
                .collect(),
        }
    }

    /// Verify the bookkeeping: each atom in exactly one fragment, each
    /// member pointing back at it, each edge joining same-fragment atoms.
    /// Panics on violation; run after every mutation in debug builds.
    pub fn check(&self) {
        let mut seen = 0usize;
        for (i, frag) in self.frags.iter() {
            for &atom in &frag.members {
                let vert = self
                    .verts
                    .get(&atom)
                    .unwrap_or_else(|| panic!("fragment #{i} lists unregistered atom {atom}"));
                assert_eq!(
                    vert.frag.index(),
                    i,
                    "atom {atom} is listed in fragment #{i} but points at {}",
                    vert.frag
                );
                seen += 1;
            }
        }
        assert_eq!(
            seen,
            self.verts.len(),
            "every atom must be in exactly one fragment"
        );
        for (_, rec) in self.edges.iter() {
            let fa = self.verts[&rec.a].frag;
            let fb = self.verts[&rec.b].frag;
            assert_eq!(
                fa, fb,
                "bond {}-{} spans fragments {fa} and {fb}",
                rec.a, rec.b
            );
        }
    }
}
