//! A molecule is a connected island of bonded atoms. It's immutable: any
//! change in topology means building a new one.

use crate::aggregate::aggregate;
use crate::arena::{AtomArena, AtomId};
use crate::core::{Bond, BondOrder, Species};
use crate::error::{Error, Result};
use ahash::{HashMap, HashMapExt};
use petgraph::graph::NodeIndex;
use petgraph::prelude::*;
use petgraph::visit::EdgeRef;
use tracing::instrument;

type IslandGraph = UnGraph<AtomId, BondOrder>;

/// A connected, immutable bond-graph over a set of atoms. Atom data stays in
/// the arena; the molecule stores handles and topology only.
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: IslandGraph,
    nodes: HashMap<AtomId, NodeIndex>,
}
impl Molecule {
    /// Build a molecule from a bond list, which must be non-empty and form
    /// exactly one connected component.
    #[instrument(level = "debug", skip_all, fields(bonds = bonds.len()))]
    pub fn new(bonds: &[Bond]) -> Result<Self> {
        let mut groups = aggregate(bonds)?;
        match groups.len() {
            0 => Err(Error::EmptyMolecule),
            1 => Ok(Self::from_component(groups.pop().unwrap())),
            n => Err(Error::Disconnected(n)),
        }
    }

    /// Build from a bond list already known to be one deduplicated component,
    /// i.e. a group straight out of [`aggregate`].
    pub(crate) fn from_component(bonds: Vec<Bond>) -> Self {
        let mut graph = IslandGraph::with_capacity(bonds.len() + 1, bonds.len());
        let mut nodes = HashMap::with_capacity(bonds.len() + 1);
        for bond in &bonds {
            let (a, b) = bond.atoms();
            let na = *nodes.entry(a).or_insert_with(|| graph.add_node(a));
            let nb = *nodes.entry(b).or_insert_with(|| graph.add_node(b));
            graph.add_edge(na, nb, bond.order());
        }
        Self { graph, nodes }
    }

    fn node(&self, atom: AtomId) -> Result<NodeIndex> {
        self.nodes
            .get(&atom)
            .copied()
            .ok_or(Error::ForeignAtom(atom))
    }

    pub fn contains(&self, atom: AtomId) -> bool {
        self.nodes.contains_key(&atom)
    }
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All bonds, deduplicated, in first-seen order.
    pub fn bonds(&self) -> impl Iterator<Item = Bond> + '_ {
        self.graph
            .edge_references()
            .map(|e| Bond::raw(self.graph[e.source()], self.graph[e.target()], *e.weight()))
    }

    /// The bonds touching `atom`, which must belong to this molecule.
    pub fn bonds_of(&self, atom: AtomId) -> Result<Vec<Bond>> {
        let node = self.node(atom)?;
        Ok(self
            .graph
            .edges(node)
            .map(|e| Bond::raw(self.graph[e.source()], self.graph[e.target()], *e.weight()))
            .collect())
    }

    /// The unique bond with endpoints exactly `{a, b}`, or `None` if both
    /// atoms are present but not bonded to each other. More than one match
    /// can't happen: construction already rejected duplicate pairs.
    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Result<Option<Bond>> {
        let na = self.node(a)?;
        let nb = self.node(b)?;
        Ok(self
            .graph
            .find_edge(na, nb)
            .map(|e| Bond::raw(a, b, self.graph[e])))
    }

    /// Like [`Species::duplicate`], but records the old handle to new handle
    /// mapping so callers can chase relabeled atoms.
    pub(crate) fn duplicate_mapped(
        &self,
        atoms: &mut AtomArena,
        map: &mut HashMap<AtomId, AtomId>,
    ) -> Result<Self> {
        let mut graph =
            IslandGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        let mut nodes = HashMap::with_capacity(self.graph.node_count());
        let mut remap = vec![NodeIndex::end(); self.graph.node_count()];
        for old in self.graph.node_indices() {
            let fresh = atoms.duplicate(self.graph[old])?;
            map.insert(self.graph[old], fresh);
            remap[old.index()] = graph.add_node(fresh);
            nodes.insert(fresh, remap[old.index()]);
        }
        for e in self.graph.edge_references() {
            graph.add_edge(
                remap[e.source().index()],
                remap[e.target().index()],
                *e.weight(),
            );
        }
        Ok(Self { graph, nodes })
    }
}
impl Species for Molecule {
    fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.graph.node_weights().copied()
    }
    fn atom_count(&self) -> usize {
        self.graph.node_count()
    }
    #[instrument(level = "debug", skip_all, fields(atoms = self.atom_count()))]
    fn duplicate(&self, atoms: &mut AtomArena) -> Result<Self> {
        let mut map = HashMap::new();
        self.duplicate_mapped(atoms, &mut map)
    }
}
