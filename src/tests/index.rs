use super::alloc;
use super::macros::trace_capture;
use crate::arena::AtomId;
use crate::prelude::*;

#[test]
fn singleton_fragments() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 3);
    let mut index = FragmentIndex::new();
    for &id in &ids {
        index.add_atom(id).unwrap();
    }
    assert_eq!(index.atom_count(), 3);
    assert_eq!(index.fragment_count(), 3);
    assert!(!index.same_fragment(ids[0], ids[1]).unwrap());
    index.check();
}

#[test]
fn duplicate_registration() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 1);
    let mut index = FragmentIndex::new();
    index.add_atom(ids[0]).unwrap();
    assert_eq!(
        index.add_atom(ids[0]).unwrap_err(),
        Error::DuplicateAtom(ids[0])
    );
}

#[test]
fn bridge_merges_two_islands() {
    trace_capture!();
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 4);
    let [a, b, c, d] = ids[..] else { unreachable!() };
    let mut index = FragmentIndex::new();
    for &id in &ids {
        index.add_atom(id).unwrap();
    }
    index.add_bond(a, b, BondOrder::Single).unwrap();
    index.add_bond(c, d, BondOrder::Single).unwrap();
    assert_eq!(index.fragment_count(), 2);
    assert!(!index.same_fragment(b, c).unwrap());

    index.add_bond(b, c, BondOrder::Single).unwrap();
    assert_eq!(index.fragment_count(), 1);
    for &x in &ids {
        assert!(index.same_fragment(a, x).unwrap());
    }

    // rebuilding through the immutable path gives one island, 4 atoms, 3 bonds
    let complex = index.rebuild(&arena).unwrap();
    assert_eq!(complex.subspecies().len(), 1);
    let mol = complex.molecules().next().unwrap();
    assert_eq!(mol.atom_count(), 4);
    assert_eq!(mol.bond_count(), 3);
}

#[test]
fn merge_keeps_the_larger_fragment() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 4);
    let [a, b, c, d] = ids[..] else { unreachable!() };
    let mut index = FragmentIndex::new();
    for &id in &ids {
        index.add_atom(id).unwrap();
    }
    index.add_bond(a, b, BondOrder::Single).unwrap();
    index.add_bond(b, c, BondOrder::Single).unwrap();
    let big = index.fragment_of(a).unwrap();

    index.add_bond(d, a, BondOrder::Single).unwrap();
    // the singleton moved into the three-atom fragment, not the other way
    assert_eq!(index.fragment_of(a).unwrap(), big);
    assert_eq!(index.fragment_of(d).unwrap(), big);
    assert_eq!(index.fragment(big).unwrap().len(), 4);
}

#[test]
fn failed_calls_change_nothing() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 3);
    let [a, b, c] = ids[..] else { unreachable!() };
    let mut index = FragmentIndex::new();
    for &id in &ids {
        index.add_atom(id).unwrap();
    }
    index.add_bond(a, b, BondOrder::Single).unwrap();

    let before = index.snapshot();
    assert_eq!(
        index.add_bond(a, b, BondOrder::Double).unwrap_err(),
        Error::DuplicateBond(a, b)
    );
    assert_eq!(index.snapshot(), before);

    let ghost = AtomId::new(40);
    assert_eq!(
        index.add_bond(c, ghost, BondOrder::Single).unwrap_err(),
        Error::UnknownAtom(ghost)
    );
    assert_eq!(index.snapshot(), before);

    assert_eq!(
        index.set_order(a, c, BondOrder::Double).unwrap_err(),
        Error::NoSuchBond(a, c)
    );
    assert_eq!(index.snapshot(), before);
}

#[test]
fn unknown_atoms_are_not_found() {
    let index = FragmentIndex::new();
    let ghost = AtomId::new(0);
    assert_eq!(index.fragment_of(ghost).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(index.bonded_atoms(ghost).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn self_bond() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 1);
    let mut index = FragmentIndex::new();
    index.add_atom(ids[0]).unwrap();
    assert_eq!(
        index.add_bond(ids[0], ids[0], BondOrder::Single).unwrap_err(),
        Error::SelfBond(ids[0])
    );
}

#[test]
fn bonded_atoms_of_a_star() {
    let mut arena = AtomArena::new();
    let center = arena.insert(Atom::new(Element::CARBON));
    let arms = alloc(&mut arena, Element::HYDROGEN, 3);
    let mut index = FragmentIndex::new();
    index.add_atom(center).unwrap();
    for &arm in &arms {
        index.add_atom(arm).unwrap();
        index.add_bond(center, arm, BondOrder::Single).unwrap();
    }
    let mut neighbors = index.bonded_atoms(center).unwrap();
    neighbors.sort_unstable();
    assert_eq!(neighbors, arms);
    assert_eq!(index.bonded_atoms(arms[0]).unwrap(), vec![center]);
}

#[test]
fn order_mutation() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 2);
    let [a, b] = ids[..] else { unreachable!() };
    let mut index = FragmentIndex::new();
    index.add_atom(a).unwrap();
    index.add_atom(b).unwrap();
    index.add_bond(a, b, BondOrder::Single).unwrap();

    assert_eq!(index.bond_order(a, b).unwrap(), BondOrder::Single);
    // the pair is unordered, so mutation through (b, a) hits the same proxy
    assert_eq!(index.set_order(b, a, BondOrder::Double).unwrap(), BondOrder::Single);
    assert_eq!(index.bond_order(a, b).unwrap(), BondOrder::Double);
    index.check();
}

#[test]
fn rebuild_matches_fragments() {
    trace_capture!();
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 6);
    let [a, b, c, d, e, _f] = ids[..] else { unreachable!() };
    let mut index = FragmentIndex::new();
    for &id in &ids {
        index.add_atom(id).unwrap();
    }
    index.add_bond(a, b, BondOrder::Single).unwrap();
    index.add_bond(b, c, BondOrder::Double).unwrap();
    index.add_bond(d, e, BondOrder::Aromatic).unwrap();
    index.check();
    assert_eq!(index.fragment_count(), 3);

    let complex = index.rebuild(&arena).unwrap();
    assert_eq!(complex.subspecies().len(), 3);
    assert_eq!(complex.molecules().count(), 2);
    assert_eq!(complex.lone_atoms().count(), 1);

    // each island's atom set is exactly one fragment's member set
    for mol in complex.molecules() {
        let mut atoms: Vec<_> = mol.atoms().collect();
        atoms.sort_unstable();
        let frag = index.fragment_of(atoms[0]).unwrap();
        let mut members = index.fragment(frag).unwrap().to_vec();
        members.sort_unstable();
        assert_eq!(atoms, members);
    }
}
