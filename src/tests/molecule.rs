use super::alloc;
use crate::prelude::*;

#[test]
fn carbon_oxygen() {
    let mut arena = AtomArena::new();
    let a = arena.insert(Atom::new(Element::CARBON));
    let b = arena.insert(Atom::new(Element::OXYGEN));
    let bond = Bond::new(a, b, BondOrder::Single).unwrap();

    let groups = aggregate(&[bond]).unwrap();
    assert_eq!(groups, vec![vec![bond]]);

    let mol = Molecule::new(&[bond]).unwrap();
    assert_eq!(mol.bonds().count(), 1);
    assert_eq!(
        mol.bond_between(a, b).unwrap().unwrap().order(),
        BondOrder::Single
    );
    assert_eq!(mol.bonds_of(a).unwrap(), vec![bond]);
}

#[test]
fn empty_bond_list() {
    assert_eq!(Molecule::new(&[]).unwrap_err(), Error::EmptyMolecule);
}

#[test]
fn disconnected_rejected() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 4);
    let bonds = [
        Bond::new(ids[0], ids[1], BondOrder::Single).unwrap(),
        Bond::new(ids[2], ids[3], BondOrder::Single).unwrap(),
    ];
    let err = Molecule::new(&bonds).unwrap_err();
    assert_eq!(err, Error::Disconnected(2));
    assert!(err.to_string().contains("more than one molecule"));
}

#[test]
fn conflicting_orders_rejected() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 2);
    let bonds = [
        Bond::new(ids[0], ids[1], BondOrder::Single).unwrap(),
        Bond::new(ids[0], ids[1], BondOrder::Aromatic).unwrap(),
    ];
    assert!(matches!(
        Molecule::new(&bonds),
        Err(Error::ConflictingOrder { .. })
    ));
}

#[test]
fn foreign_atom() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 3);
    let mol = Molecule::new(&[Bond::new(ids[0], ids[1], BondOrder::Single).unwrap()]).unwrap();
    assert_eq!(
        mol.bonds_of(ids[2]).unwrap_err(),
        Error::ForeignAtom(ids[2])
    );
    assert_eq!(
        mol.bond_between(ids[0], ids[2]).unwrap_err(),
        Error::ForeignAtom(ids[2])
    );
}

#[test]
fn present_but_unbonded() {
    let mut arena = AtomArena::new();
    let ids = alloc(&mut arena, Element::CARBON, 3);
    let mol = Molecule::new(&[
        Bond::new(ids[0], ids[1], BondOrder::Single).unwrap(),
        Bond::new(ids[1], ids[2], BondOrder::Single).unwrap(),
    ])
    .unwrap();
    // both endpoints exist, each is bonded to something, just not each other
    assert_eq!(mol.bond_between(ids[0], ids[2]).unwrap(), None);
}

#[test]
fn duplicate_is_isomorphic() {
    let mut arena = AtomArena::new();
    let a = arena.insert(Atom::new(Element::CARBON));
    let b = arena.insert(Atom::new(Element::OXYGEN));
    let c = arena.insert(Atom::new(Element::NITROGEN));
    let mol = Molecule::new(&[
        Bond::new(a, b, BondOrder::Single).unwrap(),
        Bond::new(b, c, BondOrder::Double).unwrap(),
    ])
    .unwrap();

    let copy = mol.duplicate(&mut arena).unwrap();
    assert_eq!(copy.atom_count(), 3);
    assert_eq!(copy.bond_count(), 2);

    let old: Vec<_> = mol.atoms().collect();
    let new: Vec<_> = copy.atoms().collect();
    for (o, n) in old.iter().zip(&new) {
        assert!(!old.contains(n), "duplicate reused identity {n}");
        assert_eq!(arena[*o].element, arena[*n].element);
    }
    // first-touch order corresponds, so connectivity maps index-by-index
    assert_eq!(
        copy.bond_between(new[0], new[1]).unwrap().unwrap().order(),
        BondOrder::Single
    );
    assert_eq!(
        copy.bond_between(new[1], new[2]).unwrap().unwrap().order(),
        BondOrder::Double
    );
    assert_eq!(copy.bond_between(new[0], new[2]).unwrap(), None);
}

#[test]
fn centroid() {
    let mut arena = AtomArena::new();
    let a = arena.insert(Atom::new(Element::CARBON).with_position([0.0, 0.0, 0.0]));
    let b = arena.insert(Atom::new(Element::CARBON).with_position([2.0, 4.0, -2.0]));
    let mol = Molecule::new(&[Bond::new(a, b, BondOrder::Single).unwrap()]).unwrap();
    assert_eq!(mol.centroid(&arena).unwrap(), [1.0, 2.0, -1.0]);
}
