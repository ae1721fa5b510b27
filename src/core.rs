//! Entity definitions for modeling molecular structures as graphs.
// Identity lives in the arena handles, never in these values: two atoms with
// identical fields are still different atoms if their handles differ.

use crate::arena::{AtomArena, AtomId};
use crate::error::{Error, Result};
use c_enum::*;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

#[rustfmt::skip]
const SYMBOLS: &[&str] = &[
    "*",
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// An element, stored as its atomic number. Just enough to construct atoms
/// and print symbols; property lookup belongs to an external table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Element(pub u8);
impl Element {
    pub const HYDROGEN: Self = Self(1);
    pub const CARBON: Self = Self(6);
    pub const NITROGEN: Self = Self(7);
    pub const OXYGEN: Self = Self(8);
    pub const PHOSPHORUS: Self = Self(15);
    pub const SULFUR: Self = Self(16);

    pub fn symbol(self) -> &'static str {
        SYMBOLS.get(self.0 as usize).copied().unwrap_or("?")
    }
}
impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An atom: an element plus mutable position, charge, and a free-form tag.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Atom {
    pub element: Element,
    pub position: [f64; 3],
    pub charge: i8,
    pub tag: i32,
}
impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            position: [0.0; 3],
            charge: 0,
            tag: 0,
        }
    }
    pub fn new_tagged(element: Element, tag: i32) -> Self {
        Self {
            element,
            position: [0.0; 3],
            charge: 0,
            tag,
        }
    }
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }
    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }
}
impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use fmtastic::*;
        f.write_str(self.element.symbol())?;
        match self.charge {
            0 => {}
            1 => f.write_str("⁺")?,
            -1 => f.write_str("⁻")?,
            _ => write!(f, "{:+}", Superscript(self.charge))?,
        }
        Ok(())
    }
}

c_enum! {
    /// Order label carried by a bond.
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub enum BondOrder: u8 {
        Single,
        Double,
        Triple,
        Quad,
        Aromatic,
        Amide,
        Unknown,
    }
}
impl BondOrder {
    pub fn bond_count(self) -> f32 {
        match self {
            Self::Single | Self::Amide => 1f32,
            Self::Double => 2f32,
            Self::Triple => 3f32,
            Self::Quad => 4f32,
            Self::Aromatic => 1.5f32,
            Self::Unknown => 0f32,
            _ => panic!("invalid bond order!"),
        }
    }
    pub fn as_static_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::Quad => "quad",
            Self::Aromatic => "aromatic",
            Self::Amide => "amide",
            Self::Unknown => "unknown",
            _ => panic!("invalid bond order!"),
        }
    }
}
impl Display for BondOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_static_str())
    }
}

/// Normalized unordered atom pair, the map key for anything keyed "per bond".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct BondKey(pub AtomId, pub AtomId);
impl BondKey {
    pub fn new(a: AtomId, b: AtomId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// A bond between two distinct atoms. The pair is unordered: a bond from `a`
/// to `b` equals a bond from `b` to `a` with the same order.
#[derive(Debug, Clone, Copy)]
pub struct Bond {
    a: AtomId,
    b: AtomId,
    order: BondOrder,
}
impl Bond {
    pub fn new(a: AtomId, b: AtomId, order: BondOrder) -> Result<Self> {
        if a == b {
            Err(Error::SelfBond(a))
        } else {
            Ok(Self { a, b, order })
        }
    }
    /// Endpoints already known to be distinct.
    pub(crate) fn raw(a: AtomId, b: AtomId, order: BondOrder) -> Self {
        debug_assert_ne!(a, b, "bond endpoints must be distinct");
        Self { a, b, order }
    }

    pub fn atoms(self) -> (AtomId, AtomId) {
        (self.a, self.b)
    }
    pub fn order(self) -> BondOrder {
        self.order
    }
    pub fn touches(self, atom: AtomId) -> bool {
        self.a == atom || self.b == atom
    }
    /// The endpoint opposite `atom`, if `atom` is an endpoint at all.
    pub fn other(self, atom: AtomId) -> Option<AtomId> {
        if atom == self.a {
            Some(self.b)
        } else if atom == self.b {
            Some(self.a)
        } else {
            None
        }
    }
    pub(crate) fn key(self) -> BondKey {
        BondKey::new(self.a, self.b)
    }
}
impl PartialEq for Bond {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.order == other.order
    }
}
impl Eq for Bond {}
impl Hash for Bond {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.order.hash(state);
    }
}
impl Display for Bond {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.a, self.b, self.order)
    }
}

/// Capability shared by everything made of atoms: enumerate them in a stable
/// order, deep-copy them to fresh identities, and average their positions.
pub trait Species {
    /// Constituent atom handles. The order is fixed for the object's
    /// lifetime, so repeated calls enumerate identically.
    fn atoms(&self) -> impl Iterator<Item = AtomId> + '_;

    fn atom_count(&self) -> usize {
        self.atoms().count()
    }

    /// Deep copy: every atom is reallocated with a fresh identity and the
    /// topology is rebuilt against the new handles.
    fn duplicate(&self, atoms: &mut AtomArena) -> Result<Self>
    where
        Self: Sized;

    /// Unweighted mean of the atom positions, the origin if there are none.
    fn centroid(&self, atoms: &AtomArena) -> Result<[f64; 3]> {
        let mut sum = [0f64; 3];
        let mut count = 0usize;
        for id in self.atoms() {
            let atom = atoms.get(id).ok_or(Error::UnknownAtom(id))?;
            for (acc, x) in sum.iter_mut().zip(atom.position) {
                *acc += x;
            }
            count += 1;
        }
        if count > 0 {
            for acc in &mut sum {
                *acc /= count as f64;
            }
        }
        Ok(sum)
    }
}
