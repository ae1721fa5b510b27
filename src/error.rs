//! Error types. Every failure names the invariant violated and the entities
//! involved; bookkeeping desync is a defect and panics instead of returning.

use crate::arena::AtomId;
use crate::core::BondOrder;
use thiserror::Error;

/// Coarse classification of an [`Error`]: a malformed request versus a lookup
/// that found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("bond would connect atom {0} to itself")]
    SelfBond(AtomId),
    #[error("conflicting orders for bond {a}-{b}: {first} vs {second}")]
    ConflictingOrder {
        a: AtomId,
        b: AtomId,
        first: BondOrder,
        second: BondOrder,
    },
    #[error("a molecule can't be built from an empty bond list")]
    EmptyMolecule,
    #[error("bond list represents more than one molecule: found {0} islands")]
    Disconnected(usize),
    #[error("atom {0} is not part of this molecule")]
    ForeignAtom(AtomId),
    #[error("atom {0} is already registered")]
    DuplicateAtom(AtomId),
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(AtomId, AtomId),
    #[error("atom {0} has not been registered")]
    UnknownAtom(AtomId),
    #[error("no bond between atoms {0} and {1}")]
    NoSuchBond(AtomId, AtomId),
    #[error("no atom labeled {0:?}")]
    UnknownLabel(String),
    #[error("label {label:?} is already carried by atom {prior}, refused for atom {next}")]
    LabelClash {
        label: String,
        prior: AtomId,
        next: AtomId,
    },
    #[error("atom {atom} is already labeled {old:?}, refusing {new:?}")]
    Relabeled {
        atom: AtomId,
        old: String,
        new: String,
    },
    #[error("bond row {row} references atom index {index}, but only {len} atoms are listed")]
    BadAtomIndex { row: usize, index: usize, len: usize },
}
impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAtom(_) | Self::NoSuchBond(..) | Self::UnknownLabel(_) => {
                ErrorKind::NotFound
            }
            _ => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
