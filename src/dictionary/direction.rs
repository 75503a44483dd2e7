use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIs, EnumString};

mod private {
    pub(crate) trait Sealed {}
}

/// A direction an edge is inserted in.
#[allow(private_bounds)]
pub trait Direction: private::Sealed {
    const A2B: bool;
    const B2A: bool;
    const NAME: &'static str;
}

/// A direction that can be used for lookups (one side only).
#[allow(private_bounds)]
pub trait Translation: Direction + private::Sealed {}

/// One of the two languages of a dictionary.
#[allow(private_bounds)]
pub trait Language: Translation + private::Sealed {
    const KIND: LanguageKind;
}

/// The runtime tag of a language side.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Display, AsRefStr, EnumString, EnumIs, Serialize, Deserialize,
)]
pub enum LanguageKind {
    A,
    B,
}

pub struct A;
impl private::Sealed for A {}
impl Language for A {
    const KIND: LanguageKind = LanguageKind::A;
}

pub type AToB = A;
impl Direction for AToB {
    const A2B: bool = true;
    const B2A: bool = false;
    const NAME: &'static str = "AToB";
}
impl Translation for AToB {}

pub struct B;
impl private::Sealed for B {}
impl Language for B {
    const KIND: LanguageKind = LanguageKind::B;
}

pub type BToA = B;
impl Direction for BToA {
    const A2B: bool = false;
    const B2A: bool = true;
    const NAME: &'static str = "BToA";
}
impl Translation for BToA {}

pub struct Invariant;
impl private::Sealed for Invariant {}
impl Direction for Invariant {
    const A2B: bool = true;
    const B2A: bool = true;
    const NAME: &'static str = "Invariant";
}

/// Reports the effect of an insertion relative to pre-existing state.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Display, AsRefStr, EnumString, EnumIs, Serialize, Deserialize,
)]
pub enum DirectionKind {
    AToB,
    BToA,
    Invariant,
}

/// A pair of values with the direction their edge was touched in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DirectionTuple<Ta, Tb> {
    pub a: Ta,
    pub b: Tb,
    pub direction: DirectionKind,
}

impl<Ta, Tb> DirectionTuple<Ta, Tb> {
    pub fn new(a: Ta, b: Tb, direction: DirectionKind) -> Self {
        Self { a, b, direction }
    }

    pub fn a_to_b(a: Ta, b: Tb) -> Self {
        Self::new(a, b, DirectionKind::AToB)
    }

    pub fn b_to_a(a: Ta, b: Tb) -> Self {
        Self::new(a, b, DirectionKind::BToA)
    }

    pub fn invariant(a: Ta, b: Tb) -> Self {
        Self::new(a, b, DirectionKind::Invariant)
    }

    pub fn to_ab_tuple(self) -> (Ta, Tb) {
        (self.a, self.b)
    }

    pub fn map<Ra, Rb>(
        self,
        map_a: impl FnOnce(Ta) -> Ra,
        map_b: impl FnOnce(Tb) -> Rb,
    ) -> DirectionTuple<Ra, Rb> {
        DirectionTuple::new(map_a(self.a), map_b(self.b), self.direction)
    }
}
