use std::fmt::{Display, Formatter};

/// Handle of an OR-node stored in a [`NodeManager`][crate::manager::NodeManager].
///
/// Handles are plain arena indices: equality and hashing are defined over the
/// index only. The first two slots are reserved for the terminals.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    /// The `Zero` terminal.
    pub const ZERO: Ref = Ref(0);
    /// The `One` terminal.
    pub const ONE: Ref = Ref(1);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the arena index of the reference.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == Self::ZERO.0
    }

    pub const fn is_one(self) -> bool {
        self.0 == Self::ONE.0
    }

    pub const fn is_terminal(self) -> bool {
        self.is_zero() || self.is_one()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Ref::ZERO => write!(f, "0"),
            Ref::ONE => write!(f, "1"),
            Ref(i) => write!(f, "@{}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        assert!(Ref::ZERO.is_zero());
        assert!(Ref::ONE.is_one());
        assert!(Ref::ZERO.is_terminal());
        assert!(!Ref::new(2).is_terminal());
        assert_ne!(Ref::ZERO, Ref::ONE);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::ZERO.to_string(), "0");
        assert_eq!(Ref::ONE.to_string(), "1");
        assert_eq!(Ref::new(42).to_string(), "@42");
    }
}
