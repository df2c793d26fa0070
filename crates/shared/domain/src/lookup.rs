use bitflags::bitflags;

bitflags! {
    /// Modifiers for a capability lookup walking the scope chain.
    ///
    /// `SKIP_SELF` starts at the parent of the requesting scope; `SELF_ONLY` stops after the
    /// first scope inspected. Combining both inspects exactly the parent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Lookup: u8 {
        /// A missing capability resolves to `None` instead of an error.
        const OPTIONAL = 1 << 0;
        /// Ignore registrations of the requesting scope.
        const SKIP_SELF = 1 << 1;
        /// Do not walk past the first inspected scope.
        const SELF_ONLY = 1 << 2;

        /// Nearest enclosing instance, if any.
        const PARENT = Self::OPTIONAL.bits() | Self::SKIP_SELF.bits();
    }
}

impl Lookup {
    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.contains(Self::OPTIONAL)
    }

    #[must_use]
    pub const fn skips_self(self) -> bool {
        self.contains(Self::SKIP_SELF)
    }

    #[must_use]
    pub const fn self_only(self) -> bool {
        self.contains(Self::SELF_ONLY)
    }
}
