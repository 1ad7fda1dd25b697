//! Binding rules for member lookup

use crate::member::Visibility;

bitflags::bitflags! {
    /// Flags controlling which members a lookup may bind to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindingFlags: u32 {
        /// Include public members.
        const PUBLIC = 1 << 0;
        /// Include non-public (private) members.
        const NON_PUBLIC = 1 << 1;
        /// Include instance members.
        const INSTANCE = 1 << 2;
        /// Match member names case-insensitively.
        const IGNORE_CASE = 1 << 3;
    }
}

impl BindingFlags {
    /// Public instance members, case-sensitive.
    pub const DEFAULT: BindingFlags = BindingFlags::PUBLIC.union(BindingFlags::INSTANCE);

    /// Whether a member with the given visibility is admitted.
    ///
    /// Every registered member is an instance member, so `INSTANCE` must be
    /// present for anything to bind.
    pub fn admits(self, visibility: Visibility) -> bool {
        if !self.contains(BindingFlags::INSTANCE) {
            return false;
        }
        match visibility {
            Visibility::Public => self.contains(BindingFlags::PUBLIC),
            Visibility::Private => self.contains(BindingFlags::NON_PUBLIC),
        }
    }

    /// Compare a member name against the requested name
    pub fn name_matches(self, member: &str, requested: &str) -> bool {
        if self.contains(BindingFlags::IGNORE_CASE) {
            member.eq_ignore_ascii_case(requested)
        } else {
            member == requested
        }
    }
}

impl Default for BindingFlags {
    fn default() -> Self {
        BindingFlags::DEFAULT
    }
}
