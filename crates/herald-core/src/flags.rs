//! Command flags and the name codec.
//!
//! Flags are attached explicitly at registration time. For compatibility
//! with marker-prefixed names, [`CommandFlags::derive`] also recognises a
//! leading marker group separated by `ー` and strips it; registration
//! unions both sources.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Separator between the marker group and the name proper.
pub const FLAG_SEPARATOR: char = 'ー';

/// Bitmask of per-command (and per-group) flags.
///
/// Groups propagate their own flags onto every command they hold at
/// registration time, by bitwise union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CommandFlags(u8);

impl CommandFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Preserve the declared name's casing verbatim.
    pub const RAW: Self = Self(1 << 0);
    /// Visible only in the admin variant of the help output.
    pub const ADMIN_ONLY: Self = Self(1 << 1);
    /// Pre-dispatch hook rather than a command.
    pub const MIDDLEWARE: Self = Self(1 << 2);
    /// Excluded from the command table; runs as an event handler.
    pub const HIDDEN: Self = Self(1 << 3);
    /// The sole nameless fallback command of a group.
    pub const PLUMB: Self = Self(1 << 4);

    /// Returns true if every flag in `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Derives `(flags, cleaned name)` from a declared name.
    ///
    /// A leading group of marker characters before [`FLAG_SEPARATOR`] maps
    /// to flag bits and is stripped. If any character in the marker group
    /// is unrecognised, the whole name is treated as flagless. Without
    /// [`CommandFlags::RAW`] the first character of the cleaned name is
    /// lowercased; with it, casing is preserved.
    ///
    /// Pure and idempotent: deriving from an already-cleaned name yields
    /// the cleaned name unchanged with no flags.
    pub fn derive(name: &str) -> (Self, String) {
        let (flags, rest) = match name.split_once(FLAG_SEPARATOR) {
            Some((markers, rest)) => match Self::from_markers(markers) {
                Some(flags) => (flags, rest),
                None => (Self::NONE, name),
            },
            None => (Self::NONE, name),
        };

        if flags.contains(Self::RAW) {
            (flags, rest.to_owned())
        } else {
            (flags, lower_first(rest))
        }
    }

    fn from_markers(markers: &str) -> Option<Self> {
        let mut flags = Self::NONE;
        for c in markers.chars() {
            flags |= match c {
                'R' => Self::RAW,
                'A' => Self::ADMIN_ONLY,
                'M' => Self::MIDDLEWARE,
                'H' => Self::HIDDEN,
                'P' => Self::PLUMB,
                _ => return None,
            };
        }
        Some(flags)
    }
}

impl BitOr for CommandFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CommandFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CommandFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::RAW, "raw"),
            (Self::ADMIN_ONLY, "admin-only"),
            (Self::MIDDLEWARE, "middleware"),
            (Self::HIDDEN, "hidden"),
            (Self::PLUMB, "plumb"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Lowercases the first character of `name`, leaving the rest untouched.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_plain_name() {
        let (flags, name) = CommandFlags::derive("GetCounter");
        assert!(flags.is_empty());
        assert_eq!(name, "getCounter");
    }

    #[test]
    fn derive_marker_group() {
        let (flags, name) = CommandFlags::derive("MーBumpCounter");
        assert_eq!(flags, CommandFlags::MIDDLEWARE);
        assert_eq!(name, "bumpCounter");

        let (flags, name) = CommandFlags::derive("AHーDebug");
        assert!(flags.contains(CommandFlags::ADMIN_ONLY | CommandFlags::HIDDEN));
        assert_eq!(name, "debug");
    }

    #[test]
    fn derive_raw_preserves_case() {
        let (flags, name) = CommandFlags::derive("RーNoArgs");
        assert_eq!(flags, CommandFlags::RAW);
        assert_eq!(name, "NoArgs");
    }

    #[test]
    fn derive_unknown_marker_is_not_stripped() {
        let (flags, name) = CommandFlags::derive("XーWeird");
        assert!(flags.is_empty());
        assert_eq!(name, "xーWeird");
    }

    #[test]
    fn derive_is_idempotent() {
        for input in ["MーBumpCounter", "Send", "noArgs", "RーcontentRaw"] {
            let (_, cleaned) = CommandFlags::derive(input);
            let (reflags, recleaned) = CommandFlags::derive(&cleaned);
            assert_eq!(recleaned, cleaned, "name must be stable for {input}");
            let (again, _) = CommandFlags::derive(&recleaned);
            assert_eq!(again, reflags, "flags must be stable for {input}");
        }
    }

    #[test]
    fn flag_union_and_containment() {
        let flags = CommandFlags::ADMIN_ONLY | CommandFlags::PLUMB;
        assert!(flags.contains(CommandFlags::ADMIN_ONLY));
        assert!(!flags.contains(CommandFlags::RAW));
        assert_eq!(flags.to_string(), "admin-only|plumb");
    }
}
