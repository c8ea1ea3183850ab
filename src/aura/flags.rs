//! Bit-flag words carried by spell data and applied auras.
//!
//! Each word is a transparent `u32` newtype so spell data files can write
//! the raw value (`interrupt_flags: 0x8`).

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

macro_rules! flag_word {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: $name = $name(0);

            #[inline]
            pub fn bits(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// All bits of `other` are set.
            #[inline]
            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            /// Any bit of `other` is set.
            #[inline]
            pub fn intersects(self, other: $name) -> bool {
                self.0 & other.0 != 0
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = $name;

            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }
    };
}

flag_word!(
    /// Game events that forcibly remove an aura.
    InterruptFlags
);

impl InterruptFlags {
    /// A hostile spell landed on the holder.
    pub const NEGATIVE_SPELL: InterruptFlags = InterruptFlags(0x0000_0001);
    pub const DAMAGE: InterruptFlags = InterruptFlags(0x0000_0002);
    pub const CC: InterruptFlags = InterruptFlags(0x0000_0004);
    pub const MOVE: InterruptFlags = InterruptFlags(0x0000_0008);
    pub const TURNING: InterruptFlags = InterruptFlags(0x0000_0010);
    pub const ENTER_COMBAT: InterruptFlags = InterruptFlags(0x0000_0020);
    /// Named after the state that keeps the aura alive; fires while mounted.
    pub const NOT_MOUNTED: InterruptFlags = InterruptFlags(0x0000_0040);
    pub const NOT_ABOVEWATER: InterruptFlags = InterruptFlags(0x0000_0080);
    pub const NOT_UNDERWATER: InterruptFlags = InterruptFlags(0x0000_0100);
    pub const NOT_SHEATHED: InterruptFlags = InterruptFlags(0x0000_0200);
    pub const CAST: InterruptFlags = InterruptFlags(0x0000_0400);
}

flag_word!(
    /// Combat events that can trigger an aura's proc.
    ProcFlags
);

impl ProcFlags {
    pub const DEAL_COMBAT_DMG: ProcFlags = ProcFlags(0x0000_0001);
    pub const TAKE_COMBAT_DMG: ProcFlags = ProcFlags(0x0000_0002);
    pub const KILL: ProcFlags = ProcFlags(0x0000_0004);
    /// Handled on the periodic tick path, never by proc evaluation.
    pub const HEARTBEAT: ProcFlags = ProcFlags(0x0000_0008);
    pub const DODGE: ProcFlags = ProcFlags(0x0000_0010);
    pub const PARRY: ProcFlags = ProcFlags(0x0000_0020);
    pub const BLOCK: ProcFlags = ProcFlags(0x0000_0040);
    pub const SWING: ProcFlags = ProcFlags(0x0000_0080);
    pub const SPELL_CAST: ProcFlags = ProcFlags(0x0000_0100);
    pub const SPELL_HIT: ProcFlags = ProcFlags(0x0000_0200);
}

flag_word!(
    /// Primary spell attribute word.
    SpellAttributes
);

impl SpellAttributes {
    /// Aura is removed and its cooldown starts when it ends.
    pub const DISABLED_WHILE_ACTIVE: SpellAttributes = SpellAttributes(0x0000_0400);
    pub const PASSIVE: SpellAttributes = SpellAttributes(0x0000_0040);
    pub const ALLOW_CAST_WHILE_DEAD: SpellAttributes = SpellAttributes(0x0080_0000);
    pub const CANT_CANCEL: SpellAttributes = SpellAttributes(0x8000_0000);
}

flag_word!(
    /// Secondary spell attribute word.
    SpellAttributesEx
);

impl SpellAttributesEx {
    pub const NOT_BREAK_STEALTH: SpellAttributesEx = SpellAttributesEx(0x0000_0020);
    pub const NO_THREAT: SpellAttributesEx = SpellAttributesEx(0x0000_0400);
    /// Only one instance may exist on a target regardless of caster.
    pub const AURA_UNIQUE: SpellAttributesEx = SpellAttributesEx(0x0008_0000);
}
