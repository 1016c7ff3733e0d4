//! Decoding of the caller-supplied permission bitmask.
//!
//! Bit meanings are fixed: bit0 alert, bit1 sound, bit2 badge, bit3 CarPlay,
//! bit4 critical alert, bit5 provisional. Anything above bit5 is ignored.

use serde::{Deserialize, Serialize};

pub const ALERT: i32 = 0b000001;
pub const SOUND: i32 = 0b000010;
pub const BADGE: i32 = 0b000100;
pub const CARPLAY: i32 = 0b001000;
pub const CRITICAL_ALERT: i32 = 0b010000;
pub const PROVISIONAL: i32 = 0b100000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Permission {
    Alert,
    Sound,
    Badge,
    CarPlay,
    CriticalAlert,
    Provisional,
}

const PERMISSION_TABLE: [(i32, Permission); 6] = [
    (ALERT, Permission::Alert),
    (SOUND, Permission::Sound),
    (BADGE, Permission::Badge),
    (CARPLAY, Permission::CarPlay),
    (CRITICAL_ALERT, Permission::CriticalAlert),
    (PROVISIONAL, Permission::Provisional),
];

impl Permission {
    pub fn bit(self) -> i32 {
        PERMISSION_TABLE
            .iter()
            .find(|(_, permission)| *permission == self)
            .map(|(bit, _)| *bit)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permissions {
    bits: i32,
}

impl Permissions {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every option the platform offers; used for the default request.
    pub fn standard() -> Self {
        PERMISSION_TABLE
            .iter()
            .map(|(_, permission)| *permission)
            .collect()
    }

    pub fn from_bits(mask: i32) -> Self {
        let known = PERMISSION_TABLE.iter().fold(0, |acc, (bit, _)| acc | bit);
        Self { bits: mask & known }
    }

    pub fn bits(&self) -> i32 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.bits & permission.bit() != 0
    }

    pub fn insert(&mut self, permission: Permission) {
        self.bits |= permission.bit();
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        PERMISSION_TABLE
            .iter()
            .filter(|(bit, _)| self.bits & bit != 0)
            .map(|(_, permission)| *permission)
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut permissions = Self::empty();
        for permission in iter {
            permissions.insert(permission);
        }
        permissions
    }
}
