//! # Object Identifiers
//!
//! Every ledger record is addressed by a three-part identifier
//! `space.type.instance`. Protocol objects live in space 1, implementation
//! (bookkeeping) objects in space 2. The string form `"1.3.5"` is the wire
//! representation used in every notification payload.

use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::errors::IdParseError;

/// Space holding objects created by operations.
pub const PROTOCOL_SPACE: u8 = 1;

/// Space holding derived bookkeeping objects.
pub const IMPLEMENTATION_SPACE: u8 = 2;

/// A fully qualified ledger object identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct ObjectId {
    space: u8,
    type_id: u8,
    instance: u64,
}

impl ObjectId {
    /// Build an identifier from its three components.
    #[must_use]
    pub const fn new(space: u8, type_id: u8, instance: u64) -> Self {
        Self {
            space,
            type_id,
            instance,
        }
    }

    #[must_use]
    pub const fn space(&self) -> u8 {
        self.space
    }

    #[must_use]
    pub const fn type_id(&self) -> u8 {
        self.type_id
    }

    #[must_use]
    pub const fn instance(&self) -> u64 {
        self.instance
    }

    /// The known kind of this object, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ObjectKind> {
        ObjectKind::from_parts(self.space, self.type_id)
    }

    /// Whether this identifier addresses an object of `kind`.
    #[must_use]
    pub fn is(&self, kind: ObjectKind) -> bool {
        let (space, type_id) = kind.parts();
        self.space == space && self.type_id == type_id
    }

    /// Stable byte encoding used for membership filter keys.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 10] {
        let mut out = [0u8; 10];
        out[0] = self.space;
        out[1] = self.type_id;
        out[2..].copy_from_slice(&self.instance.to_be_bytes());
        out
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.type_id, self.instance)
    }
}

impl FromStr for ObjectId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let (Some(space), Some(type_id), Some(instance), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(IdParseError::Malformed(s.to_string()));
        };

        let space = space
            .parse::<u8>()
            .map_err(|_| IdParseError::Malformed(s.to_string()))?;
        let type_id = type_id
            .parse::<u8>()
            .map_err(|_| IdParseError::Malformed(s.to_string()))?;
        let instance = instance
            .parse::<u64>()
            .map_err(|_| IdParseError::Malformed(s.to_string()))?;

        Ok(Self::new(space, type_id, instance))
    }
}

/// Object kinds the notification layer needs to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Account,
    Asset,
    LimitOrder,
    CallOrder,
    OperationHistory,
    Balance,
    AccountBalance,
    AccountTransactionHistory,
}

impl ObjectKind {
    /// `(space, type)` pair for this kind.
    #[must_use]
    pub const fn parts(self) -> (u8, u8) {
        match self {
            Self::Account => (PROTOCOL_SPACE, 2),
            Self::Asset => (PROTOCOL_SPACE, 3),
            Self::LimitOrder => (PROTOCOL_SPACE, 7),
            Self::CallOrder => (PROTOCOL_SPACE, 8),
            Self::OperationHistory => (PROTOCOL_SPACE, 11),
            Self::Balance => (PROTOCOL_SPACE, 15),
            Self::AccountBalance => (IMPLEMENTATION_SPACE, 5),
            Self::AccountTransactionHistory => (IMPLEMENTATION_SPACE, 9),
        }
    }

    #[must_use]
    pub fn from_parts(space: u8, type_id: u8) -> Option<Self> {
        match (space, type_id) {
            (PROTOCOL_SPACE, 2) => Some(Self::Account),
            (PROTOCOL_SPACE, 3) => Some(Self::Asset),
            (PROTOCOL_SPACE, 7) => Some(Self::LimitOrder),
            (PROTOCOL_SPACE, 8) => Some(Self::CallOrder),
            (PROTOCOL_SPACE, 11) => Some(Self::OperationHistory),
            (PROTOCOL_SPACE, 15) => Some(Self::Balance),
            (IMPLEMENTATION_SPACE, 5) => Some(Self::AccountBalance),
            (IMPLEMENTATION_SPACE, 9) => Some(Self::AccountTransactionHistory),
            _ => None,
        }
    }

    /// Identifier of the `instance`-th object of this kind.
    #[must_use]
    pub const fn id(self, instance: u64) -> ObjectId {
        let (space, type_id) = self.parts();
        ObjectId::new(space, type_id, instance)
    }
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay,
            DeserializeFromStr,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// The untyped identifier.
            #[must_use]
            pub const fn object_id(self) -> ObjectId {
                $kind.id(self.0)
            }
        }

        impl From<$name> for ObjectId {
            fn from(id: $name) -> Self {
                id.object_id()
            }
        }

        impl TryFrom<ObjectId> for $name {
            type Error = IdParseError;

            fn try_from(id: ObjectId) -> Result<Self, Self::Error> {
                if id.is($kind) {
                    Ok(Self(id.instance()))
                } else {
                    Err(IdParseError::WrongKind {
                        id: id.to_string(),
                        expected: stringify!($name),
                    })
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.object_id(), f)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_from(s.parse::<ObjectId>()?)
            }
        }
    };
}

typed_id!(
    /// Identifier of an account object (`1.2.x`).
    AccountId,
    ObjectKind::Account
);

typed_id!(
    /// Identifier of an asset object (`1.3.x`).
    AssetId,
    ObjectKind::Asset
);
