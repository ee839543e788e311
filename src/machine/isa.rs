//! Operation set of the box machine.
//!
//! The [`for_each_operation!`](crate::for_each_operation) macro holds the
//! canonical operation table and hands it to a callback macro, so the decoder
//! and the machine derive their per-operation code from one list.
//!
//! This module generates:
//! - [`OperationKind`], the argument-free tag used for level whitelists
//! - [`Operation`], the decoded operation with its argument
//!
//! # Syntax
//!
//! ```text
//! inbox
//! copyto 2
//! jumpifzero 7
//! ```
//!
//! Mnemonics are lowercase and case-sensitive. Playground slots and jump
//! targets are 1-based decimal integers.

use std::fmt;

/// Invokes a callback macro with the complete operation table.
///
/// Each entry is `Name = code, "mnemonic" => [field: Kind]` where `Kind` is
/// `Slot` (1-based playground index) or `Line` (1-based program line).
#[macro_export]
macro_rules! for_each_operation {
    ($callback:ident) => {
        $callback! {
            /// inbox ; pick up the next box from the input queue
            Inbox = 0, "inbox" => [],
            /// outbox ; put the held box on the output queue
            Outbox = 1, "outbox" => [],
            /// add x ; held += playground[x]
            Add = 2, "add" => [slot: Slot],
            /// sub x ; held -= playground[x]
            Sub = 3, "sub" => [slot: Slot],
            /// copyto x ; playground[x] = held
            CopyTo = 4, "copyto" => [slot: Slot],
            /// copyfrom x ; held = playground[x]
            CopyFrom = 5, "copyfrom" => [slot: Slot],
            /// jump x ; continue at line x
            Jump = 6, "jump" => [target: Line],
            /// jumpifzero x ; continue at line x if held is zero
            JumpIfZero = 7, "jumpifzero" => [target: Line],
        }
    };
}

#[macro_export]
macro_rules! define_operations {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $code:expr, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// Operation tag without its argument.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum OperationKind {
            $(
                $(#[$doc])*
                $name = $code,
            )*
        }

        impl OperationKind {
            /// Every kind, in table order.
            pub const ALL: &'static [OperationKind] = &[ $( OperationKind::$name ),* ];

            /// Returns the source mnemonic for this kind.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( OperationKind::$name => $mnemonic, )*
                }
            }

            /// Whether the operation is written with an argument.
            pub const fn takes_argument(&self) -> bool {
                match self {
                    $( OperationKind::$name => define_operations!(@has_arg $( $field )*), )*
                }
            }

            /// Looks up a kind by its exact (case-sensitive) mnemonic.
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                match name {
                    $( $mnemonic => Some(OperationKind::$name), )*
                    _ => None,
                }
            }
        }

        /// A decoded program line.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Operation {
            $(
                $(#[$doc])*
                $name { $( $field: define_operations!(@ty $kind) ),* },
            )*
        }

        impl Operation {
            pub const fn kind(&self) -> OperationKind {
                match self {
                    $( Operation::$name { .. } => OperationKind::$name, )*
                }
            }

            /// The raw argument, if the operation has one.
            pub fn argument(&self) -> Option<i64> {
                match self {
                    $( Operation::$name { $( $field ),* } => define_operations!(@arg $( $field )*), )*
                }
            }
        }

        impl fmt::Display for Operation {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.kind().mnemonic())?;
                if let Some(arg) = self.argument() {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    };

    (@ty Slot) => { i64 };
    (@ty Line) => { i64 };

    (@has_arg) => { false };
    (@has_arg $field:ident) => { true };

    (@arg) => { None };
    (@arg $field:ident) => { Some(*$field) };
}

for_each_operation!(define_operations);

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Whitelist of operation kinds a level permits.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct OperationSet(u8);

impl OperationSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every operation the machine knows.
    pub fn all() -> Self {
        OperationKind::ALL.iter().copied().collect()
    }

    /// Returns a copy of this set with `kind` added.
    pub const fn with(self, kind: OperationKind) -> Self {
        Self(self.0 | (1 << kind as u8))
    }

    pub const fn contains(&self, kind: OperationKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the members in table order.
    pub fn iter(&self) -> impl Iterator<Item = OperationKind> + '_ {
        OperationKind::ALL
            .iter()
            .copied()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<OperationKind> for OperationSet {
    fn from_iter<I: IntoIterator<Item = OperationKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<const N: usize> From<[OperationKind; N]> for OperationSet {
    fn from(kinds: [OperationKind; N]) -> Self {
        kinds.into_iter().collect()
    }
}
