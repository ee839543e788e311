//! Program line decoder.
//!
//! Turns one raw program line into an [`Operation`], enforcing the level's
//! operation whitelist. Uses [`for_each_operation!`](crate::for_each_operation)
//! to generate the per-operation arity checks.
//!
//! Decoding never looks at playground size or program length: an argument
//! that is out of range decodes fine and only fails when the line runs.

use crate::for_each_operation;
use crate::machine::errors::DecodeError;
use crate::machine::isa::{Operation, OperationKind, OperationSet};

/// Most tokens any line may carry (mnemonic plus one argument).
const MAX_TOKENS: usize = 2;

/// Splits a line on whitespace.
fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parses a base-10 signed integer argument.
pub(crate) fn parse_argument(operation: &'static str, token: &str) -> Result<i64, DecodeError> {
    token
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidArgument {
            operation,
            token: token.to_string(),
        })
}

macro_rules! define_decode_operation {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $code:expr, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// Builds an [`Operation`] of `kind` from the tokens after the mnemonic.
        fn construct(kind: OperationKind, args: &[&str]) -> Result<Operation, DecodeError> {
            match kind {
                $(
                    OperationKind::$name => {
                        define_decode_operation!(@construct args; $name $( $field )*)
                    }
                ),*
            }
        }
    };

    (@construct $args:ident; $name:ident) => {
        Ok(Operation::$name {})
    };

    (@construct $args:ident; $name:ident $field:ident) => {
        Ok(Operation::$name {
            $field: parse_argument(OperationKind::$name.mnemonic(), $args[0])?,
        })
    };
}

for_each_operation!(define_decode_operation);

/// Decodes one program line.
///
/// Checks run in this order: token count, mnemonic, arity, level whitelist,
/// argument syntax. The first failing check decides the error.
pub fn decode(line: &str, allowed: &OperationSet) -> Result<Operation, DecodeError> {
    let tokens = tokenize(line);
    let (name, args) = match tokens.split_first() {
        Some((name, args)) => (*name, args),
        None => return Err(DecodeError::EmptyLine),
    };
    if tokens.len() > MAX_TOKENS {
        return Err(DecodeError::TooManyTokens {
            count: tokens.len(),
        });
    }

    let kind = OperationKind::from_mnemonic(name).ok_or_else(|| DecodeError::UnknownOperation {
        name: name.to_string(),
    })?;

    match (kind.takes_argument(), args.is_empty()) {
        (false, false) => {
            return Err(DecodeError::UnexpectedArgument {
                operation: kind.mnemonic(),
            });
        }
        (true, true) => {
            return Err(DecodeError::MissingArgument {
                operation: kind.mnemonic(),
            });
        }
        _ => {}
    }

    if !allowed.contains(kind) {
        return Err(DecodeError::NotAllowed {
            operation: kind.mnemonic(),
        });
    }

    construct(kind, args)
}
