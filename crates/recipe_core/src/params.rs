//! Parameter resolver: late-binding of action inputs
//!
//! Each substitutable slot of an action is governed by a `ParamSource`:
//! keep the literal payload value, copy a prior action's output
//! (1-based, `$1` = first output), or copy a trigger-supplied subdata
//! value. Substitution is pure value copying; forward references are
//! illegal and abort the whole recipe.

use crate::action::SlotValue;
use crate::executor::OutputBuffer;
use crate::types::Word;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw-encoding offset where subdata references begin
pub const SUB_DATA_OFFSET: u8 = 128;

/// Where a parameter slot takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamSource {
    /// Use the literal value decoded from the payload
    Literal,
    /// Copy the k-th prior output, 1-based
    Output(u8),
    /// Copy the k-th subdata value, 0-based
    SubData(u8),
}

impl ParamSource {
    /// Decode from the legacy single-byte encoding
    ///
    /// `0` is literal, `1..=127` index the output buffer, `128 + k`
    /// indexes subdata.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Literal,
            1..=127 => Self::Output(raw),
            _ => Self::SubData(raw - SUB_DATA_OFFSET),
        }
    }

    /// Encode back into the legacy single-byte form
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            Self::Literal => 0,
            Self::Output(index) => index,
            Self::SubData(index) => SUB_DATA_OFFSET.saturating_add(index),
        }
    }
}

/// Parameter resolution failures
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamError {
    /// Mapping length differs from the action's declared slot count
    #[error("param mapping has {got} entries, action declares {expected} slots")]
    MappingLengthMismatch {
        /// Slots the action declares
        expected: usize,
        /// Entries in the supplied mapping
        got: usize,
    },

    /// Output reference beyond the buffer built so far
    #[error("output reference ${index} out of range, buffer holds {len} values")]
    OutOfRangeReference {
        /// 1-based reference
        index: usize,
        /// Buffer length at resolution time
        len: usize,
    },

    /// Subdata reference beyond the supplied values
    #[error("subdata reference {index} out of range, {len} values supplied")]
    SubDataOutOfRange {
        /// 0-based reference
        index: usize,
        /// Subdata length
        len: usize,
    },

    /// Substituted word does not fit the slot's declared kind
    #[error("substituted value for slot {position} does not fit kind `{kind}`")]
    KindMismatch {
        /// Slot position within the action's declared list
        position: usize,
        /// The slot kind that rejected the value
        kind: &'static str,
    },
}

/// Resolve an action's slots against prior outputs and subdata
///
/// # Errors
///
/// Returns error on mapping arity mismatch, out-of-range references or
/// a substituted value that cannot represent the slot's kind
pub fn resolve_params(
    slots: &[SlotValue],
    mapping: &[ParamSource],
    outputs: &OutputBuffer,
    sub_data: &[Word],
) -> Result<Vec<SlotValue>, ParamError> {
    if mapping.len() != slots.len() {
        return Err(ParamError::MappingLengthMismatch {
            expected: slots.len(),
            got: mapping.len(),
        });
    }

    let mut resolved = Vec::with_capacity(slots.len());
    for (position, (slot, source)) in slots.iter().zip(mapping).enumerate() {
        let value = match source {
            ParamSource::Literal => *slot,
            ParamSource::Output(index) => {
                let index = usize::from(*index);
                let word = outputs.get(index).ok_or(ParamError::OutOfRangeReference {
                    index,
                    len: outputs.len(),
                })?;
                slot.with_word(word).ok_or(ParamError::KindMismatch {
                    position,
                    kind: slot.kind(),
                })?
            }
            ParamSource::SubData(index) => {
                let index = usize::from(*index);
                let word = sub_data
                    .get(index)
                    .copied()
                    .ok_or(ParamError::SubDataOutOfRange {
                        index,
                        len: sub_data.len(),
                    })?;
                slot.with_word(word).ok_or(ParamError::KindMismatch {
                    position,
                    kind: slot.kind(),
                })?
            }
        };
        resolved.push(value);
    }
    Ok(resolved)
}
