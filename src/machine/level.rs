//! Static level definitions.

use crate::machine::isa::OperationSet;

/// Immutable description of one puzzle.
///
/// Built once when the catalogue is assembled and only read afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Level {
    /// Display title.
    pub title: String,
    /// Values fed to the input queue at the start of every run.
    pub input: Vec<i64>,
    /// Output sequence a run must produce to succeed.
    pub expected_output: Vec<i64>,
    /// Number of playground slots.
    pub playground_size: usize,
    /// Operations the program may use.
    pub allowed: OperationSet,
}

impl Level {
    pub fn new(
        title: impl Into<String>,
        input: Vec<i64>,
        expected_output: Vec<i64>,
        playground_size: usize,
        allowed: OperationSet,
    ) -> Self {
        Self {
            title: title.into(),
            input,
            expected_output,
            playground_size,
            allowed,
        }
    }

    /// True iff `output` equals the expected sequence element-wise.
    pub fn accepts(&self, output: &[i64]) -> bool {
        self.expected_output == output
    }
}
