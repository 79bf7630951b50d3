//! C3 linearization of class hierarchies.

use std::sync::Arc;

use cooper_core::{ClassId, ClassNode, LinearizationError, Linearizer};

/// C3 merge over the bases' linearizations plus the list of bases itself.
///
/// Returns the ancestors of a class with `bases`, excluding the class and the
/// universal base.
pub fn c3_linearize(bases: &[Arc<ClassNode>]) -> Result<Vec<Arc<ClassNode>>, LinearizationError> {
    let mut sequences: Vec<Vec<Arc<ClassNode>>> = bases
        .iter()
        .map(|base| {
            std::iter::once(Arc::clone(base))
                .chain(base.ancestors().iter().cloned())
                .collect()
        })
        .collect();
    sequences.push(bases.to_vec());

    let mut merged: Vec<Arc<ClassNode>> = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(merged);
        }

        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| !in_any_tail(&sequences, head.id()))
            .cloned()
            .ok_or_else(|| inconsistent(&sequences))?;

        for seq in &mut sequences {
            if seq[0].id() == candidate.id() {
                seq.remove(0);
            }
        }
        merged.push(candidate);
    }
}

fn in_any_tail(sequences: &[Vec<Arc<ClassNode>>], id: ClassId) -> bool {
    sequences
        .iter()
        .any(|seq| seq[1..].iter().any(|c| c.id() == id))
}

fn inconsistent(sequences: &[Vec<Arc<ClassNode>>]) -> LinearizationError {
    let heads: Vec<&str> = sequences.iter().map(|seq| seq[0].name()).collect();
    LinearizationError::new(format!(
        "cannot create a consistent method resolution order for bases {}",
        heads.join(", ")
    ))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct C3Linearizer;

impl Linearizer for C3Linearizer {
    fn linearize(&self, bases: &[Arc<ClassNode>]) -> Result<Vec<Arc<ClassNode>>, LinearizationError> {
        c3_linearize(bases)
    }
}
