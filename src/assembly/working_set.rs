use crate::error::{InputError, Result};
use crate::kernel::Document;

/// Current geometry of every part in a synthesis pass, in selection order.
///
/// Slots are addressed by position only, so a part modified by one pair is
/// seen by every later pair.
#[derive(Debug, Clone)]
pub struct WorkingSet<Id, S> {
    ids: Vec<Id>,
    solids: Vec<S>,
}

impl<Id: Copy, S> WorkingSet<Id, S> {
    /// Pairs each solid with the identity it is written back under.
    ///
    /// # Errors
    ///
    /// Returns an error if the two lists differ in length.
    pub fn new(solids: Vec<S>, ids: Vec<Id>) -> Result<Self> {
        if solids.len() != ids.len() {
            return Err(InputError::LengthMismatch {
                solids: solids.len(),
                identities: ids.len(),
            }
            .into());
        }
        Ok(Self { ids, solids })
    }

    /// Loads the listed objects from a document.
    ///
    /// # Errors
    ///
    /// Returns an error if any identity is missing from the document.
    pub fn from_document<D>(document: &D, ids: &[Id]) -> Result<Self>
    where
        D: Document<Id = Id, Solid = S>,
        S: Clone,
    {
        let solids = ids
            .iter()
            .map(|id| document.solid(*id).cloned().ok_or(InputError::ObjectNotFound))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            ids: ids.to_vec(),
            solids,
        })
    }

    #[must_use]
    pub fn solids(&self) -> &[S] {
        &self.solids
    }

    pub fn solids_mut(&mut self) -> &mut [S] {
        &mut self.solids
    }

    /// Replaces every object in `document` with its slot's geometry.
    /// Returns the number of objects replaced.
    pub fn write_back<D>(&self, document: &mut D) -> usize
    where
        D: Document<Id = Id, Solid = S>,
        S: Clone,
    {
        let mut replaced = 0;
        for (id, solid) in self.ids.iter().zip(&self.solids) {
            if document.replace_object(*id, solid.clone()) {
                replaced += 1;
            }
        }
        replaced
    }

    pub fn into_solids(self) -> Vec<S> {
        self.solids
    }
}
