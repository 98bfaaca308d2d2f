use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identity of a part in a [`DocumentStore`].
    pub struct ObjectId;
}

/// Host document that owns the parts being joined.
pub trait Document {
    /// Identity under which the document stores a part.
    type Id: Copy;
    /// Geometry stored per part.
    type Solid;

    /// Current geometry for `id`, if the object exists.
    fn solid(&self, id: Self::Id) -> Option<&Self::Solid>;

    /// Replaces the geometry stored under `id`. Returns `false` if the
    /// object does not exist.
    fn replace_object(&mut self, id: Self::Id, solid: Self::Solid) -> bool;
}

/// In-memory document backed by a generational arena.
#[derive(Debug)]
pub struct DocumentStore<S> {
    objects: SlotMap<ObjectId, S>,
}

impl<S> Default for DocumentStore<S> {
    fn default() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }
}

impl<S> DocumentStore<S> {
    /// Creates a new, empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a part and returns its identity.
    pub fn add(&mut self, solid: S) -> ObjectId {
        self.objects.insert(solid)
    }

    /// Removes a part, returning its geometry.
    pub fn remove(&mut self, id: ObjectId) -> Option<S> {
        self.objects.remove(id)
    }

    /// Number of parts in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the document holds no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates over identities and geometry in insertion-slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &S)> {
        self.objects.iter()
    }
}

impl<S> Document for DocumentStore<S> {
    type Id = ObjectId;
    type Solid = S;

    fn solid(&self, id: ObjectId) -> Option<&S> {
        self.objects.get(id)
    }

    fn replace_object(&mut self, id: ObjectId, solid: S) -> bool {
        match self.objects.get_mut(id) {
            Some(slot) => {
                *slot = solid;
                true
            }
            None => false,
        }
    }
}
