use crate::context::SerializerContext;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Callback fired after a model has been deserialized.
pub trait DeserializeListener<M>: Send + Sync {
    fn on_deserialize(&self, model: &Arc<M>, context: &SerializerContext);
}

impl<M, F> DeserializeListener<M> for F
where
    F: Fn(&Arc<M>, &SerializerContext) + Send + Sync,
{
    fn on_deserialize(&self, model: &Arc<M>, context: &SerializerContext) {
        self(model, context);
    }
}

/// Append-only, copy-on-write listener list.
///
/// Notification iterates a snapshot taken outside the lock, so listeners added during a
/// notification take effect from the next one.
pub struct Listeners<M> {
    entries: RwLock<Arc<[Arc<dyn DeserializeListener<M>>]>>,
}

impl<M> Default for Listeners<M> {
    fn default() -> Self {
        Self { entries: RwLock::new(Arc::from(Vec::new())) }
    }
}

impl<M> fmt::Debug for Listeners<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

impl<M> Listeners<M> {
    pub fn add(&self, listener: Arc<dyn DeserializeListener<M>>) {
        let mut entries = self.entries.write();
        let mut next = entries.to_vec();
        next.push(listener);
        *entries = next.into();
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<[Arc<dyn DeserializeListener<M>>]> {
        Arc::clone(&self.entries.read())
    }

    pub fn notify(&self, model: &Arc<M>, context: &SerializerContext) {
        for listener in self.snapshot().iter() {
            listener.on_deserialize(model, context);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
