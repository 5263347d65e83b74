use crate::context::SerializerContext;
use crate::listener::DeserializeListener;
use crate::serializer::RuleSerializer;
use elim_model::Model;
use fxhash::FxHashSet;
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

/// Read side of a rule set.
pub trait RuleCollection<M>: Send + Sync {
    /// Point-in-time copy of the known rules.
    fn rules(&self) -> Vec<Arc<M>>;

    /// Forgets every known rule.
    fn invalidate_cache(&self);
}

/// Collects every distinct model a serializer deserializes, in first-seen order.
///
/// The store is shared with the listener registered on the serializer, so the collection keeps
/// filling up for as long as that serializer lives.
pub struct ListeningRuleCollection<M> {
    store: Arc<Mutex<Store<M>>>,
}

struct Store<M> {
    ordered: Vec<Arc<M>>,
    seen: FxHashSet<Arc<M>>,
}

impl<M> Default for Store<M> {
    fn default() -> Self {
        Self { ordered: Vec::new(), seen: FxHashSet::default() }
    }
}

impl<M: Eq + Hash> Store<M> {
    /// `false` when an equal model is already stored.
    fn insert(&mut self, model: &Arc<M>) -> bool {
        if !self.seen.insert(Arc::clone(model)) {
            return false;
        }
        self.ordered.push(Arc::clone(model));
        true
    }

    fn clear(&mut self) {
        self.ordered.clear();
        self.seen.clear();
    }
}

impl<M> Clone for ListeningRuleCollection<M> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<M> fmt::Debug for ListeningRuleCollection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListeningRuleCollection").field("len", &self.store.lock().ordered.len()).finish()
    }
}

impl<M: Model + Eq + Hash> ListeningRuleCollection<M> {
    /// Attaches a new collection to `serializer`.
    pub fn attach(serializer: &dyn RuleSerializer<M>) -> Self {
        let store: Arc<Mutex<Store<M>>> = Arc::default();
        let sink = Arc::clone(&store);
        serializer.add_listener(Arc::new(move |model: &Arc<M>, _: &SerializerContext| {
            if sink.lock().insert(model) {
                trace!(model = M::type_name(), "Rule collected");
            } else {
                trace!(model = M::type_name(), "Equal rule already collected");
            }
        }) as Arc<dyn DeserializeListener<M>>);
        Self { store }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.lock().ordered.is_empty()
    }
}

impl<M: Model + Eq + Hash> RuleCollection<M> for ListeningRuleCollection<M> {
    fn rules(&self) -> Vec<Arc<M>> {
        self.store.lock().ordered.clone()
    }

    fn invalidate_cache(&self) {
        self.store.lock().clear();
    }
}
