/*
 * Generic two-phase registry for shared decorators. A resource starts in the
 * `pending` set when its factory manufactures it, moves to `committed` the first
 * time any slot attaches it, and leaves the pool when its reference count drops
 * back to zero. The two sets are disjoint at every observation point.
 *
 * The pool never releases native sub-handles itself: whenever a resource leaves
 * the pool it is handed back to the caller, which owns the native teardown (and
 * any cascade to dependent resources, such as a menu's items).
 *
 * There is no locking here. Every mutation happens on the event-loop thread.
 */
use super::{AttachmentSlot, ResourceId, SharedResource};

use std::collections::HashMap;

#[derive(Debug)]
struct Committed<R> {
    resource: R,
    ref_count: usize,
}

/// What `attach` did with the request.
#[derive(Debug)]
pub(crate) enum AttachOutcome<R: SharedResource> {
    /// The resource is now the slot's attachment. `released` is the slot's previous
    /// attachment if that detach dropped it to zero references.
    Attached {
        released: Option<(ResourceId<R>, R)>,
    },
    /// The slot already held this resource.
    Unchanged,
    /// Null, unknown, or exclusively owned elsewhere. Nothing changed.
    Rejected,
}

impl<R: SharedResource> AttachOutcome<R> {
    pub(crate) fn is_attached(&self) -> bool {
        matches!(self, AttachOutcome::Attached { .. })
    }
}

#[derive(Debug)]
pub(crate) struct SharedResourcePool<R: SharedResource> {
    next_raw: u64,
    pending: HashMap<ResourceId<R>, R>,
    committed: HashMap<ResourceId<R>, Committed<R>>,
    slots: HashMap<AttachmentSlot, ResourceId<R>>,
}

impl<R: SharedResource> Default for SharedResourcePool<R> {
    fn default() -> Self {
        Self {
            next_raw: 1,
            pending: HashMap::new(),
            committed: HashMap::new(),
            slots: HashMap::new(),
        }
    }
}

impl<R: SharedResource> SharedResourcePool<R> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Places a freshly manufactured resource in `pending`.
    pub(crate) fn create(&mut self, resource: R) -> ResourceId<R> {
        let id = ResourceId::new(self.next_raw);
        self.next_raw += 1;
        self.pending.insert(id, resource);
        log::debug!("{}Pool: Created {id:?} (pending).", R::KIND);
        id
    }

    /*
     * Makes `resource` the current attachment of `slot`. The new resource is
     * counted before the slot's previous attachment is released, so re-using a
     * resource in the same logical place never destroys it transiently.
     */
    pub(crate) fn attach(
        &mut self,
        slot: AttachmentSlot,
        resource: Option<ResourceId<R>>,
    ) -> AttachOutcome<R> {
        let Some(id) = resource else {
            log::debug!("{}Pool: Ignoring attach of null to {slot:?}.", R::KIND);
            return AttachOutcome::Rejected;
        };
        let previous = self.slots.get(&slot).copied();
        if previous == Some(id) {
            return AttachOutcome::Unchanged;
        }

        if let Some(resource) = self.pending.remove(&id) {
            self.committed.insert(
                id,
                Committed {
                    resource,
                    ref_count: 1,
                },
            );
        } else if let Some(entry) = self.committed.get_mut(&id) {
            if R::EXCLUSIVE {
                log::warn!(
                    "{}Pool: {id:?} is already owned by {:?}; ignoring attach to {slot:?}.",
                    R::KIND,
                    self.owner_of(id)
                );
                return AttachOutcome::Rejected;
            }
            entry.ref_count += 1;
        } else {
            log::warn!(
                "{}Pool: Attach of unknown or destroyed {id:?} to {slot:?} ignored.",
                R::KIND
            );
            return AttachOutcome::Rejected;
        }

        self.slots.insert(slot, id);
        log::debug!(
            "{}Pool: Attached {id:?} to {slot:?} (refs {}).",
            R::KIND,
            self.ref_count(id).unwrap_or(0)
        );
        let released = self.detach(previous);
        AttachOutcome::Attached { released }
    }

    /*
     * Drops one reference. Returns the resource once the count reaches zero; the
     * caller is responsible for its native teardown. Detaching null or a
     * resource that is not committed is a no-op.
     */
    fn detach(&mut self, resource: Option<ResourceId<R>>) -> Option<(ResourceId<R>, R)> {
        let id = resource?;
        let Some(entry) = self.committed.get_mut(&id) else {
            log::warn!("{}Pool: Detach of uncommitted {id:?} ignored.", R::KIND);
            return None;
        };
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            log::debug!(
                "{}Pool: Detached {id:?} (refs {}).",
                R::KIND,
                entry.ref_count
            );
            return None;
        }
        let entry = self.committed.remove(&id)?;
        log::debug!("{}Pool: {id:?} reached zero references.", R::KIND);
        Some((id, entry.resource))
    }

    /// Clears `slot` and detaches whatever it held.
    pub(crate) fn release_slot(&mut self, slot: AttachmentSlot) -> Option<(ResourceId<R>, R)> {
        let previous = self.slots.remove(&slot);
        self.detach(previous)
    }

    pub(crate) fn check(&self, id: ResourceId<R>) -> bool {
        self.committed.contains_key(&id)
    }

    pub(crate) fn is_pending(&self, id: ResourceId<R>) -> bool {
        self.pending.contains_key(&id)
    }

    /// `Some(0)` while pending, `None` once destroyed or if never created.
    pub(crate) fn ref_count(&self, id: ResourceId<R>) -> Option<usize> {
        if self.pending.contains_key(&id) {
            return Some(0);
        }
        self.committed.get(&id).map(|entry| entry.ref_count)
    }

    pub(crate) fn get(&self, id: ResourceId<R>) -> Option<&R> {
        self.pending
            .get(&id)
            .or_else(|| self.committed.get(&id).map(|entry| &entry.resource))
    }

    pub(crate) fn get_mut(&mut self, id: ResourceId<R>) -> Option<&mut R> {
        if let Some(resource) = self.pending.get_mut(&id) {
            return Some(resource);
        }
        self.committed.get_mut(&id).map(|entry| &mut entry.resource)
    }

    pub(crate) fn attached(&self, slot: AttachmentSlot) -> Option<ResourceId<R>> {
        self.slots.get(&slot).copied()
    }

    /// First slot currently holding `id`. Exclusive resources have at most one.
    pub(crate) fn owner_of(&self, id: ResourceId<R>) -> Option<AttachmentSlot> {
        self.slots
            .iter()
            .find_map(|(slot, held)| (*held == id).then_some(*slot))
    }

    /// Removes every resource that was manufactured but never attached.
    pub(crate) fn clear_pending(&mut self) -> Vec<(ResourceId<R>, R)> {
        let drained: Vec<_> = self.pending.drain().collect();
        if !drained.is_empty() {
            log::debug!(
                "{}Pool: Clearing {} pending resource(s).",
                R::KIND,
                drained.len()
            );
        }
        drained
    }

    /*
     * Detaches every slot, then empties the pool. Resources are returned in the
     * order they left the pool so the caller can tear them down.
     */
    pub(crate) fn clear_all(&mut self) -> Vec<(ResourceId<R>, R)> {
        let mut slots: Vec<AttachmentSlot> = self.slots.keys().copied().collect();
        slots.sort();
        let mut released: Vec<_> = slots
            .into_iter()
            .filter_map(|slot| self.release_slot(slot))
            .collect();
        if !self.committed.is_empty() {
            log::warn!(
                "{}Pool: {} committed resource(s) had no slot at clear_all.",
                R::KIND,
                self.committed.len()
            );
            released.extend(
                self.committed
                    .drain()
                    .map(|(id, entry)| (id, entry.resource)),
            );
        }
        released.extend(self.clear_pending());
        released
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn committed_len(&self) -> usize {
        self.committed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WidgetId;

    #[derive(Debug, PartialEq)]
    struct Shared(&'static str);

    impl SharedResource for Shared {
        const KIND: &'static str = "Shared";
        const EXCLUSIVE: bool = false;
    }

    #[derive(Debug, PartialEq)]
    struct Owned(&'static str);

    impl SharedResource for Owned {
        const KIND: &'static str = "Owned";
        const EXCLUSIVE: bool = true;
    }

    fn content(widget: u64) -> AttachmentSlot {
        AttachmentSlot::ContentBorder(WidgetId(widget))
    }

    fn assert_partition<R: SharedResource>(pool: &SharedResourcePool<R>, id: ResourceId<R>) {
        let pending = pool.is_pending(id);
        let committed = pool.check(id);
        assert!(!(pending && committed), "pools must stay disjoint");
        match pool.ref_count(id) {
            Some(0) => assert!(pending),
            Some(_) => assert!(committed),
            None => assert!(!pending && !committed),
        }
    }

    #[test]
    fn first_attach_moves_pending_to_committed() {
        let mut pool = SharedResourcePool::new();
        let id = pool.create(Shared("b1"));
        assert!(pool.is_pending(id));
        assert_eq!(pool.ref_count(id), Some(0));

        let outcome = pool.attach(content(1), Some(id));

        assert!(outcome.is_attached());
        assert!(pool.check(id));
        assert!(!pool.is_pending(id));
        assert_eq!(pool.ref_count(id), Some(1));
        assert_partition(&pool, id);
    }

    #[test]
    fn shared_resource_lives_until_last_slot_releases() {
        let mut pool = SharedResourcePool::new();
        let id = pool.create(Shared("b1"));
        pool.attach(content(1), Some(id));
        pool.attach(content(2), Some(id));
        assert_eq!(pool.ref_count(id), Some(2));

        assert!(pool.release_slot(content(1)).is_none());
        assert_eq!(pool.ref_count(id), Some(1));
        assert!(pool.check(id));

        let released = pool.release_slot(content(2)).expect("last release destroys");
        assert_eq!(released, (id, Shared("b1")));
        assert!(!pool.check(id));
        assert_eq!(pool.ref_count(id), None);
        assert_partition(&pool, id);
    }

    #[test]
    fn replacing_attachment_counts_new_before_releasing_old() {
        // Two widgets share b1, b2 is pending.
        let mut pool = SharedResourcePool::new();
        let b1 = pool.create(Shared("b1"));
        let b2 = pool.create(Shared("b2"));
        pool.attach(content(1), Some(b1));
        pool.attach(content(2), Some(b1));

        let outcome = pool.attach(content(2), Some(b2));

        match outcome {
            AttachOutcome::Attached { released } => assert!(released.is_none()),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(pool.ref_count(b1), Some(1));
        assert_eq!(pool.ref_count(b2), Some(1));
        assert!(pool.check(b2));
        assert_partition(&pool, b1);
        assert_partition(&pool, b2);
    }

    #[test]
    fn replacing_sole_attachment_releases_old_resource() {
        let mut pool = SharedResourcePool::new();
        let b1 = pool.create(Shared("b1"));
        let b2 = pool.create(Shared("b2"));
        pool.attach(content(1), Some(b1));

        match pool.attach(content(1), Some(b2)) {
            AttachOutcome::Attached { released } => {
                assert_eq!(released.map(|(id, _)| id), Some(b1));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!pool.check(b1));
    }

    #[test]
    fn reattaching_same_resource_is_unchanged() {
        let mut pool = SharedResourcePool::new();
        let id = pool.create(Shared("b1"));
        pool.attach(content(1), Some(id));

        assert!(matches!(
            pool.attach(content(1), Some(id)),
            AttachOutcome::Unchanged
        ));
        assert_eq!(pool.ref_count(id), Some(1));
    }

    #[test]
    fn null_and_unknown_attachments_are_rejected() {
        let mut pool: SharedResourcePool<Shared> = SharedResourcePool::new();
        assert!(matches!(
            pool.attach(content(1), None),
            AttachOutcome::Rejected
        ));
        assert!(matches!(
            pool.attach(content(1), Some(ResourceId::new(42))),
            AttachOutcome::Rejected
        ));
        assert_eq!(pool.attached(content(1)), None);
    }

    #[test]
    fn exclusive_resource_cannot_join_second_slot() {
        let mut pool = SharedResourcePool::new();
        let id = pool.create(Owned("menu"));
        pool.attach(AttachmentSlot::MenuBar(WidgetId(1)), Some(id));

        let outcome = pool.attach(AttachmentSlot::MenuBar(WidgetId(2)), Some(id));

        assert!(matches!(outcome, AttachOutcome::Rejected));
        assert_eq!(pool.ref_count(id), Some(1));
        assert_eq!(
            pool.owner_of(id),
            Some(AttachmentSlot::MenuBar(WidgetId(1)))
        );
        assert_eq!(pool.attached(AttachmentSlot::MenuBar(WidgetId(2))), None);
    }

    #[test]
    fn replacing_an_attachment_hands_back_the_released_resource() {
        let mut pool = SharedResourcePool::new();
        let first = pool.create(Shared("first"));
        let second = pool.create(Shared("second"));
        pool.attach(content(1), Some(first));

        let outcome = pool.attach(content(1), Some(second));

        let shown = format!("{outcome:?}");
        assert!(shown.starts_with("Attached"), "{shown}");
        assert!(shown.contains("Shared(\"first\")"), "{shown}");
        match outcome {
            AttachOutcome::Attached { released } => {
                assert_eq!(released.map(|(id, _)| id), Some(first));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(pool.check(second));
    }

    #[test]
    fn clear_pending_only_drops_unattached_resources() {
        let mut pool = SharedResourcePool::new();
        let used = pool.create(Shared("used"));
        let abandoned = pool.create(Shared("abandoned"));
        pool.attach(content(1), Some(used));

        let cleared = pool.clear_pending();

        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared[0].0, abandoned);
        assert!(pool.check(used));
        assert_eq!(pool.pending_len(), 0);
    }

    #[test]
    fn clear_all_empties_both_sets() {
        let mut pool = SharedResourcePool::new();
        let a = pool.create(Shared("a"));
        pool.create(Shared("b"));
        pool.attach(content(1), Some(a));
        pool.attach(content(2), Some(a));

        let released = pool.clear_all();

        assert_eq!(released.len(), 2);
        assert_eq!(pool.pending_len(), 0);
        assert_eq!(pool.committed_len(), 0);
        assert_eq!(pool.attached(content(1)), None);
    }

    #[test]
    fn ref_count_invariant_holds_over_mixed_sequence() {
        let mut pool = SharedResourcePool::new();
        let ids: Vec<_> = (0..3).map(|_| pool.create(Shared("x"))).collect();
        let script: [(u64, Option<usize>); 8] = [
            (1, Some(0)),
            (2, Some(0)),
            (3, Some(1)),
            (1, Some(2)),
            (2, None),
            (3, Some(0)),
            (1, None),
            (3, None),
        ];
        for (widget, choice) in script {
            match choice {
                Some(index) => {
                    pool.attach(content(widget), Some(ids[index]));
                }
                None => {
                    pool.release_slot(content(widget));
                }
            }
            for id in &ids {
                assert_partition(&pool, *id);
            }
        }
        assert_eq!(pool.committed_len(), 0);
    }
}
