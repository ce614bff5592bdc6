//! The observer seam shared by both registries.
//!
//! A registry is a subject that, on every state-changing event, walks its
//! registered observers once and lets each one update or invalidate
//! itself. Cursor records observe structural edits of their array; tracked
//! pointer registrations observe destruction of their target.

/// What an observer did in response to one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// The event did not concern this observer.
    Unchanged,
    /// The observer re-pointed itself and is still valid.
    Updated,
    /// The observer was forced to its invalid state (sentinel or null).
    Invalidated,
}

/// An entry in a registry that reacts to events of type `E`.
pub trait Observer<E: ?Sized> {
    /// React to one event.
    fn observe(&mut self, event: &E) -> Reaction;
}

/// Counts from one [`broadcast`] pass, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Observers visited.
    pub visited: usize,
    /// Observers that re-pointed themselves.
    pub updated: usize,
    /// Observers forced to their invalid state.
    pub invalidated: usize,
}

/// Deliver `event` to every observer, exactly once each, in iteration order.
pub fn broadcast<'a, E, O, I>(observers: I, event: &E) -> BroadcastSummary
where
    E: ?Sized,
    O: Observer<E> + 'a,
    I: IntoIterator<Item = &'a mut O>,
{
    let mut summary = BroadcastSummary::default();
    for observer in observers {
        summary.visited += 1;
        match observer.observe(event) {
            Reaction::Unchanged => {}
            Reaction::Updated => summary.updated += 1,
            Reaction::Invalidated => summary.invalidated += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Threshold(u32);

    impl Observer<u32> for Threshold {
        fn observe(&mut self, event: &u32) -> Reaction {
            if self.0 == *event {
                Reaction::Invalidated
            } else if self.0 > *event {
                self.0 -= 1;
                Reaction::Updated
            } else {
                Reaction::Unchanged
            }
        }
    }

    #[test]
    fn broadcast_counts_reactions() {
        let mut obs = vec![Threshold(1), Threshold(5), Threshold(9)];
        let summary = broadcast(obs.iter_mut(), &5);
        assert_eq!(
            summary,
            BroadcastSummary {
                visited: 3,
                updated: 1,
                invalidated: 1,
            }
        );
        assert_eq!(obs[2].0, 8);
    }

    #[test]
    fn broadcast_over_nothing_is_empty() {
        let mut obs: Vec<Threshold> = Vec::new();
        assert_eq!(broadcast(obs.iter_mut(), &0), BroadcastSummary::default());
    }
}
