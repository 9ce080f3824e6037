//! Actor (causer) context
//!
//! The host's authentication layer tells the audit engine who, if anyone,
//! triggered a lifecycle event.

use crate::entity::SubjectId;

/// Provider of the optional authenticated actor
pub trait ActorContext {
    /// Identifier of the authenticated actor, if any
    fn actor_id(&self) -> Option<SubjectId>;

    fn has_authenticated_actor(&self) -> bool {
        self.actor_id().is_some()
    }
}

/// No authenticated actor (background jobs, migrations, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActor;

impl ActorContext for NoActor {
    fn actor_id(&self) -> Option<SubjectId> {
        None
    }
}

/// A fixed actor, typically built per request from the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticActor(pub SubjectId);

impl StaticActor {
    pub fn new(id: impl Into<SubjectId>) -> Self {
        Self(id.into())
    }
}

impl ActorContext for StaticActor {
    fn actor_id(&self) -> Option<SubjectId> {
        Some(self.0.clone())
    }
}

impl<A: ActorContext> ActorContext for Option<A> {
    fn actor_id(&self) -> Option<SubjectId> {
        self.as_ref().and_then(ActorContext::actor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_actor() {
        assert!(!NoActor.has_authenticated_actor());
        assert_eq!(NoActor.actor_id(), None);
    }

    #[test]
    fn test_static_actor() {
        let actor = StaticActor::new(12);
        assert!(actor.has_authenticated_actor());
        assert_eq!(actor.actor_id(), Some(SubjectId::Int(12)));
    }

    #[test]
    fn test_optional_actor() {
        let absent: Option<StaticActor> = None;
        assert!(!absent.has_authenticated_actor());
        assert_eq!(
            Some(StaticActor::new("u-1")).actor_id(),
            Some(SubjectId::from("u-1"))
        );
    }
}
