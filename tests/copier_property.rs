//! Property tests for the field copier.

use mapbind::copier::{copy_fields, lift, CopyFields, CopyOutcome, FieldCopier};
use mapbind::field_copiers;
use proptest::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
struct SessionState {
    dirty: bool,
    pending_loads: Vec<String>,
    attempt_count: u32,
}

impl CopyFields for SessionState {
    fn field_copiers() -> Vec<FieldCopier<Self>> {
        field_copiers!(SessionState {
            dirty,
            pending_loads,
            attempt_count,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ProxySnapshot {
    session: SessionState,
    label: String,
    // Fixed at construction; never copied.
    identity: u64,
}

impl CopyFields for ProxySnapshot {
    fn field_copiers() -> Vec<FieldCopier<Self>> {
        let mut copiers = lift(
            SessionState::field_copiers(),
            |p: &ProxySnapshot| &p.session,
            |p: &mut ProxySnapshot| &mut p.session,
        );
        copiers.extend(field_copiers!(ProxySnapshot { label }));
        copiers.push(FieldCopier::immutable("identity"));
        copiers
    }
}

fn session_state() -> impl Strategy<Value = SessionState> {
    (
        any::<bool>(),
        proptest::collection::vec("[a-z]{1,8}", 0..4),
        any::<u32>(),
    )
        .prop_map(|(dirty, pending_loads, attempt_count)| SessionState {
            dirty,
            pending_loads,
            attempt_count,
        })
}

fn proxy_snapshot() -> impl Strategy<Value = ProxySnapshot> {
    (session_state(), "[a-z]{0,12}", any::<u64>()).prop_map(|(session, label, identity)| {
        ProxySnapshot {
            session,
            label,
            identity,
        }
    })
}

proptest! {
    /// Copying every mutable field makes source and destination agree on all
    /// of them, regardless of what the destination held before.
    #[test]
    fn copy_round_trip_equalizes_mutable_fields(
        source in proxy_snapshot(),
        mut dest in proxy_snapshot(),
    ) {
        let dest_identity = dest.identity;
        let copied = copy_fields(&source, &mut dest);

        prop_assert_eq!(copied, 4);
        prop_assert_eq!(&dest.session, &source.session);
        prop_assert_eq!(&dest.label, &source.label);
        // The immutable field is untouched.
        prop_assert_eq!(dest.identity, dest_identity);
    }

    /// A copy is idempotent: applying it twice changes nothing further.
    #[test]
    fn copy_is_idempotent(source in proxy_snapshot(), mut dest in proxy_snapshot()) {
        copy_fields(&source, &mut dest);
        let after_first = (dest.session.clone(), dest.label.clone(), dest.identity);
        copy_fields(&source, &mut dest);
        prop_assert_eq!((dest.session, dest.label, dest.identity), after_first);
    }

    /// Skipped descriptors never report as copied.
    #[test]
    fn skip_outcome_is_not_counted(state in session_state()) {
        let skipping = FieldCopier::<SessionState>::immutable("dirty");
        let mut dest = SessionState::default();
        prop_assert_eq!(skipping.apply(&state, &mut dest), CopyOutcome::Skipped);
        prop_assert_eq!(dest, SessionState::default());
    }
}
