use std::sync::{Arc, Barrier};
use std::thread;

use rolecall::bot::render::render_catalog_status;
use rolecall::bot::{AdminSet, ClaimError, ClaimNegotiator, Claimant, ClaimantId, RoleCatalog, RoleKey};

const ADMIN: u64 = 900;

fn negotiator() -> ClaimNegotiator {
    ClaimNegotiator::new(RoleCatalog::default(), AdminSet::new([ClaimantId(ADMIN)]))
}

fn user(id: u64) -> Claimant {
    Claimant::new(id, format!("member {id}"))
}

fn key(raw: &str) -> RoleKey {
    RoleKey::parse(raw).unwrap()
}

/// Each role has at most one holder and each member holds at most one role.
fn assert_exclusive(n: &ClaimNegotiator) {
    let snapshot = n.snapshot();
    let mut holders = Vec::new();
    for role in n.catalog().roles() {
        if let Some(a) = snapshot.assignment(&role.key) {
            assert_eq!(a.role_key, role.key);
            holders.push(a.claimant_id);
        }
    }
    let count = holders.len();
    holders.sort();
    holders.dedup();
    assert_eq!(holders.len(), count, "a member holds two roles");
}

#[test]
fn second_member_cannot_take_claimed_role() {
    let n = negotiator();
    n.select(&user(1), "pm").unwrap();
    n.confirm(&user(1), "pm").unwrap();

    let assignment = n.store().get_assignment(&key("pm")).unwrap();
    assert_eq!(assignment.claimant_id, ClaimantId(1));
    assert_eq!(n.select(&user(2), "pm"), Err(ClaimError::RoleTaken));
}

#[test]
fn reselection_before_confirm_moves_the_pending_claim() {
    let n = negotiator();
    n.select(&user(1), "pm").unwrap();
    n.select(&user(1), "backend").unwrap();

    assert_eq!(n.store().get_pending(ClaimantId(1)), Some(key("backend")));
    assert!(n.store().get_assignment(&key("pm")).is_none());
}

#[test]
fn confirm_needs_own_selection() {
    let n = negotiator();
    n.select(&user(1), "pm").unwrap();

    assert_eq!(n.confirm(&user(2), "pm"), Err(ClaimError::NoPendingClaim));
    assert!(n.snapshot().is_empty());
}

#[test]
fn admin_reset_frees_everything() {
    let n = negotiator();
    let initial = render_catalog_status(n.catalog(), &n.snapshot());

    n.select(&user(1), "pm").unwrap();
    n.confirm(&user(1), "pm").unwrap();
    assert_ne!(render_catalog_status(n.catalog(), &n.snapshot()), initial);

    assert_eq!(n.reset(ClaimantId(1)), Err(ClaimError::Unauthorized));
    assert_eq!(n.snapshot().len(), 1);

    n.reset(ClaimantId(ADMIN)).unwrap();
    assert_eq!(render_catalog_status(n.catalog(), &n.snapshot()), initial);
    assert!(n.select(&user(1), "pm").is_ok());
}

#[test]
fn cancel_twice_equals_cancel_once() {
    let n = negotiator();
    n.select(&user(1), "ml").unwrap();
    n.cancel(&user(1));
    let once = (n.store().get_pending(ClaimantId(1)), n.snapshot());
    n.cancel(&user(1));
    let twice = (n.store().get_pending(ClaimantId(1)), n.snapshot());
    assert_eq!(once, twice);
}

#[test]
fn concurrent_confirms_have_exactly_one_winner() {
    const MEMBERS: u64 = 16;

    for _ in 0..20 {
        let n = Arc::new(negotiator());
        for id in 1..=MEMBERS {
            n.select(&user(id), "devops").unwrap();
        }

        let barrier = Arc::new(Barrier::new(MEMBERS as usize));
        let handles: Vec<_> = (1..=MEMBERS)
            .map(|id| {
                let n = Arc::clone(&n);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    n.confirm(&user(id), "devops")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| *e == ClaimError::RoleTaken)
        );
        assert_exclusive(&n);
    }
}

#[test]
fn concurrent_members_grabbing_all_roles_stay_exclusive() {
    let n = Arc::new(negotiator());
    let roles: Vec<String> = n.catalog().roles().iter().map(|r| r.key.to_string()).collect();
    let roles = Arc::new(roles);

    let handles: Vec<_> = (1..=12u64)
        .map(|id| {
            let n = Arc::clone(&n);
            let roles = Arc::clone(&roles);
            thread::spawn(move || {
                let me = user(id);
                for role in roles.iter() {
                    if n.select(&me, role).is_ok() && n.confirm(&me, role).is_ok() {
                        return;
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Five roles, twelve members: every role ends up taken, each by a different member.
    assert_eq!(n.snapshot().len(), n.catalog().len());
    assert_exclusive(&n);
}
