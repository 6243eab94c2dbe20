//! Integration tests for protected resources: direct guarded calls,
//! consuming schedules, authority handoff and legacy authorities.

mod common;

use common::{
    authority_err, Impostor, LegacyAuthority, TestWorld, Vault, ADMIN, ALICE, AUTHORITY, BOB,
    CAROL, VAULT,
};
use gatehouse::authority::Policy;
use gatehouse::probe::can_call_with_delay;
use gatehouse::state::AuthorityEvent;
use gatehouse::{AccessManager, AuthorityError, CallError, ManagedError};
use gatehouse_abi::call::managed::decode_marker;
use gatehouse_abi::{Address, AuthorityCall, Decoder, ManagedCall, RoleId, Selector};
use std::sync::Arc;

const DEPOSITOR: u64 = 5;
const DELAY: u32 = 3_600;

const SUCCESSOR: Address = Address::from_low_u64(0x5cc);
const LEGACY: Address = Address::from_low_u64(0x1e9);
const IMPOSTOR: Address = Address::from_low_u64(0xbad);

fn world() -> TestWorld {
    let world = TestWorld::new();
    world.wire(
        VAULT,
        &[
            Vault::selector(Vault::DEPOSIT),
            Vault::selector(Vault::WITHDRAW),
        ],
        DEPOSITOR,
    );
    world.grant(DEPOSITOR, ALICE, DELAY);
    world.grant(DEPOSITOR, BOB, 0);
    world.events();
    world
}

fn managed_err<T: std::fmt::Debug>(result: Result<T, CallError>) -> ManagedError {
    match result {
        Err(CallError::Managed(e)) => e,
        other => panic!("expected a managed error, got {other:?}"),
    }
}

#[test]
fn test_immediate_member_calls_directly() {
    let world = world();
    world.call_vault(BOB, &Vault::deposit(10)).expect("deposit");
    world.call_vault(BOB, &Vault::withdraw(4)).expect("withdraw");
    assert_eq!(world.vault.balance(), 6);
}

#[test]
fn test_non_member_is_rejected() {
    let world = world();
    let err = managed_err(world.call_vault(CAROL, &Vault::deposit(10)));
    assert_eq!(err, ManagedError::Unauthorized(CAROL));
    assert_eq!(world.vault.balance(), 0);
}

#[test]
fn test_unguarded_view_is_open() {
    let world = world();
    world.call_vault(BOB, &Vault::deposit(3)).expect("deposit");
    let data = gatehouse_abi::encode_call(Vault::selector(Vault::BALANCE), &[]);
    let ret = world.host.static_call(CAROL, VAULT, &data).expect("balance");
    assert_eq!(Decoder::new(&ret).uint(64).expect("word"), 3);
}

#[test]
fn test_guarded_call_fails_under_static_call() {
    let world = world();
    let err = world.host.static_call(BOB, VAULT, &Vault::deposit(1));
    assert!(matches!(err, Err(CallError::StaticCallViolation)));
}

#[test]
fn test_resource_failure_reverts_guarded_call() {
    let world = world();
    let err = world.call_vault(BOB, &Vault::withdraw(1));
    assert!(matches!(err, Err(CallError::Reverted(_))));
}

#[test]
fn test_delayed_caller_consumes_schedule_directly() {
    let world = world();
    let data = Vault::deposit(10);
    let (id, _) = world.schedule(ALICE, VAULT, &data, 0).expect("schedule");
    world.events();

    let err = authority_err(world.call_vault(ALICE, &data));
    assert_eq!(err, AuthorityError::NotReady(id));

    world.advance(u64::from(DELAY));
    world.call_vault(ALICE, &data).expect("consume and deposit");
    assert_eq!(world.vault.balance(), 10);
    assert_eq!(world.authority.get_schedule(id), 0);
    assert_eq!(
        world.events(),
        vec![AuthorityEvent::OperationExecuted { id, nonce: 1 }]
    );

    let err = authority_err(world.call_vault(ALICE, &data));
    assert_eq!(err, AuthorityError::NotScheduled(id));
}

#[test]
fn test_consume_requires_consuming_resource() {
    let world = world();
    world
        .host
        .deploy(IMPOSTOR, Arc::new(Impostor::new(AUTHORITY, false)));

    let err = authority_err(world.host.call(ALICE, IMPOSTOR, &Vault::deposit(1)));
    assert_eq!(err, AuthorityError::UnauthorizedConsume(IMPOSTOR));

    // An account with no code cannot answer the marker probe either.
    let err = authority_err(world.call(
        ALICE,
        AuthorityCall::ConsumeScheduledOp {
            caller: ALICE,
            data: Vault::deposit(1),
        },
    ));
    assert_eq!(err, AuthorityError::UnauthorizedConsume(ALICE));
}

#[test]
fn test_consume_is_keyed_to_the_sending_resource() {
    let world = world();
    let data = Vault::deposit(1);
    world.schedule(ALICE, VAULT, &data, 0).expect("schedule");
    world.advance(u64::from(DELAY));

    // A resource that claims the marker can only consume its own schedules.
    world
        .host
        .deploy(IMPOSTOR, Arc::new(Impostor::new(AUTHORITY, true)));
    let err = authority_err(world.host.call(ALICE, IMPOSTOR, &data));
    assert!(matches!(err, AuthorityError::NotScheduled(_)));

    world.call_vault(ALICE, &data).expect("vault consumes");
}

#[test]
fn test_marker_is_only_reported_while_consuming() {
    let world = world();
    let ret = world
        .call_vault(CAROL, &ManagedCall::IsConsumingScheduledOp.encode())
        .expect("marker");
    assert_eq!(decode_marker(&ret).expect("selector"), Selector([0; 4]));
}

#[test]
fn test_update_authority_hands_off_resource() {
    let world = world();
    let successor = Arc::new(
        AccessManager::new(SUCCESSOR, CAROL, Policy::default(), world.clock.clone())
            .expect("successor"),
    );
    world.host.deploy(SUCCESSOR, successor);

    world.admin(AuthorityCall::UpdateAuthority {
        target: VAULT,
        new_authority: SUCCESSOR,
    });
    assert_eq!(world.vault.authority(), SUCCESSOR);
    assert_eq!(
        world.events(),
        vec![AuthorityEvent::AuthorityUpdated {
            resource: VAULT,
            authority: SUCCESSOR,
        }]
    );

    let ret = world
        .call_vault(ALICE, &ManagedCall::Authority.encode())
        .expect("authority()");
    assert_eq!(Decoder::new(&ret).address().expect("address"), SUCCESSOR);

    // The successor has no wiring, so only its ADMIN may deposit.
    let err = managed_err(world.call_vault(BOB, &Vault::deposit(1)));
    assert_eq!(err, ManagedError::Unauthorized(BOB));
    world.call_vault(CAROL, &Vault::deposit(1)).expect("successor admin");
}

#[test]
fn test_update_authority_requires_admin() {
    let world = world();
    let err = authority_err(world.call(
        BOB,
        AuthorityCall::UpdateAuthority {
            target: VAULT,
            new_authority: ALICE,
        },
    ));
    assert_eq!(
        err,
        AuthorityError::UnauthorizedAccount {
            account: BOB,
            required: RoleId::ADMIN,
        }
    );
}

#[test]
fn test_set_authority_rejections() {
    let world = world();

    let err = managed_err(world.call_vault(ADMIN, &ManagedCall::SetAuthority(ADMIN).encode()));
    assert_eq!(err, ManagedError::Unauthorized(ADMIN));

    let nowhere = Address::from_low_u64(0xdead);
    let err = managed_err(world.call(
        ADMIN,
        AuthorityCall::UpdateAuthority {
            target: VAULT,
            new_authority: nowhere,
        },
    ));
    assert_eq!(err, ManagedError::InvalidAuthority(nowhere));
    assert_eq!(world.vault.authority(), AUTHORITY);
    assert!(world.events().is_empty());
}

#[test]
fn test_legacy_authority_answers_with_bare_bool() {
    let world = world();
    world
        .host
        .deploy(LEGACY, Arc::new(LegacyAuthority::new([BOB])));

    let deposit = Vault::selector(Vault::DEPOSIT);
    assert_eq!(
        can_call_with_delay(&world.host, LEGACY, BOB, VAULT, deposit),
        (true, 0)
    );
    assert_eq!(
        can_call_with_delay(&world.host, LEGACY, ALICE, VAULT, deposit),
        (false, 0)
    );

    world.admin(AuthorityCall::UpdateAuthority {
        target: VAULT,
        new_authority: LEGACY,
    });
    world.call_vault(BOB, &Vault::deposit(2)).expect("allowed by legacy");
    let err = managed_err(world.call_vault(ALICE, &Vault::deposit(2)));
    assert_eq!(err, ManagedError::Unauthorized(ALICE));
}

#[test]
fn test_probe_of_missing_authority_denies() {
    let world = world();
    let nowhere = Address::from_low_u64(0xdead);
    assert_eq!(
        can_call_with_delay(
            &world.host,
            nowhere,
            BOB,
            VAULT,
            Vault::selector(Vault::DEPOSIT)
        ),
        (false, 0)
    );
}

#[test]
fn test_closed_target_rejects_direct_calls() {
    let world = world();
    world.admin(AuthorityCall::SetTargetClosed {
        target: VAULT,
        closed: true,
    });
    let err = managed_err(world.call_vault(BOB, &Vault::deposit(1)));
    assert_eq!(err, ManagedError::Unauthorized(BOB));

    world.admin(AuthorityCall::SetTargetClosed {
        target: VAULT,
        closed: false,
    });
    world.call_vault(BOB, &Vault::deposit(1)).expect("reopened");
}

#[test]
fn test_public_function_is_open_to_everyone() {
    let world = world();
    world.wire(VAULT, &[Vault::selector(Vault::EXPLODE)], RoleId::PUBLIC.0);
    let err = world.call_vault(CAROL, &Vault::explode());
    assert!(matches!(err, Err(CallError::Reverted(_))));
}
