use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use gatehouse::host::Host;
use gatehouse::probe::can_call_with_delay;
use gatehouse::{AccessManager, ManualClock, Policy};
use gatehouse_abi::{Address, AuthorityCall, RoleId, Selector};
use std::hint::black_box;
use std::sync::Arc;

const AUTHORITY: Address = Address::from_low_u64(0xa0);
const ADMIN: Address = Address::from_low_u64(0xad);
const TARGET: Address = Address::from_low_u64(0x7a);

/// An authority with `members` accounts in role 5, wired to one selector.
fn setup(members: u64) -> (Arc<Host>, Arc<AccessManager>, Selector) {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let host = Arc::new(Host::new(clock.clone()));
    let authority = Arc::new(
        AccessManager::new(AUTHORITY, ADMIN, Policy::default(), clock).expect("authority"),
    );
    host.deploy(AUTHORITY, authority.clone());

    let selector = Selector::from_signature("deposit(uint64)");
    let wire = AuthorityCall::SetTargetFunctionRole {
        target: TARGET,
        selectors: vec![selector],
        role: RoleId(5),
    };
    host.call(ADMIN, AUTHORITY, &wire.encode()).expect("wire");
    for n in 0..members {
        let grant = AuthorityCall::GrantRole {
            role: RoleId(5),
            account: Address::from_low_u64(0x1000 + n),
            execution_delay: (n % 2) as u32 * 3_600,
        };
        host.call(ADMIN, AUTHORITY, &grant.encode()).expect("grant");
    }
    (host, authority, selector)
}

fn decision_benchmark(c: &mut Criterion) {
    let (host, authority, selector) = setup(1_000);
    let member = Address::from_low_u64(0x1000);
    let stranger = Address::from_low_u64(0xffff);

    let mut group = c.benchmark_group("decision");
    group.throughput(Throughput::Elements(1));

    group.bench_function("can_call_member", |b| {
        b.iter(|| authority.can_call(black_box(member), TARGET, selector))
    });
    group.bench_function("can_call_stranger", |b| {
        b.iter(|| authority.can_call(black_box(stranger), TARGET, selector))
    });
    group.bench_function("probe_through_host", |b| {
        b.iter(|| can_call_with_delay(&host, AUTHORITY, black_box(member), TARGET, selector))
    });

    group.finish();
}

fn codec_benchmark(c: &mut Criterion) {
    let call = AuthorityCall::Schedule {
        target: TARGET,
        data: vec![0xab; 132],
        when: 0,
    };
    let encoded = call.encode();

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("encode_schedule", |b| b.iter(|| black_box(&call).encode()));
    group.bench_function("decode_schedule", |b| {
        b.iter(|| AuthorityCall::decode(black_box(&encoded)).expect("decode"))
    });

    group.finish();
}

criterion_group!(benches, decision_benchmark, codec_benchmark);
criterion_main!(benches);
