use criterion::{Criterion, criterion_group, criterion_main};
use spooky_records::*;
use std::hint::black_box;

// ─── Test Data ──────────────────────────────────────────────────────────────

/// `User(id: str, name: str, age: int, score: float = 0.0, tags: list = <factory>)`
fn user_decl() -> Declaration {
    Declaration::new("User")
        .field("id", "str")
        .field("name", "str")
        .field("age", "int")
        .field_with("score", "float", 0.0)
        .field_with("tags", "list", FieldSpec::new().default_factory(|| Value::list(vec![])))
}

fn user_args() -> Args {
    Args::positional(["user:abc123", "Alice"]).arg(28).kwarg("score", 99.5)
}

fn make_type(options: RecordOptions) -> RecordTypeRef {
    define(user_decl(), options).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 1: Defining Types
// ═══════════════════════════════════════════════════════════════════════════

fn bench_defining_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("defining_types");

    group.bench_function("define (dynamic)", |b| {
        b.iter(|| black_box(define(user_decl(), RecordOptions::default()).unwrap()))
    });

    group.bench_function("define (slotted, frozen)", |b| {
        let options = RecordOptions {
            frozen: true,
            slots: true,
            ..RecordOptions::default()
        };
        b.iter(|| black_box(define(user_decl(), options).unwrap()))
    });

    let base = make_type(RecordOptions::default());
    group.bench_function("define (subclass)", |b| {
        b.iter(|| {
            black_box(
                define(
                    Declaration::new("Admin").base(&base).field_with("level", "int", 1),
                    RecordOptions::default(),
                )
                .unwrap(),
            )
        })
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 2: Construction
// ═══════════════════════════════════════════════════════════════════════════

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    group.sample_size(500);

    let dynamic = make_type(RecordOptions::default());
    let slotted = make_type(RecordOptions::slotted());

    group.bench_function("instantiate (dynamic)", |b| {
        b.iter(|| black_box(RecordType::instantiate(&dynamic, black_box(user_args())).unwrap()))
    });

    group.bench_function("instantiate (slotted)", |b| {
        b.iter(|| black_box(RecordType::instantiate(&slotted, black_box(user_args())).unwrap()))
    });

    let user = RecordType::instantiate(&dynamic, user_args()).unwrap();
    group.bench_function("replace", |b| {
        b.iter(|| black_box(replace(&user, [("age", 29)]).unwrap()))
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 3: Synthesized Behaviors
// ═══════════════════════════════════════════════════════════════════════════

fn bench_behaviors(c: &mut Criterion) {
    let mut group = c.benchmark_group("behaviors");
    group.sample_size(500);

    let ty = make_type(RecordOptions {
        frozen: true,
        order: true,
        ..RecordOptions::default()
    });
    let a = RecordType::instantiate(&ty, user_args()).unwrap();
    let b_inst = RecordType::instantiate(&ty, user_args().kwarg("tags", Value::list(vec![]))).unwrap();
    let other = Value::Record(b_inst);

    group.bench_function("repr", |b| b.iter(|| black_box(a.repr())));
    group.bench_function("equals", |b| b.iter(|| black_box(a.equals(black_box(&other)))));
    group.bench_function("lt", |b| b.iter(|| black_box(a.lt(black_box(&other)))));
    group.bench_function("get", |b| b.iter(|| black_box(a.get(black_box("age")))));

    let point = define(
        Declaration::new("Point").field("x", "int").field_with("y", "int", 0),
        RecordOptions::frozen(),
    )
    .unwrap();
    let p = RecordType::instantiate(&point, Args::positional([3, 4])).unwrap();
    group.bench_function("hash", |b| b.iter(|| black_box(p.hash())));

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 4: Conversion
// ═══════════════════════════════════════════════════════════════════════════

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    let ty = make_type(RecordOptions::frozen());
    let user = RecordType::instantiate(&ty, user_args()).unwrap();
    let value = Value::Record(user.clone());
    let bytes = snapshot::encode(&user).unwrap();

    group.bench_function("asdict", |b| b.iter(|| black_box(asdict(black_box(&value)).unwrap())));
    group.bench_function("astuple", |b| b.iter(|| black_box(astuple(black_box(&value)).unwrap())));
    group.bench_function("snapshot::encode", |b| {
        b.iter(|| black_box(snapshot::encode(black_box(&user)).unwrap()))
    });
    group.bench_function("snapshot::restore", |b| {
        b.iter(|| black_box(snapshot::restore(&ty, black_box(&bytes)).unwrap()))
    });

    group.finish();
}

// ─── Criterion Main ─────────────────────────────────────────────────────────

criterion_group!(
    benches,
    bench_defining_types,
    bench_construction,
    bench_behaviors,
    bench_conversion,
);
criterion_main!(benches);
