use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qh_aggregate::aggregate;
use qh_codec::{render_interchange, TableBuilder};
use qh_core::{Direction, Observation, ObservedValue, TableConfig};

fn observations() -> Vec<Observation> {
    (0..10_000u64)
        .map(|i| {
            let direction = if i % 2 == 0 { Direction::Request } else { Direction::Response };
            let value = if i % 5 == 0 {
                ObservedValue::Anonymized
            } else {
                ObservedValue::Literal(format!("v{}", i % 40))
            };
            Observation::new(direction, &format!("X-Header-{}", i % 150), value, i % 7 + 1)
        })
        .collect()
}

fn pipeline_performance(c: &mut Criterion) {
    let records = observations();
    c.bench_function("aggregate_10k_records", |b| {
        b.iter(|| aggregate(black_box(&records)))
    });

    let mut sheet = aggregate(&records).expect("counts fit");
    for direction in [&mut sheet.request_complete, &mut sheet.response_complete] {
        direction.truncate(100);
    }
    sheet.request_names.retain(|c| !sheet.request_complete.iter().any(|p| p.name == c.name));
    sheet.response_names.retain(|c| !sheet.response_complete.iter().any(|p| p.name == c.name));
    let builder = TableBuilder::new(TableConfig::default()).expect("default config is valid");

    c.bench_function("build_static_table", |b| {
        b.iter(|| builder.build(black_box(&sheet)).expect("table fits"))
    });

    let table = builder.build(&sheet).expect("table fits");
    c.bench_function("render_interchange", |b| {
        b.iter(|| render_interchange(black_box(&table)).expect("serializes"))
    });
}

criterion_group!(benches, pipeline_performance);
criterion_main!(benches);
