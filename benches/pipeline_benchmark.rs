use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use caredash::prelude::*;
use chrono::NaiveDate;
use std::sync::OnceLock;

const GENDERS: [&str; 2] = ["Male", "Female"];
const CONDITIONS: [&str; 6] = ["Arthritis", "Asthma", "Cancer", "Diabetes", "Hypertension", "Obesity"];
const PROVIDERS: [&str; 5] = ["Aetna", "Blue Cross", "Cigna", "Medicare", "UnitedHealthcare"];

static DATASET: OnceLock<Dataset> = OnceLock::new();

// Deterministic synthetic table roughly the size of the public dataset
fn get_dataset() -> &'static Dataset {
    DATASET.get_or_init(|| {
        let start = NaiveDate::from_ymd_opt(2019, 5, 1).expect("valid date");
        let records = (0..55_000u64)
            .map(|i| {
                let date = start + chrono::Days::new(i % 1_800);
                Record {
                    gender: GENDERS[(i % 2) as usize].to_string(),
                    age: Some(18 + (i * 7 % 72) as u32),
                    medical_condition: CONDITIONS[(i * 5 % 6) as usize].to_string(),
                    insurance_provider: PROVIDERS[(i * 3 % 5) as usize].to_string(),
                    billing_amount: (i % 97 != 0).then(|| (i * 7_919 % 50_000) as f64 + 0.25),
                    date_of_admission: date,
                    year_month: YearMonth::from_date(date),
                }
            })
            .collect();
        Dataset::from_records(records)
    })
}

fn benchmark_filter(c: &mut Criterion) {
    let dataset = get_dataset();
    let mut group = c.benchmark_group("filter");

    group.bench_function("unfiltered", |b| {
        b.iter(|| filter(dataset.records(), None, None, None).len())
    });

    for ceiling in [5_000.0, 25_000.0, 50_000.0] {
        group.bench_with_input(BenchmarkId::new("gender_and_ceiling", ceiling as u64), &ceiling, |b, &c| {
            b.iter(|| {
                dataset
                    .query()
                    .gender(black_box("Female"))
                    .billing_ceiling(black_box(c))
                    .count()
            })
        });
    }

    group.finish();
}

fn benchmark_aggregators(c: &mut Criterion) {
    let dataset = get_dataset();
    let view = dataset.view();
    let mut group = c.benchmark_group("aggregate");

    group.bench_function("age", |b| b.iter(|| aggregate_age(black_box(&view))));
    group.bench_function("conditions", |b| b.iter(|| aggregate_conditions(black_box(&view))));
    group.bench_function("insurance", |b| b.iter(|| aggregate_insurance(black_box(&view))));
    group.bench_function("billing", |b| b.iter(|| aggregate_billing(black_box(&view), 25_000.0)));
    group.bench_function("trend", |b| b.iter(|| aggregate_trend(black_box(&view), ChartType::Line)));

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let dataset = get_dataset();
    let dashboard = Dashboard::new(dataset);

    let initial = ControlState::initial(dataset);
    let filtered = initial
        .clone()
        .with_gender(Some("Male"))
        .with_condition(Some("Cancer"))
        .with_chart_type(ChartType::Bar);

    c.bench_function("render_initial", |b| b.iter(|| dashboard.render(black_box(&initial))));
    c.bench_function("render_filtered", |b| b.iter(|| dashboard.render(black_box(&filtered))));
}

criterion_group!(benches, benchmark_filter, benchmark_aggregators, benchmark_render);
criterion_main!(benches);
