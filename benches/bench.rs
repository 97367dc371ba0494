// Criterion benchmarks for RentRobo Algo

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use rentrobo_algo::core::{min_max_scale, EngineOptions, Recommender};
use rentrobo_algo::models::{Campus, CampusDistances, Listing, PreferenceWeights, Query, SafetyMode};
use rentrobo_algo::services::DatasetLoader;

fn create_listing(id: usize) -> Listing {
    let i = id as f64;
    let mut transit_distance = CampusDistances::default();
    for (n, campus) in Campus::ALL.into_iter().enumerate() {
        transit_distance.set(campus, Some(150.0 + (i * 53.0 + n as f64 * 911.0) % 9000.0));
    }

    Listing {
        area_name: format!("Area {}", id % 12),
        address: format!("{} Commonwealth Ave", id),
        rent: 1500.0 + (i * 37.0) % 3500.0,
        bed: 1.0 + (id % 3) as f64,
        bath: 1.0 + (id % 2) as f64,
        violent_crime_rate: Some(0.02 + (i * 0.013) % 0.6),
        overall_crime_rate: Some(0.3 + (i * 0.071) % 3.5),
        transit_distance,
        driving_distance: CampusDistances::default(),
    }
}

fn create_query(safety: SafetyMode) -> Query {
    Query {
        current_address: "165 Hemenway St".to_string(),
        campus: "Boston University".to_string(),
        rent: 2950.0,
        bed: 2,
        bath: 1,
        transit_distance: Some(2400.0),
        violent_crime_rate: Some(0.2866),
        overall_crime_rate: Some(1.86),
        weights: PreferenceWeights { rent: 1.0, location: 1.5, safety },
    }
}

fn bench_min_max_scale(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000).map(|i| 500.0 + (i as f64 * 17.0) % 4000.0).collect();

    c.bench_function("min_max_scale_10000", |b| {
        b.iter(|| min_max_scale(black_box("rent per room"), black_box(&values), black_box(1180.0)));
    });
}

fn bench_score_and_rank(c: &mut Criterion) {
    let recommender = Recommender::with_default_options();
    let query = create_query(SafetyMode::SoftPenalty);

    let mut group = c.benchmark_group("score_and_rank");

    for listing_count in [100, 1000, 5000, 20000].iter() {
        let dataset: Vec<Listing> = (0..*listing_count).map(create_listing).collect();

        group.bench_with_input(
            BenchmarkId::new("soft_penalty", listing_count),
            listing_count,
            |b, _| {
                b.iter(|| recommender.score_and_rank(black_box(&dataset), black_box(&query)));
            },
        );
    }

    group.finish();
}

fn bench_parallel_threshold(c: &mut Criterion) {
    let dataset: Vec<Listing> = (0..20_000).map(create_listing).collect();
    let query = create_query(SafetyMode::HardPenalty);

    let sequential = Recommender::new(EngineOptions { parallel_threshold: usize::MAX });
    let parallel = Recommender::new(EngineOptions { parallel_threshold: 1 });

    let mut group = c.benchmark_group("scoring_mode_20000_listings");
    group.bench_function("sequential", |b| {
        b.iter(|| sequential.score_and_rank(black_box(&dataset), black_box(&query)));
    });
    group.bench_function("parallel", |b| {
        b.iter(|| parallel.score_and_rank(black_box(&dataset), black_box(&query)));
    });
    group.finish();
}

fn bench_dataset_loading(c: &mut Criterion) {
    let mut csv = String::from(
        "Area Name,Address,Rent,Bed,Bath,Violent CrimeRate,Overall CrimeRate,\
Northeastern University_transit_distance,Boston University_transit_distance,Boston College_transit_distance,\
Northeastern University_driving,Boston University_driving,Boston College_driving",
    );
    for listing in (0..5000).map(create_listing) {
        let transit = listing.transit_distance;
        csv.push_str(&format!(
            "\n{},{},{},{},{},{},{},{},{},{},{},{},{}",
            listing.area_name,
            listing.address,
            listing.rent,
            listing.bed,
            listing.bath,
            listing.violent_crime_rate.unwrap_or_default(),
            listing.overall_crime_rate.unwrap_or_default(),
            transit.northeastern_university.unwrap_or_default(),
            transit.boston_university.unwrap_or_default(),
            transit.boston_college.unwrap_or_default(),
            transit.northeastern_university.unwrap_or_default() * 1.3,
            transit.boston_university.unwrap_or_default() * 1.3,
            transit.boston_college.unwrap_or_default() * 1.3,
        ));
    }
    let loader = DatasetLoader::default();

    c.bench_function("load_reader_5000_rows", |b| {
        b.iter(|| loader.load_reader(black_box(csv.as_bytes())));
    });
}

criterion_group!(
    benches,
    bench_min_max_scale,
    bench_score_and_rank,
    bench_parallel_threshold,
    bench_dataset_loading
);

criterion_main!(benches);
