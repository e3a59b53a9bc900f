use core::hint::black_box;
use criterion::{Criterion, criterion_group, criterion_main};
use eta::{
    CacheConfig, EtaCache, EtaCalculator, GeoPoint, NearestVehicleLookup, Result, VehicleFix,
    distance_km,
};
use tokio::runtime::Builder;

struct ThreeFixes([VehicleFix; 3]);

impl NearestVehicleLookup for ThreeFixes {
    async fn nearest(&self, _point: GeoPoint, k: usize) -> Result<Vec<VehicleFix>> {
        Ok(self.0.iter().take(k).copied().collect())
    }
}

fn point(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint::new(latitude, longitude).unwrap()
}

fn bench_distance(c: &mut Criterion) {
    let a = point(55.751244, 37.618423);
    let b = point(55.7601, 37.6173);
    c.bench_function("distance_km", |bencher| {
        bencher.iter(|| distance_km(black_box(a), black_box(b)));
    });
}

fn bench_cache(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let fixes = ThreeFixes([
        point(55.7601, 37.6173).into(),
        point(55.7512, 37.6290).into(),
        point(55.7445, 37.6050).into(),
    ]);
    let cache = EtaCache::new(EtaCalculator::new(fixes), CacheConfig::default());
    let target = point(55.751244, 37.618423);

    let mut group = c.benchmark_group("eta_cache");
    group.bench_function("hit", |bencher| {
        bencher
            .to_async(&rt)
            .iter(|| async { cache.get(black_box(target)).await.unwrap() });
    });
    group.bench_function("miss", |bencher| {
        bencher.to_async(&rt).iter(|| async {
            cache.clear();
            cache.get(black_box(target)).await.unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_distance, bench_cache);
criterion_main!(benches);
