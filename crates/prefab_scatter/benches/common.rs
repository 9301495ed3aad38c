use std::time::Duration;

use criterion::{Criterion, Throughput};
use prefab_scatter::prelude::ItemSpec;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

/// Throughput in placements (or samples); never zero.
pub fn placements_throughput(placements: usize) -> Throughput {
    Throughput::Elements(placements.max(1) as u64)
}

#[allow(dead_code)]
pub fn bench_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Two variants with a gap share, so a third of the slots stay empty.
#[allow(dead_code)]
pub fn forest_palette() -> Vec<ItemSpec> {
    vec![
        ItemSpec::new("tree", 3.0),
        ItemSpec::new("rock", 1.0),
        ItemSpec::gap(2.0),
    ]
}
