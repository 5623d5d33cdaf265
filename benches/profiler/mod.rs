// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;

use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr + Ord>(name: &str, default: T, min: T, max: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

/// Criterion with a flamegraph profiler; tune with `PLOTNET_BENCH_*` variables.
pub fn criterion() -> Criterion {
    let frequency = env_or("PLOTNET_BENCH_PROFILE_FREQ", 99i32, 1, 1000);
    let sample_size = env_or("PLOTNET_BENCH_SAMPLES", 50usize, 10, 200);
    let warmup = env_or("PLOTNET_BENCH_WARMUP_SECS", 2u64, 1, 60);
    let measurement = env_or("PLOTNET_BENCH_MEASURE_SECS", 5u64, 1, 120);

    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_secs(warmup))
        .measurement_time(Duration::from_secs(measurement))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
