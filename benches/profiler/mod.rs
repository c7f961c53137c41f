// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// `KINDRED_BENCH_<name>` parsed as `T`, else `default`.
fn knob<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(format!("KINDRED_BENCH_{name}"))
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Criterion tuned from the environment, writing a flamegraph per benchmark.
pub fn criterion() -> Criterion {
    let frequency = knob::<i32>("PROFILE_FREQ", 100).clamp(1, 1000);
    let samples = knob::<usize>("SAMPLES", 50).clamp(10, 200);
    let warm_up = knob::<u64>("WARMUP_SECS", 2).clamp(1, 60);
    let measurement = knob::<u64>("MEASUREMENT_SECS", 5).clamp(1, 120);

    Criterion::default()
        .sample_size(samples)
        .warm_up_time(Duration::from_secs(warm_up))
        .measurement_time(Duration::from_secs(measurement))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
