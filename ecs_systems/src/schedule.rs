use crate::dispatch::{run_job, Job};
use crate::state::SystemState;
use ecs_core::{Handle, World};

/// Splits every row bound to `state` into at most `chunks` contiguous `Job`
/// descriptors, each possibly spanning several adjacent tables in
/// `state.tables` order. This is the scheduler-side half of the "job run"
/// contract in spec.md §4.6/§5: the engine itself does not own a worker
/// pool, but it can hand a caller-supplied pool a partition to run
/// concurrently, one job per thread, with the guarantee that every row is
/// covered exactly once (§8 property 6) and no two jobs overlap (§5).
///
/// Returns fewer than `chunks` jobs if there are not enough rows to split
/// that finely; returns no jobs if `state` has no bound tables or no rows.
pub fn partition_jobs(world: &World, state: &SystemState, chunks: usize) -> Vec<Job> {
    let chunks = chunks.max(1);
    let row_counts: Vec<usize> = state
        .tables
        .iter()
        .map(|d| world.table(d.table).row_count())
        .collect();
    let total: usize = row_counts.iter().sum();
    if total == 0 {
        return Vec::new();
    }

    let job_count = chunks.min(total);
    let base = total / job_count;
    let extra = total % job_count;

    let mut jobs = Vec::with_capacity(job_count);
    let mut table_index = 0usize;
    let mut local_start = 0usize;

    for i in 0..job_count {
        // Earlier jobs absorb the remainder so every row is still covered
        // by exactly one job even when `total` does not divide evenly.
        let mut remaining = base + usize::from(i < extra);
        let job_start_table = table_index;
        let job_start_local = local_start;

        while remaining > 0 {
            let available = row_counts[table_index] - local_start;
            let take = remaining.min(available);
            remaining -= take;
            local_start += take;

            if local_start == row_counts[table_index] && remaining > 0 {
                table_index += 1;
                local_start = 0;
            }
        }

        jobs.push(Job {
            table_index: job_start_table,
            start_index: job_start_local,
            row_count: base + usize::from(i < extra),
        });

        // If this job ended exactly on a table boundary, advance the cursor
        // so the next job starts at the next table rather than re-reading
        // an empty remainder of the one just finished.
        if local_start == row_counts.get(table_index).copied().unwrap_or(0) {
            table_index += 1;
            local_start = 0;
        }
    }

    jobs
}

/// Runs `state` across a `rayon` thread pool, one job per chunk, using
/// [`partition_jobs`] to build a disjoint covering of every bound row. This
/// is the optional `par-iter` path mirroring the base workspace's own
/// rayon-backed parallel dispatch.
#[cfg(feature = "par-iter")]
pub fn run_system_parallel(world: &World, system: Handle, state: &SystemState, chunks: usize) {
    use rayon::prelude::*;

    if !state.enabled {
        return;
    }

    let jobs = partition_jobs(world, state, chunks);
    jobs.par_iter()
        .for_each(|job| run_job(world, system, state, job));
}
