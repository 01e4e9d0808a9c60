/// Thread pool sizing for multi-file runs.
/// Each file is extracted into its own graph, so workers share no graph state.

use anyhow::Result;
use tracing::info;

/// Initialize the global rayon thread pool. Without an explicit count, half
/// the cores are used, minimum 1 worker.
pub fn init_thread_pool(threads: Option<usize>) -> Result<usize> {
    let cores = num_cpus::get();
    let workers = threads.unwrap_or(cores / 2).max(1);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(workers, cores, "initialized thread pool");
    Ok(workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_thread_pool_once() {
        // The global pool can be built only once per process
        let first = init_thread_pool(Some(2));
        if let Ok(workers) = first {
            assert_eq!(workers, 2);
        }
        assert!(init_thread_pool(Some(2)).is_err());
    }
}
