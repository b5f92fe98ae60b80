use clap::Parser;

fn default_workers() -> usize {
    num_cpus::get().clamp(1, 8)
}

/// Command-line arguments for the simulation scenarios.
#[derive(Debug, Parser)]
#[command(name = "conflux-sim", about = "Worker pool and stream merge demos")]
pub struct CliArgs {
    /// Worker tasks in the pool.
    #[arg(long, default_value_t = default_workers())]
    pub workers: usize,

    /// Jobs submitted to the pool.
    #[arg(long, default_value_t = 5)]
    pub jobs: u64,

    /// Independent producers feeding the merge.
    #[arg(long, default_value_t = 2)]
    pub producers: u64,

    /// Items emitted by each producer.
    #[arg(long, default_value_t = 5)]
    pub items_per_producer: u64,

    /// Bounded capacity for the job and result queues.
    #[arg(long, default_value_t = 16)]
    pub queue_capacity: usize,

    /// Simulated per-job work duration in milliseconds (jitter is added on
    /// top so the interleaving across workers is visible).
    #[arg(long, default_value_t = 100)]
    pub work_ms: u64,
}
