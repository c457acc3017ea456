use incremental_svd_rom_rs::demos::streaming_rom;
use incremental_svd_rom_rs::solvers::Variant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let final_ranks = streaming_rom::run(
        /* d_global */ 40,
        /* num_ranks */ 4,
        /* num_steps */ 200,
        /* max_increments_per_interval */ 50,
        /* epsilon */ 1e-8,
        Variant::FastUpdate,
        /* seed */ 42,
    )?;

    for (rank, r) in final_ranks.iter().enumerate() {
        println!("rank {rank}: final basis rank = {r}");
    }
    Ok(())
}
