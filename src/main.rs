#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = skillexam_results::run().await {
        eprintln!("skillexam-results fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
