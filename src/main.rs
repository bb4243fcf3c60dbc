#[tokio::main]
async fn main() {
    if let Err(e) = triage_lib::run().await {
        eprintln!("patient-triage: {e}");
        std::process::exit(1);
    }
}
