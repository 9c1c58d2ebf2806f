mod cli;

#[tokio::main]
async fn main() {
    // Parse CLI, set up logging and dispatch; exit with the mapped code.
    let code = cli::run_from_args().await;
    std::process::exit(code);
}
