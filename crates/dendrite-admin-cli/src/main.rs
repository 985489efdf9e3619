//! Binary entrypoint for the `dendrite-admin` CLI.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = dendrite_admin_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
