//! dfsctl — operator CLI for the coordinator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use libdfs::DfsClient;

mod cmd;

const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:5000";

fn print_usage() {
    println!("Usage: dfsctl [--coordinator <url>] <command>");
    println!();
    println!("  status                    File/chunk summary");
    println!("  list                      Every file's chunk-to-holder map");
    println!("  upload <path>             Split and upload a file");
    println!("  download <name> <out>     Reassemble a file to <out>");
    println!("  delete <name>             Delete a file from every holder");
    println!("  verify <name>             Per-chunk replica health");
    println!();
    println!(
        "Options:\n  --coordinator <url>       Coordinator base URL (default: {})",
        DEFAULT_COORDINATOR_URL
    );
    println!();
    println!("Examples:");
    println!("  dfsctl upload report.pdf");
    println!("  dfsctl download report.pdf ./out.pdf");
    println!("  dfsctl verify report.pdf");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut coordinator_url = DEFAULT_COORDINATOR_URL.to_string();
    let mut remaining: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--coordinator" {
            i += 1;
            coordinator_url = args.get(i).context("--coordinator requires a value")?.clone();
        } else {
            remaining.push(args[i].clone());
        }
        i += 1;
    }

    let remaining_refs: Vec<&str> = remaining.iter().map(|s| s.as_str()).collect();
    let client = DfsClient::new(coordinator_url);

    match remaining_refs.as_slice() {
        ["status"] | [] => cmd::status::run(&client).await,
        ["list"] => cmd::list::run(&client).await,
        ["upload", path] => cmd::upload::run(&client, &PathBuf::from(path)).await,
        ["download", filename, out] => cmd::download::run(&client, filename, &PathBuf::from(out)).await,
        ["delete", filename] => cmd::delete::run(&client, filename).await,
        ["verify", filename] => cmd::verify::run(&client, filename).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
