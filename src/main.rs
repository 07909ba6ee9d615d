use distributed_pagerank::broker::client::HttpBroker;
use distributed_pagerank::broker::handlers;
use distributed_pagerank::broker::state::BrokerCore;
use distributed_pagerank::lifecycle::coordinator::Coordinator;
use distributed_pagerank::lifecycle::types::RunConfig;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "broker" => run_broker(&args[2..]).await,
        "worker" => run_worker(&args[2..]).await,
        other => {
            eprintln!("Unknown mode: {}", other);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} broker --bind <addr:port> --peers <N>", program);
    eprintln!(
        "       {} worker --broker <url> --dataset <path> --partition <path> \
         [--reverse <path>] [--rounds <n>]",
        program
    );
    eprintln!("Example: {} broker --bind 127.0.0.1:8000 --peers 4", program);
    eprintln!(
        "Example: {} worker --broker http://127.0.0.1:8000 --dataset graph.txt \
         --partition graph_partition_4.txt --rounds 10",
        program
    );
}

/// Runs the rendezvous service until interrupted.
async fn run_broker(args: &[String]) -> anyhow::Result<()> {
    let mut bind_addr: Option<SocketAddr> = None;
    let mut peers: Option<usize> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--peers" => {
                peers = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.expect("--bind is required");
    let peers = peers.expect("--peers is required");

    tracing::info!("Starting broker on {} for {} peers", bind_addr, peers);

    let core = BrokerCore::new(peers);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    handlers::serve(core, listener).await
}

/// Runs one worker instance end to end and prints its report as JSON.
async fn run_worker(args: &[String]) -> anyhow::Result<()> {
    let mut broker_url: Option<String> = None;
    let mut dataset: Option<String> = None;
    let mut reverse: Option<String> = None;
    let mut partition: Option<String> = None;
    let mut rounds: u32 = 1;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--broker" => {
                broker_url = Some(args[i + 1].clone());
                i += 2;
            }
            "--dataset" => {
                dataset = Some(args[i + 1].clone());
                i += 2;
            }
            "--reverse" => {
                reverse = Some(args[i + 1].clone());
                i += 2;
            }
            "--partition" => {
                partition = Some(args[i + 1].clone());
                i += 2;
            }
            "--rounds" => {
                rounds = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let broker_url = broker_url.expect("--broker is required");
    let dataset = dataset.expect("--dataset is required");
    let partition = partition.expect("--partition is required");

    tracing::info!("Loading datasets");
    let adjacency = tokio::fs::read_to_string(&dataset).await?;
    let partition = tokio::fs::read_to_string(&partition).await?;
    let reverse = match reverse {
        Some(path) => Some(tokio::fs::read_to_string(&path).await?),
        None => None,
    };

    let coordinator = Coordinator::new(Arc::new(HttpBroker::new(&broker_url)));
    let report = coordinator
        .execute(RunConfig {
            rounds,
            adjacency,
            reverse,
            partition,
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
