use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use bot_kitchen::config::KitchenConfig;
use bot_kitchen::node::Node;
use bot_kitchen::scheduler::{Kitchen, KitchenSnapshot, OrderView, DEFAULT_MAX_BOTS};
use bot_kitchen::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "bot-kitchen")]
#[command(version)]
#[command(about = "Order kitchen with VIP priority and a resizable pool of cooking bots")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Open the kitchen and tick it until interrupted
    Serve(ServeArgs),

    /// Run a fixed number of ticks offline and print the result
    Simulate(SimulateArgs),
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Number of bots when the kitchen opens
    #[arg(long, default_value = "0")]
    bots: usize,

    /// Milliseconds between ticks
    #[arg(long, default_value = "1000")]
    tick_ms: u64,

    /// Upper bound on the number of bots, including resizes from the dashboard
    #[arg(long, default_value_t = DEFAULT_MAX_BOTS)]
    max_bots: usize,

    /// Port for the JSON dashboard (optional)
    #[arg(long)]
    dashboard_port: Option<u16>,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Number of bots
    #[arg(long, default_value = "1")]
    bots: usize,

    /// Normal orders created before the first tick
    #[arg(long, default_value = "0")]
    normal: usize,

    /// VIP orders created after the normal ones
    #[arg(long, default_value = "0")]
    vip: usize,

    /// Ticks to run
    #[arg(long, default_value = "10")]
    ticks: u64,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn print_orders(title: &str, orders: &[OrderView]) {
    println!("{} ({})", title, orders.len());
    println!("{}", "-".repeat(60));
    if orders.is_empty() {
        println!("  (none)");
        println!();
        return;
    }
    println!("{:<8} {:<6} {:<12} {:<9} WORKER", "ORDER", "VIP", "STATUS", "PROGRESS");
    for order in orders {
        let vip = if order.is_vip { "yes" } else { "-" };
        let worker = order
            .worker_id
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<6} {:<12} {:<9} {}",
            order.id.to_string(),
            vip,
            order.status.to_string(),
            format!("{}%", order.progress),
            worker
        );
    }
    println!();
}

fn print_snapshot(snapshot: &KitchenSnapshot) {
    let stats = &snapshot.stats;
    println!("Kitchen after tick {}", stats.tick);
    println!("{}", "=".repeat(60));
    println!("Bots: {} ({} idle)", stats.bots, stats.idle_bots);
    println!();
    print_orders("Pending", &snapshot.pending);
    print_orders("Processing", &snapshot.processing);
    print_orders("Completed", &snapshot.completed);
}

// =============================================================================
// Commands
// =============================================================================

async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut config = KitchenConfig::default()
        .with_tick_interval_ms(args.tick_ms)
        .with_initial_bots(args.bots)
        .with_max_bots(args.max_bots);
    if let Some(port) = args.dashboard_port {
        let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
        config = config.with_dashboard(addr);
    }

    tracing::info!(
        bots = config.initial_bots,
        tick_interval_ms = config.tick_interval_ms,
        dashboard_addr = ?config.dashboard.as_ref().map(|d| d.listen_addr),
        "Starting bot-kitchen"
    );

    let shutdown = install_shutdown_handler();
    let node = Node::new(config)?;
    node.run(shutdown).await?;
    Ok(())
}

fn run_simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut kitchen = Kitchen::with_bots(args.bots)?;
    for _ in 0..args.normal {
        kitchen.create_order(false);
    }
    for _ in 0..args.vip {
        kitchen.create_order(true);
    }
    for _ in 0..args.ticks {
        kitchen.tick();
    }

    let snapshot = kitchen.snapshot();
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Table => print_snapshot(&snapshot),
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Serve(serve_args) => run_serve(serve_args).await?,
        Commands::Simulate(simulate_args) => run_simulate(simulate_args)?,
    }

    Ok(())
}
