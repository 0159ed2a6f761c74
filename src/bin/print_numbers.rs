//! Queues the number printer several times on a worker pool.

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use work_pool::printer::Printer;
use work_pool::{default_worker_count, PoolConfig, ShutdownMode, WorkPool};

#[derive(Parser, Debug)]
#[command(name = "print_numbers", about = "Queue a number printer on a worker pool")]
struct Args {
    /// Worker threads in the pool
    #[arg(long, default_value_t = default_worker_count())]
    workers: usize,

    /// How many times the printer is queued
    #[arg(long, default_value_t = 10)]
    tasks: usize,

    /// Numbers printed per task
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Pause after each number, in milliseconds
    #[arg(long, default_value_t = 200)]
    delay_ms: u64,

    /// Do not wait for Enter before shutting down
    #[arg(long)]
    no_wait: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    println!("Main thread started. ThreadID = {:?}", thread::current().id());

    let config = PoolConfig::default().with_thread_name_prefix("printer");
    let mut pool = WorkPool::with_config(config);
    pool.start(args.workers)?;
    println!("ThreadPool Count: {}", pool.worker_count());
    println!();

    let printer = Printer::new(args.count, Duration::from_millis(args.delay_ms));
    for _ in 0..args.tasks {
        pool.submit(
            |printer: Printer| printer.print_numbers(&mut io::stdout()),
            printer,
        )?;
    }
    println!("All tasks queued");

    if !args.no_wait {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
    }

    let report = pool.shutdown(ShutdownMode::Drain)?;
    log::info!(
        "Executed {} task(s), discarded {}",
        report.executed,
        report.discarded
    );
    Ok(())
}
