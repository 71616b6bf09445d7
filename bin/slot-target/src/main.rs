use std::sync::atomic::{AtomicI32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use stockpile::slots::SlotTable;

/// Holds a slot table in its own memory so stockpile has something to attach to.
///
/// The locator matches on the executable name, so copy or link this binary as
/// `Game.exe` before running it.
#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Args {
    /// Seconds between value reports
    #[arg(short, long, default_value_t = 30)]
    report_every: u64,

    /// Exit after this many seconds instead of running until killed
    #[arg(short, long)]
    lifetime: Option<u64>,
}

fn main() {
    let args = Args::parse();
    let table = SlotTable::cultures();

    let slots: Vec<AtomicI32> = (0..table.len()).map(|_| AtomicI32::new(0)).collect();
    slots[0].store(400, Ordering::SeqCst);
    slots[7].store(500, Ordering::SeqCst);

    println!("pid {}", std::process::id());
    println!("storage at {:#x}", slots.as_ptr() as usize);

    let started = Instant::now();
    let report_every = Duration::from_secs(args.report_every);
    loop {
        thread::sleep(report_every);
        report(&table, &slots);

        if args.lifetime.is_some_and(|l| started.elapsed() >= Duration::from_secs(l)) {
            println!("Exiting");
            return;
        }
    }
}

fn report(table: &SlotTable, slots: &[AtomicI32]) {
    let values: Vec<String> = table.names().iter()
        .zip(slots)
        .map(|(name, slot)| format!("{}:{}", name, slot.load(Ordering::SeqCst)))
        .collect();

    println!("{}", values.join(" "));
}
