use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use tunectl::discovery;
use tunectl::helpers::now_iso;

use crate::argsets::WatchArgs;

use super::{open_bus, TICK_MS};

/// Stream live readings for a fixed duration. Updates are pushed from
/// the service on a background thread and drained here, so tree state
/// is only ever touched from this thread.
pub fn watch(args: WatchArgs) -> Result<()> {
    let bus = open_bus();
    let mut tree = discovery::build(&bus)?;

    let stop = Arc::new(AtomicBool::new(false));
    let ticker = {
        let bus = bus.clone();
        let stop = Arc::clone(&stop);
        let period = Duration::from_millis(*TICK_MS);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                bus.tick();
                thread::sleep(period);
            }
        })
    };

    log::info!("Watching live values for {}s", args.seconds);
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(*TICK_MS));
        for proxy in tree.dynamic_proxies_mut() {
            if proxy.poll() {
                let text = proxy.latest_text().unwrap_or_default();
                println!("{} {} = {text}", now_iso(), proxy.path());
            }
        }
    }

    stop.store(true, Ordering::Relaxed);
    let _ = ticker.join();
    Ok(())
}
