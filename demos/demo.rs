use std::sync::Arc;
use std::time::Duration;

use cachevisor::{Cache, Config, LogWriter, Simulated};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cfg = Config::default();
    cfg.refresh_interval = Duration::from_secs(1);
    cfg.grace = Duration::from_secs(5);

    // 10..=200ms simulated latency, 10% recoverable failures, 2% crashes.
    let producer = Arc::new(Simulated::new(10..=200, 0.10, 0.02));
    let cache: Arc<Cache<String>> = Cache::start(cfg, producer, vec![Arc::new(LogWriter)])?;

    // Feed three stations every 700ms; stop feeding "OSL" after a while so
    // its entry expires and its worker retires.
    let feeder = {
        let cache = cache.clone();
        tokio::spawn(async move {
            let mut round: u64 = 0;
            loop {
                round += 1;
                for station in ["HEL", "NYC", "OSL"] {
                    if station == "OSL" && round > 6 {
                        continue;
                    }
                    let report = format!("{station} report #{round}");
                    if let Err(e) = cache.store_ttl(station, report, 4.0).await {
                        eprintln!("store {station}: {e}");
                    }
                }
                tokio::time::sleep(Duration::from_millis(700)).await;
            }
        })
    };

    let reader = {
        let cache = cache.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(2)).await;
                for station in ["HEL", "NYC", "OSL"] {
                    match cache.get(station) {
                        Ok(report) => println!("  get {station} -> {report}"),
                        Err(e) => println!("  get {station} -> {e}"),
                    }
                }
            }
        })
    };

    println!("running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    feeder.abort();
    reader.abort();
    match cache.shutdown().await {
        Ok(()) => println!("cache stopped gracefully"),
        Err(e) => println!("cache stopped with error: {e}"),
    }
    Ok(())
}
