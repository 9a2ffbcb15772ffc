//! # Example: basic_controller
//!
//! One controller reconciling a handful of keys:
//! - `default/web-tls` succeeds on the first try;
//! - `default/api-tls` conflicts twice before succeeding (logged at info);
//! - `default/broken` always fails (logged at error, backoff keeps growing).
//!
//! A readiness flag is flipped after 300ms, a bootstrap task seeds the queue and a
//! periodic resync re-adds every key each second. The controller stops after 5s.
//!
//! ## Flow
//! ```text
//! run(2, stop)
//!   ├─► wait for "cache-synced"
//!   ├─► Worker x2 ──► handler.sync(key) ──┬─ Ok  → forget, done
//!   │                                     └─ Err → done, add_with_backoff
//!   ├─► bootstrap "seed"     (once)
//!   ├─► periodic  "resync"   (every 1s)
//!   └─► stop → shut_down queue → join workers → cancel ctx
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=reconvisor=debug cargo run --example basic_controller
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use reconvisor::{
    BackoffPolicy, Config, Controller, HandlerError, HandlerFn, JitterPolicy, Key,
    RateLimitingQueue, ReadyFlag, SyncCallCounter, TaskError, TaskFn, WorkQueue,
};

const KEYS: [(&str, &str); 3] = [("default", "web-tls"), ("default", "api-tls"), ("default", "broken")];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reconvisor=debug")),
        )
        .init();

    // 1. Configure backoff for requeues.
    let cfg = Config {
        readiness_poll: Duration::from_millis(50),
        backoff: BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(2),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        },
    };
    let queue = RateLimitingQueue::from_config(&cfg);

    // 2. Handler: conflicts twice on api-tls, always fails on broken.
    let conflicts = Arc::new(AtomicU32::new(0));
    let handler = HandlerFn::arc(move |_ctx: CancellationToken, key: Key| {
        let conflicts = Arc::clone(&conflicts);
        async move {
            match key.split() {
                (_, "api-tls") if conflicts.fetch_add(1, Ordering::Relaxed) < 2 => {
                    Err(HandlerError::conflict("the object has been modified"))
                }
                (_, "broken") => Err(HandlerError::fail("issuer not found")),
                _ => {
                    println!("[handler] reconciled {key}");
                    Ok(())
                }
            }
        }
    });

    // 3. Side tasks: seed once, resync every second.
    let seed_queue = queue.clone();
    let seed = TaskFn::arc("seed", move |_ctx: CancellationToken| {
        let queue = seed_queue.clone();
        async move {
            for (ns, name) in KEYS {
                queue.add(Key::namespaced(ns, name));
            }
            Ok::<(), TaskError>(())
        }
    });
    let resync_queue = queue.clone();
    let resync = TaskFn::arc("resync", move |_ctx: CancellationToken| {
        let queue = resync_queue.clone();
        async move {
            for (ns, name) in KEYS {
                queue.add(Key::namespaced(ns, name));
            }
            Ok::<(), TaskError>(())
        }
    });

    // 4. Readiness: flipped shortly after start.
    let synced = ReadyFlag::arc("cache-synced");
    let flag = synced.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        flag.mark_ready();
    });

    let metrics = Arc::new(SyncCallCounter::new());
    let controller = Controller::builder("certificates", handler, queue.clone())
        .with_config(cfg)
        .with_readiness(synced)
        .with_bootstrap(seed)
        .with_periodic(resync, Duration::from_secs(1))
        .with_metrics(metrics.clone())
        .build();

    // 5. Stop after a few seconds.
    let stop = CancellationToken::new();
    let trigger = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    controller.run(2, stop).await?;
    println!(
        "[main] sync calls: {}, broken requeues before shutdown: {}",
        metrics.sync_call_count("certificates"),
        queue.num_requeues(&Key::namespaced("default", "broken")),
    );
    Ok(())
}
