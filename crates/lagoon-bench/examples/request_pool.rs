//! One pool per request, end to end.
//!
//! Demonstrates: create a named pool → serve several requests, resetting
//! between them → attach cleanups for external resources → destroy.
//! Run with `cargo run --example request_pool` to see the pool's debug
//! events.

use std::cell::Cell;
use std::num::NonZeroUsize;
use std::rc::Rc;

use lagoon_bench::{request_sizes, serve_request};
use lagoon_collections::{Array, List};
use lagoon_pool::{CleanupAction, Pool, PoolConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    println!("=== Lagoon Request Pool Example ===\n");

    let mut pool = Pool::create(PoolConfig::new(4096).with_name("request")).unwrap();
    println!(
        "block size {} bytes, small-allocation threshold {} bytes",
        pool.block_size(),
        pool.max()
    );

    // --- Requests: allocate freely, reset in between ---
    for request in 0..3u64 {
        let sizes = request_sizes(request, 400, pool.max() + 1);
        let total = serve_request(&mut pool, &sizes).unwrap();
        println!(
            "request {request}: {} allocations, {total} bytes, {} blocks, {} large",
            sizes.len(),
            pool.block_count(),
            pool.large_live()
        );
        pool.reset();
    }

    // --- Containers ---
    let mut headers = Array::create(&mut pool, 4, 16).unwrap();
    for name in ["host", "accept", "user-agent", "content-type", "cookie"] {
        let slot = headers.push(&mut pool).unwrap();
        let len = name.len().min(slot.len());
        slot[..len].copy_from_slice(&name.as_bytes()[..len]);
    }
    println!("\narray: {} headers, capacity {}", headers.len(), headers.capacity());

    let mut chunks = List::create(&mut pool, NonZeroUsize::new(4).unwrap(), 64).unwrap();
    for i in 0..10u8 {
        chunks.push(&mut pool).unwrap().fill(i);
    }
    println!("list: {} chunks in {} parts", chunks.len(), chunks.part_count());

    // --- Cleanups ---
    let released = Rc::new(Cell::new(0));
    for resource in ["upstream connection", "cache lock"] {
        let released = Rc::clone(&released);
        pool.on_destroy(move || {
            println!("releasing {resource}");
            released.set(released.get() + 1);
        })
        .unwrap();
    }

    let handle = pool.add_cleanup(8).unwrap();
    pool.cleanup_data(&handle)
        .unwrap()
        .copy_from_slice(&42u64.to_le_bytes());
    pool.set_cleanup(
        &handle,
        CleanupAction::with_data(|data| println!("flushing record {data:?}")),
    )
    .unwrap();

    #[cfg(unix)]
    let _dir = attach_temp_file(&mut pool);

    println!("\nblock occupancy:");
    for (index, stats) in pool.block_stats().iter().enumerate() {
        println!(
            "  block {index}: {} used, {} unused, failed {}",
            stats.used, stats.unused, stats.failed
        );
    }

    println!("\ndestroying pool");
    pool.destroy();
    println!("{} resources released", released.get());
}

#[cfg(unix)]
fn attach_temp_file(pool: &mut Pool) -> tempfile::TempDir {
    use std::fs::File;

    use lagoon_pool::FileCleanup;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.part");
    let file = File::create(&path).unwrap();
    let handle = pool.add_cleanup(0).unwrap();
    pool.set_cleanup(&handle, FileCleanup::delete(file, &path))
        .unwrap();
    println!("temp file {} removed at destroy", path.display());
    dir
}
