use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tcp_sweep::config::{BannerConfig, ScanConfig};
use tcp_sweep::progress::SharedResultSet;
use tcp_sweep::scanner::{scan_target, scan_targets, scan_targets_with_shared};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Bind and immediately release a port so nothing is listening on it.
async fn closed_port() -> u16 {
    let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
    l.local_addr().unwrap().port()
}

/// Listener that accepts forever and counts connections.
async fn counting_listener() -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    tokio::spawn(async move {
        while let Ok((_sock, _)) = listener.accept().await {
            c.fetch_add(1, Ordering::SeqCst);
        }
    });
    (port, count)
}

fn fast_config(workers: usize) -> ScanConfig {
    ScanConfig::new(workers, Duration::from_secs(1)).with_banner(BannerConfig::disabled())
}

#[tokio::test]
async fn only_the_listening_port_is_open() {
    let (open, _) = counting_listener().await;
    let c1 = closed_port().await;
    let c2 = closed_port().await;

    let r = scan_target("127.0.0.1", &[c1, open, c2], &fast_config(3))
        .await
        .unwrap();

    assert_eq!(r.target, "127.0.0.1");
    assert_eq!(r.open_ports, vec![format!("127.0.0.1:{open}")]);
    assert_eq!(r.port_count, 1);
    assert_eq!(r.total_ports, 3);
    assert_eq!(r.progress_percent, 100.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_task_probed_exactly_once_for_any_worker_count() {
    const N: usize = 7;
    for workers in [1, 3, N, 20] {
        let (port, accepted) = counting_listener().await;
        let ports = vec![port; N];

        let r = scan_target("127.0.0.1", &ports, &fast_config(workers))
            .await
            .unwrap();
        assert_eq!(r.port_count, N, "workers={workers}");
        assert_eq!(r.open_ports.len(), r.port_count);
        assert_eq!(r.total_ports, N);

        let deadline = Instant::now() + Duration::from_secs(2);
        while accepted.load(Ordering::SeqCst) < N && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(accepted.load(Ordering::SeqCst), N, "workers={workers}");
    }
}

#[tokio::test]
async fn banner_is_captured_for_open_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let _ = sock.write_all(b"220 mail.local ESMTP\r\n").await;
        }
    });

    let cfg = ScanConfig::new(2, Duration::from_secs(1)).with_banner(BannerConfig {
        enabled: true,
        timeout: Duration::from_millis(500),
        max_bytes: 1024,
    });
    let r = scan_target("127.0.0.1", &[port], &cfg).await.unwrap();
    let addr = format!("127.0.0.1:{port}");
    assert_eq!(r.open_ports, vec![addr.clone()]);
    assert_eq!(r.banners.get(&addr).map(String::as_str), Some("220 mail.local ESMTP"));
}

/// Listener that accepts and holds every connection open without writing.
async fn silent_listener() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });
    port
}

async fn timed_silent_scan(workers: usize, banner_wait: Duration) -> Duration {
    let port = silent_listener().await;
    let cfg = ScanConfig::new(workers, Duration::from_secs(1)).with_banner(BannerConfig {
        enabled: true,
        timeout: banner_wait,
        max_bytes: 1024,
    });
    let start = Instant::now();
    let r = scan_target("127.0.0.1", &[port; 5], &cfg).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(r.port_count, 5);
    assert!(r.banners.is_empty());
    assert_eq!(r.progress_percent, 100.0);
    elapsed
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn workers_wait_on_silent_ports_in_parallel() {
    let wait = Duration::from_millis(400);

    let serial = timed_silent_scan(1, wait).await;
    assert!(serial >= wait * 5, "one worker took {serial:?}");

    let parallel = timed_silent_scan(5, wait).await;
    assert!(parallel >= wait, "five workers took {parallel:?}");
    assert!(parallel < wait * 3, "five workers took {parallel:?}");
}

#[tokio::test]
async fn two_targets_give_two_results() {
    let (port, _) = counting_listener().await;
    let targets = vec!["127.0.0.1".to_string(), "localhost".to_string()];

    let set = scan_targets(&targets, &[port], &fast_config(2)).await.unwrap();
    assert_eq!(set.len(), 2);
    let mut names: Vec<_> = set.iter().map(|r| r.target.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["127.0.0.1", "localhost"]);
    for r in &set {
        assert_eq!(r.port_count, r.open_ports.len());
        assert_eq!(r.total_ports, 1);
    }
}

#[tokio::test]
async fn shared_result_set_is_filled_by_each_target() {
    let (port, _) = counting_listener().await;
    let targets = vec!["127.0.0.1".to_string(), "127.0.0.1".to_string()];
    let shared = SharedResultSet::new();

    scan_targets_with_shared(&targets, &[port], &fast_config(1), shared.clone())
        .await
        .unwrap();
    assert_eq!(shared.len().await, 2);
}

#[tokio::test]
async fn global_ceiling_still_completes_every_target() {
    let (port, accepted) = counting_listener().await;
    let targets = vec!["127.0.0.1".to_string(); 3];
    let cfg = fast_config(4).with_max_in_flight(Some(1));

    let set = scan_targets(&targets, &[port, port], &cfg).await.unwrap();
    assert_eq!(set.len(), 3);
    assert!(set.iter().all(|r| r.port_count == 2));

    let deadline = Instant::now() + Duration::from_secs(2);
    while accepted.load(Ordering::SeqCst) < 6 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(accepted.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn empty_port_list_completes_without_error() {
    let set = scan_targets(&["127.0.0.1".to_string()], &[], &fast_config(4))
        .await
        .unwrap();
    assert_eq!(set.len(), 1);
    assert!(set[0].open_ports.is_empty());
    assert_eq!(set[0].total_ports, 0);
}
