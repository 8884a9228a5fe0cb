//! End-to-end tests: a real server on a real socket, one request per
//! connection, exercising the documented wire scenarios, persistence across
//! a restart, and concurrent queue traffic.

use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;
use tkvs::thread_pool::{SharedQueueThreadPool, ThreadPool};
use tkvs::{snapshot, Stores, TkvsClient, TkvsServer};

/// starts a test server on `port` over the given stores
fn start_server(port: u16, stores: Arc<Stores>) {
    thread::spawn(move || {
        let pool = SharedQueueThreadPool::new(4).unwrap();
        let server = TkvsServer::new(stores, pool);
        let _ = server.run(("127.0.0.1", port));
    });
    wait_for_server(port);
}

/// waits until the server accepts connections
fn wait_for_server(port: u16) {
    for _ in 0..50 {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
    panic!("server on port {} failed to start", port);
}

/// sends one request batch and returns the reply line
fn request(port: u16, batch: &str) -> String {
    TkvsClient::connect(("127.0.0.1", port))
        .unwrap()
        .request(batch)
        .unwrap()
}

#[test]
fn documented_scenarios() {
    let port = 17401;
    start_server(port, Arc::new(Stores::new()));

    // S1: string create / append / get
    assert_eq!(
        request(port, "CREATE STR g hello;STR APPEND g _world;STR GET g"),
        "[1][hello_world][]"
    );
    // S2: set cardinality
    assert_eq!(
        request(port, "CREATE SET s;SET ADD s a;SET ADD s b;SET LEN s"),
        "[1][2][]"
    );
    // S3: hash field round trip
    assert_eq!(
        request(port, "CREATE HASH h;HASH SET h name bob;HASH GET h name"),
        "[1][bob][]"
    );
    assert_eq!(request(port, "HASH GETALL h"), "[1][[ {name : bob} ]][]");
    assert_eq!(request(port, "HASH SEARCH h na"), "[1][[ name ]][]");
    // S4: last reply wins in a batch
    assert_eq!(
        request(
            port,
            "CREATE QUEUE q;QUEUE PUSH q x;QUEUE PUSH q y;QUEUE POP q;QUEUE POP q"
        ),
        "[1][y][]"
    );
    // S5: lookup of an absent key
    assert_eq!(
        request(port, "STR GET missing"),
        "[0][missing does not exist][KEY_NOT_FOUND]"
    );
    // S6: double create fails on the second statement
    assert_eq!(
        request(port, "CREATE STR a 1;CREATE STR a 2"),
        "[0][a already exists][KEY_EXISTS]"
    );
}

#[test]
fn boundary_behaviors() {
    let port = 17402;
    start_server(port, Arc::new(Stores::new()));

    request(port, "CREATE STR s abcd");
    // SUB with start == end is the empty string
    assert_eq!(request(port, "STR SUB s 2 2"), "[1][][]");
    // LTRIM of the whole value empties it
    assert_eq!(request(port, "STR LTRIM s 4;STR GET s"), "[1][][]");
    // trimming past the length is invalid
    assert_eq!(
        request(port, "STR RTRIM s 1").split('[').nth(3).unwrap(),
        "INVALID_ARGUMENTS]"
    );

    request(port, "CREATE SET x;SET ADD x 1");
    assert!(request(port, "SET DIFF x x").contains("[INVALID_ARGUMENTS]"));

    // single-element algebra results render deterministically
    request(port, "CREATE SET s1;SET ADD s1 a;SET ADD s1 b;CREATE SET s2;SET ADD s2 b");
    assert_eq!(request(port, "SET INTER s1 s2"), "[1][[ b ]][]");
    assert_eq!(request(port, "SET DIFF s1 s2"), "[1][[ a ]][]");
    assert_eq!(request(port, "SET CONTAINS s1 a"), "[1][true][]");
    assert_eq!(request(port, "SET POP s1 a;SET CONTAINS s1 a"), "[1][false][]");
    assert!(request(port, "SET POP s1 a").contains("[VALUE_NOT_FOUND]"));

    // the only membership probe that answers instead of erroring
    assert_eq!(request(port, "STR EXISTS nowhere"), "[1][false][]");

    assert!(request(port, "CREATE QUEUE fresh;QUEUE POP fresh").contains("[QUEUE_EMPTY]"));

    // bare KEYS and KEYS * agree
    assert_eq!(request(port, "KEYS"), request(port, "KEYS *"));

    assert!(request(port, "STR SUB s one 2").contains("[BAD_CAST]"));
    assert!(request(port, "STR SUB s 1").contains("[BAD_ARG_LEN]"));
    assert!(request(port, "NOPE x").contains("[CMD_UNKNOWN]"));
}

#[test]
fn reply_always_ends_with_a_newline() {
    use std::io::{Read, Write};

    let port = 17403;
    start_server(port, Arc::new(Stores::new()));

    // an empty batch renders an empty payload; the newline must still arrive
    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"|").unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).unwrap();
    assert_eq!(reply, b"[1][][]\n");
}

#[test]
fn snapshot_survives_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dump.bin");

    let port = 17404;
    let stores = Arc::new(Stores::new());
    start_server(port, Arc::clone(&stores));

    request(port, "CREATE STR greeting hello_world");
    request(port, "CREATE SET colors;SET ADD colors red;SET ADD colors blue");
    request(port, "CREATE HASH user;HASH SET user name bob");
    request(port, "CREATE QUEUE jobs;QUEUE PUSH jobs transient");
    snapshot::dump(&stores, &path).unwrap();

    // a second server restores from the same file
    let port2 = 17405;
    let restored = Arc::new(Stores::new());
    snapshot::load(&restored, &path).unwrap();
    start_server(port2, restored);

    assert_eq!(request(port2, "STR GET greeting"), "[1][hello_world][]");
    assert_eq!(request(port2, "SET LEN colors"), "[1][2][]");
    assert_eq!(request(port2, "HASH GET user name"), "[1][bob][]");
    // queues are not persisted
    assert!(request(port2, "QUEUE POP jobs").contains("[KEY_NOT_FOUND]"));
}

#[test]
fn dump_schedule_writes_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scheduled.bin");

    let stores = Arc::new(Stores::new());
    stores
        .strings
        .create(&stores.keyspace, "tick", "tock")
        .unwrap();
    tkvs::spawn_dump_schedule(Arc::clone(&stores), path.clone(), Duration::from_millis(100));

    // the schedule keeps rewriting the file, so a read can catch a dump
    // mid-write; retry until a whole snapshot decodes
    let mut restored = None;
    for _ in 0..100 {
        if path.exists() {
            let stores = Stores::new();
            if snapshot::load(&stores, &path).is_ok() {
                restored = Some(stores);
                break;
            }
        }
        thread::sleep(Duration::from_millis(20));
    }
    let restored = restored.expect("no decodable snapshot appeared");
    assert_eq!(restored.strings.get("tick").unwrap(), "tock");
}

#[test]
fn concurrent_queue_traffic_over_tcp() {
    let port = 17406;
    start_server(port, Arc::new(Stores::new()));
    request(port, "CREATE QUEUE work");

    let producers = 4;
    let per_producer = 50;
    let total = producers * per_producer;
    let consumed = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for p in 0..producers {
        handles.push(thread::spawn(move || {
            for i in 0..per_producer {
                let reply = request(port, &format!("QUEUE PUSH work p{}-{}", p, i));
                assert_eq!(reply, "[1][][]");
            }
        }));
    }
    for _ in 0..2 {
        let consumed = Arc::clone(&consumed);
        let sink = Arc::clone(&sink);
        handles.push(thread::spawn(move || {
            while consumed.load(Ordering::SeqCst) < total {
                let reply = request(port, "QUEUE POP work");
                if reply.starts_with("[1]") {
                    consumed.fetch_add(1, Ordering::SeqCst);
                    sink.lock().unwrap().push(reply);
                } else {
                    assert!(reply.contains("[QUEUE_EMPTY]"));
                    thread::yield_now();
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let taken = sink.lock().unwrap();
    assert_eq!(taken.len(), total);
    let got: std::collections::HashSet<String> = taken.iter().cloned().collect();
    assert_eq!(got.len(), total);
    for p in 0..producers {
        for i in 0..per_producer {
            assert!(got.contains(&format!("[1][p{}-{}][]", p, i)));
        }
    }
}

#[test]
fn single_producer_single_consumer_fifo_over_tcp() {
    let port = 17407;
    start_server(port, Arc::new(Stores::new()));
    request(port, "CREATE QUEUE line");

    for i in 0..20 {
        request(port, &format!("QUEUE PUSH line item-{}", i));
    }
    for i in 0..20 {
        assert_eq!(request(port, "QUEUE POP line"), format!("[1][item-{}][]", i));
    }
}
