//! Topology driver tests.
//!
//! Long-running roles are spawned on the test runtime and cancelled by
//! dropping their task handles; progress is read back from a shared
//! `MemoryReporter`.

use bytes::Bytes;
use compio::runtime::spawn;
use compio::time::sleep;
use std::rc::Rc;
use std::time::Duration;
use topokit::driver::reqrep::request;
use topokit::driver::survey::survey_round;
use topokit::prelude::*;

const SETTLE: Duration = Duration::from_millis(50);

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn fast_config() -> DriverConfig {
    DriverConfig::default()
        .with_recv_deadline(Duration::from_millis(20))
        .with_interval(Duration::from_millis(50))
        .with_linger(Duration::from_millis(20))
        .with_survey_time(Duration::from_millis(200))
        .with_bus_delays(Duration::from_millis(100), Duration::from_millis(100))
}

/// Answers every query with `name` after `delay`.
async fn delayed_respondent(url: &str, name: &'static str, delay: Duration) -> topokit::sp::Result<()> {
    let mut sock = RespondentSocket::new();
    sock.dial(url).await?;
    loop {
        sock.recv().await?;
        sleep(delay).await;
        sock.send(Bytes::from_static(name.as_bytes())).await?;
    }
}

#[compio::test]
async fn test_survey_round_keeps_only_replies_inside_window() {
    topokit::dev_tracing::init_tracing();

    let window = Duration::from_millis(300);
    let mut surveyor = SurveyorSocket::with_options(SocketOptions::default().with_survey_time(window));
    surveyor.listen("inproc://drv-survey-window").await.unwrap();

    let _fast = spawn(delayed_respondent("inproc://drv-survey-window", "fast", Duration::from_millis(30)));
    let _slow = spawn(delayed_respondent("inproc://drv-survey-window", "slow", Duration::from_millis(400)));
    sleep(SETTLE).await;

    let round = survey_round(&mut surveyor, Bytes::from_static(b"DATE")).await.unwrap();
    assert_eq!(round.responses, vec![Bytes::from_static(b"fast")]);
    assert!(round.elapsed >= window, "{:?}", round.elapsed);

    // The slow reply to round one lands during round two and must be dropped
    let round = survey_round(&mut surveyor, Bytes::from_static(b"DATE")).await.unwrap();
    assert_eq!(round.responses, vec![Bytes::from_static(b"fast")]);
}

#[compio::test]
async fn test_survey_round_without_respondents_completes_on_time() {
    let window = Duration::from_millis(100);
    let mut surveyor = SurveyorSocket::with_options(SocketOptions::default().with_survey_time(window));
    surveyor.listen("inproc://drv-survey-empty").await.unwrap();

    let round = survey_round(&mut surveyor, Bytes::from_static(b"DATE")).await.unwrap();
    assert!(round.responses.is_empty());
    assert!(round.elapsed >= window);
    assert!(round.elapsed < window * 4, "{:?}", round.elapsed);
}

#[compio::test]
async fn test_survey_round_outlasts_short_recv_deadline() {
    let window = Duration::from_millis(300);
    let mut surveyor = SurveyorSocket::with_options(
        SocketOptions::default()
            .with_survey_time(window)
            .with_recv_timeout(Duration::from_millis(50)),
    );
    surveyor.listen("inproc://drv-survey-recv-deadline").await.unwrap();

    let _late = spawn(delayed_respondent(
        "inproc://drv-survey-recv-deadline",
        "late",
        Duration::from_millis(150),
    ));
    sleep(SETTLE).await;

    let round = survey_round(&mut surveyor, Bytes::from_static(b"DATE")).await.unwrap();
    assert_eq!(round.responses, vec![Bytes::from_static(b"late")]);
    assert!(round.elapsed >= window, "{:?}", round.elapsed);
    assert!(!surveyor.in_survey());
}

#[compio::test]
async fn test_survey_round_collects_every_respondent() {
    let mut surveyor =
        SurveyorSocket::with_options(SocketOptions::default().with_survey_time(Duration::from_millis(200)));
    surveyor.listen("inproc://drv-survey-many").await.unwrap();

    let _a = spawn(delayed_respondent("inproc://drv-survey-many", "a", Duration::ZERO));
    let _b = spawn(delayed_respondent("inproc://drv-survey-many", "b", Duration::from_millis(10)));
    let _c = spawn(delayed_respondent("inproc://drv-survey-many", "c", Duration::from_millis(20)));
    sleep(SETTLE).await;

    let round = survey_round(&mut surveyor, Bytes::from_static(b"DATE")).await.unwrap();
    let mut names: Vec<_> = round.responses.iter().map(|r| r.to_vec()).collect();
    names.sort();
    assert_eq!(names, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
}

#[compio::test]
async fn test_survey_driver_reports_rounds() {
    let reporter = Rc::new(MemoryReporter::new());

    let (r, config) = (reporter.clone(), fast_config());
    let _server = spawn(async move {
        Driver::Survey
            .run("server", &args(&["inproc://drv-survey-driver"]), &config, &*r)
            .await
    });
    sleep(SETTLE).await;

    let (r, config) = (reporter.clone(), fast_config());
    let _client0 = spawn(async move {
        Driver::Survey
            .run("client", &args(&["inproc://drv-survey-driver", "client0"]), &config, &*r)
            .await
    });
    let (r, config) = (reporter.clone(), fast_config());
    let _client1 = spawn(async move {
        Driver::Survey
            .run("respondent", &args(&["inproc://drv-survey-driver", "client1"]), &config, &*r)
            .await
    });

    sleep(Duration::from_millis(700)).await;

    assert!(reporter.count("SERVER: SURVEY COMPLETE") >= 2, "{:#?}", reporter.lines());
    assert!(reporter.contains("CLIENT (client0): RECEIVED \"DATE\" SURVEY REQUEST"));
    assert!(reporter.contains("CLIENT (client1): SENDING DATE SURVEY RESPONSE"));
    assert!(reporter.count("\" SURVEY RESPONSE") >= 2, "{:#?}", reporter.lines());
}

#[compio::test]
async fn test_pipeline_stops_on_sentinel() {
    let reporter = Rc::new(MemoryReporter::new());
    let config = fast_config();

    let (r, c) = (reporter.clone(), config.clone());
    let puller = spawn(async move {
        Driver::Pipeline
            .run("puller", &args(&["inproc://drv-pipeline"]), &c, &*r)
            .await
    });
    sleep(SETTLE).await;

    for msg in ["Hello", "World", "STOP"] {
        Driver::Pipeline
            .run("pusher", &args(&["inproc://drv-pipeline", msg]), &config, &*reporter)
            .await
            .unwrap();
    }

    puller.await.unwrap();
    let lines = reporter.lines();
    let received: Vec<_> = lines.iter().filter(|l| l.starts_with("NODE0")).collect();
    assert_eq!(
        received,
        vec![
            "NODE0: RECEIVED \"Hello\"",
            "NODE0: RECEIVED \"World\"",
            "NODE0: RECEIVED \"STOP\"",
            "NODE0: STOPPING",
        ]
    );
    assert!(reporter.contains("NODE1: SENDING \"World\""));
}

#[compio::test]
async fn test_puller_stops_on_corrupt_frame() {
    use compio::buf::BufResult;
    use compio::io::{AsyncReadExt, AsyncWriteExt};
    use topokit_core::frame::{encode_greeting, GREETING_LEN};

    let reporter = Rc::new(MemoryReporter::new());
    let (r, config) = (reporter.clone(), fast_config());
    let puller = spawn(async move {
        Driver::Pipeline
            .run("puller", &args(&["tcp://127.0.0.1:40872"]), &config, &*r)
            .await
    });
    sleep(SETTLE).await;

    let mut stream = compio::net::TcpStream::connect("127.0.0.1:40872").await.unwrap();
    let BufResult(res, _) = stream.write_all(encode_greeting(Protocol::Push)).await;
    res.unwrap();
    let BufResult(res, _) = stream.read_exact([0u8; GREETING_LEN]).await;
    res.unwrap();
    // Length prefix far beyond the default message limit
    let BufResult(res, _) = stream.write_all([0xffu8; 8]).await;
    res.unwrap();

    let err = puller.await.unwrap_err();
    assert!(
        matches!(err, DriverError::Socket(topokit_core::Error::Receive(_))),
        "{err}"
    );
    assert!(!reporter.contains("NODE0"));
}

#[compio::test]
async fn test_reqrep_round_trip_over_tcp() {
    let reporter = Rc::new(MemoryReporter::new());

    let (r, config) = (reporter.clone(), fast_config());
    let _responder = spawn(async move {
        Driver::ReqRep
            .run("node0", &args(&["tcp://127.0.0.1:40871"]), &config, &*r)
            .await
    });
    sleep(SETTLE).await;

    Driver::ReqRep
        .run("node1", &args(&["tcp://127.0.0.1:40871"]), &fast_config(), &*reporter)
        .await
        .unwrap();

    assert_eq!(
        reporter.lines().first().map(String::as_str),
        Some("NODE1: SENDING DATE REQUEST DATE")
    );
    assert!(reporter.contains("NODE0: RECEIVED DATE REQUEST"));
    assert!(reporter.contains("NODE0: SENDING DATE "));
    assert!(reporter.contains("NODE1: RECEIVED DATE "));
}

#[compio::test]
async fn test_responder_ignores_unknown_requests() {
    let reporter = Rc::new(MemoryReporter::new());

    let (r, config) = (reporter.clone(), fast_config());
    let _responder = spawn(async move {
        Driver::ReqRep
            .run("responder", &args(&["inproc://drv-reqrep-ignore"]), &config, &*r)
            .await
    });
    sleep(SETTLE).await;

    let mut req = ReqSocket::with_options(
        SocketOptions::default().with_recv_timeout(Duration::from_millis(150)),
    );
    req.dial("inproc://drv-reqrep-ignore").await.unwrap();

    let err = request(&mut req, Bytes::from_static(b"TIME")).await.unwrap_err();
    assert!(matches!(err, DriverError::Socket(ref e) if e.is_timeout()), "{err}");
    assert!(!reporter.contains("NODE0"));

    let reply = request(&mut req, Bytes::from_static(b"DATE")).await.unwrap();
    assert_eq!(reply.len(), 24);
    assert_eq!(reporter.count("NODE0: RECEIVED DATE REQUEST"), 1);
}

#[compio::test]
async fn test_pubsub_late_subscriber_misses_earlier_dates() {
    let reporter = Rc::new(MemoryReporter::new());

    let (r, config) = (reporter.clone(), fast_config());
    let _server = spawn(async move {
        Driver::PubSub
            .run("server", &args(&["inproc://drv-pubsub"]), &config, &*r)
            .await
    });
    sleep(SETTLE).await;

    let (r, config) = (reporter.clone(), fast_config());
    let _early = spawn(async move {
        Driver::PubSub
            .run("client", &args(&["inproc://drv-pubsub", "early"]), &config, &*r)
            .await
    });
    sleep(Duration::from_millis(300)).await;

    let (r, config) = (reporter.clone(), fast_config());
    let _late = spawn(async move {
        Driver::PubSub
            .run("client", &args(&["inproc://drv-pubsub", "late"]), &config, &*r)
            .await
    });
    sleep(Duration::from_millis(300)).await;

    let early = reporter.count("CLIENT (early): RECEIVED ");
    let late = reporter.count("CLIENT (late): RECEIVED ");
    assert!(late >= 1, "{:#?}", reporter.lines());
    assert!(early > late + 2, "early={early} late={late}");
    assert!(reporter.count("SERVER: PUBLISHING DATE ") >= early);
}

#[compio::test]
async fn test_pair_nodes_exchange_names() {
    let reporter = Rc::new(MemoryReporter::new());

    let (r, config) = (reporter.clone(), fast_config());
    let _node0 = spawn(async move {
        Driver::Pair
            .run("node0", &args(&["inproc://drv-pair"]), &config, &*r)
            .await
    });
    sleep(Duration::from_millis(20)).await;

    let (r, config) = (reporter.clone(), fast_config());
    let _node1 = spawn(async move {
        Driver::Pair
            .run("node1", &args(&["inproc://drv-pair"]), &config, &*r)
            .await
    });
    sleep(Duration::from_millis(400)).await;

    assert!(reporter.contains("node0: SENDING \"node0\""));
    assert!(reporter.count("node0: RECEIVED: \"node1\"") >= 2, "{:#?}", reporter.lines());
    assert!(reporter.count("node1: RECEIVED: \"node0\"") >= 2, "{:#?}", reporter.lines());
}

#[compio::test]
async fn test_bus_nodes_hear_direct_peers() {
    let reporter = Rc::new(MemoryReporter::new());
    let nodes = [
        ("node0", vec!["inproc://drv-bus0", "inproc://drv-bus1", "inproc://drv-bus2"]),
        ("node1", vec!["inproc://drv-bus1", "inproc://drv-bus2"]),
        ("node2", vec!["inproc://drv-bus2"]),
    ];

    let mut tasks = Vec::new();
    for (name, urls) in nodes {
        let (r, config) = (reporter.clone(), fast_config());
        tasks.push(spawn(async move {
            Driver::Bus.run(name, &args(&urls), &config, &*r).await
        }));
    }
    sleep(Duration::from_millis(500)).await;

    for (me, other) in [
        ("node0", "node1"),
        ("node0", "node2"),
        ("node1", "node0"),
        ("node1", "node2"),
        ("node2", "node0"),
        ("node2", "node1"),
    ] {
        let line = format!("{me}: RECEIVED '{other}' FROM BUS");
        assert_eq!(reporter.count(&line), 1, "{line}: {:#?}", reporter.lines());
    }
    assert!(!reporter.contains("node0: RECEIVED 'node0'"));
    drop(tasks);
}

#[compio::test]
async fn test_usage_errors() {
    let config = DriverConfig::default();
    let reporter = MemoryReporter::new();

    let err = Driver::Pair
        .run("node7", &args(&["inproc://drv-usage"]), &config, &reporter)
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Usage(_)));

    let err = Driver::PubSub
        .run("subscriber", &args(&["inproc://drv-usage"]), &config, &reporter)
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Usage(_)));

    let err = Driver::Bus.run("node0", &[], &config, &reporter).await.unwrap_err();
    assert!(matches!(err, DriverError::Usage(_)));
    assert!(reporter.lines().is_empty());
}

#[compio::test]
async fn test_requester_fails_without_listener() {
    let reporter = MemoryReporter::new();
    let err = Driver::ReqRep
        .run("requester", &args(&["inproc://drv-nobody"]), &DriverConfig::default(), &reporter)
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Socket(topokit_core::Error::Connect { .. })), "{err}");
}
