//! Behaviour of the timing middleware, driven through `Router::handle`.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lapse::middleware::{DURATION_HEADER, LogRecord, Next, TimingLog, TimingLogConfig, from_fn};
use lapse::{Error, Logger, Request, Response, Router, Severity, StatusCode};

// =============================================================================
// Test doubles
// =============================================================================

/// Records every emitted line.
#[derive(Default)]
struct CaptureLogger {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl CaptureLogger {
    fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, severity: Severity, message: &str) {
        self.lines.lock().unwrap().push((severity, message.to_owned()));
    }
}

/// Mirrors a slow middleware further down the stack: waits, then fails for
/// anything under `/throw`.
fn delay_then_maybe_fail(delay: Duration) -> impl lapse::middleware::Middleware {
    from_fn(move |req: Request, next: Next| async move {
        tokio::time::sleep(delay).await;
        if req.path().starts_with("/throw") {
            return Err(Error::middleware("expected exception"));
        }
        next.run(req).await
    })
}

fn app(config: TimingLogConfig, logger: Arc<CaptureLogger>, delay: Duration) -> Router {
    Router::new()
        .layer(TimingLog::with_logger(config, logger))
        .layer(delay_then_maybe_fail(delay))
}

fn get(path: &str) -> Request {
    Request::builder().path(path).correlation_id("corr-1").build()
}

/// Pulls the number out of `request to /x took 12.34ms`.
fn duration_in(line: &str, prefix: &str, suffix: &str) -> f64 {
    line.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .unwrap_or_else(|| panic!("unexpected line: {line}"))
        .parse()
        .unwrap_or_else(|e| panic!("duration in `{line}` is not a float: {e}"))
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn default_format_logs_once_at_information() {
    let logger = Arc::new(CaptureLogger::default());
    let app = app(TimingLogConfig::default(), logger.clone(), Duration::from_millis(20));

    let res = app.handle(get("/something/")).await.unwrap();
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let lines = logger.lines();
    assert_eq!(lines.len(), 1);
    let (severity, line) = &lines[0];
    assert_eq!(*severity, Severity::Information);

    let ms = duration_in(line, "request to /something/ took ", "ms");
    assert!((19.0..=30.0).contains(&ms), "20ms delay measured as {ms}ms");
}

#[tokio::test]
async fn custom_format_renders_operation_and_duration() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder()
        .with_format("customduration: {operation} => {duration}")
        .build()
        .unwrap();
    let app = app(config, logger.clone(), Duration::from_millis(20));

    app.handle(get("/orders")).await.unwrap();

    let lines = logger.lines();
    assert_eq!(lines.len(), 1);
    let ms = duration_in(&lines[0].1, "customduration: /orders => ", "");
    assert!((19.0..=30.0).contains(&ms), "20ms delay measured as {ms}ms");
}

#[tokio::test]
async fn custom_severity_is_used() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder().defaults().with_severity(Severity::Trace).build().unwrap();
    let app = app(config, logger.clone(), Duration::ZERO);

    app.handle(get("/something/")).await.unwrap();

    let lines = logger.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, Severity::Trace);
    assert!(lines[0].1.starts_with("request to /something/ took "));
}

#[tokio::test]
async fn failed_requests_are_not_logged_and_error_propagates() {
    let logger = Arc::new(CaptureLogger::default());
    let app = app(TimingLogConfig::default(), logger.clone(), Duration::ZERO);

    let err = app.handle(get("/throw/")).await.unwrap_err();
    assert!(matches!(err, Error::Middleware(_)));
    assert_eq!(err.to_string(), "middleware: expected exception");
    assert!(logger.lines().is_empty());

    // The same stack still logs a request that succeeds.
    app.handle(get("/fine")).await.unwrap();
    assert_eq!(logger.lines().len(), 1);
}

#[tokio::test]
async fn sub_millisecond_durations_keep_their_fraction() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder().with_format("{duration}").build().unwrap();

    // Sleep granularity is a millisecond; spin instead.
    let app = Router::new()
        .layer(TimingLog::with_logger(config, logger.clone()))
        .get("/spin", |_req: Request| async {
            let start = Instant::now();
            while start.elapsed() < Duration::from_micros(200) {
                std::hint::spin_loop();
            }
            "spun"
        });

    app.handle(get("/spin")).await.unwrap();

    let ms: f64 = logger.lines()[0].1.parse().unwrap();
    // The floor is exact. The ceiling allows for the test thread being
    // preempted on a shared runner, which a 0.3ms bound would not.
    assert!((0.2..1.0).contains(&ms), "measured {ms}ms for a 0.2ms spin");
    assert!(ms.fract() != 0.0, "duration {ms} was truncated");
}

#[tokio::test]
async fn formatter_sees_the_whole_record() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder()
        .with_formatter(|record, err| {
            assert!(err.is_none());
            assert!(record.duration_ms >= 0.0);
            format!("{}|{}", record.operation, record.correlation_id)
        })
        .build()
        .unwrap();
    let app = app(config, logger.clone(), Duration::ZERO);

    app.handle(get("/orders/9")).await.unwrap();

    assert_eq!(logger.lines()[0].1, "/orders/9|corr-1");
}

#[tokio::test]
async fn structured_backends_receive_the_record() {
    #[derive(Default)]
    struct RecordLogger {
        records: Mutex<Vec<(String, String, f64, String)>>,
    }

    impl Logger for RecordLogger {
        fn log(&self, _severity: Severity, _message: &str) {
            panic!("records go through log_record");
        }

        fn log_record(&self, _severity: Severity, record: &LogRecord, message: &str) {
            self.records.lock().unwrap().push((
                record.operation.clone(),
                record.correlation_id.clone(),
                record.duration_ms,
                message.to_owned(),
            ));
        }
    }

    let logger = Arc::new(RecordLogger::default());
    let app = Router::new()
        .layer(TimingLog::with_logger(TimingLogConfig::default(), logger.clone()))
        .get("/p", |_req: Request| async { "ok" });

    app.handle(get("/p")).await.unwrap();

    let records = logger.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    let (operation, correlation_id, duration_ms, message) = &records[0];
    assert_eq!(operation, "/p");
    assert_eq!(correlation_id, "corr-1");
    assert!(*duration_ms >= 0.0);
    assert_eq!(*message, format!("request to /p took {duration_ms}ms"));
}

#[tokio::test]
async fn missing_logger_is_a_no_op() {
    let app = Router::new()
        .layer(TimingLog::silent(TimingLogConfig::default()))
        .get("/", |_req: Request| async { "ok" });

    let res = app.handle(get("/")).await.unwrap();
    assert_eq!(res.body(), b"ok");
}

#[tokio::test]
async fn response_is_passed_through_unchanged() {
    let logger = Arc::new(CaptureLogger::default());
    let app = Router::new()
        .layer(TimingLog::with_logger(TimingLogConfig::default(), logger.clone()))
        .post("/users", |_req: Request| async {
            Response::builder()
                .status(StatusCode::CREATED)
                .header("location", "/users/99")
                .json(br#"{"id":99}"#.to_vec())
        });

    let req = Request::builder().method(lapse::Method::POST).path("/users").build();
    let res = app.handle(req).await.unwrap();

    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.header("location"), Some("/users/99"));
    assert_eq!(res.body(), br#"{"id":99}"#);
    assert_eq!(res.header(DURATION_HEADER), None);
}

#[tokio::test]
async fn duration_header_is_added_when_enabled() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder()
        .defaults()
        .with_duration_header(true)
        .build()
        .unwrap();
    let app = app(config, logger, Duration::from_millis(5));

    let res = app.handle(get("/timed")).await.unwrap();
    let ms: f64 = res.header(DURATION_HEADER).expect("duration header").parse().unwrap();
    assert!(ms >= 4.0, "5ms delay reported as {ms}ms");
}

#[tokio::test]
async fn concurrent_requests_are_timed_independently() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder().with_format("{correlationId} {duration}").build().unwrap();
    let app = Arc::new(
        Router::new()
            .layer(TimingLog::with_logger(config, logger.clone()))
            .get("/sleep/{ms}", |req: Request| async move {
                let ms: u64 = req.param("ms").and_then(|v| v.parse().ok()).unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                "slept"
            }),
    );

    let mut handles = Vec::new();
    for (id, ms) in [("fast", 5), ("slow", 40)] {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            let req = Request::builder().path(&format!("/sleep/{ms}")).correlation_id(id).build();
            app.handle(req).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let lines = logger.lines();
    assert_eq!(lines.len(), 2);
    let duration_of = |id: &str| -> f64 {
        let line = lines.iter().find(|(_, l)| l.starts_with(id)).map(|(_, l)| l).unwrap();
        line[id.len() + 1..].parse().unwrap()
    };
    assert!(duration_of("fast") < duration_of("slow"));
    assert!(duration_of("slow") >= 39.0);
}
