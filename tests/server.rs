//! End-to-end over a real socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lapse::health::HealthCheck;
use lapse::middleware::{CorrelationId, DURATION_HEADER, TimingLog, TimingLogConfig, from_fn};
use lapse::{Error, Logger, Request, Router, Server, Severity};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Default)]
struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

impl Logger for CaptureLogger {
    fn log(&self, _severity: Severity, message: &str) {
        self.lines.lock().unwrap().push(message.to_owned());
    }
}

#[tokio::test]
async fn serves_through_the_middleware_stack() {
    let logger = Arc::new(CaptureLogger::default());
    let config = TimingLogConfig::builder()
        .with_format("{operation} {correlationId}")
        .with_duration_header(true)
        .build()
        .unwrap();

    let app = Router::new()
        .layer(HealthCheck::new("all systems go"))
        .layer(CorrelationId::default())
        .layer(TimingLog::with_logger(config, logger.clone()))
        .layer(from_fn(|req: Request, next: lapse::middleware::Next| async move {
            if req.path() == "/boom" {
                return Err(Error::middleware("boom"));
            }
            next.run(req).await
        }))
        .get("/users/{id}", |req: Request| async move {
            format!("user {}", req.param("id").unwrap_or_default())
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );

    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/users/7"))
        .header("x-correlation-id", "client-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key(DURATION_HEADER));
    assert_eq!(res.text().await.unwrap(), "user 7");

    let res = client.get(format!("http://{addr}/healthcheck")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "all systems go");

    let res = client.get(format!("http://{addr}/boom")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    let lines = logger.lines.lock().unwrap().clone();
    assert_eq!(lines, vec!["/users/7 client-abc".to_owned()]);

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let app = Router::new().get("/", |_req: Request| async { "ok" });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );

    // The client keeps its connection pooled for 90s after this request.
    let client = reqwest::Client::new();
    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "ok");

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("idle connection kept the server alive")
        .unwrap()
        .unwrap();
    drop(client);
}
