use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tessera::di::{ComponentOptions, component};
use tessera::prelude::*;

#[derive(Injectable)]
#[injectable(init)]
struct Cache {
    #[injectable(default)]
    done: AtomicBool,
}

#[async_trait]
impl Initializable for Cache {
    async fn init(&self) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.done.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn report(container: &Container) {
    container.set_async_resolver(
        "report",
        |container: Container| async move {
            let cache = container.resolve_async::<Cache>().await?;
            Ok::<_, TesseraError>(tessera::value(cache.done.load(Ordering::SeqCst)))
        },
        Scope::Singleton,
    );
}

#[tokio::test]
async fn test_runner_starts_every_singleton() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    component().apply_to::<Cache>(ComponentOptions::singleton());
    let container = Container::new();
    report(&container);

    let started = Runner::new(container.create_child_container())
        .start()
        .await
        .unwrap();

    assert_eq!(started, 2);
    assert!(container.resolve::<Cache>().unwrap().done.load(Ordering::SeqCst));
    assert!(*container.get_as::<bool>("report").unwrap().unwrap());
}

#[tokio::test]
async fn test_runner_times_out() {
    component().apply_to::<Cache>(ComponentOptions::singleton());
    let container = Container::new();
    container.set_async_resolver(
        "stalled",
        |_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, TesseraError>(tessera::value(()))
        },
        Scope::Singleton,
    );

    let runner = Runner::new(container);
    assert!(runner.container().parent().is_none());
    assert!(matches!(
        runner.start_with_timeout(Duration::from_millis(100)).await,
        Err(TesseraError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_failed_service_stops_startup() {
    let container = Container::new();
    container.set_async_resolver(
        "broken",
        |_| async { Err::<Value, _>(TesseraError::Custom(anyhow::anyhow!("connection refused"))) },
        Scope::Singleton,
    );

    let err = Runner::new(container).start().await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}
