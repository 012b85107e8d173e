use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tessera::di::{ComponentOptions, component, inject};
use tessera::prelude::*;

#[derive(Injectable)]
struct Shared;

#[derive(Injectable)]
struct Counter {
    #[injectable(default)]
    hits: AtomicUsize,
}

#[derive(Injectable)]
struct RequestState {
    #[injectable(default)]
    id: AtomicUsize,
}

#[test]
fn test_singleton_is_shared_with_children() {
    component().apply_to::<Shared>(ComponentOptions::singleton());
    let root = Container::new();
    let first = root.create_child_container();
    let second = root.create_child_container();

    let a = first.resolve::<Shared>().unwrap();
    let b = second.resolve::<Shared>().unwrap();
    let c = root.resolve::<Shared>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
}

#[test]
fn test_transient_instances_are_independent() {
    component().apply_to::<Counter>(ComponentOptions::transient());
    let container = Container::new();

    let a = container.resolve::<Counter>().unwrap();
    let b = container.resolve::<Counter>().unwrap();
    a.hits.fetch_add(1, Ordering::SeqCst);

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(b.hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_request_scope_requires_child_container() {
    component().apply_to::<RequestState>(ComponentOptions::request());
    let root = Container::new();

    assert!(matches!(
        root.resolve::<RequestState>(),
        Err(TesseraError::ScopeMismatch { .. })
    ));

    let first = root.create_child_container();
    let second = root.create_child_container();
    let a = first.resolve::<RequestState>().unwrap();
    let b = first.resolve::<RequestState>().unwrap();
    let c = second.resolve::<RequestState>().unwrap();
    a.id.store(7, Ordering::SeqCst);

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(c.id.load(Ordering::SeqCst), 0);
}

#[derive(Injectable)]
struct AsyncRequestState;

#[tokio::test]
async fn test_async_request_scope_requires_child_container() {
    component().apply_to::<AsyncRequestState>(ComponentOptions::request());
    let root = Container::new();

    assert!(matches!(
        root.resolve_async::<AsyncRequestState>().await,
        Err(TesseraError::ScopeMismatch { .. })
    ));
    let child = root.create_child_container();
    assert!(child.resolve_async::<AsyncRequestState>().await.is_ok());
}

#[derive(Injectable)]
struct Alpha {
    value: u32,
}

#[derive(Injectable)]
struct Beta {
    alpha: Arc<Alpha>,
}

#[derive(Injectable)]
struct Gamma {
    alpha: Arc<Alpha>,
    beta: Arc<Beta>,
}

#[test]
fn test_dependency_graph_shares_singletons() {
    inject().constructor_param::<Alpha>(0, Some(Key::from("ABC")));
    let container = Container::new();
    container.set_value("ABC", 13u32).unwrap();

    let gamma = container.resolve::<Gamma>().unwrap();
    assert_eq!(gamma.alpha.value, 13);
    assert!(Arc::ptr_eq(&gamma.alpha, &gamma.beta.alpha));
    assert!(Arc::ptr_eq(&gamma.alpha, &container.resolve::<Alpha>().unwrap()));
}

struct Unregistered;

#[derive(Injectable)]
struct Optional {
    dep: Option<Arc<Unregistered>>,
}

#[test]
fn unknown_dependency_resolves_to_none() {
    let container = Container::new();
    assert!(container.resolve::<Optional>().unwrap().dep.is_none());
    assert!(
        container
            .get(&Key::Class(ClassRef::opaque::<Unregistered>()))
            .unwrap()
            .is_none()
    );
}

#[derive(Injectable)]
struct ListedA;
#[derive(Injectable)]
struct ListedB;
#[derive(Injectable)]
struct ListedC;
#[derive(Injectable)]
struct ListedD;

#[test]
fn test_list_services_by_scope() {
    component().apply_to::<ListedA>(ComponentOptions::singleton());
    component().apply_to::<ListedB>(ComponentOptions::singleton());
    component().apply_to::<ListedC>(ComponentOptions::singleton());
    component().apply_to::<ListedD>(ComponentOptions::transient());
    let container = Container::new();
    container.set_resolver("listed-resolver", |_| Ok(tessera::value(0u8)), Scope::Request);

    let ours = [
        Key::of::<ListedA>(),
        Key::of::<ListedB>(),
        Key::of::<ListedC>(),
        Key::of::<ListedD>(),
    ];
    let listed = |scope| {
        container
            .list_services(scope)
            .into_iter()
            .filter(|s| ours.contains(&s.key) || s.key == Key::from("listed-resolver"))
            .collect::<Vec<_>>()
    };

    let singletons = listed(Scope::Singleton);
    assert_eq!(singletons.len(), 3);
    assert!(singletons.iter().all(|s| s.scope == Scope::Singleton));

    let transients = listed(Scope::Transient);
    assert_eq!(transients.len(), 1);
    assert_eq!(transients[0].key, Key::of::<ListedD>());

    let requests = listed(Scope::Request);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].key, Key::from("listed-resolver"));
}

#[test]
fn test_tokens_resolve_through_parent() {
    let token = Token::<String>::new("greeting");
    let other = Token::<String>::new("greeting");
    let root = Container::new();
    root.set_value(&token, "hi".to_string()).unwrap();
    let child = root.create_child_container();

    assert_eq!(*child.get_token(&token).unwrap().unwrap(), "hi");
    assert!(child.get_token(&other).unwrap().is_none());
}

#[test]
fn test_resolver_call_counts_per_scope() {
    let root = Container::new();
    let counter = |calls: &Arc<AtomicUsize>| {
        let calls = calls.clone();
        move |_: &Container| -> Result<Value> {
            Ok(tessera::value(calls.fetch_add(1, Ordering::SeqCst)))
        }
    };
    let singleton = Arc::new(AtomicUsize::new(0));
    let transient = Arc::new(AtomicUsize::new(0));
    let request = Arc::new(AtomicUsize::new(0));
    root.set_resolver("singleton", counter(&singleton), Scope::Singleton);
    root.set_resolver("transient", counter(&transient), Scope::Transient);
    root.set_resolver("request", counter(&request), Scope::Request);

    let first = root.create_child_container();
    let second = root.create_child_container();
    for container in [&root, &first, &second] {
        container.get(&Key::from("singleton")).unwrap();
        container.get(&Key::from("transient")).unwrap();
    }
    first.get(&Key::from("request")).unwrap();
    first.get(&Key::from("request")).unwrap();
    second.get(&Key::from("request")).unwrap();

    assert_eq!(singleton.load(Ordering::SeqCst), 1);
    assert_eq!(transient.load(Ordering::SeqCst), 3);
    assert_eq!(request.load(Ordering::SeqCst), 2);
    assert!(matches!(
        root.get(&Key::from("request")),
        Err(TesseraError::ScopeMismatch { .. })
    ));
}

#[derive(Injectable)]
struct Mailer;

#[test]
fn test_component_alias_key() {
    component().apply_to::<Mailer>(ComponentOptions::singleton().with_key("mailer"));
    let container = Container::new();

    let by_alias = container.get_as::<Mailer>("mailer").unwrap().unwrap();
    let by_class = container.resolve::<Mailer>().unwrap();
    assert!(Arc::ptr_eq(&by_alias, &by_class));
}

struct Faceless;

#[tokio::test]
async fn test_alias_without_construction_metadata_fails() {
    component().apply(
        ClassRef::opaque::<Faceless>(),
        ComponentOptions::singleton().with_key("faceless"),
    );
    let container = Container::new();

    assert!(matches!(
        container.get(&Key::from("faceless")),
        Err(TesseraError::NotConstructible { .. })
    ));
    assert!(matches!(
        container.get_async(&Key::from("faceless")).await,
        Err(TesseraError::NotConstructible { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_first_access_builds_once() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    container.set_async_resolver(
        "slow",
        move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, TesseraError>(tessera::value(String::from("slow value")))
            }
        },
        Scope::Singleton,
    );

    let results =
        futures::future::join_all((0..5).map(|_| container.get_async_as::<String>("slow"))).await;
    let values: Vec<Arc<String>> = results
        .into_iter()
        .map(|result| result.unwrap().unwrap())
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
}

#[tokio::test]
async fn test_failed_production_is_retried_once() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    container.set_async_resolver(
        "flaky",
        move |_| {
            let attempt = counted.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    return Err(TesseraError::Custom(anyhow::anyhow!("first attempt fails")));
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, TesseraError>(tessera::value(attempt))
            }
        },
        Scope::Singleton,
    );

    let late = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        container.get_async_as::<usize>("flaky").await
    };
    let (first, second, third) = tokio::join!(
        container.get_async_as::<usize>("flaky"),
        container.get_async_as::<usize>("flaky"),
        late,
    );

    assert!(first.is_err());
    let second = second.unwrap().unwrap();
    let third = third.unwrap().unwrap();
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[derive(Injectable)]
#[injectable(init)]
struct Warm {
    #[injectable(default)]
    ready: AtomicBool,
}

#[async_trait]
impl Initializable for Warm {
    async fn init(&self) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_init_hook_runs_on_async_path() {
    let warmed = Container::new().resolve_async::<Warm>().await.unwrap();
    assert!(warmed.ready.load(Ordering::SeqCst));

    let cold = Container::new().resolve::<Warm>().unwrap();
    assert!(!cold.ready.load(Ordering::SeqCst));
}

#[derive(Injectable)]
struct RequestCtx;

#[derive(Injectable)]
struct Holder {
    ctx: Arc<RequestCtx>,
}

#[derive(Injectable)]
struct PerCall {
    ctx: Arc<RequestCtx>,
}

#[test]
fn test_request_dependency_of_singleton_fails() {
    component().apply_to::<RequestCtx>(ComponentOptions::request());
    component().apply_to::<Holder>(ComponentOptions::singleton());
    component().apply_to::<PerCall>(ComponentOptions::transient());
    let child = Container::new().create_child_container();

    assert!(matches!(
        child.resolve::<Holder>(),
        Err(TesseraError::ScopeMismatch { .. })
    ));

    let per_call = child.resolve::<PerCall>().unwrap();
    let ctx = child.resolve::<RequestCtx>().unwrap();
    assert!(Arc::ptr_eq(&per_call.ctx, &ctx));
}

#[test]
fn test_builder_applies_steps() {
    let container = ContainerBuilder::new()
        .resolve_mode(ResolveMode::Sequential)
        .value("name", "tessera".to_string())
        .resolver(
            "len",
            |c: &Container| {
                let name = c.get_as::<String>("name")?.unwrap_or_default();
                Ok(tessera::value(name.len()))
            },
            Scope::Transient,
        )
        .build()
        .unwrap();

    assert_eq!(container.config().resolve_mode, ResolveMode::Sequential);
    assert_eq!(*container.get_as::<usize>("len").unwrap().unwrap(), 7);
}
