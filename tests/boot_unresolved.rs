use tessera::di::{ComponentOptions, component};
use tessera::prelude::*;

struct Plain;

#[derive(Injectable)]
struct Built;

#[tokio::test]
async fn test_unbuildable_singleton_stops_startup() {
    component().apply(ClassRef::opaque::<Plain>(), ComponentOptions::singleton());
    let container = Container::new();

    match Runner::new(container).start().await {
        Err(TesseraError::DependencyNotFound { type_name }) => {
            assert!(type_name.contains("Plain"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(started) => panic!("startup reported {started} services"),
    }
}

#[tokio::test]
async fn test_opaque_registration_keeps_component_buildable() {
    component().apply(
        ClassRef::opaque::<Built>(),
        ComponentOptions::transient().with_key("built"),
    );
    component().apply_to::<Built>(ComponentOptions::transient().with_key("built"));
    let container = Container::new();

    assert!(container.get_async_as::<Built>("built").await.unwrap().is_some());
    assert!(container.resolve::<Built>().is_ok());
}
