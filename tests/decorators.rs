use std::sync::Arc;
use tessera::decorators::{
    CompoundPayload, Multi, Single, Target, create_decorator, create_method_decorator,
    create_property_decorator,
};
use tessera::reflect::{MethodInfo, extract_method_param_types, extract_method_return_type};
use tessera::{ClassRef, Injectable, invocable};

#[derive(Injectable)]
struct Repository;

#[derive(Injectable)]
struct Orders {
    repository: Arc<Repository>,
    #[property]
    region: Option<String>,
}

#[invocable]
impl Orders {
    fn total(&self, customer: u64, repository: Arc<Repository>) -> u64 {
        let _ = repository;
        customer * 2
    }

    fn region(&self) -> Option<String> {
        self.region.clone()
    }
}

#[test]
fn method_decorator_reads_derived_signatures() {
    let (route, routes) = create_method_decorator(Single, |payload, path: &'static str| {
        (path, payload.params.clone(), payload.return_type)
    });
    route.apply_to::<Orders>("total", "/orders/total");

    let (path, params, returns) = routes
        .get_metadata(ClassRef::opaque::<Orders>(), "total")
        .unwrap();
    assert_eq!(path, "/orders/total");
    assert!(params[0].is::<u64>());
    assert!(params[1].is::<Repository>() && params[1].is_constructible());
    assert!(returns.is::<u64>());
    assert_eq!(extract_method_param_types::<Orders>("total"), params);
    assert!(extract_method_return_type::<Orders>("region").is::<Option<String>>());
}

#[test]
fn property_decorator_sees_declared_type() {
    let (column, columns) =
        create_property_decorator(Multi, |payload, name: &'static str| (name, payload.ty));
    column.apply_to::<Orders>("region", "region_code");
    column.apply_to::<Orders>("region", "region_name");

    let stored = columns
        .get_metadata(ClassRef::of::<Orders>(), "region")
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].0, "region_name");
    assert!(stored[0].1.is::<String>());
    assert_eq!(columns.decorated_properties(ClassRef::of::<Orders>()), vec!["region"]);
}

#[test]
fn compound_decorator_dispatches_by_target_shape() {
    let (tag, tags) = create_decorator(Multi, |payload, label: &'static str| {
        let kind = match payload {
            CompoundPayload::Class(_) => "class",
            CompoundPayload::Method(_) => "method",
            CompoundPayload::Property(_) => "property",
            CompoundPayload::Parameter(_) => "parameter",
        };
        format!("{kind}:{label}")
    });
    let class = ClassRef::of::<Orders>();
    let total = MethodInfo::find::<Orders>("total").unwrap();

    tag.apply(Target::class(class), "entity").unwrap();
    tag.apply(Target::method(class, total), "cached").unwrap();
    tag.apply(Target::property(class, "region"), "indexed").unwrap();
    tag.apply(Target::parameter(class, None, 0), "primary").unwrap();
    tag.apply(Target::parameter(class, Some("total"), 0), "id").unwrap();

    assert_eq!(tags.class.get_value(class).unwrap(), vec!["class:entity"]);
    assert_eq!(tags.method.get_metadata(class, "total").unwrap(), vec!["method:cached"]);
    assert_eq!(tags.property.get_metadata(class, "region").unwrap(), vec!["property:indexed"]);
    assert_eq!(
        tags.parameter.get_parameter_metadata(class, None, 0).unwrap(),
        vec!["parameter:primary"]
    );
    assert_eq!(
        tags.parameter.get_parameter_metadata(class, Some("total"), 0).unwrap(),
        vec!["parameter:id"]
    );
}

#[test]
fn compound_decorator_rejects_unnamed_method() {
    let (tag, _) = create_decorator(Single, |_, (): ()| ());
    let target = Target {
        class: ClassRef::of::<Orders>(),
        member: None,
        slot: Some(tessera::decorators::TargetSlot::Method(MethodInfo::new(
            "total",
            Vec::new(),
            ClassRef::object(),
        ))),
    };

    assert!(tag.apply(target, ()).is_err());
}
