use std::sync::Arc;

use reflective_di::{
    Annotation, DynError, Injectable, Instance, KeyRegistry, Provider, Reflector,
    ReflectiveDependencyResolver, ReflectiveInjector, Token, TypeInfo,
};

struct Engine;
struct TurboEngine;
struct DashboardSoftware;
struct Dashboard {
    _software: Arc<DashboardSoftware>,
}
struct CarWithDashboard {
    _engine: Arc<Engine>,
    _dashboard: Arc<Dashboard>,
}
struct CarWithOptionalEngine {
    engine: Option<Arc<Engine>>,
}
struct CarWithInject {
    _engine: Arc<TurboEngine>,
}

fn take<T: Injectable>(args: &mut Vec<Option<Instance>>, index: usize) -> Result<Arc<T>, DynError> {
    let instance = args
        .get_mut(index)
        .and_then(Option::take)
        .ok_or_else(|| format!("missing argument {index}"))?;
    instance
        .downcast::<T>()
        .map_err(|actual| format!("argument {index} had type {actual}").into())
}

fn reflector() -> Reflector {
    let mut reflector = Reflector::new();
    reflector.register::<Engine, _>(Vec::new(), |_args| Ok(Instance::new(Engine)));
    reflector.register::<TurboEngine, _>(Vec::new(), |_args| Ok(Instance::new(TurboEngine)));
    reflector.register::<DashboardSoftware, _>(Vec::new(), |_args| {
        Ok(Instance::new(DashboardSoftware))
    });
    reflector.register::<Dashboard, _>(
        vec![vec![Annotation::ty::<DashboardSoftware>()]],
        |mut args| {
            let software = take::<DashboardSoftware>(&mut args, 0)?;
            Ok(Instance::new(Dashboard {
                _software: software,
            }))
        },
    );
    reflector.register::<CarWithDashboard, _>(
        vec![
            vec![Annotation::ty::<Engine>()],
            vec![Annotation::ty::<Dashboard>()],
        ],
        |mut args| {
            let engine = take::<Engine>(&mut args, 0)?;
            let dashboard = take::<Dashboard>(&mut args, 1)?;
            Ok(Instance::new(CarWithDashboard {
                _engine: engine,
                _dashboard: dashboard,
            }))
        },
    );
    reflector.register::<CarWithOptionalEngine, _>(
        vec![vec![Annotation::ty::<Engine>(), Annotation::Optional]],
        |mut args| {
            let engine = args
                .get_mut(0)
                .and_then(Option::take)
                .and_then(|instance| instance.downcast::<Engine>().ok());
            Ok(Instance::new(CarWithOptionalEngine { engine }))
        },
    );
    reflector.register::<CarWithInject, _>(
        vec![vec![Annotation::inject(Token::of::<TurboEngine>())]],
        |mut args| {
            let engine = take::<TurboEngine>(&mut args, 0)?;
            Ok(Instance::new(CarWithInject { _engine: engine }))
        },
    );
    reflector
}

fn create_injector(
    classes: &[TypeInfo],
    reflector: &Reflector,
    registry: Arc<KeyRegistry>,
) -> ReflectiveInjector {
    let providers = classes.iter().copied().map(Provider::Type).collect();
    ReflectiveInjector::resolve_and_create(providers, reflector, registry).unwrap()
}

#[test]
fn resolves_direct_dependencies() {
    let reflector = reflector();
    let registry = Arc::new(KeyRegistry::new());
    let deps =
        ReflectiveDependencyResolver::resolve(&[TypeInfo::of::<Dashboard>()], &reflector, &registry)
            .unwrap();

    assert_eq!(
        deps,
        vec![
            TypeInfo::of::<Dashboard>(),
            TypeInfo::of::<DashboardSoftware>()
        ]
    );

    let injector = create_injector(&deps, &reflector, registry);
    assert!(injector.require::<Dashboard>().is_ok());
}

#[test]
fn resolves_dependencies_of_dependencies() {
    let reflector = reflector();
    let registry = Arc::new(KeyRegistry::new());
    let deps = ReflectiveDependencyResolver::resolve(
        &[TypeInfo::of::<CarWithDashboard>()],
        &reflector,
        &registry,
    )
    .unwrap();

    assert_eq!(
        deps,
        vec![
            TypeInfo::of::<CarWithDashboard>(),
            TypeInfo::of::<Engine>(),
            TypeInfo::of::<Dashboard>(),
            TypeInfo::of::<DashboardSoftware>(),
        ]
    );

    let injector = create_injector(&deps, &reflector, registry);
    assert!(injector.require::<CarWithDashboard>().is_ok());
}

#[test]
fn resolves_optional_dependencies() {
    let reflector = reflector();
    let registry = Arc::new(KeyRegistry::new());
    let deps = ReflectiveDependencyResolver::resolve(
        &[TypeInfo::of::<CarWithOptionalEngine>()],
        &reflector,
        &registry,
    )
    .unwrap();

    // Optional edges are still enumerated
    assert_eq!(
        deps,
        vec![
            TypeInfo::of::<CarWithOptionalEngine>(),
            TypeInfo::of::<Engine>()
        ]
    );

    let injector = create_injector(&deps, &reflector, registry);
    let car = injector.require::<CarWithOptionalEngine>().unwrap();
    assert!(car.engine.is_some());
}

#[test]
fn resolves_re_provided_dependencies() {
    let reflector = reflector();
    let registry = Arc::new(KeyRegistry::new());
    let deps = ReflectiveDependencyResolver::resolve(
        &[TypeInfo::of::<CarWithInject>()],
        &reflector,
        &registry,
    )
    .unwrap();

    assert_eq!(
        deps,
        vec![TypeInfo::of::<CarWithInject>(), TypeInfo::of::<TurboEngine>()]
    );

    let injector = create_injector(&deps, &reflector, registry);
    assert!(injector.require::<CarWithInject>().is_ok());
}
