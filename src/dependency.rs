use crate::{
    errors::ResolveError,
    key::{KeyRegistry, ReflectiveKey},
    reflector::{Annotation, Reflector},
    token::{resolve_forward_ref, Token},
    types::TypeInfo,
};

/// Scoping restriction captured from a parameter's annotations.
/// Honored by the injector's hierarchy walk; captured here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    OnlySelf,
    SkipSelf,
}

/// The resolved requirement of one constructor parameter.
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct ReflectiveDependency {
    pub key: ReflectiveKey,
    pub optional: bool,
    pub visibility: Option<Visibility>,
}

impl ReflectiveDependency {
    pub fn from_key(key: ReflectiveKey) -> Self {
        ReflectiveDependency {
            key,
            optional: false,
            visibility: None,
        }
    }
}

/// Dependencies of a registered class's constructor.
///
/// No recorded metadata means a zero-argument constructor. A parameter
/// slot without annotations is always a configuration error, never
/// silently defaulted: the error lists the full parameter pattern with
/// `?` marking the unresolvable slots.
pub fn dependencies_for(
    class: TypeInfo,
    reflector: &Reflector,
    registry: &KeyRegistry,
) -> Result<Vec<ReflectiveDependency>, ResolveError> {
    let Some(params) = reflector.parameters(&class) else {
        return Ok(Vec::new());
    };

    let pattern = describe_params(params);
    if params.iter().any(Option::is_none) {
        return Err(no_annotation(class.type_name, &pattern));
    }

    params
        .iter()
        .map(|slot| extract_token(class.type_name, &pattern, slot.as_deref().unwrap_or(&[]), registry))
        .collect()
}

/// Builds dependency descriptors from an explicit dependency list (the
/// factory-provider case). Each entry runs through the same extraction
/// rule as reflected constructor metadata.
pub fn construct_dependencies(
    target: &str,
    deps: &[Vec<Annotation>],
    registry: &KeyRegistry,
) -> Result<Vec<ReflectiveDependency>, ResolveError> {
    let slots: Vec<Option<Vec<Annotation>>> = deps.iter().cloned().map(Some).collect();
    let pattern = describe_params(&slots);
    deps.iter()
        .map(|annotations| extract_token(target, &pattern, annotations, registry))
        .collect()
}

/// Scans one parameter's annotation list: token-bearing entries set the
/// candidate token (last one wins, so an explicit-inject wrapper
/// overrides a raw type reference), markers set optionality and
/// visibility. The candidate then passes through forward-reference
/// resolution.
fn extract_token(
    target: &str,
    pattern: &str,
    annotations: &[Annotation],
    registry: &KeyRegistry,
) -> Result<ReflectiveDependency, ResolveError> {
    let mut token = None;
    let mut optional = false;
    let mut visibility = None;

    for annotation in annotations {
        match annotation {
            Annotation::Type(class) => token = Some(Token::Class(*class).into()),
            Annotation::Token(injection) => {
                token = Some(Token::Injection(injection.clone()).into())
            }
            Annotation::Literal(value) => token = Some(Token::Literal(value.clone()).into()),
            Annotation::Inject(token_ref) => token = Some(token_ref.clone()),
            Annotation::Optional => optional = true,
            Annotation::OnlySelf => visibility = Some(Visibility::OnlySelf),
            Annotation::SkipSelf => visibility = Some(Visibility::SkipSelf),
        }
    }

    let Some(token_ref) = token else {
        return Err(no_annotation(target, pattern));
    };
    let token = resolve_forward_ref(&token_ref);

    Ok(ReflectiveDependency {
        key: registry.get(&token),
        optional,
        visibility,
    })
}

fn no_annotation(target: &str, pattern: &str) -> ResolveError {
    ResolveError::NoAnnotation {
        class: target.to_string(),
        params: pattern.to_string(),
    }
}

fn describe_params(params: &[Option<Vec<Annotation>>]) -> String {
    params
        .iter()
        .map(describe_slot)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_slot(slot: &Option<Vec<Annotation>>) -> String {
    let Some(annotations) = slot else {
        return "?".to_string();
    };
    for annotation in annotations {
        match annotation {
            Annotation::Type(class) => return class.type_name.to_string(),
            Annotation::Token(injection) => {
                return format!("InjectionToken {}", injection.description())
            }
            Annotation::Literal(value) => return value.clone(),
            Annotation::Inject(token_ref) => return resolve_forward_ref(token_ref).to_string(),
            _ => {}
        }
    }
    "?".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{token::InjectionToken, types::Instance};

    struct Engine;
    struct TurboEngine;
    struct Car;

    fn fixture() -> (Reflector, KeyRegistry) {
        (Reflector::new(), KeyRegistry::new())
    }

    #[test]
    fn no_metadata_means_zero_arguments() {
        let (reflector, registry) = fixture();
        let deps = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn extracts_type_annotations_in_order() {
        let (mut reflector, registry) = fixture();
        reflector.register::<Car, _>(
            vec![
                vec![Annotation::ty::<Engine>()],
                vec![Annotation::ty::<TurboEngine>()],
            ],
            |_args| Ok(Instance::new(Car)),
        );

        let deps = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].key.token, Token::of::<Engine>());
        assert_eq!(deps[1].key.token, Token::of::<TurboEngine>());
        assert!(!deps[0].optional);
        assert!(deps[0].visibility.is_none());
    }

    #[test]
    fn inject_wrapper_overrides_the_type_reference() {
        let (mut reflector, registry) = fixture();
        reflector.register::<Car, _>(
            vec![vec![
                Annotation::ty::<Engine>(),
                Annotation::inject(Token::of::<TurboEngine>()),
            ]],
            |_args| Ok(Instance::new(Car)),
        );

        let deps = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap();
        assert_eq!(deps[0].key.token, Token::of::<TurboEngine>());
    }

    #[test]
    fn literal_annotations_set_a_literal_token() {
        let (mut reflector, registry) = fixture();
        reflector.register::<Car, _>(vec![vec![Annotation::literal("fuel")]], |_args| {
            Ok(Instance::new(Car))
        });

        let deps = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap();
        assert_eq!(deps[0].key.token, Token::literal("fuel"));
    }

    #[test]
    fn markers_set_optionality_and_visibility() {
        let (mut reflector, registry) = fixture();
        reflector.register::<Car, _>(
            vec![
                vec![Annotation::ty::<Engine>(), Annotation::Optional],
                vec![Annotation::ty::<TurboEngine>(), Annotation::SkipSelf],
            ],
            |_args| Ok(Instance::new(Car)),
        );

        let deps = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap();
        assert!(deps[0].optional);
        assert_eq!(deps[1].visibility, Some(Visibility::SkipSelf));
    }

    #[test]
    fn forward_referenced_tokens_resolve_late() {
        let (mut reflector, registry) = fixture();
        reflector.register::<Car, _>(
            vec![vec![Annotation::inject_forward(Token::of::<Engine>)]],
            |_args| Ok(Instance::new(Car)),
        );

        let deps = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap();
        assert_eq!(deps[0].key.token, Token::of::<Engine>());
    }

    #[test]
    fn partially_annotated_class_is_rejected() {
        let (mut reflector, registry) = fixture();
        reflector.register_raw::<Car, _>(
            Some(vec![Some(vec![Annotation::ty::<Engine>()]), None]),
            |_args| Ok(Instance::new(Car)),
        );

        let error = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap_err();
        match error {
            ResolveError::NoAnnotation { class, params } => {
                assert!(class.contains("Car"));
                assert!(params.ends_with("?"));
            }
            other => panic!("expected NoAnnotation, got {other:?}"),
        }
    }

    #[test]
    fn marker_only_slot_has_no_token() {
        let (mut reflector, registry) = fixture();
        reflector.register::<Car, _>(vec![vec![Annotation::Optional]], |_args| {
            Ok(Instance::new(Car))
        });

        let error = dependencies_for(TypeInfo::of::<Car>(), &reflector, &registry).unwrap_err();
        assert!(matches!(error, ResolveError::NoAnnotation { .. }));
    }

    #[test]
    fn explicit_deps_reuse_the_extraction_rule() {
        let (_, registry) = fixture();
        let token = InjectionToken::new("Config");
        let deps = construct_dependencies(
            "make_service",
            &[
                vec![Annotation::token(token.clone())],
                vec![Annotation::ty::<Engine>(), Annotation::Optional],
            ],
            &registry,
        )
        .unwrap();

        assert_eq!(deps[0].key.token, Token::Injection(token));
        assert!(deps[1].optional);
    }
}
