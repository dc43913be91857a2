mod common;

use common::{attrs, FixedBackend, Operation, Outcome};
use modelkit_core::{MemoryBackend, ModelError, ModelType, ModelTypeBuilder};
use serde_json::json;
use std::rc::Rc;

fn with_greeting(builder: ModelTypeBuilder) -> ModelTypeBuilder {
    builder
        .instance_method("greet", |model, args| {
            let name = model.get("name").unwrap_or_default();
            let greeting = args
                .first()
                .and_then(|value| value.as_str())
                .unwrap_or("Hello");
            json!(format!("{greeting}, {}", name.as_str().unwrap_or("stranger")))
        })
        .class_method("member_count", |model_type, _| {
            json!(model_type.collection().len())
        })
}

#[test]
fn instance_methods_see_the_receiving_instance() {
    let people = ModelType::builder("Person").customize(with_greeting).build();
    let ada = people.instantiate(attrs(json!({"name": "Ada"})));
    let anonymous = people.instantiate_empty();

    assert_eq!(ada.call("greet", &[]).unwrap(), json!("Hello, Ada"));
    assert_eq!(
        anonymous.call("greet", &[json!("Hi")]).unwrap(),
        json!("Hi, stranger")
    );
}

#[test]
fn class_methods_see_type_state() {
    let people = ModelType::builder("Person").customize(with_greeting).build();
    people.instantiate_empty().save();
    people.instantiate_empty().save();

    assert_eq!(people.call("member_count", &[]).unwrap(), json!(2));
}

#[test]
fn unknown_instance_method_reports_type_and_name() {
    let people = ModelType::builder("Person").build();
    let person = people.instantiate_empty();

    let err = person.call("greet", &[]).unwrap_err();
    assert_eq!(
        err,
        ModelError::UnknownMethod {
            model: "Person".to_string(),
            method: "greet".to_string(),
        }
    );
    assert_eq!(err.to_string(), "model `Person` has no method `greet`");
}

#[test]
fn instance_and_class_methods_are_separate_namespaces() {
    let people = ModelType::builder("Person").customize(with_greeting).build();
    let person = people.instantiate_empty();

    assert!(person.call("member_count", &[]).is_err());
    assert!(people.call("greet", &[]).is_err());
}

#[test]
fn types_built_from_one_name_are_independent() {
    let first = ModelType::builder("Person").customize(with_greeting).build();
    let second = ModelType::builder("Person").build();

    first.instantiate_empty().save();
    assert_eq!(first.collection().len(), 1);
    assert!(second.collection().is_empty());
    assert!(!second.has_instance_method("greet"));
    assert_eq!(first.name(), second.name());
    assert_ne!(first, second);
}

#[test]
fn instances_keep_their_type() {
    let people = ModelType::builder("Person").build();
    let person = people.instantiate_empty();

    assert_eq!(person.model_type(), Some(people.clone()));
    assert_eq!(person.type_name(), "Person");
}

#[test]
fn dropping_the_type_releases_members_and_backend() {
    let backend = Rc::new(MemoryBackend::new());
    let people = ModelType::builder("Person").backend(backend.clone()).build();
    let member = people.instantiate_empty();
    member.save();
    drop(member);
    assert_eq!(people.collection().len(), 1);

    drop(people);
    assert_eq!(Rc::strong_count(&backend), 1);
}

#[test]
fn instances_outliving_their_type_are_detached() {
    let people = ModelType::builder("Person")
        .validate(|_, errors| errors.add("name", "is required"))
        .instance_method("greet", |_, _| json!("hi"))
        .build();
    let person = people.instantiate(attrs(json!({"name": "Ada"})));
    drop(people);

    assert!(person.model_type().is_none());
    assert_eq!(person.type_name(), "Person");
    assert_eq!(person.get("name"), Some(json!("Ada")));
    assert!(person.valid());
    assert_eq!(
        person.call("greet", &[]).unwrap_err(),
        ModelError::DetachedInstance {
            model: "Person".to_string(),
        }
    );

    let outcome = Outcome::new();
    person.set("name", "Grace").save_with(outcome.callback());
    person.destroy_with(outcome.callback());
    assert_eq!(outcome.results(), vec![false, false]);
    assert_eq!(person.changes(), attrs(json!({"name": "Grace"})));
}

#[test]
fn replaced_backend_receives_operations() {
    let backend = Rc::new(FixedBackend::new(false));
    let people = ModelType::builder("Person")
        .customize(|builder| builder.backend(backend.clone()))
        .build();
    let person = people.instantiate_empty();

    let outcome = Outcome::new();
    person.save_with(outcome.callback());
    person.destroy_with(outcome.callback());

    assert_eq!(backend.calls(), vec![Operation::Save, Operation::Destroy]);
    assert_eq!(outcome.results(), vec![false, false]);
}

#[test]
fn later_registration_replaces_a_method() {
    let people = ModelType::builder("Person")
        .instance_method("kind", |_, _| json!("first"))
        .instance_method("kind", |_, _| json!("second"))
        .build();

    assert_eq!(
        people.instantiate_empty().call("kind", &[]).unwrap(),
        json!("second")
    );
}
