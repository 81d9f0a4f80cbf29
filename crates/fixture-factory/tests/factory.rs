//! Integration tests for building, persisting and cleaning up fixtures.
//!
//! These tests cover:
//! - Attribute generation from definitions and overrides
//! - Pending/saved tracking through `instance`, `create` and `seed`
//! - Save failures, callbacks and the double save around them
//! - Reverse-order cleanup with aggregated delete failures
//! - Group resolution and relations between models

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{Post, Tag, User, blog_factory, name_of, record_factory};
use fixture_factory::prelude::*;
use fixture_factory::InstanceId;
use rstest::rstest;

/// Asserts the tracker invariants for one instance.
fn assert_consistent(factory: &Factory, instance: &Instance) {
    assert_eq!(
        factory.is_pending_or_saved(instance),
        factory.is_pending(instance) || factory.is_saved(instance)
    );
    assert!(!(factory.is_pending(instance) && factory.is_saved(instance)));
}

fn ids(instances: &[Instance]) -> Vec<InstanceId> {
    instances.iter().map(Instance::id).collect()
}

#[test]
fn test_create_assigns_dispatched_values() {
    let mut factory = record_factory();
    factory.register_generator(
        "slug",
        |_: &mut Factory, descriptor: &Descriptor, _: &Instance| -> fixture_factory::Result<Value> {
            Ok(Value::from(format!("slug-{}", descriptor.arg(0).unwrap_or("none"))))
        },
    );
    factory.define(
        "Page",
        attributes! {
            "a" => Kind::literal(42),
            "b" => "slug|intro",
            "c" => Kind::invocable(|page: &Instance, _: &mut Faker| {
                page.get("a").and_then(|a| a.as_i64()).unwrap_or_default() + 1
            }),
        },
    );

    let page = factory.create("Page").unwrap();

    assert_eq!(page.get("a"), Some(Value::from(42)));
    assert_eq!(page.get("b"), Some(Value::from("slug-intro")));
    assert_eq!(page.get("c"), Some(Value::from(43)));
}

#[test]
fn test_typed_models_receive_generated_attributes() {
    let mut factory = blog_factory();

    let user = factory.create("User").unwrap();
    let (name, email, role, saves) = user
        .with(|u: &User| (u.name.clone(), u.email.clone(), u.role.clone(), u.saves))
        .unwrap();

    assert!(!name.is_empty());
    assert!(email.contains('@'));
    assert_eq!(role, "member");
    assert_eq!(saves, 1);
}

#[test]
fn test_attributes_for_returns_assigned_values() {
    let mut factory = blog_factory();
    let user = factory.instance("User").unwrap();
    let before = user.with(|u: &User| u.email.clone()).unwrap();

    let assigned = factory
        .attributes_for(&user, &attributes! { "role" => Kind::literal("admin") })
        .unwrap();

    let keys: Vec<_> = assigned.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["name", "email", "role"]);
    assert_eq!(assigned["role"], Value::from("admin"));

    let after = user.with(|u: &User| u.email.clone()).unwrap();
    assert_ne!(before, after, "unique emails are regenerated");
    assert_eq!(assigned["email"], Value::from(after));
}

#[test]
fn test_create_is_saved_and_instance_is_untracked() {
    let mut factory = blog_factory();

    let created = factory.create("Tag").err();
    assert!(matches!(
        created,
        Some(FactoryError::SaveMethodNotFound { ref model, ref method })
            if model == "Tag" && method == "save"
    ));

    let user = factory.create("User").unwrap();
    assert!(factory.is_saved(&user));
    assert!(!factory.is_pending(&user));
    assert!(factory.saved().contains(&user));
    assert!(!factory.pending().contains(&user));

    let draft = factory.instance("User").unwrap();
    assert!(!factory.saved().contains(&draft));
    assert!(!factory.pending().contains(&draft));
    assert!(!factory.is_pending_or_saved(&draft));
}

#[test]
fn test_tracker_states_are_exclusive() {
    let mut factory = blog_factory();

    let untracked = factory.instance("User").unwrap();
    let saved = factory.create("User").unwrap();
    let _ = factory.create_with("Post", &attributes! { "title" => Kind::literal("") });
    let pending = factory.pending().pop().unwrap();

    for instance in [&untracked, &saved, &pending] {
        assert_consistent(&factory, instance);
    }
    assert!(factory.is_pending(&pending));
    assert!(factory.is_saved(&saved));
}

#[test]
fn test_failed_save_stays_pending() {
    let mut factory = blog_factory();

    let error = factory
        .create_with("Post", &attributes! { "title" => Kind::literal("") })
        .unwrap_err();

    let FactoryError::SaveFailed { model, instance, errors } = &error else {
        panic!("expected SaveFailed, got {error:?}");
    };
    assert_eq!(model, "Post");
    assert_eq!(errors.as_deref(), Some("title can't be blank"));
    assert!(error.to_string().contains("title can't be blank"));

    let pending = factory.pending();
    assert_eq!(ids(&pending), vec![*instance]);
    assert!(factory.saved().iter().all(|saved| saved.id() != *instance));
}

#[test]
fn test_custom_saver_failure() {
    let mut factory = record_factory();
    factory
        .define("Item", attributes! { "name" => "word" })
        .set_custom_saver(|_: &Instance| false);

    assert!(matches!(
        factory.create("Item"),
        Err(FactoryError::SaveFailed { errors: None, .. })
    ));
    assert_eq!(factory.pending().len(), 1);
    assert!(factory.saved().is_empty());
}

#[test]
fn test_seed_creates_distinct_instances_in_order() {
    let mut factory = blog_factory();

    let users = factory.seed(3, "User").unwrap();

    assert_eq!(users.len(), 3);
    assert_ne!(users[0], users[1]);
    assert_ne!(users[1], users[2]);
    assert_ne!(users[0], users[2]);
    assert_eq!(ids(&factory.saved()), ids(&users));

    let emails: Vec<_> = users
        .iter()
        .map(|u| u.with(|u: &User| u.email.clone()).unwrap())
        .collect();
    assert_ne!(emails[0], emails[1]);
    assert_ne!(emails[1], emails[2]);
}

#[test]
fn test_seed_stops_at_first_failure() {
    let mut factory = record_factory();
    let saves = Rc::new(Cell::new(0));
    let counter = saves.clone();
    factory
        .define("Item", attributes! { "name" => "word" })
        .set_custom_saver(move |_: &Instance| {
            counter.set(counter.get() + 1);
            counter.get() < 2
        });

    assert!(matches!(factory.seed(5, "Item"), Err(FactoryError::SaveFailed { .. })));
    assert_eq!(saves.get(), 2);
    assert_eq!(factory.saved().len(), 1);
    assert_eq!(factory.pending().len(), 1);
}

#[test]
fn test_delete_saved_in_reverse_order() {
    let mut factory = record_factory();
    factory.define("Item", attributes! { "name" => Kind::literal("") });

    let created: Vec<Instance> = ["o1", "o2", "o3"]
        .into_iter()
        .map(|name| {
            factory
                .create_with("Item", &attributes! { "name" => Kind::literal(name) })
                .unwrap()
        })
        .collect();

    let attempts = Rc::new(RefCell::new(Vec::new()));
    let log = attempts.clone();
    factory.set_custom_deleter(move |instance: &Instance| {
        let name = name_of(instance);
        let deleted = name != "o2";
        log.borrow_mut().push(name);
        deleted
    });

    let error = factory.delete_saved().unwrap_err();

    assert_eq!(*attempts.borrow(), vec!["o3", "o2", "o1"]);
    assert!(factory.saved().is_empty());

    let failures = error.failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        FactoryError::DeleteFailed { model, instance }
            if model == "Item" && *instance == created[1].id()
    ));
}

#[test]
fn test_delete_saved_collects_missing_method() {
    let mut factory = blog_factory();
    factory.set_delete_method("destroy");
    factory.seed(2, "User").unwrap();

    let error = factory.delete_saved().unwrap_err();

    assert_eq!(error.failures().len(), 2);
    assert!(error.failures().iter().all(|e| matches!(
        e,
        FactoryError::DeleteMethodNotFound { method, .. } if method == "destroy"
    )));
    assert!(factory.saved().is_empty());
}

#[test]
fn test_delete_saved_success_is_chainable() {
    let mut factory = blog_factory();
    let users = factory.seed(2, "User").unwrap();

    factory.delete_saved().unwrap().delete_saved().unwrap();

    assert!(factory.saved().is_empty());
    for user in users {
        assert!(user.with(|u: &User| u.deleted).unwrap());
    }
}

#[test]
fn test_callback_saves_twice() {
    let mut factory = record_factory();
    let saves = Rc::new(Cell::new(0));
    let counter = saves.clone();
    factory
        .define_with_callback(
            "Item",
            attributes! { "name" => Kind::literal("before") },
            |item: &Instance, persisted: bool| {
                assert!(persisted);
                item.set("name", Value::from("after")).unwrap();
            },
        )
        .set_custom_saver(move |_: &Instance| {
            counter.set(counter.get() + 1);
            true
        });

    let item = factory.create("Item").unwrap();

    assert_eq!(saves.get(), 2);
    assert_eq!(name_of(&item), "after");
    assert!(factory.is_saved(&item));
}

#[test]
fn test_failed_save_after_callback_stays_saved() {
    let mut factory = record_factory();
    let saves = Rc::new(Cell::new(0));
    let counter = saves.clone();
    factory
        .define_with_callback(
            "Item",
            attributes! { "name" => Kind::literal("x") },
            |_: &Instance, _: bool| {},
        )
        .set_custom_saver(move |_: &Instance| {
            counter.set(counter.get() + 1);
            counter.get() < 2
        });

    let error = factory.create("Item").unwrap_err();

    assert_eq!(saves.get(), 2);
    let saved = factory.saved();
    assert_eq!(saved.len(), 1);
    assert!(factory.pending().is_empty());
    assert!(matches!(
        &error,
        FactoryError::SaveFailed { model, instance, .. }
            if model == "Item" && *instance == saved[0].id()
    ));

    let deleted = Rc::new(RefCell::new(Vec::new()));
    let log = deleted.clone();
    factory.set_custom_deleter(move |instance: &Instance| {
        log.borrow_mut().push(instance.id());
        true
    });
    factory.delete_saved().unwrap();

    assert_eq!(*deleted.borrow(), ids(&saved));
    assert!(factory.saved().is_empty());
}

#[test]
fn test_without_callback_saves_once() {
    let mut factory = blog_factory();
    let user = factory.create("User").unwrap();
    assert_eq!(user.with(|u: &User| u.saves).unwrap(), 1);
}

#[test]
fn test_undefined_model_leaves_tracker_unchanged() {
    let mut factory = blog_factory();
    factory.create("User").unwrap();
    let pending = ids(&factory.pending());
    let saved = ids(&factory.saved());

    assert!(matches!(
        factory.create("Comment"),
        Err(FactoryError::NoDefinedFactory(model)) if model == "Comment"
    ));
    assert_eq!(ids(&factory.pending()), pending);
    assert_eq!(ids(&factory.saved()), saved);
}

#[test]
fn test_unregistered_type_is_model_not_found() {
    let mut factory = Factory::new();
    factory.define("Ghost", Attributes::new());

    assert!(matches!(
        factory.instance("Ghost"),
        Err(FactoryError::ModelNotFound(name)) if name == "Ghost"
    ));
}

#[test]
fn test_grouped_definition_without_bare_type() {
    let mut factory = blog_factory();
    factory.define(
        "featured:Post",
        attributes! { "title" => Kind::literal("Featured"), "published" => Kind::literal(true) },
    );

    let post = factory.create("featured:Post").unwrap();

    assert_eq!(post.model_id(), "featured:Post");
    let (title, published, author) = post
        .with(|p: &Post| (p.title.clone(), p.published, p.author_id))
        .unwrap();
    assert_eq!(title, "Featured");
    assert!(published);
    assert!(author.is_some(), "bare Post attributes are inherited");

    let mut bare = record_factory();
    bare.define("archived:Note", attributes! { "name" => Kind::literal("old") });
    let note = bare.create("archived:Note").unwrap();
    assert_eq!(name_of(&note), "old");
    assert!(matches!(
        bare.create("Note"),
        Err(FactoryError::NoDefinedFactory(model)) if model == "Note"
    ));
}

#[test]
fn test_grouped_callback_overrides_bare_callback() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut factory = record_factory();

    let bare = seen.clone();
    factory.define_with_callback("Item", Attributes::new(), move |_: &Instance, _: bool| {
        bare.borrow_mut().push("bare");
    });
    let grouped = seen.clone();
    factory.define_with_callback("big:Item", Attributes::new(), move |_: &Instance, _: bool| {
        grouped.borrow_mut().push("grouped");
    });
    factory.define("small:Item", Attributes::new());

    factory.instance("Item").unwrap();
    factory.instance("big:Item").unwrap();
    factory.instance("small:Item").unwrap();

    assert_eq!(*seen.borrow(), vec!["bare", "grouped", "bare"]);
}

#[test]
fn test_relation_is_created_before_owner() {
    let mut factory = blog_factory();

    let post = factory.create("Post").unwrap();

    let saved = factory.saved();
    assert_eq!(saved.len(), 2);
    assert!(saved[0].is::<User>());
    assert_eq!(saved[1], post);

    let author_id = post.with(|p: &Post| p.author_id).unwrap();
    assert_eq!(author_id, saved[0].with(|u: &User| u.id).unwrap());
}

#[test]
fn test_relation_is_only_built_for_instances() {
    let mut factory = blog_factory();

    let post = factory.instance("Post").unwrap();

    assert!(factory.saved().is_empty());
    assert!(factory.pending().is_empty());
    assert_eq!(post.with(|p: &Post| p.author_id).unwrap(), None);
}

#[test]
fn test_relation_without_primary_key_keeps_handle() {
    let mut factory = record_factory();
    factory
        .define("Author", attributes! { "name" => Kind::literal("Ada") })
        .define("Book", attributes! { "author" => Kind::factory("Author") });

    let book = factory.instance("Book").unwrap();

    let author = book.get("author").unwrap();
    let author = author.as_instance().unwrap();
    assert_eq!(author.model_id(), "Author");
    assert_eq!(name_of(author), "Ada");
}

#[test]
fn test_custom_setter_and_save_method() {
    let mut factory = blog_factory();
    let assigned = Rc::new(RefCell::new(Vec::new()));
    let log = assigned.clone();
    factory
        .set_custom_setter(move |instance: &Instance, name: &str, value: Value| {
            log.borrow_mut().push(name.to_string());
            instance.set(name, value).map_err(|source| FactoryError::Attribute {
                model: instance.model_id().to_string(),
                source,
            })
        })
        .set_save_method("publish");

    assert!(matches!(
        factory.create("User"),
        Err(FactoryError::SaveMethodNotFound { method, .. }) if method == "publish"
    ));
    assert_eq!(*assigned.borrow(), vec!["name", "email", "role"]);
    assert_eq!(factory.config().save_method, "publish");
}

#[test]
fn test_unknown_attribute_aborts_build() {
    let mut factory = blog_factory();

    let error = factory
        .instance_with("Tag", &attributes! { "colour" => Kind::literal("red") })
        .unwrap_err();

    assert!(matches!(
        &error,
        FactoryError::Attribute { model, source: AttributeError::Unknown(name) }
            if model == "Tag" && name == "colour"
    ));
    assert!(factory.instance("Tag").unwrap().is::<Tag>());
}

#[rstest]
#[case(Locale::En)]
#[case(Locale::FrFr)]
#[case(Locale::PtBr)]
#[case(Locale::JaJp)]
#[case(Locale::ZhCn)]
#[case(Locale::ZhTw)]
fn test_localized_generation(#[case] locale: Locale) {
    let mut factory = record_factory();
    factory
        .set_locale(locale)
        .define("Person", attributes! { "name" => "name", "city" => "city" });

    let person = factory.instance("Person").unwrap();

    assert_eq!(factory.faker().locale(), locale);
    assert!(!name_of(&person).is_empty());
    assert!(person.get("city").and_then(Value::into_string).is_some());
}

#[test]
fn test_same_seed_reproduces_values() {
    let build = || {
        let mut factory = record_factory();
        factory.define("Person", attributes! { "name" => "name", "age" => "number|18;90" });
        let person = factory.instance("Person").unwrap();
        (person.get("name"), person.get("age"))
    };

    assert_eq!(build(), build());
}

#[test]
fn test_optional_yields_some_nulls() {
    let mut factory = record_factory();
    factory.define("Person", attributes! { "nickname" => "optional:first_name" });

    let values: Vec<Value> = (0..64)
        .map(|_| factory.instance("Person").unwrap().get("nickname").unwrap())
        .collect();

    assert!(values.iter().any(Value::is_null));
    assert!(values.iter().any(|v| v.as_str().is_some()));
}
