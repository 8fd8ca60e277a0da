//! End-to-end execution scenarios.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use engine_value::{ConstValue, Variables};
use futures_util::{stream, Stream, StreamExt};
use serde_json::json;

use crate::{
    executor::{execute, execute_sync, subscribe, ExecutionArgs},
    registry::{
        FieldFuture, InterfaceType, MetaField, MetaInputValue, ObjectType, Registry,
    },
    validation::test_harness::parse,
};

fn value(json: serde_json::Value) -> ConstValue {
    ConstValue::from_json(json)
}

async fn run(registry: &Registry, query: &str, root: serde_json::Value) -> serde_json::Value {
    run_with(registry, query, root, Variables::default(), None).await
}

async fn run_with(
    registry: &Registry,
    query: &str,
    root: serde_json::Value,
    variables: Variables,
    operation_name: Option<&str>,
) -> serde_json::Value {
    let document = parse(query);
    let root = value(root);
    let response = execute(ExecutionArgs {
        operation_name,
        variable_values: variables,
        root_value: Some(&root),
        ..ExecutionArgs::new(registry, &document)
    })
    .await;
    response.into_value()
}

fn hello_registry() -> Registry {
    Registry::builder("Query")
        .register(ObjectType::new("Query").field(MetaField::new("hello", "String")))
        .build()
        .unwrap()
}

#[tokio::test]
async fn hello_world() {
    let registry = hello_registry();
    let response = run(&registry, "{ hello }", json!({ "hello": "world" })).await;
    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "hello": "world"
      }
    }
    "###);
}

#[tokio::test]
async fn aliases_keep_selection_order() {
    let registry = hello_registry();
    let response = run(&registry, "{ a: hello b: hello }", json!({ "hello": "world" })).await;
    assert_eq!(response, json!({ "data": { "a": "world", "b": "world" } }));
    let keys: Vec<_> = response["data"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, ["a", "b"]);
}

#[tokio::test]
async fn non_null_violation_nulls_the_response() {
    let registry = Registry::builder("Query")
        .register(ObjectType::new("Query").field(MetaField::new("x", "String!")))
        .build()
        .unwrap();
    let response = run(&registry, "{ x }", json!({ "x": null })).await;
    assert_eq!(response["data"], json!(null));
    assert_eq!(
        response["errors"][0]["message"],
        json!("Cannot return null for non-nullable field Query.x.")
    );
    assert_eq!(response["errors"][0]["path"], json!(["x"]));
}

#[tokio::test]
async fn null_stops_at_the_nearest_nullable_ancestor() {
    let registry = Registry::builder("Query")
        .register(ObjectType::new("Query").field(MetaField::new("outer", "Outer")))
        .register(ObjectType::new("Outer").field(MetaField::new("inner", "String!")))
        .build()
        .unwrap();
    let response = run(
        &registry,
        "{ outer { inner } }",
        json!({ "outer": { "inner": null } }),
    )
    .await;
    assert_eq!(response["data"], json!({ "outer": null }));
    assert_eq!(response["errors"].as_array().unwrap().len(), 1);
    assert_eq!(response["errors"][0]["path"], json!(["outer", "inner"]));
}

#[tokio::test]
async fn mutation_fields_run_serially() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let log_a = Arc::clone(&log);
    let log_b = Arc::clone(&log);
    let registry = Registry::builder("Query")
        .mutation_type("Mutation")
        .register(ObjectType::new("Query").field(MetaField::new("ok", "Boolean")))
        .register(
            ObjectType::new("Mutation")
                .field(MetaField::new("a", "String").resolver(move |_ctx| {
                    let log = Arc::clone(&log_a);
                    FieldFuture::new(async move {
                        log.lock().unwrap().push("a:start");
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        log.lock().unwrap().push("a:end");
                        Ok(Some(ConstValue::String("a".into())))
                    })
                }))
                .field(MetaField::new("b", "String").resolver(move |_ctx| {
                    let log = Arc::clone(&log_b);
                    FieldFuture::new(async move {
                        log.lock().unwrap().push("b:start");
                        log.lock().unwrap().push("b:end");
                        Ok(Some(ConstValue::String("b".into())))
                    })
                })),
        )
        .build()
        .unwrap();

    let response = run(&registry, "mutation { a b }", json!(null)).await;
    assert_eq!(response, json!({ "data": { "a": "a", "b": "b" } }));
    assert_eq!(
        *log.lock().unwrap(),
        ["a:start", "a:end", "b:start", "b:end"]
    );
}

#[tokio::test]
async fn skip_and_include_combine() {
    let registry = hello_registry();
    let response = run(
        &registry,
        r#"{
            hello @skip(if: true) @include(if: true)
            kept: hello @skip(if: false) @include(if: true)
        }"#,
        json!({ "hello": "world" }),
    )
    .await;
    assert_eq!(response, json!({ "data": { "kept": "world" } }));
}

#[tokio::test]
async fn list_items_complete_with_index_paths() {
    let registry = Registry::builder("Query")
        .register(
            ObjectType::new("Query")
                .field(MetaField::new("nums", "[Int!]"))
                .field(MetaField::new("sparse", "[Int]")),
        )
        .build()
        .unwrap();

    // A null inside `[Int!]` nulls the whole list and records the index.
    let response = run(&registry, "{ nums }", json!({ "nums": [1, null, 3] })).await;
    assert_eq!(response["data"], json!({ "nums": null }));
    assert_eq!(response["errors"][0]["path"], json!(["nums", 1]));

    // A null inside `[Int]` is just a null item.
    let response = run(&registry, "{ sparse }", json!({ "sparse": [1, null, 3] })).await;
    assert_eq!(response, json!({ "data": { "sparse": [1, null, 3] } }));
}

#[tokio::test]
async fn async_resolvers_join_concurrently() {
    let registry = Registry::builder("Query")
        .register(
            ObjectType::new("Query")
                .field(MetaField::new("slow", "Int").resolver(|_ctx| {
                    FieldFuture::new(async {
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok(Some(value(json!(1))))
                    })
                }))
                .field(
                    MetaField::new("fast", "Int")
                        .resolver(|_ctx| FieldFuture::from_value(Some(value(json!(2))))),
                ),
        )
        .build()
        .unwrap();
    let response = run(&registry, "{ slow fast }", json!(null)).await;
    assert_eq!(response, json!({ "data": { "slow": 1, "fast": 2 } }));
}

#[tokio::test]
async fn abstract_types_resolve_through_typename() {
    let registry = Registry::builder("Query")
        .register(ObjectType::new("Query").field(MetaField::new("pet", "Pet")))
        .register(InterfaceType::new("Pet").field(MetaField::new("name", "String")))
        .register(
            ObjectType::new("Dog")
                .implement("Pet")
                .field(MetaField::new("name", "String"))
                .field(MetaField::new("barkVolume", "Int")),
        )
        .register(
            ObjectType::new("Cat")
                .implement("Pet")
                .field(MetaField::new("name", "String")),
        )
        .build()
        .unwrap();
    let response = run(
        &registry,
        r#"{ pet { name __typename ... on Dog { barkVolume } } }"#,
        json!({ "pet": { "__typename": "Dog", "name": "Rex", "barkVolume": 11 } }),
    )
    .await;
    assert_eq!(
        response,
        json!({ "data": { "pet": { "name": "Rex", "__typename": "Dog", "barkVolume": 11 } } })
    );
}

#[tokio::test]
async fn arguments_apply_defaults_and_variables() {
    let registry = Registry::builder("Query")
        .register(
            ObjectType::new("Query").field(
                MetaField::new("echo", "String")
                    .argument(
                        MetaInputValue::new("word", "String")
                            .default_value(ConstValue::String("default".into())),
                    )
                    .resolver(|ctx| {
                        FieldFuture::Value(ctx.arg("word").cloned())
                    }),
            ),
        )
        .build()
        .unwrap();

    let response = run(&registry, "{ echo }", json!(null)).await;
    assert_eq!(response, json!({ "data": { "echo": "default" } }));

    let response = run_with(
        &registry,
        "query ($w: String) { echo(word: $w) }",
        json!(null),
        Variables::from_json(json!({ "w": "hi" })),
        None,
    )
    .await;
    assert_eq!(response, json!({ "data": { "echo": "hi" } }));
}

#[tokio::test]
async fn variable_coercion_failure_has_no_data_key() {
    let registry = Registry::builder("Query")
        .register(
            ObjectType::new("Query").field(
                MetaField::new("echo", "Int")
                    .argument(MetaInputValue::new("n", "Int!")),
            ),
        )
        .build()
        .unwrap();
    let response = run_with(
        &registry,
        "query ($n: Int!) { echo(n: $n) }",
        json!(null),
        Variables::default(),
        None,
    )
    .await;
    assert!(response.get("data").is_none());
    assert_eq!(
        response["errors"][0]["message"],
        json!("Variable \"$n\" of required type \"Int!\" was not provided.")
    );
}

#[tokio::test]
async fn operation_selection_rules() {
    let registry = hello_registry();
    let document = parse("query A { hello } query B { hello }");
    let root = value(json!({ "hello": "world" }));

    let response = execute(ExecutionArgs {
        root_value: Some(&root),
        ..ExecutionArgs::new(&registry, &document)
    })
    .await;
    assert_eq!(
        response.errors[0].message,
        "Must provide operation name if query contains multiple operations."
    );

    let response = execute(ExecutionArgs {
        operation_name: Some("C"),
        root_value: Some(&root),
        ..ExecutionArgs::new(&registry, &document)
    })
    .await;
    assert_eq!(response.errors[0].message, "Unknown operation named \"C\".");

    let response = execute(ExecutionArgs {
        operation_name: Some("B"),
        root_value: Some(&root),
        ..ExecutionArgs::new(&registry, &document)
    })
    .await;
    assert_eq!(response.into_value(), json!({ "data": { "hello": "world" } }));
}

#[test]
fn execute_sync_refuses_to_suspend() {
    let registry = Registry::builder("Query")
        .register(
            ObjectType::new("Query").field(MetaField::new("pending", "Int").resolver(|_ctx| {
                FieldFuture::new(async {
                    futures_util::future::pending::<()>().await;
                    Ok(None)
                })
            })),
        )
        .build()
        .unwrap();
    let document = parse("{ pending }");
    let response = execute_sync(ExecutionArgs::new(&registry, &document));
    assert_eq!(
        response.errors[0].message,
        "Execution suspended on an asynchronous resolver; use `execute` instead."
    );

    let registry = hello_registry();
    let document = parse("{ hello }");
    let root = value(json!({ "hello": "world" }));
    let response = execute_sync(ExecutionArgs {
        root_value: Some(&root),
        ..ExecutionArgs::new(&registry, &document)
    });
    assert_eq!(response.into_value(), json!({ "data": { "hello": "world" } }));
}

/// A stream wrapper recording how many times it is dropped.
struct CountedStream<S> {
    inner: S,
    drops: Arc<AtomicUsize>,
}

impl<S: Stream + Unpin> Stream for CountedStream<S> {
    type Item = S::Item;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        std::pin::Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<S> Drop for CountedStream<S> {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn count_registry(drops: Arc<AtomicUsize>) -> Registry {
    Registry::builder("Query")
        .subscription_type("Subscription")
        .register(ObjectType::new("Query").field(MetaField::new("ok", "Boolean")))
        .register(
            ObjectType::new("Subscription").field(
                MetaField::new("count", "Int")
                    .resolver(|ctx| FieldFuture::Value(Some(ctx.parent_value.clone())))
                    .subscribe(move |_ctx| {
                        let drops = Arc::clone(&drops);
                        Ok(CountedStream {
                            inner: stream::iter([1, 2, 3].map(|n| Ok(value(json!(n))))),
                            drops,
                        }
                        .boxed())
                    }),
            ),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn subscriptions_map_each_source_event() {
    let drops = Arc::new(AtomicUsize::new(0));
    let registry = count_registry(Arc::clone(&drops));
    let document = parse("subscription { count }");
    let mut responses = subscribe(ExecutionArgs::new(&registry, &document)).unwrap();

    let mut seen = Vec::new();
    while let Some(response) = responses.next().await {
        seen.push(response.into_value());
    }
    assert_eq!(
        seen,
        [
            json!({ "data": { "count": 1 } }),
            json!({ "data": { "count": 2 } }),
            json!({ "data": { "count": 3 } }),
        ]
    );
    drop(responses);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropping_the_consumer_closes_the_source_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let registry = count_registry(Arc::clone(&drops));
    let document = parse("subscription { count }");
    let mut responses = subscribe(ExecutionArgs::new(&registry, &document)).unwrap();

    let first = responses.next().await.unwrap();
    assert_eq!(first.into_value(), json!({ "data": { "count": 1 } }));
    drop(responses);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_fields_are_omitted_from_the_result() {
    // No validation ran here on purpose; execution must not invent keys.
    let registry = hello_registry();
    let response = run(&registry, "{ hello missing }", json!({ "hello": "world" })).await;
    assert_eq!(response, json!({ "data": { "hello": "world" } }));
}
