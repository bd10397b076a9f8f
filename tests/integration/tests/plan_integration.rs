//! Integration tests for `plan`.
//!
//! **Category**: Construction
//!
//! A plan saves nothing of its own record, but belongs-to associations are
//! built (and saved, outside a suppressed scope) so their ids can stand in
//! for the related records.

use fabrik::prelude::*;
use fabrik_integration_tests::factory;
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
fn test_plan_does_not_save_the_constructed_object(factory: Factory<MemoryStore>) {
	factory.blueprint("Person", Blueprint::new().set("name", "Fred"));

	let plan = factory.plan("Person").unwrap();

	assert_eq!(plan.value("name"), Some(&json!("Fred")));
	assert_eq!(factory.model().count("Person"), 0);
}

#[rstest]
fn test_plan_replaces_belongs_to_with_its_id(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post"));

	let plan = factory.plan("Comment").unwrap();

	assert_eq!(factory.model().count("Post"), 1);
	assert!(!plan.contains("post"));
	assert_eq!(plan.value("post_id"), Some(&json!(1)));
}

#[rstest]
fn test_plan_keeps_declaration_order(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Person", Blueprint::new())
		.blueprint(
			"Comment",
			Blueprint::new()
				.set("body", "Hi")
				.association("author"),
		);

	let plan = factory.plan("Comment").unwrap();

	let keys: Vec<&str> = plan.keys().collect();
	assert_eq!(keys, ["body", "author_id"]);
}

#[rstest]
fn test_plan_into_json(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post").set("body", "Hi"));

	let params = factory.plan("Comment").unwrap().into_json().unwrap();

	assert_eq!(Value::Object(params), json!({ "post_id": 1, "body": "Hi" }));
}

#[rstest]
fn test_plan_with_collection_record_cannot_become_json(factory: Factory<MemoryStore>) {
	factory
		.blueprint("User", Blueprint::new())
		.blueprint("Post", Blueprint::new().association("users"));

	let plan = factory.plan("Post").unwrap();

	assert!(plan.get("users").is_some_and(AttributeValue::is_record));
	assert!(matches!(plan.into_json(), Err(BuildError::UnflattenedRecord(attribute)) if attribute == "users"));
}

#[rstest]
fn test_plan_batch(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post"));

	let plans = factory.construct("Comment").plan_batch(3).unwrap();

	let ids: Vec<Option<&Value>> = plans.iter().map(|plan| plan.value("post_id")).collect();
	assert_eq!(ids, [Some(&json!(1)), Some(&json!(2)), Some(&json!(3))]);
	assert_eq!(factory.model().count("Comment"), 0);
}

// ============================================================================
// Collections
// ============================================================================

#[rstest]
fn test_collection_plan_excludes_parent(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint(
			"Comment",
			Blueprint::new().association("post").lazy("body", || "Test"),
		);
	let post = factory.make("Post").unwrap();

	let plan = factory.collection(&post, "comments").plan().unwrap();

	assert!(!plan.contains("post"));
	assert!(!plan.contains("post_id"));
	assert_eq!(plan.value("body"), Some(&json!("Test")));
}

#[rstest]
#[case("Post", "users", "User", "name")]
#[case("Person", "posts", "Post", "title")]
fn test_many_to_many_plan_excludes_parent(
	factory: Factory<MemoryStore>,
	#[case] parent_model: &str,
	#[case] collection: &str,
	#[case] member_model: &str,
	#[case] column: &str,
) {
	factory
		.blueprint(parent_model, Blueprint::new())
		.blueprint(member_model, Blueprint::new().set(column, "Planned"));
	let parent = factory.make(parent_model).unwrap();
	let store = factory.model();
	let counts = |store: &MemoryStore| {
		(
			store.count("User"),
			store.count("Post"),
			store.count("Subscription"),
			store.join_count("posts_users"),
		)
	};
	let before = counts(store);

	let plan = factory.collection(&parent, collection).plan().unwrap();

	for key in ["post", "post_id", "person", "person_id", "posts", "people"] {
		assert!(!plan.contains(key), "unexpected {key}");
	}
	assert_eq!(plan.value(column), Some(&json!("Planned")));
	assert_eq!(counts(store), before);
}

#[rstest]
fn test_collection_plan_creates_no_extra_parent(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post"));
	let post = factory.make("Post").unwrap();
	let post_count = factory.model().count("Post");

	factory.collection(&post, "comments").plan().unwrap();

	assert_eq!(factory.model().count("Post"), post_count);
	assert_eq!(factory.model().count("Comment"), 0);
}
