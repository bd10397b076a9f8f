//! Integration tests for construction through collection relationships.
//!
//! **Category**: Collections
//!
//! Covers has-many, many-to-many through a join table and has-many through a
//! join model, each with and without guarded columns, on both the
//! single-write and the guarded fallback creation paths.

use fabrik::prelude::*;
use fabrik_integration_tests::{direct_factory, factory};
use rstest::{fixture, rstest};
use serde_json::json;

// ============================================================================
// Has-many
// ============================================================================

struct CommentedPost {
	factory: Factory<MemoryStore>,
	post: MemoryRecord,
	comment: MemoryRecord,
}

#[fixture]
fn commented_post(factory: Factory<MemoryStore>) -> CommentedPost {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post"));
	let post = factory.make("Post").unwrap();
	let comment = factory.collection(&post, "comments").make().unwrap();
	CommentedPost {
		factory,
		post,
		comment,
	}
}

#[rstest]
fn test_has_many_saves_the_created_object(commented_post: CommentedPost) {
	assert!(commented_post.comment.is_persisted());
}

#[rstest]
fn test_has_many_sets_parent_association(commented_post: CommentedPost) {
	let CommentedPost {
		factory,
		post,
		comment,
	} = commented_post;

	assert_eq!(comment.owner("post").and_then(MemoryRecord::id), post.id());
	assert_eq!(comment.get("post_id"), Some(&json!(post.id())));
	assert_eq!(factory.model().count("Post"), 1);
}

#[rstest]
fn test_has_many_member_is_listed_by_parent(commented_post: CommentedPost) {
	let members = commented_post
		.factory
		.model()
		.members(&commented_post.post, "comments")
		.unwrap();

	assert_eq!(members.len(), 1);
	assert_eq!(members[0].id(), commented_post.comment.id());
}

// ============================================================================
// Many-to-many through a join table
// ============================================================================

struct PostWithUsers {
	factory: Factory<MemoryStore>,
	post: MemoryRecord,
	users: Vec<MemoryRecord>,
}

#[fixture]
fn post_with_users(factory: Factory<MemoryStore>) -> PostWithUsers {
	factory
		.blueprint("User", Blueprint::new().set("name", "Fred"))
		.blueprint("Post", Blueprint::new());
	let post = factory.make("Post").unwrap();
	let users = (0..5)
		.map(|_| factory.collection(&post, "users").make())
		.collect::<BuildResult<Vec<_>>>()
		.unwrap();
	PostWithUsers {
		factory,
		post,
		users,
	}
}

#[rstest]
fn test_join_table_creates_the_right_amount_of_children(post_with_users: PostWithUsers) {
	let store = post_with_users.factory.model();

	assert_eq!(store.members(&post_with_users.post, "users").unwrap().len(), 5);
	assert_eq!(store.join_count("posts_users"), 5);
}

#[rstest]
fn test_join_table_saves_the_created_objects(post_with_users: PostWithUsers) {
	let store = post_with_users.factory.model();

	let members = store.members(&post_with_users.post, "users").unwrap();

	assert!(members.iter().all(MemoryRecord::is_persisted));
}

#[rstest]
fn test_join_table_links_child_to_parent(post_with_users: PostWithUsers) {
	let store = post_with_users.factory.model();

	for user in &post_with_users.users {
		let posts = store.members(user, "posts").unwrap();
		assert_eq!(posts.first().and_then(MemoryRecord::id), post_with_users.post.id());
	}
}

#[rstest]
fn test_join_table_sets_child_attributes(post_with_users: PostWithUsers) {
	let store = post_with_users.factory.model();

	let members = store.members(&post_with_users.post, "users").unwrap();

	assert!(members.iter().all(|user| user.get_str("name") == Some("Fred")));
}

#[rstest]
fn test_join_table_protected_attribute(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("User", Blueprint::new().set("secret", "secret"));
	let post = factory.make("Post").unwrap();
	factory.collection(&post, "users").make().unwrap();

	let store = factory.model();
	let stored_post = store.all("Post").remove(0);
	let users = store.members(&stored_post, "users").unwrap();

	assert_eq!(users[0].get_str("secret"), Some("secret"));
}

// ============================================================================
// Has-many through a join model
// ============================================================================

struct SubscribedPerson {
	factory: Factory<MemoryStore>,
	person: MemoryRecord,
	post: MemoryRecord,
}

#[fixture]
fn subscribed_person(factory: Factory<MemoryStore>) -> SubscribedPerson {
	factory
		.blueprint("Person", Blueprint::new())
		.blueprint("Post", Blueprint::new().set("title", "Fred goes wild"));
	let person = factory.make("Person").unwrap();
	let post = factory.collection(&person, "posts").make().unwrap();
	SubscribedPerson {
		factory,
		person,
		post,
	}
}

#[rstest]
fn test_through_couples_parent_to_child(subscribed_person: SubscribedPerson) {
	let store = subscribed_person.factory.model();

	let people = store.members(&subscribed_person.post, "people").unwrap();

	assert_eq!(people.first().and_then(MemoryRecord::id), subscribed_person.person.id());
}

#[rstest]
fn test_through_couples_child_to_parent(subscribed_person: SubscribedPerson) {
	let store = subscribed_person.factory.model();

	let posts = store.members(&subscribed_person.person, "posts").unwrap();

	assert_eq!(posts.first().and_then(MemoryRecord::id), subscribed_person.post.id());
}

#[rstest]
fn test_through_shares_the_join_object(subscribed_person: SubscribedPerson) {
	let store = subscribed_person.factory.model();

	let from_post = store.members(&subscribed_person.post, "subscriptions").unwrap();
	let from_person = store.members(&subscribed_person.person, "subscriptions").unwrap();

	assert_eq!(from_post, from_person);
	assert_eq!(from_post.len(), 1);
	assert!(from_post[0].is_persisted());
}

#[rstest]
fn test_through_sets_child_attributes(subscribed_person: SubscribedPerson) {
	let store = subscribed_person.factory.model();

	let posts = store.members(&subscribed_person.person, "posts").unwrap();

	assert_eq!(posts[0].get_str("title"), Some("Fred goes wild"));
	assert!(posts[0].is_persisted());
}

#[rstest]
fn test_through_protected_attribute(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Person", Blueprint::new().set("password", "secret"))
		.blueprint("Post", Blueprint::new());
	let post = factory.make("Post").unwrap();
	factory.collection(&post, "people").make().unwrap();

	let store = factory.model();
	let stored_post = store.all("Post").remove(0);
	let people = store.members(&stored_post, "people").unwrap();

	assert_eq!(people[0].get_str("password"), Some("secret"));
}

#[rstest]
#[case("comments", "Comment")]
#[case("users", "User")]
#[case("people", "Person")]
fn test_collection_sets_id_from_blueprint(
	factory: Factory<MemoryStore>,
	#[case] collection: &str,
	#[case] model: &str,
) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint(model, Blueprint::new().set("id", 12345));
	let post = factory.make("Post").unwrap();

	let member = factory.collection(&post, collection).make().unwrap();

	assert_eq!(member.id(), Some(12345));
	assert!(member.is_persisted());
	let store = factory.model();
	assert!(store.find(model, 12345).is_ok());
	assert_eq!(store.count(model), 1);
	let members = store.members(&post, collection).unwrap();
	assert_eq!(members.iter().map(MemoryRecord::id).collect::<Vec<_>>(), [Some(12345)]);
}

// ============================================================================
// Single-write creation
// ============================================================================

#[rstest]
#[case("users", "User", "secret")]
#[case("people", "Person", "password")]
fn test_direct_create_keeps_protected_attribute(
	direct_factory: Factory<MemoryStore>,
	#[case] collection: &str,
	#[case] model: &str,
	#[case] column: &str,
) {
	direct_factory
		.blueprint("Post", Blueprint::new())
		.blueprint(model, Blueprint::new().set(column, "hidden"));
	let post = direct_factory.make("Post").unwrap();

	let member = direct_factory.collection(&post, collection).make().unwrap();

	assert_eq!(member.get_str(column), Some("hidden"));
	let stored = direct_factory.model().find(model, member.id().unwrap()).unwrap();
	assert_eq!(stored.get_str(column), Some("hidden"));
	assert_eq!(direct_factory.model().count(model), 1);
}

// ============================================================================
// Overrides, blocks and errors
// ============================================================================

#[rstest]
fn test_collection_override_wins(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post").set("body", "Test"));
	let post = factory.make("Post").unwrap();

	let comment = factory
		.collection(&post, "comments")
		.with("body", "Override")
		.make()
		.unwrap();

	assert_eq!(comment.get_str("body"), Some("Override"));
}

#[rstest]
fn test_collection_block_runs_on_created_member(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new().association("post"));
	let post = factory.make("Post").unwrap();
	let store = factory.model().clone();

	let comment = factory
		.collection(&post, "comments")
		.make_with(|comment| {
			store.assign(comment, "body", AttributeValue::value("Edited"))?;
			store.save(comment)
		})
		.unwrap();

	assert_eq!(factory.model().find("Comment", comment.id().unwrap()).unwrap().get_str("body"), Some("Edited"));
}

#[rstest]
fn test_collection_on_unsaved_parent_fails(factory: Factory<MemoryStore>) {
	factory
		.blueprint("Post", Blueprint::new())
		.blueprint("Comment", Blueprint::new());
	let post = factory.make_unsaved("Post").unwrap();

	let result = factory.collection(&post, "comments").make();

	assert!(matches!(result, Err(BuildError::Persistence(_))));
}

#[rstest]
fn test_collection_on_plain_attribute_fails(factory: Factory<MemoryStore>) {
	factory.blueprint("Post", Blueprint::new());
	let post = factory.make("Post").unwrap();

	let result = factory.collection(&post, "title").make();

	assert!(matches!(
		result,
		Err(BuildError::NotACollection { model, collection }) if model == "Post" && collection == "title"
	));
}
