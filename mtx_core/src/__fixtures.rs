use serde_json::Value;
use serde_json::json;

use crate::Node;
use crate::Operation;

pub fn doc(value: Value) -> Node {
	Node::from(value)
}

/// A document with `enabled` flags at the root, in nested objects and inside
/// array elements.
pub fn enabled_document() -> Node {
	doc(json!({
		"enabled": true,
		"root": { "enabled": true, "child": { "enabled": true } },
		"items": [{ "enabled": true }, { "meta": { "enabled": true } }]
	}))
}

/// Like [`enabled_document`] with one more flag under an array element's
/// child object.
pub fn six_flag_document() -> Node {
	doc(json!({
		"enabled": true,
		"root": { "enabled": true, "child": { "enabled": true } },
		"items": [
			{ "enabled": true, "meta": { "enabled": true } },
			{ "meta": { "enabled": true } }
		]
	}))
}

pub fn release_document() -> Node {
	doc(json!({
		"items": [{ "id": 1 }],
		"legacy": { "items": [{ "id": 0 }] },
		"draft": true,
		"site": { "name": "Old" }
	}))
}

pub fn release_operations() -> Vec<Operation> {
	vec![
		Operation::set("site.name", "New"),
		Operation::replace("site.name", "Newest"),
		Operation::copy("site.name", "site.displayName"),
		Operation::r#move("legacy.items", "items"),
		Operation::insert("items", 0, json!({ "id": 99 })),
		Operation::append("items", json!({ "id": 2 })),
		Operation::merge("site", json!({ "environment": "ci" })),
		Operation::remove("draft"),
	]
}

pub fn flags_document() -> Node {
	doc(json!({
		"items": [
			{ "name": "a", "enabled": true },
			{ "name": "b", "enabled": true }
		]
	}))
}
