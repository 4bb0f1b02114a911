//! Bracket-notation query strings, as WordPress front ends build them, read into JSON.
//!
//! `postType[]=post&isolated[0]=5&filters[0][key]=category` becomes
//! `{"postType": ["post"], "isolated": ["5"], "filters": [{"key": "category"}]}`. Values stay
//! strings; the query normalizer already reads numbers from strings.

use serde_json::{Map, Value};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Query key {key:?} has no name.")]
	MissingName { key: String },
	#[error("Query key {key:?} has an unclosed bracket.")]
	UnclosedBracket { key: String },
	#[error("Query key {key:?} appends past the largest list index.")]
	IndexOverflow { key: String },
}

/// Later pairs overwrite earlier ones at the same path, except `[]`, which always appends.
pub fn to_value(pairs: &[(String, String)]) -> Result<Value> {
	let mut root = Map::new();

	for (key, value) in pairs {
		let (name, segments) = split_key(key)?;

		insert(&mut root, name, &segments, value)
			.ok_or_else(|| Error::IndexOverflow { key: key.to_string() })?;
	}

	Ok(into_lists(Value::Object(root)))
}

fn split_key(key: &str) -> Result<(&str, Vec<&str>)> {
	let (name, mut rest) = match key.find('[') {
		Some(start) => (&key[..start], &key[start..]),
		None => (key, ""),
	};

	if name.trim().is_empty() {
		return Err(Error::MissingName { key: key.to_string() });
	}

	let mut segments = Vec::new();

	while let Some(open) = rest.strip_prefix('[') {
		let Some(end) = open.find(']') else {
			return Err(Error::UnclosedBracket { key: key.to_string() });
		};

		segments.push(&open[..end]);

		rest = &open[end + 1..];
	}

	// Trailing text after the last bracket is ignored.
	Ok((name, segments))
}

/// `None` when an empty bracket has no index left to append at.
fn insert(map: &mut Map<String, Value>, key: &str, segments: &[&str], value: &str) -> Option<()> {
	let Some((next, rest)) = segments.split_first() else {
		map.insert(key.to_string(), Value::String(value.to_string()));

		return Some(());
	};
	let entry = map.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));

	if !entry.is_object() {
		*entry = Value::Object(Map::new());
	}

	let Value::Object(child) = entry else {
		return Some(());
	};
	let segment = if next.is_empty() { next_index(child)? } else { (*next).to_string() };

	insert(child, &segment, rest, value)
}

fn next_index(map: &Map<String, Value>) -> Option<String> {
	let last = map.keys().filter_map(|key| key.parse::<usize>().ok()).max();

	match last {
		Some(last) => last.checked_add(1).map(|index| index.to_string()),
		None => Some("0".to_string()),
	}
}

/// Objects keyed only by indexes become arrays, in index order.
fn into_lists(value: Value) -> Value {
	let Value::Object(map) = value else {
		return value;
	};

	if !map.is_empty() && map.keys().all(|key| key.parse::<usize>().is_ok()) {
		let mut entries: Vec<(usize, Value)> = map
			.into_iter()
			.filter_map(|(key, value)| {
				key.parse::<usize>().ok().map(|index| (index, into_lists(value)))
			})
			.collect();

		entries.sort_by_key(|(index, _)| *index);

		return Value::Array(entries.into_iter().map(|(_, value)| value).collect());
	}

	Value::Object(map.into_iter().map(|(key, value)| (key, into_lists(value))).collect())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::query_string::{Error, to_value};

	fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
		raw.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
	}

	#[test]
	fn plain_keys_stay_scalars() {
		let value = to_value(&pairs(&[("order", "az"), ("limit", "4"), ("search", "hello")]))
			.expect("Failed to read query string.");

		assert_eq!(value, json!({ "order": "az", "limit": "4", "search": "hello" }));
	}

	#[test]
	fn empty_brackets_append() {
		let value = to_value(&pairs(&[("postType[]", "post"), ("postType[]", "page")]))
			.expect("Failed to read query string.");

		assert_eq!(value, json!({ "postType": ["post", "page"] }));
	}

	#[test]
	fn indexes_sort_numerically() {
		let value = to_value(&pairs(&[("fixed[10]", "3"), ("fixed[2]", "1"), ("fixed[0]", "9")]))
			.expect("Failed to read query string.");

		assert_eq!(value, json!({ "fixed": ["9", "1", "3"] }));
	}

	#[test]
	fn nested_filters_become_objects() {
		let value = to_value(&pairs(&[
			("filters[0][key]", "category"),
			("filters[0][comparator]", "!="),
			("filters[0][value]", "3"),
			("filters[1][taxonomy]", "post_tag"),
			("filters[1][term]", "7"),
		]))
		.expect("Failed to read query string.");

		assert_eq!(
			value,
			json!({
				"filters": [
					{ "key": "category", "comparator": "!=", "value": "3" },
					{ "taxonomy": "post_tag", "term": "7" }
				]
			})
		);
	}

	#[test]
	fn later_pairs_win() {
		let value = to_value(&pairs(&[("limit", "3"), ("limit", "5"), ("order", "az")]))
			.expect("Failed to read query string.");

		assert_eq!(value["limit"], "5");

		let value = to_value(&pairs(&[("isolated", "1,2"), ("isolated[]", "4")]))
			.expect("Failed to read query string.");

		assert_eq!(value["isolated"], json!(["4"]));
	}

	#[test]
	fn malformed_keys_are_rejected() {
		assert!(matches!(
			to_value(&pairs(&[("postType[", "post")])),
			Err(Error::UnclosedBracket { .. })
		));
		assert!(matches!(to_value(&pairs(&[("[0]", "post")])), Err(Error::MissingName { .. })));
	}

	#[test]
	fn appending_after_the_largest_index_is_rejected() {
		let max = usize::MAX.to_string();
		let key = format!("isolated[{max}]");

		assert!(matches!(
			to_value(&pairs(&[(key.as_str(), "1"), ("isolated[]", "2")])),
			Err(Error::IndexOverflow { .. })
		));

		let value = to_value(&pairs(&[(key.as_str(), "1")])).expect("Failed to read query string.");

		assert_eq!(value, json!({ "isolated": ["1"] }));
	}
}
