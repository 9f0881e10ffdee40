//! Call parameters and their wire encodings.
//!
//! A call's parameters are captured once, when the call is made, and then
//! rendered according to the verb: query pairs for GET, a form-encoded
//! body for POST, PUT and DELETE, and a JSON document for POST-JSON. The
//! JSON document is serialized straight from the caller's type, so field
//! order and 128-bit integers survive; pairs go through a
//! [`serde_json::Value`].
//!
//! Map-like values flatten to pairs: strings verbatim, numbers and
//! booleans as text, arrays as repeated keys, nested objects as JSON
//! text, and `null` entries dropped. A list of `(key, value)` pairs keeps
//! its order. A bare string is taken to be an already-encoded `a=1&b=2`
//! string.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::EncodeError;

#[derive(Debug, Clone)]
pub struct Params {
    value: Result<Value, String>,
    json: Result<String, String>,
}

impl Params {
    pub fn capture<P: Serialize + ?Sized>(params: &P) -> Self {
        Self {
            value: serde_json::to_value(params).map_err(|e| e.to_string()),
            json: serde_json::to_string(params).map_err(|e| e.to_string()),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self {
            value: Ok(Value::Null),
            json: Ok("null".to_string()),
        }
    }

    fn value(&self) -> Result<&Value, EncodeError> {
        self.value
            .as_ref()
            .map_err(|msg| EncodeError::Serialize(msg.clone()))
    }

    pub fn to_pairs(&self) -> Result<Vec<(String, String)>, EncodeError> {
        match self.value()? {
            Value::Null => Ok(Vec::new()),
            Value::String(encoded) => Ok(url::form_urlencoded::parse(
                encoded.trim_start_matches('?').as_bytes(),
            )
            .into_owned()
            .collect()),
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, value) in map {
                    match value {
                        Value::Array(items) => pairs.extend(
                            items
                                .iter()
                                .filter_map(scalar_text)
                                .map(|text| (key.clone(), text)),
                        ),
                        other => {
                            if let Some(text) = scalar_text(other) {
                                pairs.push((key.clone(), text));
                            }
                        }
                    }
                }
                Ok(pairs)
            }
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Array(pair) => match pair.as_slice() {
                        [Value::String(key), value] => {
                            scalar_text(value).map(|text| Ok((key.clone(), text)))
                        }
                        _ => Some(Err(EncodeError::NotAMap("an array"))),
                    },
                    _ => Some(Err(EncodeError::NotAMap("an array"))),
                })
                .collect(),
            Value::Bool(_) => Err(EncodeError::NotAMap("a boolean")),
            Value::Number(_) => Err(EncodeError::NotAMap("a number")),
        }
    }

    pub fn to_form(&self) -> Result<String, EncodeError> {
        let pairs = self.to_pairs()?;
        Ok(url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish())
    }

    pub fn to_json(&self) -> Result<String, EncodeError> {
        self.json
            .clone()
            .map_err(EncodeError::Serialize)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(value.to_string())
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.json, &self.value) {
            (Ok(json), _) => f.write_str(json),
            (Err(_), Ok(value)) => write!(f, "{value}"),
            (Err(msg), Err(_)) => write!(f, "<unserializable: {msg}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Search {
        q: String,
        page: u32,
        tags: Vec<&'static str>,
        cursor: Option<String>,
    }

    #[test]
    fn struct_flattens_to_pairs() {
        let params = Params::capture(&Search {
            q: "rust lang".into(),
            page: 2,
            tags: vec!["a", "b"],
            cursor: None,
        });
        let pairs = params.to_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "rust lang".to_string()),
                ("tags".to_string(), "a".to_string()),
                ("tags".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn form_body_is_percent_encoded() {
        let mut form = BTreeMap::new();
        form.insert("name", "Ada Lovelace");
        form.insert("note", "a&b");
        let body = Params::capture(&form).to_form().unwrap();
        assert_eq!(body, "name=Ada+Lovelace&note=a%26b");
    }

    #[test]
    fn encoded_string_is_parsed() {
        let pairs = Params::capture("?a=1&b=two").to_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two".to_string())
            ]
        );
    }

    #[test]
    fn pair_list_keeps_order() {
        let pairs = Params::capture(&[("z", "1"), ("a", "2"), ("z", "3")])
            .to_pairs()
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("z".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
                ("z".to_string(), "3".to_string()),
            ]
        );
        assert!(Params::capture(&[1, 2]).to_pairs().is_err());
    }

    #[test]
    fn unit_and_none_produce_no_pairs() {
        assert!(Params::capture(&()).to_pairs().unwrap().is_empty());
        assert!(Params::none().to_form().unwrap().is_empty());
    }

    #[test]
    fn scalars_are_not_maps() {
        let err = Params::capture(&42).to_pairs().unwrap_err();
        assert!(matches!(err, EncodeError::NotAMap("a number")));
    }

    #[test]
    fn non_string_keys_fail_to_capture() {
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], "x");
        let params = Params::capture(&bad);
        assert!(matches!(params.to_json(), Err(EncodeError::Serialize(_))));
        assert!(params.to_string().starts_with("<unserializable"));
    }

    #[derive(Serialize)]
    struct Order {
        zeta: u8,
        alpha: u8,
        big: u128,
    }

    #[test]
    fn json_keeps_declared_field_order() {
        let params = Params::capture(&Order {
            zeta: 1,
            alpha: 2,
            big: 5,
        });
        assert_eq!(params.to_json().unwrap(), r#"{"zeta":1,"alpha":2,"big":5}"#);
        assert_eq!(params.to_string(), r#"{"zeta":1,"alpha":2,"big":5}"#);
    }

    #[test]
    fn json_accepts_wide_integers() {
        let params = Params::capture(&Order {
            zeta: 1,
            alpha: 2,
            big: u128::MAX,
        });
        assert_eq!(
            params.to_json().unwrap(),
            format!(r#"{{"zeta":1,"alpha":2,"big":{}}}"#, u128::MAX)
        );
        assert!(params.to_pairs().is_err());
    }

    #[test]
    fn json_keeps_nested_structure() {
        let params = Params::capture(&serde_json::json!({"user": {"id": 7}}));
        assert_eq!(params.to_json().unwrap(), r#"{"user":{"id":7}}"#);
    }
}
