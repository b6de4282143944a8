use indexmap::IndexMap;
use serde::Serialize;

/// A value read from a build descriptor.
///
/// Mappings keep their keys in the order they first appear in the file, so
/// rendering the value back out is stable and diffable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DescriptorValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<DescriptorValue>),
    Mapping(IndexMap<String, DescriptorValue>),
}

impl DescriptorValue {
    pub fn as_sequence(&self) -> Option<&[DescriptorValue]> {
        match self {
            DescriptorValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, DescriptorValue>> {
        match self {
            DescriptorValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this value is a mapping
    pub fn get(&self, key: &str) -> Option<&DescriptorValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DescriptorValue::Null => "null",
            DescriptorValue::Boolean(_) => "boolean",
            DescriptorValue::Integer(_) | DescriptorValue::Float(_) => "number",
            DescriptorValue::String(_) => "string",
            DescriptorValue::Sequence(_) => "sequence",
            DescriptorValue::Mapping(_) => "mapping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serializes_as_plain_json() {
        let mut target = IndexMap::new();
        target.insert(
            "target_name".to_string(),
            DescriptorValue::String("app".to_string()),
        );
        target.insert("debug".to_string(), DescriptorValue::Boolean(false));
        target.insert("jobs".to_string(), DescriptorValue::Integer(4));
        target.insert("ratio".to_string(), DescriptorValue::Float(0.5));
        target.insert("extra".to_string(), DescriptorValue::Null);
        let value = DescriptorValue::Sequence(vec![DescriptorValue::Mapping(target)]);

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"[{"target_name":"app","debug":false,"jobs":4,"ratio":0.5,"extra":null}]"#
        );
    }

    #[test]
    fn test_accessors() {
        let mut map = IndexMap::new();
        map.insert(
            "sources".to_string(),
            DescriptorValue::Sequence(vec![DescriptorValue::String("a.c".to_string())]),
        );
        let value = DescriptorValue::Mapping(map);

        let sources = value.get("sources").and_then(|v| v.as_sequence()).unwrap();
        assert_eq!(sources[0], DescriptorValue::String("a.c".to_string()));
        assert!(value.get("missing").is_none());
        assert_eq!(value.type_name(), "mapping");
        assert_eq!(DescriptorValue::Float(1.0).type_name(), "number");
    }
}
