//! Capacity fields of a node-group template, located by byte span.
//!
//! The template is parsed with serde_json into borrowed [`RawValue`]s. Every
//! raw value is a slice of the original text, so its position in that text
//! gives the exact span to rewrite. The parse is only used to check shape and
//! find spans; output text is always the original with spans replaced.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::Deserialize;
use serde_json::value::RawValue;

use nodegrid_core::{Capacity, NODEGROUP_LOGICAL_ID};

use crate::error::{ReconcileError, ReconcileResult};

/// Resource type the `NodeGroup` resource must have, when it declares one.
pub const AUTOSCALING_GROUP_TYPE: &str = "AWS::AutoScaling::AutoScalingGroup";

pub const DESIRED_CAPACITY: &str = "DesiredCapacity";
pub const MIN_SIZE: &str = "MinSize";
pub const MAX_SIZE: &str = "MaxSize";

#[derive(Deserialize)]
struct TemplateDoc<'a> {
    #[serde(rename = "Resources", borrow)]
    resources: BTreeMap<String, &'a RawValue>,
}

#[derive(Deserialize)]
struct ResourceDoc<'a> {
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "Properties", borrow)]
    properties: BTreeMap<String, &'a RawValue>,
}

/// One decimal-string field and the span of its digits in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    value: u32,
    span: Range<usize>,
}

/// The three capacity fields of a template's `NodeGroup` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityFields {
    desired: Field,
    min: Field,
    max: Field,
}

impl CapacityFields {
    /// Locate the capacity fields in `text`.
    pub fn locate(text: &str) -> ReconcileResult<Self> {
        let doc: TemplateDoc<'_> = serde_json::from_str(text)
            .map_err(|e| parse_err(format!("invalid template JSON: {e}")))?;

        let raw = doc
            .resources
            .get(NODEGROUP_LOGICAL_ID)
            .ok_or_else(|| parse_err(format!("no {NODEGROUP_LOGICAL_ID} resource")))?;

        let resource: ResourceDoc<'_> = serde_json::from_str(raw.get()).map_err(|e| {
            parse_err(format!("invalid {NODEGROUP_LOGICAL_ID} resource: {e}"))
        })?;

        if let Some(kind) = &resource.kind
            && kind != AUTOSCALING_GROUP_TYPE
        {
            return Err(parse_err(format!(
                "{NODEGROUP_LOGICAL_ID} resource has type {kind}, expected {AUTOSCALING_GROUP_TYPE}"
            )));
        }

        let field = |name: &str| -> ReconcileResult<Field> {
            let raw = resource
                .properties
                .get(name)
                .ok_or_else(|| parse_err(format!("missing property {name}")))?;
            locate_field(text, name, raw)
        };

        Ok(Self {
            desired: field(DESIRED_CAPACITY)?,
            min: field(MIN_SIZE)?,
            max: field(MAX_SIZE)?,
        })
    }

    /// Current capacity as written in the template.
    pub fn capacity(&self) -> Capacity {
        Capacity {
            desired: self.desired.value,
            min: self.min.value,
            max: self.max.value,
        }
    }

    /// Rewrite the three fields of `text` to `target`, leaving every other
    /// byte as it is. `text` must be the template these fields were located in.
    pub fn splice(&self, text: &str, target: Capacity) -> String {
        let mut edits = [
            (&self.desired.span, target.desired),
            (&self.min.span, target.min),
            (&self.max.span, target.max),
        ];
        edits.sort_by_key(|(span, _)| span.start);

        let mut out = String::with_capacity(text.len() + 8);
        let mut cursor = 0;
        for (span, value) in edits {
            out.push_str(&text[cursor..span.start]);
            out.push_str(&value.to_string());
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        out
    }
}

/// Resolve a raw property value to its decimal value and digit span.
fn locate_field(text: &str, name: &str, raw: &RawValue) -> ReconcileResult<Field> {
    let src = raw.get();
    let offset = (src.as_ptr() as usize)
        .checked_sub(text.as_ptr() as usize)
        .filter(|off| text.get(*off..*off + src.len()) == Some(src))
        .ok_or_else(|| parse_err(format!("cannot locate property {name}")))?;

    let digits = src
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| parse_err(format!("property {name} is not a string: {src}")))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_err(format!(
            "property {name} is not a decimal number: {src}"
        )));
    }

    let value = digits
        .parse::<u32>()
        .map_err(|e| parse_err(format!("property {name} out of range: {e}")))?;

    let start = offset + 1;
    Ok(Field {
        value,
        span: start..start + digits.len(),
    })
}

fn parse_err(msg: String) -> ReconcileError {
    ReconcileError::Parse(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{
  "Resources": {
    "NodeGroup": {
      "Type": "AWS::AutoScaling::AutoScalingGroup",
      "Properties": {
        "DesiredCapacity": "3",
        "MaxSize": "6",
        "MinSize": "1"
      }
    }
  }
}"#;

    #[test]
    fn locates_current_capacity() {
        let fields = CapacityFields::locate(TEMPLATE).unwrap();
        assert_eq!(
            fields.capacity(),
            Capacity {
                desired: 3,
                min: 1,
                max: 6
            }
        );
    }

    #[test]
    fn spans_cover_only_the_digits() {
        let fields = CapacityFields::locate(TEMPLATE).unwrap();
        assert_eq!(&TEMPLATE[fields.desired.span.clone()], "3");
        assert_eq!(&TEMPLATE[fields.min.span.clone()], "1");
        assert_eq!(&TEMPLATE[fields.max.span.clone()], "6");
    }

    #[test]
    fn splice_handles_width_changes() {
        let fields = CapacityFields::locate(TEMPLATE).unwrap();
        let out = fields.splice(
            TEMPLATE,
            Capacity {
                desired: 12,
                min: 1,
                max: 100,
            },
        );
        assert_eq!(
            out,
            TEMPLATE
                .replace(r#""DesiredCapacity": "3""#, r#""DesiredCapacity": "12""#)
                .replace(r#""MaxSize": "6""#, r#""MaxSize": "100""#)
        );
    }

    #[test]
    fn ignores_same_named_fields_in_other_resources() {
        let text = r#"{"Resources":{"Other":{"Properties":{"DesiredCapacity":"9","MinSize":"9","MaxSize":"9"}},"NodeGroup":{"Properties":{"DesiredCapacity":"2","MinSize":"1","MaxSize":"3"}}}}"#;
        let fields = CapacityFields::locate(text).unwrap();
        assert_eq!(fields.capacity().desired, 2);

        let out = fields.splice(
            text,
            Capacity {
                desired: 3,
                min: 1,
                max: 3,
            },
        );
        assert!(out.contains(r#""Other":{"Properties":{"DesiredCapacity":"9""#));
        assert!(out.contains(r#""NodeGroup":{"Properties":{"DesiredCapacity":"3""#));
    }

    #[test]
    fn rejects_numeric_values() {
        let text = r#"{"Resources":{"NodeGroup":{"Properties":{"DesiredCapacity":3,"MinSize":"1","MaxSize":"6"}}}}"#;
        assert!(matches!(
            CapacityFields::locate(text),
            Err(ReconcileError::Parse(_))
        ));
    }

    #[test]
    fn rejects_non_decimal_strings() {
        for bad in [r#""""#, r#""-1""#, r#""3.0""#, r#"" 3""#, r#""99999999999""#] {
            let text = format!(
                r#"{{"Resources":{{"NodeGroup":{{"Properties":{{"DesiredCapacity":{bad},"MinSize":"1","MaxSize":"6"}}}}}}}}"#
            );
            assert!(
                matches!(CapacityFields::locate(&text), Err(ReconcileError::Parse(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn rejects_other_resource_types() {
        let text = r#"{"Resources":{"NodeGroup":{"Type":"AWS::EC2::Instance","Properties":{"DesiredCapacity":"3","MinSize":"1","MaxSize":"6"}}}}"#;
        let err = CapacityFields::locate(text).unwrap_err();
        assert!(err.to_string().contains("AWS::EC2::Instance"));
    }

    #[test]
    fn rejects_missing_pieces() {
        for text in [
            "",
            "not json",
            "{}",
            r#"{"Resources":{}}"#,
            r#"{"Resources":{"NodeGroup":{}}}"#,
            r#"{"Resources":{"NodeGroup":{"Properties":{"DesiredCapacity":"3","MinSize":"1"}}}}"#,
        ] {
            assert!(
                matches!(CapacityFields::locate(text), Err(ReconcileError::Parse(_))),
                "accepted {text:?}"
            );
        }
    }
}
