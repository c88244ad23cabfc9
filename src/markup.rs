// WHY: Reconciliation only needs four capabilities from a markup parser:
// parse into a tree, find elements by name, read attributes, read flattened text.
// The MarkupParser trait keeps the scan independent of the XML library behind it.

use crate::error::{HeidelTimeError, Result};
use tracing::debug;

/// Root element HeidelTime wraps TimeML output in
pub const TIMEML_CONTAINER: &str = "TimeML";

/// Element HeidelTime uses for each temporal expression
pub const TIMEX3_TAG: &str = "TIMEX3";

/// Names of the container element and the annotation elements inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSchema {
    pub container: String,
    pub tag: String,
}

impl Default for MarkupSchema {
    fn default() -> Self {
        Self {
            container: TIMEML_CONTAINER.to_string(),
            tag: TIMEX3_TAG.to_string(),
        }
    }
}

/// One annotation element, in markup order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTag {
    /// Attributes in the order they appear on the element
    pub attributes: Vec<(String, String)>,
    /// Text the element wraps
    pub text: String,
}

impl AnnotationTag {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            text: text.into(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What a parser hands to the reconciliation scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMarkup {
    /// Flattened text content of the container element, boundary characters included
    pub container_text: String,
    /// Annotation elements found beneath the container, in document order
    pub tags: Vec<AnnotationTag>,
}

/// Capability interface over a markup parser
pub trait MarkupParser {
    /// Returns `Ok(None)` when the markup parses but has no container element.
    fn extract(&self, markup: &str, schema: &MarkupSchema) -> Result<Option<ExtractedMarkup>>;
}

/// Default parser backed by roxmltree
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlMarkupParser;

impl MarkupParser for XmlMarkupParser {
    fn extract(&self, markup: &str, schema: &MarkupSchema) -> Result<Option<ExtractedMarkup>> {
        // HeidelTime emits <!DOCTYPE TimeML SYSTEM "TimeML.dtd">, which roxmltree rejects by default
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;

        let document = roxmltree::Document::parse_with_options(markup, options)
            .map_err(|e| HeidelTimeError::malformed_output(format!("markup is not well-formed XML: {e}")))?;

        let container = match document
            .descendants()
            .find(|node| node.is_element() && node.tag_name().name() == schema.container)
        {
            Some(node) => node,
            None => return Ok(None),
        };

        let tags: Vec<AnnotationTag> = container
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == schema.tag)
            .map(|node| AnnotationTag {
                attributes: node
                    .attributes()
                    .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                    .collect(),
                text: flattened_text(node),
            })
            .collect();

        debug!(
            "Extracted {} <{}> elements from <{}>",
            tags.len(),
            schema.tag,
            schema.container
        );

        Ok(Some(ExtractedMarkup {
            container_text: flattened_text(container),
            tags,
        }))
    }
}

/// Concatenation of every text node beneath `node`
fn flattened_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<?xml version=\"1.0\"?>\n\
<!DOCTYPE TimeML SYSTEM \"TimeML.dtd\">\n\
<TimeML>\n\
<TIMEX3 tid=\"t1\" type=\"DATE\" value=\"XXXX-XX-XX\">Yesterday</TIMEX3> we drove to the mountains. \
<TIMEX3 tid=\"t2\" type=\"DATE\" value=\"PRESENT_REF\">Today</TIMEX3> we are going to the sea\n\
</TimeML>\n";

    #[test]
    fn test_extracts_container_text_and_tags() {
        let extracted = XmlMarkupParser
            .extract(SAMPLE, &MarkupSchema::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            extracted.container_text,
            "\nYesterday we drove to the mountains. Today we are going to the sea\n"
        );
        assert_eq!(extracted.tags.len(), 2);
        assert_eq!(extracted.tags[0].text, "Yesterday");
        assert_eq!(extracted.tags[1].attribute("value"), Some("PRESENT_REF"));
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let extracted = XmlMarkupParser
            .extract(SAMPLE, &MarkupSchema::default())
            .unwrap()
            .unwrap();

        let keys: Vec<&str> = extracted.tags[0]
            .attributes
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["tid", "type", "value"]);
    }

    #[test]
    fn test_missing_container_is_none() {
        let markup = "<xmi:XMI xmlns:xmi=\"http://www.omg.org/XMI\"><sofa text=\"x\"/></xmi:XMI>";
        let extracted = XmlMarkupParser.extract(markup, &MarkupSchema::default()).unwrap();
        assert!(extracted.is_none());
    }

    #[test]
    fn test_unparseable_markup_is_malformed() {
        let result = XmlMarkupParser.extract("<TimeML><TIMEX3>oops</TimeML>", &MarkupSchema::default());
        assert!(matches!(result, Err(HeidelTimeError::MalformedOutput(_))));
    }

    #[test]
    fn test_entities_are_decoded() {
        let markup = "<TimeML>\nA &amp; B <TIMEX3 tid=\"t1\">today</TIMEX3>\n</TimeML>";
        let extracted = XmlMarkupParser
            .extract(markup, &MarkupSchema::default())
            .unwrap()
            .unwrap();
        assert_eq!(extracted.container_text, "\nA & B today\n");
    }

    #[test]
    fn test_custom_schema() {
        let markup = "<doc> <date id=\"d1\">1999</date> </doc>";
        let schema = MarkupSchema {
            container: "doc".to_string(),
            tag: "date".to_string(),
        };
        let extracted = XmlMarkupParser.extract(markup, &schema).unwrap().unwrap();
        assert_eq!(extracted.tags, vec![AnnotationTag::new("1999").with_attribute("id", "d1")]);
    }
}
