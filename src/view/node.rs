use std::fmt;

/// Render output of a component.
///
/// A deliberately small tree: elements, text and action buttons are all the
/// presentation layer needs to draw a view and wire its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: &'static str,
        children: Vec<Node>,
    },
    Text(String),
    /// An interactive control that dispatches `action` when activated.
    Button { label: String, action: String },
}

impl Node {
    pub fn element(tag: &'static str, children: impl IntoIterator<Item = Node>) -> Self {
        Node::Element {
            tag,
            children: children.into_iter().collect(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn button(label: impl Into<String>, action: impl Into<String>) -> Self {
        Node::Button {
            label: label.into(),
            action: action.into(),
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Text(text) => out.push_str(text),
            Node::Button { label, .. } => out.push_str(label),
        }
    }

    /// Actions of every control in document order.
    pub fn actions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_actions(&mut out);
        out
    }

    fn collect_actions<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_actions(out);
                }
            }
            Node::Text(_) => {}
            Node::Button { action, .. } => out.push(action),
        }
    }

    /// Serialize to HTML, escaping text and attribute values.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element { tag, children } => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
            Node::Button { label, action } => {
                out.push_str("<button data-action=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(action));
                out.push_str("\">");
                out.push_str(&html_escape::encode_text(label));
                out.push_str("</button>");
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_escaped() {
        let node = Node::element(
            "div",
            [
                Node::element("h2", [Node::text("Tom & <Jerry>")]),
                Node::button("Go", "say \"hi\""),
            ],
        );

        assert_eq!(
            node.to_html(),
            "<div><h2>Tom &amp; &lt;Jerry&gt;</h2>\
             <button data-action=\"say &quot;hi&quot;\">Go</button></div>"
        );
        assert_eq!(node.to_string(), node.to_html());
    }

    #[test]
    fn text_and_actions_in_document_order() {
        let node = Node::element(
            "div",
            [
                Node::text("a"),
                Node::button("b", "first"),
                Node::element("p", [Node::text("c"), Node::button("d", "second")]),
            ],
        );

        assert_eq!(node.text_content(), "abcd");
        assert_eq!(node.actions(), vec!["first", "second"]);
    }
}
