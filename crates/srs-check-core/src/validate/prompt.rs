use std::fmt::Write;

/// What the oracle is told about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptNode<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub section_number: Option<&'a str>,
    pub rule: &'a str,
    pub content: &'a str,
}

const PREAMBLE: &str = "You are a document review expert. Below is a set of document sections, each with the normative rule that applies to it and the section's actual content. For every section decide whether the content complies with its rule. Use `result` (bool) to state compliance and `reason` (string) to briefly justify the decision.\n\nJudge each of the following sections one by one.\n";

const OUTPUT_FORMAT: &str = "\nReturn the results strictly in the following format, with nothing else before or after it:\n[\n  {\"id\": \"node id\", \"name\": \"node name\", \"result\": true/false, \"reason\": \"justification\", \"parent_id\": \"parent node id\"},\n  ...\n]";

/// Build the single prompt sent for one batch.
pub fn build_prompt(nodes: &[PromptNode<'_>]) -> String {
    let mut prompt = String::from(PREAMBLE);
    for (idx, node) in nodes.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "\n## Section {}\nID: {}\nName: {}\nSection number: {}\n### Rule\n{}\n### Content\n{}\n",
            idx + 1,
            node.id,
            node.name,
            node.section_number.unwrap_or("none"),
            node.rule,
            node.content,
        );
    }
    prompt.push_str(OUTPUT_FORMAT);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_every_node_in_order() {
        let nodes = [
            PromptNode {
                id: "node_0",
                name: "Scope",
                section_number: Some("1"),
                rule: "Scope: identify the system.",
                content: "Some body text.",
            },
            PromptNode {
                id: "node_1",
                name: "Glossary",
                section_number: None,
                rule: "No matching rule",
                content: "Glossary",
            },
        ];
        let prompt = build_prompt(&nodes);
        let first = prompt.find("ID: node_0").unwrap();
        let second = prompt.find("ID: node_1").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Section number: 1\n"));
        assert!(prompt.contains("Section number: none\n"));
        assert!(prompt.contains("### Rule\nScope: identify the system.\n"));
        assert!(prompt.contains("### Content\nSome body text.\n"));
        assert!(prompt.trim_end().ends_with(']'));
        assert!(prompt.contains("\"parent_id\""));
    }
}
