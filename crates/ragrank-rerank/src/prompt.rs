//! Relevance prompt construction.

use ragrank_core::constants::RELEVANCE_PROMPT_TEMPLATE;

/// Fill the relevance template with `query` and `document`.
///
/// Substitution is single-pass, so placeholders inside the query or the
/// document text are left as they are. Documents longer than `max_chars`
/// characters are cut at a character boundary.
pub fn relevance_prompt(query: &str, document: &str, max_chars: usize) -> String {
    let document = truncate_chars(document, max_chars);
    let mut out = String::with_capacity(RELEVANCE_PROMPT_TEMPLATE.len() + query.len() + document.len());
    let mut rest = RELEVANCE_PROMPT_TEMPLATE;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{query}") {
            out.push_str(query);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{document}") {
            out.push_str(document);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_template() {
        assert_eq!(
            relevance_prompt("space movies", "A crew travels to Mars.", 100),
            "Query: space movies\nDocument: A crew travels to Mars.\nRelevance (1-10):"
        );
    }

    #[test]
    fn placeholders_in_input_are_not_expanded() {
        let p = relevance_prompt("{document}", "{query}", 100);
        assert_eq!(p, "Query: {document}\nDocument: {query}\nRelevance (1-10):");
    }

    #[test]
    fn empty_query_still_builds_prompt() {
        assert!(relevance_prompt("", "text", 100).starts_with("Query: \nDocument: text"));
    }

    #[test]
    fn long_documents_are_truncated_on_char_boundary() {
        let p = relevance_prompt("q", "ééééé", 3);
        assert!(p.contains("Document: ééé\n"));
    }
}
