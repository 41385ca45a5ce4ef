/// Strip markdown code fences from a model reply. The intent contract
/// forbids fences, but a tolerant caller strips them before parsing.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
