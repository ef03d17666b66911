use crate::application::ports::ExtractorError;
use crate::domain::Question;

/// Parse an LLM completion into a validated question list.
///
/// Models wrap JSON in markdown fences or prose more often than not, so
/// strategies run from most to least structured:
/// 1. direct JSON array parse
/// 2. markdown code-block extraction
/// 3. JSON object with a "questions" key
/// 4. bracket-matched array search in surrounding text
pub fn parse_question_payload(response: &str) -> Result<Vec<Question>, ExtractorError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ExtractorError::InvalidResponse(
            "empty completion".to_string(),
        ));
    }

    if let Ok(questions) = serde_json::from_str::<Vec<Question>>(trimmed) {
        return Ok(renumber(questions));
    }

    if let Some(block) = extract_code_block(trimmed) {
        if let Ok(questions) = serde_json::from_str::<Vec<Question>>(block) {
            return Ok(renumber(questions));
        }
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(inner) = value.get("questions") {
            if let Ok(questions) = serde_json::from_value::<Vec<Question>>(inner.clone()) {
                return Ok(renumber(questions));
            }
        }
    }

    if let Some(questions) = find_question_array(trimmed) {
        return Ok(renumber(questions));
    }

    Err(ExtractorError::InvalidResponse(format!(
        "no question array in completion: {}",
        truncate(trimmed, 200)
    )))
}

/// Question order reflects position in the document; the model's own
/// numbering is not trusted.
fn renumber(mut questions: Vec<Question>) -> Vec<Question> {
    for (i, q) in questions.iter_mut().enumerate() {
        q.order = i as u32 + 1;
    }
    questions
}

fn extract_code_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n')?;
    let body = &after_fence[body_start + 1..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Try every bracket-matched candidate; prose ahead of the real array may
/// itself contain brackets.
fn find_question_array(text: &str) -> Option<Vec<Question>> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('[') {
        let start = search_from + offset;
        if let Some(candidate) = bracket_match(&text[start..]) {
            if let Ok(questions) = serde_json::from_str::<Vec<Question>>(candidate) {
                return Some(questions);
            }
        }
        search_from = start + 1;
    }
    None
}

fn bracket_match(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
