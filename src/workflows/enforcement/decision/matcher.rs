use super::super::rules::{tokenize, RuleLookupError, RuleRepository, ViolationRule};

/// Resolve a report against the catalogue.
///
/// Precedence: exact code match first; otherwise a category/entity-type plus
/// keyword match over the free text. The hint may name either a category or
/// an entity type, so both columns are consulted. Without a hint and some
/// free text there is nothing to fall back on and the caller gets `None`.
pub(crate) fn match_rule(
    repository: &dyn RuleRepository,
    type_code: &str,
    entity_hint: Option<&str>,
    free_text: Option<&str>,
) -> Result<Option<ViolationRule>, RuleLookupError> {
    if let Some(rule) = repository.find_by_code(type_code)? {
        return Ok(Some(rule));
    }

    let Some(hint) = entity_hint.map(str::trim).filter(|hint| !hint.is_empty()) else {
        return Ok(None);
    };
    let tokens = free_text.map(tokenize).unwrap_or_default();
    if tokens.is_empty() {
        return Ok(None);
    }

    repository.find_by_category_and_keywords(hint, hint, &tokens)
}
