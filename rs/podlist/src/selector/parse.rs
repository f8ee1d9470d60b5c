use kube::core::{Expression, Selector};
use std::collections::BTreeSet;

use super::SelectorError;

/// Parses the textual label selector form, e.g. `app=web,tier in (a,b),!legacy`.
/// An empty string selects everything.
pub fn parse_selector(input: &str) -> Result<Selector, SelectorError> {
    parse_expressions(input).map(|expressions| expressions.into_iter().collect())
}

fn parse_expressions(input: &str) -> Result<Vec<Expression>, SelectorError> {
    if input.trim().is_empty() {
        return Ok(vec![]);
    }
    split_requirements(input)?
        .into_iter()
        .map(|part| {
            if part.trim().is_empty() {
                Err(SelectorError::EmptyRequirement(input.to_owned()))
            } else {
                parse_requirement(part.trim())
            }
        })
        .collect()
}

// Commas inside a value set do not separate requirements
fn split_requirements(input: &str) -> Result<Vec<&str>, SelectorError> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SelectorError::UnbalancedParentheses(input.to_owned()))?;
            }
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SelectorError::UnbalancedParentheses(input.to_owned()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_requirement(req: &str) -> Result<Expression, SelectorError> {
    if let Some(open) = req.find('(') {
        return parse_set_requirement(req, open);
    }
    if let Some(key) = req.strip_prefix('!') {
        return Ok(Expression::DoesNotExist(validate_key(key.trim())?));
    }
    if let Some((key, value)) = req.split_once("!=") {
        return Ok(Expression::NotEqual(
            validate_key(key.trim())?,
            validate_value(value.trim())?,
        ));
    }
    if let Some((key, value)) = req.split_once("==").or_else(|| req.split_once('=')) {
        return Ok(Expression::Equal(
            validate_key(key.trim())?,
            validate_value(value.trim())?,
        ));
    }
    Ok(Expression::Exists(validate_key(req)?))
}

fn parse_set_requirement(req: &str, open: usize) -> Result<Expression, SelectorError> {
    let close = req
        .rfind(')')
        .filter(|close| *close > open && req[close + 1..].trim().is_empty())
        .ok_or_else(|| SelectorError::UnbalancedParentheses(req.to_owned()))?;

    let head = req[..open].trim();
    let (key, operator) = head
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| SelectorError::UnknownOperator(head.to_owned()))?;
    let key = validate_key(key.trim())?;

    let values = req[open + 1..close]
        .split(',')
        .map(|value| validate_value(value.trim()))
        .collect::<Result<BTreeSet<_>, _>>()?;
    if values.iter().all(String::is_empty) {
        return Err(SelectorError::EmptyValueSet(req.to_owned()));
    }

    match operator {
        "in" => Ok(Expression::In(key, values)),
        "notin" => Ok(Expression::NotIn(key, values)),
        other => Err(SelectorError::UnknownOperator(other.to_owned())),
    }
}

fn validate_key(key: &str) -> Result<String, SelectorError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if valid {
        Ok(key.to_owned())
    } else {
        Err(SelectorError::InvalidKey(key.to_owned()))
    }
}

fn validate_value(value: &str) -> Result<String, SelectorError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Ok(value.to_owned())
    } else {
        Err(SelectorError::InvalidValue(value.to_owned()))
    }
}
