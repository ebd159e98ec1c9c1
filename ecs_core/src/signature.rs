use thiserror::Error;

/// Where a signature column's component data lives.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Source {
    /// The component lives on the matched entity itself.
    FromEntity,
    /// The entity carries some component whose owner holds the requested
    /// component — one level of indirection.
    FromComponent,
}

/// Parse-time operator. `Or` always folds into the previously emitted
/// column; `Not` never emits a column.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Operator {
    And,
    Or,
    Not,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("signature has an empty term")]
    EmptyTerm,
    #[error("'!' cannot be combined with an Or alternative: {0:?}")]
    NotInOrAlternative(String),
}

/// Parses the comma/pipe signature grammar described in spec.md §6 and
/// drives `callback(source, operator, component_name)` once per term in
/// signature order. This is the "external parser" the systems engine
/// receives tokens from through a callback — it does not own lexing, only
/// consumes what this module produces.
///
/// Grammar (informal): terms are comma-separated; a term's alternatives are
/// pipe-separated. The first alternative of a term may be prefixed with `!`
/// (Not) or `:` (FromComponent source, otherwise FromEntity); later
/// alternatives inherit the Or operator and may independently carry a `:`
/// source prefix but never `!`.
pub fn parse(
    signature: &str,
    mut callback: impl FnMut(Source, Operator, &str),
) -> Result<(), ParseError> {
    if signature.trim().is_empty() {
        return Ok(());
    }

    for term in signature.split(',') {
        for (i, alt) in term.split('|').enumerate() {
            let mut s = alt.trim();
            if s.is_empty() {
                return Err(ParseError::EmptyTerm);
            }

            let operator = if i == 0 {
                if let Some(rest) = s.strip_prefix('!') {
                    s = rest.trim();
                    Operator::Not
                } else {
                    Operator::And
                }
            } else {
                if s.starts_with('!') {
                    return Err(ParseError::NotInOrAlternative(alt.to_string()));
                }
                Operator::Or
            };

            let source = if let Some(rest) = s.strip_prefix(':') {
                s = rest.trim();
                Source::FromComponent
            } else {
                Source::FromEntity
            };

            if s.is_empty() {
                return Err(ParseError::EmptyTerm);
            }

            callback(source, operator, s);
        }
    }

    Ok(())
}

/// Literal term count (commas + 1), ignoring `|`/`!`/`:` structure — matches
/// the ancestor C parser's naive `components_count`, which is what
/// `new_system` uses to reject empty signatures before even invoking the
/// parser.
pub fn term_count(signature: &str) -> usize {
    if signature.trim().is_empty() {
        0
    } else {
        signature.split(',').count()
    }
}
