//! Parse struct definitions from text using PEST.
//!
//! Type tags are checked here, at the boundary, so a definition that loads is
//! guaranteed to contain only known numeric types.

use std::path::Path;

use pest::Parser;
use pest_derive::Parser as PestParser;

use crate::buffer::BufferError;
use crate::structs::{WriteDefinition, WriteField};
use crate::types::NumberType;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct DefinitionParser;

/// Parse definition source. Text definitions never contain custom readers, so the
/// result is a [`WriteDefinition`]; convert it with `ReadDefinition::from` for decoding.
pub fn parse_definition(source: &str) -> Result<WriteDefinition, BufferError> {
    let pairs = DefinitionParser::parse(Rule::definition, source)
        .map_err(|e| BufferError::Definition(format!("parse error: {}", e)))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| BufferError::Definition("empty parse".to_string()))?;
    build_fields(pair)
}

/// Read and parse a definition file.
pub fn load_definition(path: impl AsRef<Path>) -> Result<WriteDefinition, BufferError> {
    let source = std::fs::read_to_string(path)?;
    parse_definition(&source)
}

fn build_fields(pair: pest::iterators::Pair<Rule>) -> Result<WriteDefinition, BufferError> {
    let mut def = WriteDefinition::new();
    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::field {
            continue;
        }
        let (name, spec) = build_field(inner)?;
        def.insert(name, spec);
    }
    Ok(def)
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<(String, WriteField), BufferError> {
    let mut it = pair.into_inner();
    let name = it
        .next()
        .ok_or_else(|| BufferError::Definition("field: missing name".to_string()))?
        .as_str()
        .to_string();
    let spec_pair = it
        .next()
        .ok_or_else(|| BufferError::Definition(format!("field {}: missing type", name)))?;
    let spec = match spec_pair.as_rule() {
        Rule::type_tag => WriteField::Number(NumberType::parse(spec_pair.as_str())?),
        Rule::size => {
            let n: usize = spec_pair
                .as_str()
                .parse()
                .map_err(|e| BufferError::Definition(format!("field {}: size: {}", name, e)))?;
            if n == 0 {
                return Err(BufferError::Definition(format!("field {}: size must be positive", name)));
            }
            WriteField::Bytes(n)
        }
        Rule::nested => WriteField::Nested(build_fields(spec_pair)?),
        r => return Err(BufferError::Definition(format!("field {}: unexpected {:?}", name, r))),
    };
    Ok((name, spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flat() {
        let def = parse_definition("a: u8; b: s24; c: 16;").expect("parse");
        let fields: Vec<_> = def.iter().map(|(n, f)| (n.to_string(), f.clone())).collect();
        assert_eq!(
            fields,
            vec![
                ("a".to_string(), WriteField::Number(NumberType::U8)),
                ("b".to_string(), WriteField::Number(NumberType::S24)),
                ("c".to_string(), WriteField::Bytes(16)),
            ]
        );
    }

    #[test]
    fn parse_size_zero_rejected() {
        let err = parse_definition("blob: 0;").unwrap_err();
        assert!(matches!(err, BufferError::Definition(_)));
    }

    #[test]
    fn parse_missing_semicolon_rejected() {
        assert!(parse_definition("a: u8 b: u8;").is_err());
    }
}
