//! Parser for the type names written inside declaration files.
//!
//! ```text
//! type     ::= base suffix*
//! base     ::= "delegate*" "<" type ("," type)* ">"
//!            | "(" element ("," element)+ ")"
//!            | identifier
//! element  ::= type identifier?
//! suffix   ::= "*" | "?"
//! ```

use crate::error::InvalidTypeNameError;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1, one_of};
use nom::combinator::{all_consuming, map, opt, recognize, verify};
use nom::multi::{many0, many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use recsynth_span::Span;

/// Unresolved syntax of a type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Named(String),
    Nullable(Box<TypeName>),
    Pointer(Box<TypeName>),
    /// Parameter types followed by the return type.
    FunctionPointer(Vec<TypeName>),
    Tuple(Vec<(TypeName, Option<String>)>),
}

pub fn parse_type_name(text: &str) -> Result<TypeName, InvalidTypeNameError> {
    let parsed = all_consuming(delimited(multispace0, type_name, multispace0))(text);
    match parsed {
        Ok((_, name)) => Ok(name),
        Err(_) => Err(InvalidTypeNameError {
            text: text.to_owned(),
            span: Span::empty(),
        }),
    }
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag(".")))),
    ))(input)
}

fn type_name(input: &str) -> IResult<&str, TypeName> {
    let (input, base) = alt((function_pointer, tuple, named))(input)?;
    let (input, suffixes) = many0(preceded(multispace0, one_of("*?")))(input)?;
    let ty = suffixes.into_iter().fold(base, |ty, suffix| match suffix {
        '*' => TypeName::Pointer(Box::new(ty)),
        _ => TypeName::Nullable(Box::new(ty)),
    });
    Ok((input, ty))
}

fn named(input: &str) -> IResult<&str, TypeName> {
    map(identifier, |name| TypeName::Named(name.to_owned()))(input)
}

fn function_pointer(input: &str) -> IResult<&str, TypeName> {
    map(
        preceded(
            terminated(tag("delegate*"), ws(char('<'))),
            terminated(separated_list1(ws(char(',')), type_name), ws(char('>'))),
        ),
        TypeName::FunctionPointer,
    )(input)
}

fn tuple(input: &str) -> IResult<&str, TypeName> {
    let element = pair(type_name, opt(preceded(multispace1, identifier)));
    map(
        verify(
            delimited(
                terminated(char('('), multispace0),
                separated_list1(ws(char(',')), element),
                preceded(multispace0, char(')')),
            ),
            |elements: &Vec<(TypeName, Option<&str>)>| elements.len() >= 2,
        ),
        |elements| {
            TypeName::Tuple(
                elements
                    .into_iter()
                    .map(|(ty, name)| (ty, name.map(str::to_owned)))
                    .collect(),
            )
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use crate::type_name::{parse_type_name, TypeName};
    use recsynth_macros::{assert_err, assert_matches, assert_ok};

    #[test]
    fn test_parse_nullable_named_type() {
        let name = assert_ok!(parse_type_name("string?"));
        let inner = assert_matches!(name, TypeName::Nullable(inner) => inner);
        assert_eq!(*inner, TypeName::Named("string".to_owned()));
    }

    #[test]
    fn test_parse_qualified_name() {
        let name = assert_ok!(parse_type_name(" System.Type "));
        assert_eq!(name, TypeName::Named("System.Type".to_owned()));
    }

    #[test]
    fn test_parse_function_pointer() {
        let name = assert_ok!(parse_type_name("delegate*<int, void>"));
        let parts = assert_matches!(name, TypeName::FunctionPointer(parts) => parts);
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_parse_pointer_and_tuple() {
        let name = assert_ok!(parse_type_name("int*"));
        assert_matches!(name, TypeName::Pointer(_) => ());
        let name = assert_ok!(parse_type_name("(int a, R b)"));
        let elements = assert_matches!(name, TypeName::Tuple(elements) => elements);
        assert_eq!(elements[0].1.as_deref(), Some("a"));
        assert_eq!(elements[1].0, TypeName::Named("R".to_owned()));
    }

    #[test]
    fn test_reject_malformed_names() {
        assert_err!(parse_type_name("(int)"));
        assert_err!(parse_type_name("int int"));
        assert_err!(parse_type_name(""));
    }
}
