use miette::Diagnostic;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::combinator::{all_consuming, rest, verify};
use nom::error::{Error as NomError, ErrorKind};
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("failed to parse emit query '{query}'")]
    #[diagnostic(
        code(driver::invalid_query),
        help("queries look like `record.<Type>` or `member.<Type>.<Member>`")
    )]
    InvalidQuery { query: String },
    #[error("emit query names '{name}', which is not a record of this compilation")]
    #[diagnostic(code(driver::unknown_record))]
    UnknownRecord { name: String },
    #[error("record '{record}' has no synthesized member named '{member}'")]
    #[diagnostic(code(driver::unknown_member))]
    UnknownMember { record: String, member: String },
}

/// A query narrowing what the emit operations print.
///
/// Dumping every synthesized member of a declaration file is a lot of text, so the textual
/// operations accept queries that select one record, or the members of one record sharing a name.
///
/// ```text
/// query  ::= "record" DOT type
///          | "member" DOT type DOT member
/// type   ::= [^.]+
/// member ::= any+
/// ```
///
/// Member names may contain dots themselves, so `member.Point..ctor` selects the constructors of
/// `Point`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitQuery {
    /// Every synthesized member of the record.
    Record(String),
    /// The synthesized members of the record with this metadata name.
    Member { record: String, member: String },
}

impl EmitQuery {
    /// Parse a list of queries.
    pub fn from_queries<S: AsRef<str>>(queries: &[S]) -> Result<Vec<Self>, QueryError> {
        let mut parsed_queries = Vec::with_capacity(queries.len());
        for query in queries {
            let query = query.as_ref();
            let (_, parsed) = EmitQuery::parse(query).map_err(|_| QueryError::InvalidQuery {
                query: query.to_owned(),
            })?;
            parsed_queries.push(parsed);
        }
        Ok(parsed_queries)
    }

    /// Name of the record the query selects from.
    pub fn record(&self) -> &str {
        match self {
            EmitQuery::Record(record) | EmitQuery::Member { record, .. } => record,
        }
    }

    /// Parse a single query.
    fn parse(input: &str) -> IResult<&str, Self> {
        let (input, namespace) = segment(input)?;
        let (input, _) = char('.')(input)?;
        match namespace {
            "record" => {
                let (input, record) = all_consuming(segment)(input)?;
                Ok((input, Self::Record(record.to_owned())))
            }
            "member" => {
                let (input, record) = segment(input)?;
                let (input, _) = char('.')(input)?;
                let (input, member) = verify(rest, |s: &str| !s.is_empty())(input)?;
                Ok((
                    input,
                    Self::Member {
                        record: record.to_owned(),
                        member: member.to_owned(),
                    },
                ))
            }
            _ => Err(nom::Err::Error(NomError::new(namespace, ErrorKind::Tag))),
        }
    }
}

fn segment(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '.')(input)
}

#[cfg(test)]
mod tests {
    use crate::query::{EmitQuery, QueryError};
    use recsynth_macros::{assert_err, assert_matches, assert_ok};

    #[test]
    fn test_parse_record_query() {
        let query = assert_ok!(EmitQuery::from_queries(&["record.Point"]));
        assert_eq!(query, vec![EmitQuery::Record("Point".to_owned())]);
    }

    #[test]
    fn test_parse_member_query_with_dotted_name() {
        let query = assert_ok!(EmitQuery::from_queries(&["member.Point..ctor", "member.P.Equals"]));
        assert_eq!(query.len(), 2);
        let (record, member) =
            assert_matches!(&query[0], EmitQuery::Member { record, member } => (record, member));
        assert_eq!(record, "Point");
        assert_eq!(member, ".ctor");
        assert_eq!(query[1].record(), "P");
    }

    #[test]
    fn test_reject_malformed_queries() {
        for query in ["hir.fn.main", "record.", "record.A.B", "member.A", "member.A.", "Point"] {
            let err = assert_err!(EmitQuery::from_queries(&[query]));
            assert_matches!(err, QueryError::InvalidQuery { query: q } => assert_eq!(q, query));
        }
    }
}
