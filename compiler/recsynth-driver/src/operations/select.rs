use crate::pipeline::{Pipeline, SynthesisUnit};
use crate::query::{EmitQuery, QueryError};
use recsynth_records::{RecordSynthesis, SynthesizedMember};

/// What one emitted document shows.
pub enum Selection<'c> {
    Record(&'c RecordSynthesis),
    Members(Vec<&'c SynthesizedMember>),
}

/// Resolve the pipeline's queries against the synthesized records.
///
/// Without queries every record is selected, in declaration order.
pub fn select<'c>(
    pipeline: &Pipeline,
    unit: SynthesisUnit<'c>,
) -> Result<Vec<Selection<'c>>, QueryError> {
    if pipeline.queries.is_empty() {
        return Ok(unit.output.records.iter().map(Selection::Record).collect());
    }
    pipeline
        .queries
        .iter()
        .map(|query| {
            let record = unit
                .compilation
                .lookup_type(query.record())
                .and_then(|ty| unit.output.record(ty))
                .ok_or_else(|| QueryError::UnknownRecord {
                    name: query.record().to_owned(),
                })?;
            match query {
                EmitQuery::Record(_) => Ok(Selection::Record(record)),
                EmitQuery::Member { member, .. } => {
                    let members = record
                        .members
                        .iter()
                        .filter(|m| m.descriptor.name == *member)
                        .collect::<Vec<_>>();
                    if members.is_empty() {
                        return Err(QueryError::UnknownMember {
                            record: query.record().to_owned(),
                            member: member.clone(),
                        });
                    }
                    Ok(Selection::Members(members))
                }
            }
        })
        .collect()
}
