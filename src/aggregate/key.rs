//! Grouping key derivation.

use crate::aggregate::observation::Observation;

/// Identity of one summary series.
///
/// Each field is kept separately rather than joined into a delimited
/// string, so values containing any separator character cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupingKey {
    pub ip: String,
    pub status_code: u16,
    pub user_agent: String,
    pub method: String,
    pub proto: String,
    pub aggregate_path: String,
}

/// Derive the grouping key of an observation.
pub fn build_key(observation: &Observation) -> GroupingKey {
    GroupingKey {
        ip: observation.ip.clone(),
        status_code: observation.status_code,
        user_agent: observation.user_agent.clone(),
        method: observation.method.clone(),
        proto: observation.proto.clone(),
        aggregate_path: observation.aggregate_path.clone(),
    }
}
