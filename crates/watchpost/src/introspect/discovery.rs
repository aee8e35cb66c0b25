//! Member discovery and advisory tagging.

use serde::{Deserialize, Serialize};

use super::{EntityId, MemberDescriptor, TypeIntrospector};
use crate::error::{Error, Result};
use crate::value::{Value, format_value};

/// A named set of name fragments; members whose name contains any of the
/// terms (case-insensitive) get the tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicSet {
    pub tag: String,
    pub terms: Vec<String>,
}

impl HeuristicSet {
    pub fn new(tag: &str, terms: &[&str]) -> Self {
        Self {
            tag: tag.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Movement-speed, stamina and jump term sets
pub fn default_heuristics() -> Vec<HeuristicSet> {
    vec![
        HeuristicSet::new(
            "speed",
            &["speed", "velocity", "movespeed", "sprint", "walk"],
        ),
        HeuristicSet::new("stamina", &["stamina", "energy"]),
        HeuristicSet::new("jump", &["jump", "gravity", "airtime"]),
    ]
}

/// Applies heuristic sets to member names. Tags never affect discovery.
#[derive(Debug, Clone, Default)]
pub struct MemberTagger {
    sets: Vec<(String, Vec<String>)>,
}

impl MemberTagger {
    pub fn new(sets: &[HeuristicSet]) -> Self {
        let sets = sets
            .iter()
            .map(|s| {
                let terms = s.terms.iter().map(|t| t.to_lowercase()).collect();
                (s.tag.clone(), terms)
            })
            .collect();
        Self { sets }
    }

    pub fn tags_for(&self, member_name: &str) -> Vec<String> {
        let name = member_name.to_lowercase();
        self.sets
            .iter()
            .filter(|(_, terms)| terms.iter().any(|t| name.contains(t.as_str())))
            .map(|(tag, _)| tag.clone())
            .collect()
    }
}

/// Outcome of reading one member during discovery
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    Value(Value),
    /// The read failed; the message is kept for the placeholder
    Error(String),
    /// Write-only data member
    Unreadable,
    /// Invocable behavior, nothing to read
    Behavior,
}

impl MemberValue {
    /// Formatted value or placeholder
    pub fn render(&self) -> String {
        match self {
            MemberValue::Value(v) => format_value(v),
            MemberValue::Error(message) => format!("<error: {}>", message),
            MemberValue::Unreadable => "<write-only>".to_string(),
            MemberValue::Behavior => String::new(),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            MemberValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredMember {
    pub descriptor: MemberDescriptor,
    pub tags: Vec<String>,
    pub value: MemberValue,
}

/// Everything discovery found on one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityReport {
    pub id: EntityId,
    pub type_name: String,
    pub display_name: String,
    pub members: Vec<DiscoveredMember>,
}

impl EntityReport {
    pub fn data_members(&self) -> impl Iterator<Item = &DiscoveredMember> {
        self.members.iter().filter(|m| m.descriptor.is_data())
    }

    pub fn behaviors(&self) -> impl Iterator<Item = &DiscoveredMember> {
        self.members.iter().filter(|m| !m.descriptor.is_data())
    }
}

/// Read and tag a single member.
///
/// Returns `Err` only when the entity itself became invalid; any other read
/// failure becomes [`MemberValue::Error`].
pub fn discover_member<H: TypeIntrospector + ?Sized>(
    host: &H,
    entity: EntityId,
    descriptor: &MemberDescriptor,
    tagger: &MemberTagger,
) -> Result<DiscoveredMember> {
    let value = if !descriptor.is_data() {
        MemberValue::Behavior
    } else if !descriptor.readable {
        MemberValue::Unreadable
    } else {
        match host.read_member(entity, descriptor) {
            Ok(v) => MemberValue::Value(v),
            Err(e) if e.is_invalid_entity() => return Err(e),
            Err(e) => MemberValue::Error(e.to_string()),
        }
    };

    Ok(DiscoveredMember {
        descriptor: descriptor.clone(),
        tags: tagger.tags_for(&descriptor.name),
        value,
    })
}

/// Enumerate and read every member of an entity.
pub fn discover<H: TypeIntrospector + ?Sized>(
    host: &H,
    entity: EntityId,
    tagger: &MemberTagger,
) -> Result<EntityReport> {
    if !host.is_valid(entity) {
        return Err(Error::InvalidEntity(entity));
    }

    let type_name = host.type_name(entity)?;
    let display_name = host.display_name(entity)?;
    let descriptors = host.list_members(entity)?;

    let mut members = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        members.push(discover_member(host, entity, descriptor, tagger)?);
    }

    Ok(EntityReport {
        id: entity,
        type_name,
        display_name,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScriptedHost;

    fn stamina_host() -> (ScriptedHost, EntityId) {
        let mut host = ScriptedHost::new();
        host.define_type(
            "Stamina",
            vec![
                MemberDescriptor::field("Stamina", "EnergyCurrent", "float"),
                MemberDescriptor::property("Stamina", "SprintSpeed", "float", true),
                MemberDescriptor::property("Stamina", "Secret", "int", true),
                MemberDescriptor::method("Stamina", "Jump", &["float"], "void"),
            ],
        );
        let id = host.spawn("Player", "Stamina").unwrap();
        host.set_value(id, "EnergyCurrent", Value::Float(42.0)).unwrap();
        host.set_value(id, "SprintSpeed", Value::Float(6.5)).unwrap();
        (host, id)
    }

    #[test]
    fn test_tagger_matches_case_insensitively() {
        let tagger = MemberTagger::new(&default_heuristics());
        assert_eq!(tagger.tags_for("EnergyCurrent"), vec!["stamina"]);
        assert_eq!(tagger.tags_for("SprintSpeed"), vec!["speed"]);
        assert_eq!(tagger.tags_for("JumpForce"), vec!["jump"]);
        assert!(tagger.tags_for("Health").is_empty());
    }

    #[test]
    fn test_discover_reads_all_members() {
        let (host, id) = stamina_host();
        let tagger = MemberTagger::new(&default_heuristics());
        let report = discover(&host, id, &tagger).unwrap();

        assert_eq!(report.type_name, "Stamina");
        assert_eq!(report.display_name, "Player");
        assert_eq!(report.members.len(), 4);
        assert_eq!(report.data_members().count(), 3);
        assert_eq!(report.behaviors().count(), 1);
        assert_eq!(
            report.members[0].value,
            MemberValue::Value(Value::Float(42.0))
        );
        assert_eq!(report.members[0].tags, vec!["stamina"]);
    }

    #[test]
    fn test_failing_member_becomes_placeholder() {
        let (mut host, id) = stamina_host();
        host.fail_member(id, "SprintSpeed", "NullReferenceException")
            .unwrap();
        let tagger = MemberTagger::default();
        let report = discover(&host, id, &tagger).unwrap();

        let sprint = &report.members[1];
        assert!(matches!(sprint.value, MemberValue::Error(_)));
        assert!(sprint.value.render().starts_with("<error: "));
        assert!(sprint.value.render().contains("NullReferenceException"));
        // siblings still discovered
        assert_eq!(report.members[0].value.render(), "42.000");
    }

    #[test]
    fn test_tags_do_not_gate_discovery() {
        let (host, id) = stamina_host();
        let report = discover(&host, id, &MemberTagger::default()).unwrap();
        assert_eq!(report.members.len(), 4);
        assert!(report.members.iter().all(|m| m.tags.is_empty()));
    }

    #[test]
    fn test_invalid_entity() {
        let (mut host, id) = stamina_host();
        host.destroy(id);
        let err = discover(&host, id, &MemberTagger::default()).unwrap_err();
        assert!(err.is_invalid_entity());
    }
}
