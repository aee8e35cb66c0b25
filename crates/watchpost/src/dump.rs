//! Text rendering of full structural dumps.

use crate::detect::Detection;
use crate::introspect::{DiscoveredMember, EntityReport, MemberValue};

const INDENT: &str = "  ";

fn member_line(member: &DiscoveredMember) -> String {
    let d = &member.descriptor;
    let mut line = format!("{:<8} {}", d.kind.to_string(), d.signature());
    if member.value != MemberValue::Behavior {
        line.push_str(" = ");
        line.push_str(&member.value.render());
        if !d.writable {
            line.push_str(" (read-only)");
        }
    }
    if !member.tags.is_empty() {
        line.push_str(&format!(" [{}]", member.tags.join(", ")));
    }
    line
}

/// Render every member of an entity, indented by walk depth
pub fn render_dump(report: &EntityReport, header: Option<&str>, depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    let mut lines = Vec::with_capacity(report.members.len() + 2);

    if let Some(header) = header {
        lines.push(format!("{}=== {} ===", pad, header));
    }
    lines.push(format!(
        "{}[{}] {} {} ({} members)",
        pad,
        report.type_name,
        report.display_name,
        report.id,
        report.members.len()
    ));
    for member in &report.members {
        lines.push(format!("{}{}{}", pad, INDENT, member_line(member)));
    }
    lines.join("\n")
}

/// Render the change and new-member lines of a detection pass
pub fn render_detection(detection: &Detection) -> Vec<String> {
    let mut lines = Vec::with_capacity(detection.changes.len() + detection.new_members.len());
    for member in &detection.new_members {
        lines.push(format!(
            "NEW MEMBER FOUND on {}: {}",
            detection.entity,
            member_line(member)
        ));
    }
    for change in &detection.changes {
        lines.push(format!("CHANGE {}", change));
    }
    lines
}
