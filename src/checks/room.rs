//! Room checks (ROOM-*)

use crate::checks::base::{CheckContext, Rule};
use crate::models::{Category, Issue, IssueId, Severity};
use crate::snapshot::{Room, Unit};

pub const RULES: &[Rule] = &[
    Rule::new("ROOM-001", Category::Room, "No active rooms in inactive units", rooms_in_inactive_units),
    Rule::new("ROOM-002", Category::Room, "Critical care rooms have oxygen", critical_care_oxygen),
    Rule::new("ROOM-003", Category::Room, "Critical care rooms have suction", critical_care_suction),
    Rule::new("ROOM-004", Category::Room, "Inpatient rooms have a pricing tier", pricing_tiers),
    Rule::new("ROOM-005", Category::Room, "Rooms have a room type", room_types),
    Rule::new("ROOM-006", Category::Room, "Isolation rooms exist for inpatient care", isolation_rooms),
    Rule::new("ROOM-007", Category::Room, "Ward patient rooms allow multiple beds", ward_occupancy),
];

fn counted(id: &'static str, severity: Severity, title: String, count: usize) -> Issue {
    Issue::new(IssueId::new(id), Category::Room, severity, title).count(count)
}

fn rooms_of<'a>(units: impl Iterator<Item = &'a Unit>) -> impl Iterator<Item = &'a Room> {
    units.flat_map(|u| u.rooms.iter())
}

fn rooms_in_inactive_units(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = rooms_of(ctx.snapshot.inactive_units()).count();
    if count == 0 {
        return Vec::new();
    }
    vec![counted(
        "ROOM-001",
        Severity::Warning,
        format!("{} active room(s) belong to inactive units", count),
        count,
    )
    .details("These rooms won't be usable since their parent unit is deactivated.")
    .fix_hint("Deactivate these rooms or reactivate their parent units.")]
}

fn critical_care_rooms<'a>(ctx: &CheckContext<'a>) -> impl Iterator<Item = &'a Room> {
    rooms_of(ctx.snapshot.active_units().filter(|u| u.is_critical_care()))
}

fn critical_care_oxygen(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = critical_care_rooms(ctx).filter(|r| !r.has_oxygen).count();
    if count == 0 {
        return Vec::new();
    }
    vec![counted(
        "ROOM-002",
        Severity::Warning,
        format!("{} critical care room(s) without oxygen supply", count),
        count,
    )
    .details("ICU/HDU/CCU rooms must have piped oxygen for patient safety.")
    .fix_hint("Enable the oxygen flag on these critical care rooms.")]
}

fn critical_care_suction(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = critical_care_rooms(ctx).filter(|r| !r.has_suction).count();
    if count == 0 {
        return Vec::new();
    }
    vec![counted(
        "ROOM-003",
        Severity::Info,
        format!("{} critical care room(s) without suction", count),
        count,
    )
    .details("Critical care rooms should have suction for airway management.")
    .fix_hint("Enable the suction flag on these rooms.")]
}

fn pricing_tiers(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = rooms_of(ctx.snapshot.active_units().filter(|u| u.is_bed_based()))
        .filter(|r| r.pricing_tier.is_none())
        .count();
    if count == 0 {
        return Vec::new();
    }
    vec![counted(
        "ROOM-004",
        Severity::Info,
        format!("{} IPD room(s) without a pricing tier", count),
        count,
    )
    .details("Pricing tier (ECONOMY, STANDARD, DELUXE, etc.) is used for auto-applying bed charges.")
    .fix_hint("Set the pricing tier on each IPD room.")]
}

fn room_types(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = rooms_of(ctx.snapshot.units.iter())
        .filter(|r| r.room_type.is_none())
        .count();
    if count == 0 {
        return Vec::new();
    }
    vec![counted(
        "ROOM-005",
        Severity::Info,
        format!("{} room(s) without a room type set", count),
        count,
    )
    .details("Room type (CONSULTATION, PROCEDURE, PATIENT_ROOM, etc.) helps with scheduling and reporting.")
    .fix_hint("Set the room type on each room.")]
}

fn isolation_rooms(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.snapshot.active_units().any(|u| u.is_bed_based()) {
        return Vec::new();
    }
    let has_isolation = rooms_of(ctx.snapshot.active_units()).any(|r| {
        matches!(
            r.room_type.as_deref(),
            Some("ISOLATION") | Some("NEGATIVE_PRESSURE")
        )
    });
    if has_isolation {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("ROOM-006"),
        Category::Room,
        Severity::Info,
        "No isolation / negative-pressure rooms configured",
    )
    .details("NABH recommends isolation rooms for infection control in IPD facilities.")
    .fix_hint("Add at least one ISOLATION or NEGATIVE_PRESSURE room type.")]
}

fn ward_occupancy(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = rooms_of(ctx.snapshot.active_units().filter(|u| u.is_type("WARD")))
        .filter(|r| r.room_type.as_deref() == Some("PATIENT_ROOM") && r.max_occupancy == Some(1))
        .count();
    if count == 0 {
        return Vec::new();
    }
    vec![counted(
        "ROOM-007",
        Severity::Info,
        format!("{} ward patient room(s) with maxOccupancy = 1", count),
        count,
    )
    .details("Ward rooms typically have multi-bed occupancy. Max occupancy may need adjustment.")
    .fix_hint("Review and set correct maxOccupancy for ward patient rooms.")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ids, run_rules};
    use crate::snapshot::BranchSnapshot;

    fn room(id: &str, room_type: &str) -> Room {
        Room {
            id: id.into(),
            room_type: Some(room_type.into()),
            pricing_tier: Some("STANDARD".into()),
            max_occupancy: Some(4),
            has_oxygen: true,
            has_suction: true,
            ..Default::default()
        }
    }

    fn unit(id: &str, type_code: &str, rooms: Vec<Room>) -> Unit {
        Unit {
            id: id.into(),
            name: id.into(),
            type_code: type_code.into(),
            rooms,
            ..Default::default()
        }
    }

    fn snapshot(units: Vec<Unit>) -> BranchSnapshot {
        BranchSnapshot {
            units,
            ..Default::default()
        }
    }

    #[test]
    fn test_well_equipped_rooms_pass() {
        let units = vec![
            unit("icu", "ICU", vec![room("i1", "PATIENT_ROOM"), room("i2", "ISOLATION")]),
            unit("ward", "WARD", vec![room("w1", "PATIENT_ROOM")]),
        ];
        assert!(run_rules(RULES, &snapshot(units)).is_empty());
    }

    #[test]
    fn test_critical_care_amenities() {
        let mut bare = room("i1", "ISOLATION");
        bare.has_oxygen = false;
        bare.has_suction = false;
        let mut half = room("i2", "PATIENT_ROOM");
        half.has_suction = false;
        let issues = run_rules(RULES, &snapshot(vec![unit("icu", "icu", vec![bare, half])]));
        assert_eq!(ids(&issues), vec!["ROOM-002", "ROOM-003"]);
        assert_eq!(issues[0].count, Some(1));
        assert_eq!(issues[1].count, Some(2));
    }

    #[test]
    fn test_inactive_units_and_missing_metadata() {
        let mut closed = unit("old", "OPD", vec![room("o1", "CONSULTATION"), room("o2", "CONSULTATION")]);
        closed.is_active = false;
        let mut untyped = room("w1", "PATIENT_ROOM");
        untyped.room_type = None;
        untyped.pricing_tier = None;
        let ward = unit("ward", "WARD", vec![untyped, room("w2", "ISOLATION")]);

        let issues = run_rules(RULES, &snapshot(vec![closed, ward]));
        assert_eq!(ids(&issues), vec!["ROOM-001", "ROOM-004", "ROOM-005"]);
        assert_eq!(issues[0].count, Some(2));
    }

    #[test]
    fn test_isolation_and_ward_occupancy() {
        let mut single = room("w1", "PATIENT_ROOM");
        single.max_occupancy = Some(1);
        let issues = run_rules(RULES, &snapshot(vec![unit("ward", "WARD", vec![single])]));
        assert_eq!(ids(&issues), vec!["ROOM-006", "ROOM-007"]);

        // No bed-based units: isolation is not expected.
        let clinic = unit("opd", "OPD", vec![room("c1", "CONSULTATION")]);
        assert!(run_rules(RULES, &snapshot(vec![clinic])).is_empty());
    }
}
