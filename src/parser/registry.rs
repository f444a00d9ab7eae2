use serde::Serialize;
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// Known test-run types, keyed by the exact tag line the robot firmware
/// prints at the start of a run.
#[derive(
    AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq,
)]
pub enum TestKind {
    #[strum(serialize = "test_straight_v2")]
    StraightV2,
    #[strum(serialize = "test_straight")]
    Straight,
    #[strum(serialize = "test_turn")]
    Turn,
    #[strum(serialize = "test_minspeed")]
    MinSpeed,
    #[strum(serialize = "test_gyro_pd")]
    GyroPd,
}

impl Serialize for TestKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_ref())
    }
}

/// Fixed column layout for one test type.
///
/// The header text is the canonical comma-joined column list exactly as the
/// firmware echoes it after the tag line.
#[derive(Clone, Copy, Debug)]
pub struct TestSchema {
    pub kind: TestKind,
    header: &'static str,
}

impl TestSchema {
    /// Tag line that opens a block of this type
    pub fn tag(&self) -> &'static str {
        self.kind.into()
    }

    /// Canonical header line (comma-joined column names)
    pub fn header(&self) -> &'static str {
        self.header
    }

    /// Ordered column names
    pub fn columns(&self) -> impl Iterator<Item = &'static str> {
        self.header.split(',')
    }

    pub fn column_count(&self) -> usize {
        self.header.split(',').count()
    }
}

const STRAIGHT_V2_HEADER: &str =
    "time_s,menc,move_err,last_move_error,delta_move_err,vm,dt,current_power,gyro_err,vg,turnpower,left_avg,right_avg";

/// All recognized schemas, in declaration order.
/// test_gyro_pd logs the same columns as test_straight_v2.
pub static SCHEMAS: &[TestSchema] = &[
    TestSchema {
        kind: TestKind::StraightV2,
        header: STRAIGHT_V2_HEADER,
    },
    TestSchema {
        kind: TestKind::Straight,
        header: "time_s,menc,move_err,vm,current_power,gyro_err,vg,turnpower,left_avg,right_avg",
    },
    TestSchema {
        kind: TestKind::Turn,
        header: "time_s,gyro_err,vg,turnpower,left_avg,right_avg",
    },
    TestSchema {
        kind: TestKind::MinSpeed,
        header: "time_s,power,diff",
    },
    TestSchema {
        kind: TestKind::GyroPd,
        header: STRAIGHT_V2_HEADER,
    },
];

/// Look up the schema for a whitespace-trimmed line, if it is exactly a
/// registered tag.
pub fn schema_for_tag(line: &str) -> Option<&'static TestSchema> {
    let kind = TestKind::from_str(line).ok()?;
    schema_for_kind(kind)
}

pub fn schema_for_kind(kind: TestKind) -> Option<&'static TestSchema> {
    SCHEMAS.iter().find(|s| s.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_kind_has_a_schema() {
        for kind in TestKind::iter() {
            assert!(
                schema_for_kind(kind).is_some(),
                "missing schema for {:?}",
                kind
            );
        }
    }

    #[test]
    fn test_tag_lookup_is_exact() {
        assert_eq!(
            schema_for_tag("test_turn").map(|s| s.kind),
            Some(TestKind::Turn)
        );
        assert!(schema_for_tag("test_turn ").is_none());
        assert!(schema_for_tag("test_turned").is_none());
        assert!(schema_for_tag("TEST_TURN").is_none());
    }

    #[test]
    fn test_column_counts() {
        assert_eq!(schema_for_tag("test_straight_v2").unwrap().column_count(), 13);
        assert_eq!(schema_for_tag("test_straight").unwrap().column_count(), 10);
        assert_eq!(schema_for_tag("test_turn").unwrap().column_count(), 6);
        assert_eq!(schema_for_tag("test_minspeed").unwrap().column_count(), 3);
        assert_eq!(schema_for_tag("test_gyro_pd").unwrap().column_count(), 13);
    }

    #[test]
    fn test_time_is_first_column() {
        for schema in SCHEMAS {
            assert_eq!(schema.columns().next(), Some("time_s"));
        }
    }
}
